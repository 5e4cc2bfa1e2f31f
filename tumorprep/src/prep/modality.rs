use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

/// MRI成像模态。通道顺序即声明顺序。
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Modality {
    Flair,
    T1,
    T1ce,
    T2,
}

impl Modality {
    /// 按通道顺序排列的全部模态。
    pub const ALL: [Modality; 4] = [Modality::Flair, Modality::T1, Modality::T1ce, Modality::T2];

    /// 文件名中的模态后缀。
    #[inline]
    pub fn suffix(self) -> &'static str {
        match self {
            Modality::Flair => "flair",
            Modality::T1 => "t1",
            Modality::T1ce => "t1ce",
            Modality::T2 => "t2",
        }
    }

    #[inline]
    pub fn channel(self) -> usize {
        self as usize
    }

    /// 病例目录下该模态的文件路径：`{patient_id}_{modality}.nii`。
    pub fn file_in<P, S>(self, patient_dir: P, patient_id: S) -> PathBuf
    where
        P: AsRef<Path>,
        S: AsRef<OsStr>,
    {
        patient_dir
            .as_ref()
            .join(patient_file_name(patient_id.as_ref(), self.suffix()))
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modality::Flair => "FLAIR",
            Modality::T1 => "T1",
            Modality::T1ce => "T1CE",
            Modality::T2 => "T2",
        };
        f.write_str(name)
    }
}

/// 病例目录下分割标注的文件路径：`{patient_id}_seg.nii`。
pub fn mask_file_in<P, S>(patient_dir: P, patient_id: S) -> PathBuf
where
    P: AsRef<Path>,
    S: AsRef<OsStr>,
{
    patient_dir
        .as_ref()
        .join(patient_file_name(patient_id.as_ref(), "seg"))
}

// 目录名不一定是合法UTF-8，文件名按原样拼接
fn patient_file_name(patient_id: &OsStr, suffix: &str) -> OsString {
    let mut name = patient_id.to_os_string();
    name.push("_");
    name.push(suffix);
    name.push(".nii");
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_order() {
        let channels: Vec<usize> = Modality::ALL.iter().map(|m| m.channel()).collect();
        assert_eq!(channels, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_file_naming() {
        let dir = Path::new("/data/BraTS20_Training_001");
        assert_eq!(
            Modality::T1ce.file_in(dir, "BraTS20_Training_001"),
            dir.join("BraTS20_Training_001_t1ce.nii")
        );
        assert_eq!(
            mask_file_in(dir, "BraTS20_Training_001"),
            dir.join("BraTS20_Training_001_seg.nii")
        );
    }
}
