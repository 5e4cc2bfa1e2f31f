//! 交互查看：四个独立上传的模态体数据，选取单张切片作为模型输入。

use crate::error::{PrepError, Result};
use crate::prep::consts::{TARGET_HEIGHT, TARGET_WIDTH};
use crate::prep::{stack_channels, Modality, Normalization, Volume};
use ndarray::{Array2, Array4, Axis};
use std::fs;
use std::path::Path;

/// 一个上传的文件：声明的文件名与文件内容。
#[derive(Clone, Debug)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    #[inline]
    pub fn new<S: Into<String>>(name: S, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// 以文件名作为声明名读入整个文件。
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, fs::read(path)?))
    }

    pub fn load(&self) -> Result<Volume> {
        Volume::from_upload(&self.name, self.bytes.as_slice())
    }
}

/// 单张切片的模型输入。
#[derive(Clone, Debug)]
pub struct ViewerInput {
    pub depth_index: usize,
    /// 归一化后的FLAIR切片，用于显示。
    pub flair: Array2<f32>,
    /// 模型输入批次(1, H, W, 4)。
    pub batch: Array4<f32>,
}

/// 同一次扫描的四个模态，按[flair, t1, t1ce, t2]排列，形状保证一致。
#[derive(Clone, Debug)]
pub struct ViewerSession {
    volumes: [Volume; 4],
    target: (usize, usize),
}

impl ViewerSession {
    pub fn new(volumes: [Volume; 4]) -> Result<Self> {
        let expected = volumes[0].shape();
        for (modality, volume) in Modality::ALL.into_iter().zip(volumes.iter()).skip(1) {
            if volume.shape() != expected {
                return Err(PrepError::ShapeMismatch {
                    modality,
                    expected: expected.to_vec(),
                    found: volume.shape().to_vec(),
                });
            }
        }
        Ok(Self {
            volumes,
            target: (TARGET_HEIGHT, TARGET_WIDTH),
        })
    }

    pub fn from_uploads(uploads: &[Upload; 4]) -> Result<Self> {
        Self::new([
            uploads[0].load()?,
            uploads[1].load()?,
            uploads[2].load()?,
            uploads[3].load()?,
        ])
    }

    #[inline]
    pub fn with_target(mut self, target: (usize, usize)) -> Self {
        self.target = target;
        self
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.volumes[0].shape()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.volumes[0].depth()
    }

    /// 默认选中的切片：深度的中间位置。
    #[inline]
    pub fn default_slice(&self) -> usize {
        self.depth() / 2
    }

    #[inline]
    pub fn volume(&self, modality: Modality) -> &Volume {
        &self.volumes[modality.channel()]
    }

    /// 以带保护的归一化预处理深度索引处的四个切片。
    pub fn prepare(&self, depth_index: usize) -> Result<ViewerInput> {
        let slices = [
            self.volumes[0].slice(depth_index)?,
            self.volumes[1].slice(depth_index)?,
            self.volumes[2].slice(depth_index)?,
            self.volumes[3].slice(depth_index)?,
        ];
        let image = stack_channels(&slices, self.target, Normalization::guarded())?;
        let flair = image
            .index_axis(Axis(2), Modality::Flair.channel())
            .to_owned();
        Ok(ViewerInput {
            depth_index,
            flair,
            batch: image.insert_axis(Axis(0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array3};
    use nifti::writer::WriterOptions;

    fn volume(shape: (usize, usize, usize), seed: usize) -> Volume {
        Volume::from_array(Array::from_shape_fn(shape, |(x, y, z)| {
            ((x * 7 + y * 3 + z + seed) % 41) as f32
        }))
    }

    #[test]
    fn test_shape_mismatch() {
        let err = ViewerSession::new([
            volume((32, 32, 5), 0),
            volume((32, 32, 5), 1),
            volume((32, 32, 4), 2),
            volume((32, 32, 5), 3),
        ])
        .unwrap_err();
        match err {
            PrepError::ShapeMismatch {
                modality,
                expected,
                found,
            } => {
                assert_eq!(modality, Modality::T1ce);
                assert_eq!(expected, vec![32, 32, 5]);
                assert_eq!(found, vec![32, 32, 4]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_prepare_batch() {
        let session = ViewerSession::new([
            volume((240, 240, 9), 0),
            volume((240, 240, 9), 1),
            volume((240, 240, 9), 2),
            volume((240, 240, 9), 3),
        ])
        .unwrap();
        assert_eq!(session.default_slice(), 4);

        let input = session.prepare(session.default_slice()).unwrap();
        assert_eq!(input.batch.shape(), &[1, 128, 128, 4]);
        assert_eq!(input.flair.dim(), (128, 128));
        assert!(input.batch.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(
            input.flair,
            input.batch.index_axis(Axis(0), 0).index_axis_move(Axis(2), 0)
        );
        assert!(session.prepare(9).is_err());
    }

    #[test]
    fn test_prepare_degenerate_slice_is_finite() {
        let flat = Volume::from_array(Array3::zeros((16, 16, 2)));
        let session = ViewerSession::new([
            flat.clone(),
            volume((16, 16, 2), 1),
            volume((16, 16, 2), 2),
            volume((16, 16, 2), 3),
        ])
        .unwrap()
        .with_target((16, 16));
        let input = session.prepare(0).unwrap();
        assert!(input.batch.iter().all(|v| v.is_finite()));
        assert!(input.flair.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_from_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let mut uploads = Vec::new();
        for (seed, name) in ["f.nii", "t1.nii.gz", "t1ce.nii", "t2.nii.gz"].iter().enumerate() {
            let path = dir.path().join(name);
            WriterOptions::new(&path)
                .write_nifti(volume((20, 20, 3), seed).data())
                .unwrap();
            uploads.push(Upload::read_from(&path).unwrap());
        }
        let uploads: [Upload; 4] = [
            uploads[0].clone(),
            uploads[1].clone(),
            uploads[2].clone(),
            uploads[3].clone(),
        ];
        let session = ViewerSession::from_uploads(&uploads).unwrap();
        assert_eq!(session.shape(), &[20, 20, 3]);
        assert_eq!(session.volume(Modality::T2).data(), volume((20, 20, 3), 3).data());
    }

    #[test]
    fn test_upload_bad_extension() {
        let bad = Upload::new("flair.dcm", vec![0; 8]);
        assert!(matches!(bad.load(), Err(PrepError::UnsupportedFormat(_))));
    }
}
