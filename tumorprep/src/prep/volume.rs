//! 体数据加载：从磁盘路径或内存上传读取单个模态的NIfTI体数据。

use super::consts::{DELETE_ATTEMPTS, DELETE_BACKOFF};
use crate::error::{PrepError, Result};
use ndarray::{Array3, ArrayD, ArrayView2, Axis, Ix3};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::thread;
use tracing::{debug, warn};

/// 可识别的体数据文件后缀。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VolumeSuffix {
    Nii,
    NiiGz,
}

impl VolumeSuffix {
    /// 根据文件名判断后缀。`.nii.gz`优先于`.nii`匹配。
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".nii.gz") {
            Some(VolumeSuffix::NiiGz)
        } else if name.ends_with(".nii") {
            Some(VolumeSuffix::Nii)
        } else {
            None
        }
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            VolumeSuffix::Nii => ".nii",
            VolumeSuffix::NiiGz => ".nii.gz",
        }
    }
}

/// 单个模态（或分割标注）的三维体数据，轴顺序为(width, height, depth)。
#[derive(Clone, Debug)]
pub struct Volume {
    data: Array3<f32>,
}

impl Volume {
    #[inline]
    pub fn from_array(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// 从磁盘读取`.nii`或`.nii.gz`文件。
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "decoding volume");
        let obj = ReaderOptions::new().read_file(path)?;
        let voxels = obj.into_volume().into_ndarray::<f32>()?;
        Ok(Self {
            data: into_3d(voxels)?,
        })
    }

    /// 从内存中的上传内容读取体数据，`name`为上传时声明的文件名。
    ///
    /// 解码器只接受文件路径，并依据后缀判断是否为gzip压缩，因此内容会先落盘到带有
    /// 相同后缀的临时文件中。解码完成后临时文件会被删除；删除失败时按固定间隔重试，
    /// 仍失败则放弃（文件泄漏，不报错）。
    pub fn from_upload<R: Read>(name: &str, reader: R) -> Result<Self> {
        Self::from_upload_in(env::temp_dir(), name, reader)
    }

    /// 同`from_upload`，临时文件建在`dir`下。
    pub fn from_upload_in<P, R>(dir: P, name: &str, mut reader: R) -> Result<Self>
    where
        P: AsRef<Path>,
        R: Read,
    {
        let suffix = VolumeSuffix::from_name(name)
            .ok_or_else(|| PrepError::UnsupportedFormat(name.to_owned()))?;

        let mut tmp = tempfile::Builder::new()
            .prefix("tumorprep-upload-")
            .suffix(suffix.as_str())
            .tempfile_in(dir)?;
        io::copy(&mut reader, &mut tmp)?;
        tmp.flush()?;
        let tmp_path = tmp.into_temp_path().keep().map_err(|e| e.error)?;

        let decoded = Self::open(tmp_path.as_path());
        remove_with_retry(tmp_path.as_path());
        decoded
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 沿第三个轴的切片个数。
    #[inline]
    pub fn depth(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// 取得深度索引为`index`的二维切片。
    pub fn slice(&self, index: usize) -> Result<ArrayView2<'_, f32>> {
        if index >= self.depth() {
            return Err(PrepError::SliceOutOfBounds {
                index,
                depth: self.depth(),
            });
        }
        Ok(self.data.index_axis(Axis(2), index))
    }

    #[inline]
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }
}

fn into_3d(mut voxels: ArrayD<f32>) -> Result<Array3<f32>> {
    // 形如(x, y, z, 1)的体数据去掉尾部单例轴
    while voxels.ndim() > 3 && voxels.shape()[voxels.ndim() - 1] == 1 {
        let last = voxels.ndim() - 1;
        voxels = voxels.index_axis_move(Axis(last), 0);
    }
    if voxels.ndim() != 3 {
        return Err(PrepError::DimensionMismatch(voxels.shape().to_vec()));
    }
    Ok(voxels.into_dimensionality::<Ix3>()?)
}

/// 删除临时文件，失败时按固定间隔重试。返回文件是否已被删除。
fn remove_with_retry(path: &Path) -> bool {
    for attempt in 1..=DELETE_ATTEMPTS {
        match fs::remove_file(path) {
            Ok(()) => return true,
            Err(e) => {
                debug!(path = %path.display(), attempt, error = %e, "failed to remove temporary volume");
                if attempt < DELETE_ATTEMPTS {
                    thread::sleep(DELETE_BACKOFF);
                }
            }
        }
    }
    warn!(path = %path.display(), "temporary volume left behind");
    false
}
