//! 预处理流程的错误类型。

use crate::prep::Modality;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    /// 上传文件名不是`.nii`或`.nii.gz`。
    #[error("Unsupported file format: `{0}` (expected `.nii` or `.nii.gz`)")]
    UnsupportedFormat(String),
    /// 四个模态的体数据形状不一致。
    #[error("All modalities must have the same shape! ({modality} is {found:?}, FLAIR is {expected:?})")]
    ShapeMismatch {
        modality: Modality,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// 两个掩膜的形状不一致。
    #[error("mask shapes differ: {0:?} vs {1:?}")]
    MaskShapeMismatch(Vec<usize>, Vec<usize>),
    #[error("slice index {index} out of bounds for volume depth {depth}")]
    SliceOutOfBounds { index: usize, depth: usize },
    #[error("expected a 3D volume, got shape {0:?}")]
    DimensionMismatch(Vec<usize>),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("NIfTI decoding failed: {0}")]
    Nifti(#[from] nifti::NiftiError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    /// 模型推理失败，由具体模型实现给出原因。
    #[error("model inference failed: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, PrepError>;
