//! 分割模型句柄。
//!
//! 网络结构与推理运行时不在本crate内，这里只约定输入输出：输入批次(N, H, W, 4)，
//! 输出逐像素肿瘤概率(N, H, W, 1)。模型只加载一次，由调用方持有并显式传递。

use crate::error::{PrepError, Result};
use crate::prep::consts::PREDICTION_THRESHOLD;
use crate::viewer::ViewerInput;
use ndarray::{Array2, Array4, ArrayView4, Axis};
use std::path::{Path, PathBuf};
use tracing::info;

pub trait SegmentationModel {
    fn predict(&self, batch: ArrayView4<f32>) -> Result<Array4<f32>>;
}

/// 已加载的模型与其来源路径。
pub struct ModelHandle<M> {
    model: M,
    source: PathBuf,
}

impl<M: SegmentationModel> ModelHandle<M> {
    /// 用`loader`从`path`加载模型。
    pub fn load<P, F>(path: P, loader: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: FnOnce(&Path) -> Result<M>,
    {
        let source = path.as_ref().to_owned();
        let model = loader(source.as_path())?;
        info!(source = %source.display(), "segmentation model loaded");
        Ok(Self { model, source })
    }

    #[inline]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// 对单张切片推理，按`> 0.5`二值化得到(H, W)掩膜。
    pub fn segment(&self, input: &ViewerInput) -> Result<Array2<u8>> {
        let probs = self.model.predict(input.batch.view())?;
        let (_, h, w, _) = input.batch.dim();
        if probs.dim() != (1, h, w, 1) {
            return Err(PrepError::Model(format!(
                "expected prediction of shape {:?}, got {:?}",
                (1, h, w, 1),
                probs.dim()
            )));
        }
        let probs = probs.index_axis_move(Axis(0), 0).index_axis_move(Axis(2), 0);
        Ok(probs.mapv(|p| u8::from(p > PREDICTION_THRESHOLD)))
    }
}
