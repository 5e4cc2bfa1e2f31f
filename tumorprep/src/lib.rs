//! 脑肿瘤多模态MRI切片预处理。
//!
//! 从BraTS风格的病例目录中提取二维轴向切片，生成分割网络的训练样本；
//! 同时提供交互查看时单张切片的预处理、模型推理结果的后处理与可视化。

pub mod error;
pub mod metrics;
pub mod model;
pub mod prelude;
pub mod prep;
pub mod render;
pub mod viewer;

pub use error::{PrepError, Result};
