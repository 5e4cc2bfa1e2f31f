//! 数据集与预处理常量。

use std::time::Duration;

/// 目标切片高度。
pub const TARGET_HEIGHT: usize = 128;

/// 目标切片宽度。
pub const TARGET_WIDTH: usize = 128;

/// 每个病例默认扫描的切片深度上界（不含）。
pub const NUM_SLICES: usize = 155;

/// 默认切片步长。
pub const STRIDE: usize = 5;

/// 模态通道数。
pub const CHANNELS: usize = 4;

/// 交互路径中归一化分母的保护值。
pub const NORM_EPSILON: f32 = 1e-8;

/// 预测概率的二值化阈值。
pub const PREDICTION_THRESHOLD: f32 = 0.5;

/// 临时文件删除的最大尝试次数。
pub const DELETE_ATTEMPTS: usize = 3;

/// 临时文件删除失败后的等待时间。
pub const DELETE_BACKOFF: Duration = Duration::from_millis(100);
