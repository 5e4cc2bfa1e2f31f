//! 退化切片过滤：任一模态的原始切片动态范围为0时，整个深度索引被排除。

use super::modality::Modality;
use super::normalize::dynamic_range;
use ndarray::ArrayView2;

#[inline]
pub fn is_degenerate(slice: ArrayView2<f32>) -> bool {
    dynamic_range(slice) == 0.0
}

/// 按通道顺序检查四个模态的原始切片，返回第一个退化的模态。
pub fn first_degenerate(slices: &[ArrayView2<f32>; 4]) -> Option<Modality> {
    Modality::ALL
        .into_iter()
        .zip(slices.iter())
        .find(|(_, s)| is_degenerate(s.view()))
        .map(|(m, _)| m)
}
