//! 切片归一化：缩放到目标分辨率，再线性映射到[0, 1]。

use super::consts::NORM_EPSILON;
use super::resize::resize_linear;
use ndarray::{Array2, ArrayView2};

/// 线性映射时分母的处理方式。
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Normalization {
    /// 直接除以`max - min`。调用方必须事先排除退化切片，否则结果为NaN。
    Unguarded,
    /// 除以`max - min + epsilon`，退化切片映射为全0。
    Guarded { epsilon: f32 },
}

impl Normalization {
    /// 交互路径使用的归一化方式。
    #[inline]
    pub fn guarded() -> Self {
        Normalization::Guarded {
            epsilon: NORM_EPSILON,
        }
    }

    #[inline]
    fn denominator(self, min: f32, max: f32) -> f32 {
        match self {
            Normalization::Unguarded => max - min,
            Normalization::Guarded { epsilon } => max - min + epsilon,
        }
    }
}

/// 切片的最小值与最大值。空切片返回`None`。
pub fn min_max(slice: ArrayView2<f32>) -> Option<(f32, f32)> {
    let mut it = slice.iter().copied();
    let first = it.next()?;
    Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// 切片的动态范围`max - min`，空切片视为0。
#[inline]
pub fn dynamic_range(slice: ArrayView2<f32>) -> f32 {
    min_max(slice).map_or(0.0, |(lo, hi)| hi - lo)
}

/// 将切片缩放到`target`分辨率后线性映射到[0, 1]。
pub fn normalize_slice(
    slice: ArrayView2<f32>,
    target: (usize, usize),
    normalization: Normalization,
) -> Array2<f32> {
    let mut resized = resize_linear(slice, target);
    if let Some((min, max)) = min_max(resized.view()) {
        let denom = normalization.denominator(min, max);
        resized.mapv_inplace(|v| (v - min) / denom);
    }
    resized
}
