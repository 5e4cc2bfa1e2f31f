//! 二维切片缩放。
//!
//! 采样位置按像素中心对齐：输出索引`o`对应输入坐标`(o + 0.5) * factor - 0.5`，
//! 越界坐标按镜像方式折回。插值只在原值之间进行，不会截断或改变数值范围。

use ndarray::{Array2, ArrayView2, Axis};

/// 双线性缩放。缩小时先做高斯抗锯齿，`sigma = max(0, (factor - 1) / 2)`。
pub fn resize_linear(src: ArrayView2<f32>, (out_h, out_w): (usize, usize)) -> Array2<f32> {
    let (in_h, in_w) = src.dim();
    if (in_h, in_w) == (out_h, out_w) {
        return src.to_owned();
    }
    let factor_h = in_h as f64 / out_h as f64;
    let factor_w = in_w as f64 / out_w as f64;

    let mut smoothed = src.to_owned();
    if factor_h > 1.0 {
        smoothed = gaussian_along(smoothed.view(), Axis(0), (factor_h - 1.0) / 2.0);
    }
    if factor_w > 1.0 {
        smoothed = gaussian_along(smoothed.view(), Axis(1), (factor_w - 1.0) / 2.0);
    }

    let rows: Vec<(usize, usize, f64)> = (0..out_h)
        .map(|o| linear_taps(source_coord(o, factor_h), in_h))
        .collect();
    let cols: Vec<(usize, usize, f64)> = (0..out_w)
        .map(|o| linear_taps(source_coord(o, factor_w), in_w))
        .collect();

    Array2::from_shape_fn((out_h, out_w), |(h, w)| {
        let (h0, h1, th) = rows[h];
        let (w0, w1, tw) = cols[w];
        let top = lerp(smoothed[(h0, w0)] as f64, smoothed[(h0, w1)] as f64, tw);
        let bottom = lerp(smoothed[(h1, w0)] as f64, smoothed[(h1, w1)] as f64, tw);
        lerp(top, bottom, th) as f32
    })
}

/// 最近邻缩放（0阶插值），不会产生原数据中不存在的值。
pub fn resize_nearest<T: Copy>(src: ArrayView2<T>, (out_h, out_w): (usize, usize)) -> Array2<T> {
    let (in_h, in_w) = src.dim();
    let factor_h = in_h as f64 / out_h as f64;
    let factor_w = in_w as f64 / out_w as f64;

    let rows: Vec<usize> = (0..out_h)
        .map(|o| nearest_tap(source_coord(o, factor_h), in_h))
        .collect();
    let cols: Vec<usize> = (0..out_w)
        .map(|o| nearest_tap(source_coord(o, factor_w), in_w))
        .collect();

    Array2::from_shape_fn((out_h, out_w), |(h, w)| src[(rows[h], cols[w])])
}

#[inline]
fn source_coord(out: usize, factor: f64) -> f64 {
    (out as f64 + 0.5) * factor - 0.5
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// 将任意整数索引镜像折回`[0, len)`，边缘像素不重复（`d c b | a b c d | c b a`）。
fn mirror(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let i = index.rem_euclid(period);
    if i >= len as isize {
        (period - i) as usize
    } else {
        i as usize
    }
}

fn linear_taps(coord: f64, len: usize) -> (usize, usize, f64) {
    let lower = coord.floor();
    let t = coord - lower;
    let lower = lower as isize;
    (mirror(lower, len), mirror(lower + 1, len), t)
}

#[inline]
fn nearest_tap(coord: f64, len: usize) -> usize {
    mirror((coord + 0.5).floor() as isize, len)
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (4.0 * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x * x) as f64 / (sigma * sigma)).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

fn gaussian_along(src: ArrayView2<f32>, axis: Axis, sigma: f64) -> Array2<f32> {
    if sigma <= 0.0 {
        return src.to_owned();
    }
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let len = src.len_of(axis);

    let mut out = Array2::<f32>::zeros(src.dim());
    for (src_lane, mut out_lane) in src
        .lanes(axis)
        .into_iter()
        .zip(out.lanes_mut(axis).into_iter())
    {
        for i in 0..len {
            let acc: f64 = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    let j = mirror(i as isize + k as isize - radius, len);
                    w * src_lane[j] as f64
                })
                .sum();
            out_lane[i] = acc as f32;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array};

    #[test]
    fn test_mirror() {
        let folded: Vec<usize> = (-3..7).map(|i| mirror(i, 4)).collect();
        assert_eq!(folded, vec![3, 2, 1, 0, 1, 2, 3, 2, 1, 0]);
        assert_eq!(mirror(-5, 1), 0);
    }

    #[test]
    fn test_identity_resize() {
        let src = array![[0.5f32, 2.0], [-1.0, 7.25]];
        assert_eq!(resize_linear(src.view(), (2, 2)), src);
        assert_eq!(resize_nearest(src.view(), (2, 2)), src);
    }

    #[test]
    fn test_linear_preserves_range() {
        let src = Array::from_shape_fn((240, 240), |(h, w)| ((h * 7 + w * 13) % 97) as f32 - 20.0);
        let out = resize_linear(src.view(), (128, 128));
        assert_eq!(out.dim(), (128, 128));
        assert!(out.iter().all(|&v| (-20.0..=76.0).contains(&v)));
    }

    #[test]
    fn test_linear_constant_stays_constant() {
        let src = Array2::<f32>::from_elem((10, 30), 3.5);
        let out = resize_linear(src.view(), (128, 128));
        assert!(out.iter().all(|&v| (v - 3.5).abs() < 1e-5));
    }

    #[test]
    fn test_linear_upsample_midpoint() {
        // 1x2 -> 1x4: 采样坐标为 -0.25, 0.25, 0.75, 1.25
        let src = array![[0.0f32, 4.0]];
        let out = resize_linear(src.view(), (1, 4));
        let expected = [1.0f32, 1.0, 3.0, 3.0];
        for (v, e) in out.iter().zip(expected) {
            assert!((v - e).abs() < 1e-6, "{v} != {e}");
        }
    }

    #[test]
    fn test_nearest_keeps_labels() {
        let src = Array::from_shape_fn((240, 240), |(h, w)| match (h / 60, w / 60) {
            (1, 1) => 4.0f32,
            (2, _) => 2.0,
            (_, 3) => 1.0,
            _ => 0.0,
        });
        let out = resize_nearest(src.view(), (128, 128));
        assert!(out.iter().all(|v| [0.0, 1.0, 2.0, 4.0].contains(v)));
        assert_eq!(out[(40, 40)], 4.0);
    }

    #[test]
    fn test_gaussian_kernel_normalized() {
        let kernel = gaussian_kernel(0.375);
        assert_eq!(kernel.len(), 5);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}
