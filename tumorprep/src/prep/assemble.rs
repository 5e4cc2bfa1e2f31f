//! 多模态样本组装。

use super::normalize::{normalize_slice, Normalization};
use super::resize::resize_nearest;
use crate::error::Result;
use ndarray::{stack, Array2, Array3, ArrayView2, Axis};

/// 一个训练样本：四通道图像(H, W, 4)与单通道二值掩膜(H, W, 1)。
#[derive(Clone, Debug)]
pub struct Sample {
    pub image: Array3<f32>,
    pub mask: Array3<u8>,
}

/// 组装同一深度索引下的四个模态切片与标注切片。
///
/// 调用前必须已经通过退化切片过滤：这里对每个模态做不带保护的归一化。
pub fn assemble(
    modalities: &[ArrayView2<f32>; 4],
    mask: ArrayView2<f32>,
    target: (usize, usize),
) -> Result<Sample> {
    let image = stack_channels(modalities, target, Normalization::Unguarded)?;
    let mask = binarize(resize_nearest(mask, target).view()).insert_axis(Axis(2));
    Ok(Sample { image, mask })
}

/// 各模态独立归一化后沿新的末尾轴按[flair, t1, t1ce, t2]顺序堆叠。
pub fn stack_channels(
    modalities: &[ArrayView2<f32>; 4],
    target: (usize, usize),
    normalization: Normalization,
) -> Result<Array3<f32>> {
    let channels: Vec<Array2<f32>> = modalities
        .iter()
        .map(|s| normalize_slice(s.view(), target, normalization))
        .collect();
    let views: Vec<ArrayView2<f32>> = channels.iter().map(|c| c.view()).collect();
    Ok(stack(Axis(2), &views)?)
}

/// 严格大于0的像素置1，其余置0。
pub fn binarize(mask: ArrayView2<f32>) -> Array2<u8> {
    mask.mapv(|v| u8::from(v > 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array};

    fn modality(seed: usize) -> Array2<f32> {
        Array::from_shape_fn((240, 240), |(h, w)| ((h * (seed + 3) + w * 11) % 251) as f32)
    }

    #[test]
    fn test_assemble_shapes_and_ranges() {
        let slices: Vec<Array2<f32>> = (0..4).map(modality).collect();
        let views = [slices[0].view(), slices[1].view(), slices[2].view(), slices[3].view()];
        let mut mask = Array2::<f32>::zeros((240, 240));
        mask.slice_mut(s![100..140, 80..120]).fill(2.0);
        mask[(0, 0)] = 4.0;

        let sample = assemble(&views, mask.view(), (128, 128)).unwrap();
        assert_eq!(sample.image.shape(), &[128, 128, 4]);
        assert_eq!(sample.mask.shape(), &[128, 128, 1]);
        assert!(sample.image.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(sample.mask.iter().all(|&v| v == 0 || v == 1));
        assert_eq!(sample.mask[(64, 53, 0)], 1);
        assert_eq!(sample.mask[(10, 10, 0)], 0);
    }

    #[test]
    fn test_channel_order() {
        // 每个通道只有一个像素的亮度不同，归一化后该像素为1
        let mut slices = vec![Array2::<f32>::zeros((4, 4)); 4];
        for (c, slice) in slices.iter_mut().enumerate() {
            slice[(c, c)] = 5.0;
        }
        let views = [slices[0].view(), slices[1].view(), slices[2].view(), slices[3].view()];
        let image = stack_channels(&views, (4, 4), Normalization::Unguarded).unwrap();
        for c in 0..4 {
            assert_eq!(image[(c, c, c)], 1.0);
            assert_eq!(image.slice(s![.., .., c]).sum(), 1.0);
        }
    }

    #[test]
    fn test_binarize_idempotent() {
        let labels = Array::from_shape_fn((8, 8), |(h, w)| ((h + w) % 5) as f32 - 1.0);
        let once = binarize(labels.view());
        let twice = binarize(once.mapv(f32::from).view());
        assert_eq!(once, twice);
        assert_eq!(once[(0, 0)], 0);
        assert_eq!(once[(0, 1)], 0);
        assert_eq!(once[(0, 2)], 1);
    }
}
