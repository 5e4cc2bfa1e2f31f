//! 切片与掩膜的可视化。数组的第0轴为图像的行（高度），第1轴为列（宽度）。

use crate::error::{PrepError, Result};
use image::{GrayImage, Luma, Rgb, RgbImage};
use ndarray::ArrayView2;

/// 默认的掩膜叠加颜色。
pub const OVERLAY_RED: Rgb<u8> = Rgb([0xFF, 0x00, 0x00]);

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// [0, 1]范围内的切片转为灰度图。
pub fn gray_image(slice: ArrayView2<f32>) -> GrayImage {
    let (h, w) = slice.dim();
    GrayImage::from_fn(w as u32, h as u32, |x, y| {
        Luma([to_byte(slice[(y as usize, x as usize)])])
    })
}

/// 二值掩膜转为黑白图。
pub fn mask_image(mask: ArrayView2<u8>) -> GrayImage {
    let (h, w) = mask.dim();
    GrayImage::from_fn(w as u32, h as u32, |x, y| {
        if mask[(y as usize, x as usize)] != 0 {
            Luma([0xFF])
        } else {
            Luma([0x00])
        }
    })
}

/// 将掩膜为1的像素以`color`叠加在灰度切片上。
pub fn overlay(flair: ArrayView2<f32>, mask: ArrayView2<u8>, color: Rgb<u8>) -> Result<RgbImage> {
    if flair.dim() != mask.dim() {
        let (fh, fw) = flair.dim();
        let (mh, mw) = mask.dim();
        return Err(PrepError::MaskShapeMismatch(vec![fh, fw], vec![mh, mw]));
    }
    let (h, w) = flair.dim();
    Ok(RgbImage::from_fn(w as u32, h as u32, |x, y| {
        let pos = (y as usize, x as usize);
        if mask[pos] != 0 {
            color
        } else {
            let v = to_byte(flair[pos]);
            Rgb([v, v, v])
        }
    }))
}
