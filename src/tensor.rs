use image::{Rgb, RgbImage};
use ndarray::prelude::*;
use num_traits::clamp;

use crate::errors::{ClothSegError, Result};

/// ノード境界のテンソル変換
///
/// バッチは channel-last (N, H, W, 3)、値域 [0,1] の f32。ここでは
/// 1枚分 (H, W, 3) と `RgbImage` の相互変換だけを扱う。

pub fn image_from_tensor(tensor: ArrayView3<f32>) -> Result<RgbImage> {
    let (height, width, channels) = tensor.dim();
    if channels != 3 {
        return Err(ClothSegError::Validation {
            field: "image tensor".to_string(),
            reason: format!("expected 3 channels (channel-last), got {channels}"),
        });
    }

    Ok(RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let pixel = |c: usize| {
            let value = tensor[[y as usize, x as usize, c]] * 255.0;
            clamp(value, 0.0, 255.0) as u8
        };
        Rgb([pixel(0), pixel(1), pixel(2)])
    }))
}

pub fn image_to_tensor(image: &RgbImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    Array3::from_shape_fn(
        (height as usize, width as usize, 3),
        |(y, x, c)| f32::from(image.get_pixel(x as u32, y as u32)[c]) / 255.0,
    )
}
