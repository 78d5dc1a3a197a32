use image::RgbImage;
use ndarray::prelude::*;

use crate::errors::Result;
use crate::labels::NUM_LABELS;
use crate::traits::HumanParsingModel;

/// テスト用のモック人体パースモデル
///
/// 赤チャンネルの値からラベルを決定する。推論を伴わず決定的なので、
/// バッチ一貫性などのパイプライン検証に使う。
#[derive(Debug, Clone)]
pub struct MockParsingModel {
    pub image_size: u32,
}

impl MockParsingModel {
    pub const fn new(image_size: u32) -> Self {
        Self { image_size }
    }
}

impl HumanParsingModel for MockParsingModel {
    fn parse(&self, image: &RgbImage) -> Result<Array2<u8>> {
        let (width, height) = image.dimensions();
        Ok(Array2::from_shape_fn(
            (height as usize, width as usize),
            |(y, x)| image.get_pixel(x as u32, y as u32)[0] % NUM_LABELS as u8,
        ))
    }

    fn input_size(&self) -> (u32, u32) {
        (self.image_size, self.image_size)
    }
}

/// テスト用のファクトリー関数
pub const fn create_mock_model() -> MockParsingModel {
    MockParsingModel::new(512)
}
