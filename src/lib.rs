pub mod config;
pub mod errors;
pub mod labels;
pub mod mask;
pub mod model;
pub mod processor;
pub mod tensor;
pub mod traits;
pub mod weights;

pub mod mocks;

use image::RgbImage;
use ndarray::prelude::*;

pub use config::Config;
pub use errors::{ClothSegError, Result};
pub use labels::{Category, CategoryToggles, Label};
pub use model::SegformerModel;
pub use processor::{ProcessorConfig, SegformerProcessor};
pub use traits::HumanParsingModel;
pub use weights::{ModelSource, ResolvedModel};

#[cfg(test)]
pub use mocks::*;

/// マスク生成ノードの本体
///
/// モデルは一度だけ構築して渡す。トグルは呼び出しごとに外部から
/// 与えられ、呼び出し内では不変。
pub struct MaskPipeline<M: HumanParsingModel> {
    model: M,
}

impl<M: HumanParsingModel> MaskPipeline<M> {
    pub const fn new(model: M) -> Self {
        Self { model }
    }

    pub const fn model(&self) -> &M {
        &self.model
    }

    /// 1画像から {0,255} の3チャンネルマスク画像を生成する
    pub fn mask_image(&self, image: &RgbImage, toggles: &CategoryToggles) -> Result<RgbImage> {
        let labels_grid = self.model.parse(image)?;
        let binary = mask::build_mask(labels_grid.view(), toggles);
        Ok(mask::mask_to_image(binary.view()))
    }

    /// ノード契約: channel-last (N, H, W, 3)・値域 [0,1] のバッチを受け、
    /// 同形のマスクバッチを入力順で返す
    ///
    /// 途中の画像で失敗した場合は全体が失敗する（部分結果は返さない）。
    pub fn mask_batch(
        &self,
        batch: ArrayView4<f32>,
        toggles: &CategoryToggles,
    ) -> Result<Array4<f32>> {
        let (count, height, width, channels) = batch.dim();
        if channels != 3 {
            return Err(ClothSegError::Validation {
                field: "image batch".to_string(),
                reason: format!("expected channel-last RGB batch, got {channels} channels"),
            });
        }
        if count == 0 {
            return Ok(Array4::zeros((0, height, width, 3)));
        }

        tracing::debug!(
            "masking batch of {count}, suppressed labels: {:?}",
            toggles.suppressed_labels()
        );

        let mut masks = Vec::with_capacity(count);
        for item in batch.axis_iter(Axis(0)) {
            let image = tensor::image_from_tensor(item)?;
            let mask_image = self.mask_image(&image, toggles)?;
            masks.push(tensor::image_to_tensor(&mask_image));
        }

        let views: Vec<_> = masks.iter().map(Array3::view).collect();
        ndarray::stack(Axis(0), &views).map_err(Into::into)
    }
}
