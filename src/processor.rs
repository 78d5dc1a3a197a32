use std::fs;
use std::path::Path;

use image::{imageops, imageops::FilterType, RgbImage};
use ndarray::prelude::*;
use nshare::AsNdarray3;
use serde::Deserialize;

use crate::errors::{ClothSegError, Result};

/// モデル入力サイズ。旧形式（単一値）と新形式（height/width）の両方を受ける
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum SizeConfig {
    Square(u32),
    Explicit { height: u32, width: u32 },
}

impl SizeConfig {
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Square(size) => (size, size),
            Self::Explicit { height, width } => (width, height),
        }
    }
}

/// `preprocessor_config.json` の前処理パラメータ
///
/// 未知のキー（image_processor_type など）は無視する。欠けたキーは
/// SegFormer の既定値で補う。
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorConfig {
    #[serde(default = "default_flag")]
    pub do_resize: bool,
    #[serde(default = "default_flag")]
    pub do_rescale: bool,
    #[serde(default = "default_flag")]
    pub do_normalize: bool,
    #[serde(default = "default_size")]
    pub size: SizeConfig,
    #[serde(default = "default_rescale_factor")]
    pub rescale_factor: f32,
    #[serde(default = "default_image_mean")]
    pub image_mean: [f32; 3],
    #[serde(default = "default_image_std")]
    pub image_std: [f32; 3],
}

const fn default_flag() -> bool {
    true
}

const fn default_size() -> SizeConfig {
    SizeConfig::Square(512)
}

const fn default_rescale_factor() -> f32 {
    1.0 / 255.0
}

const fn default_image_mean() -> [f32; 3] {
    [0.485, 0.456, 0.406]
}

const fn default_image_std() -> [f32; 3] {
    [0.229, 0.224, 0.225]
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            do_resize: default_flag(),
            do_rescale: default_flag(),
            do_normalize: default_flag(),
            size: default_size(),
            rescale_factor: default_rescale_factor(),
            image_mean: default_image_mean(),
            image_std: default_image_std(),
        }
    }
}

/// 画像→モデル入力テンソルの前処理器
///
/// resize → rescale → normalize → NCHW の順。SegFormer の
/// ImageProcessor と同じ規約に従う。
#[derive(Debug, Clone)]
pub struct SegformerProcessor {
    config: ProcessorConfig,
}

impl SegformerProcessor {
    pub const fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| ClothSegError::FileSystem {
            path: path.to_path_buf(),
            operation: "前処理設定読み込み".to_string(),
            source: e,
        })?;
        let config: ProcessorConfig = serde_json::from_str(&raw)?;
        Ok(Self::new(config))
    }

    pub const fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// モデル入力の (width, height)
    pub const fn input_size(&self) -> (u32, u32) {
        self.config.size.dimensions()
    }

    /// RGB画像を (1, 3, H, W) の f32 テンソルへ変換する
    pub fn preprocess(&self, image: &RgbImage) -> Array4<f32> {
        let (width, height) = self.input_size();
        let resized = if self.config.do_resize && image.dimensions() != (width, height) {
            // resample=2 (bilinear) 相当
            imageops::resize(image, width, height, FilterType::Triangle)
        } else {
            image.clone()
        };

        let scale = if self.config.do_rescale {
            self.config.rescale_factor
        } else {
            1.0
        };
        let mut tensor = resized.as_ndarray3().mapv(|v| f32::from(v) * scale);

        if self.config.do_normalize {
            for channel in 0..3 {
                let mean = self.config.image_mean[channel];
                let std = self.config.image_std[channel];
                tensor
                    .slice_mut(s![channel, .., ..])
                    .mapv_inplace(|v| (v - mean) / std);
            }
        }

        tensor.insert_axis(Axis(0))
    }
}

impl Default for SegformerProcessor {
    fn default() -> Self {
        Self::new(ProcessorConfig::default())
    }
}
