use std::path::Path;

use image::{imageops, imageops::FilterType, ImageBuffer, Luma, RgbImage};
use ndarray::prelude::*;
use ort::value::TensorRef;
use ort::session::{builder::SessionBuilder, Session};
use parking_lot::Mutex;

#[cfg(feature = "cuda")]
use ort::execution_providers::CUDAExecutionProvider;
#[cfg(feature = "tensorrt")]
use ort::execution_providers::TensorRTExecutionProvider;

use crate::{
    errors::{ClothSegError, Result},
    labels::NUM_LABELS,
    processor::SegformerProcessor,
    traits::HumanParsingModel,
    weights::{self, ModelSource, ResolvedModel},
};

/// SegFormer-B2 clothes の ONNX セッションラッパー
///
/// Session は &mut を要求するため Mutex で直列化する。プロセッサと
/// セッションは構築後は読み取り専用で、再ロードは行わない。
pub struct SegformerModel {
    processor: SegformerProcessor,
    source: ModelSource,
    session: Mutex<Session>,
}

impl SegformerModel {
    /// models ディレクトリから解決してロードする（ローカル→ハブの順）
    pub fn load(models_dir: &Path, device_id: i32) -> Result<Self> {
        let resolved = weights::resolve(models_dir)?;
        Self::new(&resolved, device_id)
    }

    pub fn new(resolved: &ResolvedModel, device_id: i32) -> Result<Self> {
        let processor = SegformerProcessor::from_file(&resolved.preprocessor_config)?;

        let builder = SessionBuilder::new().map_err(|e| ClothSegError::Model {
            operation: "セッションビルダー初期化".to_string(),
            source: Box::new(e),
        })?;

        #[cfg(any(feature = "cuda", feature = "tensorrt"))]
        let builder = builder
            .with_execution_providers([
                #[cfg(feature = "tensorrt")]
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
                #[cfg(feature = "cuda")]
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])
            .map_err(|e| ClothSegError::Model {
                operation: "実行プロバイダー設定".to_string(),
                source: Box::new(e),
            })?;
        #[cfg(not(any(feature = "cuda", feature = "tensorrt")))]
        let _ = device_id;

        let mut session = builder
            .with_memory_pattern(true)
            .map_err(|e| ClothSegError::Model {
                operation: "メモリパターン設定".to_string(),
                source: Box::new(e),
            })?
            .commit_from_file(&resolved.weights)
            .map_err(|e| ClothSegError::Model {
                operation: format!("モデルファイル読み込み: {}", resolved.weights.display()),
                source: Box::new(e),
            })?;

        // initialize model
        let (width, height) = processor.input_size();
        let data = Array4::<f32>::zeros((1, 3, height as usize, width as usize));
        session.run(ort::inputs!["pixel_values" => TensorRef::from_array_view(&data).map_err(|e| ClothSegError::Model {
            operation: "初期化テンソル作成".to_string(),
            source: Box::new(e),
        })?]).map_err(|e| ClothSegError::Model {
            operation: "モデル初期化実行".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            processor,
            source: resolved.source,
            session: Mutex::new(session),
        })
    }

    pub const fn source(&self) -> ModelSource {
        self.source
    }

    pub const fn processor(&self) -> &SegformerProcessor {
        &self.processor
    }

    /// 前処理済みテンソル (1, 3, H, W) からクラスロジット (1, 18, h', w') を得る
    pub fn predict_logits(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>> {
        let mut binding = self.session.lock();
        let outputs = binding.run(
            ort::inputs!["pixel_values" => TensorRef::from_array_view(&tensor.as_standard_layout())?],
        )?;
        Ok(outputs["logits"]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix4>()?
            .to_owned())
    }
}

impl HumanParsingModel for SegformerModel {
    fn parse(&self, image: &RgbImage) -> Result<Array2<u8>> {
        let tensor = self.processor.preprocess(image);
        let logits = self.predict_logits(tensor.view())?;
        let (width, height) = image.dimensions();
        upsample_argmax(&logits, width, height)
    }

    fn input_size(&self) -> (u32, u32) {
        self.processor.input_size()
    }
}

/// ロジットを元解像度へ双線形アップサンプルし、arg-max でラベルグリッドへ潰す
///
/// SegFormer はクラスロジットを入力の 1/4 解像度で出力するため、
/// クラス平面ごとに (width, height) へ拡大してから比較する。
/// corner alignment なしの双線形（Triangle フィルタ）。
pub fn upsample_argmax(logits: &Array4<f32>, width: u32, height: u32) -> Result<Array2<u8>> {
    let (batch, classes, plane_h, plane_w) = logits.dim();
    if batch != 1 || classes != NUM_LABELS {
        return Err(ClothSegError::Validation {
            field: "logits".to_string(),
            reason: format!("expected shape (1, {NUM_LABELS}, h, w), got {:?}", logits.dim()),
        });
    }

    let mut planes = Vec::with_capacity(classes);
    for class in 0..classes {
        let plane = logits.slice(s![0, class, .., ..]);
        let buffer = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(
            plane_w as u32,
            plane_h as u32,
            plane.iter().copied().collect(),
        )
        .ok_or_else(|| ClothSegError::Model {
            operation: "ロジット平面の再構成".to_string(),
            source: Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "logits plane does not match its declared shape",
            )),
        })?;
        planes.push(imageops::resize(&buffer, width, height, FilterType::Triangle));
    }

    let mut labels = Array2::<u8>::zeros((height as usize, width as usize));
    for y in 0..height {
        for x in 0..width {
            let mut best = 0u8;
            let mut best_score = f32::NEG_INFINITY;
            for (class, plane) in planes.iter().enumerate() {
                let score = plane.get_pixel(x, y)[0];
                if score > best_score {
                    best_score = score;
                    best = class as u8;
                }
            }
            labels[[y as usize, x as usize]] = best;
        }
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::Label;

    fn logits_with_winner(winner: usize, h: usize, w: usize) -> Array4<f32> {
        let mut logits = Array4::<f32>::zeros((1, NUM_LABELS, h, w));
        logits.slice_mut(s![0, winner, .., ..]).fill(10.0);
        logits
    }

    #[test]
    fn test_upsample_argmax_picks_dominant_class() {
        let logits = logits_with_winner(Label::Face.id() as usize, 16, 16);
        let labels = upsample_argmax(&logits, 64, 64).unwrap();

        assert_eq!(labels.dim(), (64, 64));
        assert!(labels.iter().all(|&l| l == Label::Face.id()));
    }

    #[test]
    fn test_upsample_argmax_no_resize_needed() {
        let logits = logits_with_winner(Label::Hair.id() as usize, 8, 8);
        let labels = upsample_argmax(&logits, 8, 8).unwrap();
        assert!(labels.iter().all(|&l| l == Label::Hair.id()));
    }

    #[test]
    fn test_upsample_argmax_split_regions() {
        // 左半分 Hat、右半分 Bag が勝つロジット
        let mut logits = Array4::<f32>::zeros((1, NUM_LABELS, 4, 4));
        logits
            .slice_mut(s![0, Label::Hat.id() as usize, .., 0..2])
            .fill(5.0);
        logits
            .slice_mut(s![0, Label::Bag.id() as usize, .., 2..4])
            .fill(5.0);

        let labels = upsample_argmax(&logits, 4, 4).unwrap();
        assert_eq!(labels[[0, 0]], Label::Hat.id());
        assert_eq!(labels[[3, 3]], Label::Bag.id());
    }

    #[test]
    fn test_upsample_argmax_rejects_wrong_class_count() {
        let logits = Array4::<f32>::zeros((1, 4, 8, 8));
        assert!(matches!(
            upsample_argmax(&logits, 8, 8),
            Err(ClothSegError::Validation { .. })
        ));
    }
}
