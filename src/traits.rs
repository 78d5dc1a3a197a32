use image::RgbImage;
use ndarray::Array2;

use crate::errors::Result;

/// 人体パースモデルの抽象化
///
/// 依存関係逆転原則（DIP）に従い、具象クラスではなく抽象に依存する
pub trait HumanParsingModel: Send + Sync {
    /// 1画像を画素ごとのラベルグリッド (H, W) へ変換する
    fn parse(&self, image: &RgbImage) -> Result<Array2<u8>>;

    /// モデルの入力画像サイズ (width, height)
    fn input_size(&self) -> (u32, u32);
}
