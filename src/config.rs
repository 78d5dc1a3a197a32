use clap::{ArgAction, Parser};
use image::ImageFormat;
use std::path::PathBuf;

use crate::labels::CategoryToggles;

#[derive(Parser, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    pub input_dir: PathBuf,

    #[arg(default_value = "output")]
    pub output_dir: PathBuf,

    /// ホスト提供の models ディレクトリ。この配下の
    /// segformer_b2_clothes を探し、無ければハブへフォールバックする
    #[arg(short, long, default_value = "models")]
    pub models_dir: PathBuf,

    #[arg(short, long, default_value = "png", value_parser = check_format)]
    pub format: String,

    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,

    // カテゴリトグル。既定は全て有効（マスクに残す）
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub face: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub hat: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub hair: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub upper_clothes: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub skirt: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub pants: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub dress: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub belt: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub shoe: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub leg: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub arm: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub bag: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub scarf: bool,
}

impl Config {
    /// CLIフラグをノードのカテゴリトグルへ写す
    pub const fn toggles(&self) -> CategoryToggles {
        CategoryToggles {
            face: self.face,
            hat: self.hat,
            hair: self.hair,
            upper_clothes: self.upper_clothes,
            skirt: self.skirt,
            pants: self.pants,
            dress: self.dress,
            belt: self.belt,
            shoe: self.shoe,
            leg: self.leg,
            arm: self.arm,
            bag: self.bag,
            scarf: self.scarf,
        }
    }
}

fn check_format(s: &str) -> Result<String, String> {
    let supported: Vec<_> = ImageFormat::all()
        .filter(|f| f.writing_enabled())
        .flat_map(|f| f.extensions_str())
        .map(|s| format!("`{}`", s))
        .collect();
    let supported_message = format!("Supported formats: {}", supported.join(", "));

    let format = ImageFormat::from_extension(s)
        .ok_or(format!("{} is not supported. {}", s, supported_message))?;
    if !format.writing_enabled() {
        return Err(format!("{} is not supported. {}", s, supported_message));
    }

    Ok(s.to_string())
}
