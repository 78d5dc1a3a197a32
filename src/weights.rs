use std::fmt;
use std::path::{Path, PathBuf};

use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};

use crate::errors::{ClothSegError, Result};

/// ローカルモデルディレクトリ名（ホスト提供の models ディレクトリ配下）
pub const MODEL_DIR_NAME: &str = "segformer_b2_clothes";

/// フォールバック先のハブリポジトリ
pub const HUB_REPO_ID: &str = "mattmdjaga/segformer_b2_clothes";

/// ローカルディレクトリを「使用可能」と判定するための必須ファイル
pub const REQUIRED_FILES: [&str; 2] = ["config.json", "preprocessor_config.json"];

pub const PREPROCESSOR_CONFIG_FILE: &str = "preprocessor_config.json";
pub const WEIGHTS_FILE: &str = "model.onnx";
pub const HUB_WEIGHTS_FILE: &str = "onnx/model.onnx";

/// Where the model weights were ultimately resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    Local,
    Remote,
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local directory"),
            Self::Remote => write!(f, "hub"),
        }
    }
}

/// 解決済みモデル: ONNX重みと前処理設定ファイルのパスの組
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    pub source: ModelSource,
    pub weights: PathBuf,
    pub preprocessor_config: PathBuf,
}

/// Resolve the weights + preprocessor-config pair.
///
/// Attempt order is fixed: the local model directory is used only when it
/// exists and carries both required config files; anything short of that
/// falls back to the hub repository. Only when both attempts fail does the
/// whole initialization fail, with both reasons preserved.
pub fn resolve(models_dir: &Path) -> Result<ResolvedModel> {
    let local_reason = match resolve_local(models_dir) {
        Ok(resolved) => {
            tracing::info!(
                "loaded model from local path: {}",
                models_dir.join(MODEL_DIR_NAME).display()
            );
            return Ok(resolved);
        }
        Err(reason) => {
            tracing::warn!("local model unavailable ({reason}), falling back to hub");
            reason
        }
    };

    match resolve_remote() {
        Ok(resolved) => {
            tracing::info!("loaded model from hub repository: {HUB_REPO_ID}");
            Ok(resolved)
        }
        Err(remote_reason) => {
            tracing::error!("hub load failed: {remote_reason}");
            Err(ClothSegError::ModelUnavailable {
                local_reason,
                remote_reason,
            })
        }
    }
}

fn resolve_local(models_dir: &Path) -> std::result::Result<ResolvedModel, String> {
    let dir = models_dir.join(MODEL_DIR_NAME);
    if !dir.is_dir() {
        return Err(format!("{} does not exist", dir.display()));
    }

    for file in REQUIRED_FILES {
        if !dir.join(file).is_file() {
            return Err(format!("missing required file {file} in {}", dir.display()));
        }
    }

    // 重みは平置きと onnx/ サブディレクトリの両方を受ける
    let weights = [dir.join(WEIGHTS_FILE), dir.join(HUB_WEIGHTS_FILE)]
        .into_iter()
        .find(|path| path.is_file())
        .ok_or_else(|| {
            format!(
                "no ONNX weights ({WEIGHTS_FILE} or {HUB_WEIGHTS_FILE}) in {}",
                dir.display()
            )
        })?;

    Ok(ResolvedModel {
        source: ModelSource::Local,
        weights,
        preprocessor_config: dir.join(PREPROCESSOR_CONFIG_FILE),
    })
}

fn resolve_remote() -> std::result::Result<ResolvedModel, String> {
    let api = Api::new().map_err(|e| format!("hub api init: {e}"))?;
    let repo = api.repo(Repo::new(HUB_REPO_ID.to_string(), RepoType::Model));

    // ローカル判定と同じファイル一式をキャッシュへ揃える
    repo.get("config.json")
        .map_err(|e| format!("config.json: {e}"))?;
    let preprocessor_config = repo
        .get(PREPROCESSOR_CONFIG_FILE)
        .map_err(|e| format!("{PREPROCESSOR_CONFIG_FILE}: {e}"))?;
    let weights = repo
        .get(HUB_WEIGHTS_FILE)
        .map_err(|e| format!("{HUB_WEIGHTS_FILE}: {e}"))?;

    Ok(ResolvedModel {
        source: ModelSource::Remote,
        weights,
        preprocessor_config,
    })
}
