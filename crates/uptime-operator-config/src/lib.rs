pub mod error;
pub mod operator;

pub use error::*;
pub use operator::{OperatorConfig, RequeueConfig};

use std::path::PathBuf;

pub const ENV_MANIFEST_PATH: &str = "UPTIME_OPERATOR_MANIFEST";

/// グローバル設定ディレクトリ (~/.config/uptime-operator)
///
/// 参照専用。ディレクトリは作成しない。
pub fn global_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("uptime-operator"))
}

/// マニフェスト (uptime.kdl) を探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 UPTIME_OPERATOR_MANIFEST (直接パス指定)
/// 2. カレントディレクトリ: uptime.local.kdl, uptime.kdl
/// 3. ./.uptime-operator/ ディレクトリ内: 同様の順序
/// 4. ~/.config/uptime-operator/uptime.kdl (グローバル設定)
pub fn find_manifest_file() -> Result<PathBuf> {
    if let Ok(manifest_path) = std::env::var(ENV_MANIFEST_PATH) {
        let path = PathBuf::from(manifest_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    let candidates = ["uptime.local.kdl", "uptime.kdl"];

    for filename in &candidates {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let operator_dir = current_dir.join(".uptime-operator");
    if operator_dir.is_dir() {
        for filename in &candidates {
            let path = operator_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = global_config_dir() {
        let global = config_dir.join("uptime.kdl");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::ManifestNotFound)
}
