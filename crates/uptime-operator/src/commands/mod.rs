pub mod run;
pub mod status;
pub mod validate;

use std::path::PathBuf;

/// 明示されたパス、なければ自動検出したマニフェスト
pub fn resolve_manifest(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(uptime_operator_config::find_manifest_file()?),
    }
}
