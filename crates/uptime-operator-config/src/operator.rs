//! オペレーター本体の設定
//!
//! 優先順位: デフォルト値 < 設定ファイル (YAML) < 環境変数

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_KEY: &str = "UPTIMEROBOT_API_KEY";
pub const ENV_API_URL: &str = "UPTIMEROBOT_API_URL";
pub const ENV_CONFIG_PATH: &str = "UPTIME_OPERATOR_CONFIG";

pub const DEFAULT_API_URL: &str = "https://api.uptimerobot.com/v2";
const CONFIG_FILE: &str = "config.yaml";

/// 種別ごとの再確認間隔 (秒)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequeueConfig {
    pub alert_contact_secs: u64,
    pub monitor_secs: u64,
    pub account_secs: u64,
}

impl Default for RequeueConfig {
    fn default() -> Self {
        Self {
            alert_contact_secs: 15,
            monitor_secs: 15,
            account_secs: 30,
        }
    }
}

/// uptime-operator の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    /// UptimeRobot の API キー (`run` 時は必須)
    pub api_key: Option<String>,

    pub api_url: String,

    pub request_timeout_secs: u64,

    /// state.json と lock.json を置くディレクトリ
    pub state_dir: PathBuf,

    pub requeue: RequeueConfig,

    /// 即時リトライ時の待ち時間 (ミリ秒)
    pub retry_delay_ms: u64,

    pub max_concurrent_reconciles: usize,

    /// マニフェストの再読み込み間隔 (秒)
    pub manifest_poll_secs: u64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            state_dir: PathBuf::from(".uptime-operator"),
            requeue: RequeueConfig::default(),
            retry_delay_ms: 1000,
            max_concurrent_reconciles: 4,
            manifest_poll_secs: 10,
        }
    }
}

impl OperatorConfig {
    /// 設定を読み込む
    ///
    /// 1. 環境変数 UPTIME_OPERATOR_CONFIG で指定されたファイル
    /// 2. ~/.config/uptime-operator/config.yaml
    /// 3. どちらもなければデフォルト値
    ///
    /// 最後に環境変数で上書きする。
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                crate::global_config_dir()
                    .map(|d| d.join(CONFIG_FILE))
                    .filter(|p| p.exists())
            });

        let config = match path {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };

        config.apply_env().validated()
    }

    /// 指定されたファイルから読み込む (環境変数は適用しない)
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// 環境変数で上書きする
    pub fn apply_env(mut self) -> Self {
        if let Ok(key) = std::env::var(ENV_API_KEY)
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }
        if let Ok(url) = std::env::var(ENV_API_URL)
            && !url.is_empty()
        {
            self.api_url = url;
        }
        self
    }

    fn validated(self) -> Result<Self> {
        if self.max_concurrent_reconciles == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_reconciles は 1 以上にしてください".to_string(),
            ));
        }
        if self.requeue.alert_contact_secs == 0
            || self.requeue.monitor_secs == 0
            || self.requeue.account_secs == 0
        {
            return Err(ConfigError::Invalid(
                "requeue の間隔は 1 秒以上にしてください".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn manifest_poll_interval(&self) -> Duration {
        Duration::from_secs(self.manifest_poll_secs)
    }

    pub fn alert_contact_requeue(&self) -> Duration {
        Duration::from_secs(self.requeue.alert_contact_secs)
    }

    pub fn monitor_requeue(&self) -> Duration {
        Duration::from_secs(self.requeue.monitor_secs)
    }

    pub fn account_requeue(&self) -> Duration {
        Duration::from_secs(self.requeue.account_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = OperatorConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.alert_contact_requeue(), Duration::from_secs(15));
        assert_eq!(config.monitor_requeue(), Duration::from_secs(15));
        assert_eq!(config.account_requeue(), Duration::from_secs(30));
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_load_from_partial_yaml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(
            &path,
            "api_key: file-key\nrequeue:\n  monitor_secs: 60\nmax_concurrent_reconciles: 8\n",
        )
        .unwrap();

        let config = OperatorConfig::load_from(&path).unwrap();
        assert_eq!(config.require_api_key().unwrap(), "file-key");
        assert_eq!(config.requeue.monitor_secs, 60);
        // 指定していない値はデフォルトのまま
        assert_eq!(config.requeue.alert_contact_secs, 15);
        assert_eq!(config.max_concurrent_reconciles, 8);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "api_key: file-key\napi_url: http://file\n").unwrap();

        temp_env::with_vars(
            [
                (ENV_CONFIG_PATH, Some(path.to_str().unwrap())),
                (ENV_API_KEY, Some("env-key")),
                (ENV_API_URL, None),
            ],
            || {
                let config = OperatorConfig::load().unwrap();
                assert_eq!(config.require_api_key().unwrap(), "env-key");
                assert_eq!(config.api_url, "http://file");
            },
        );
    }

    #[test]
    #[serial]
    fn test_invalid_concurrency_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "max_concurrent_reconciles: 0\n").unwrap();

        temp_env::with_var(ENV_CONFIG_PATH, Some(path.to_str().unwrap()), || {
            assert!(matches!(
                OperatorConfig::load(),
                Err(ConfigError::Invalid(_))
            ));
        });
    }
}
