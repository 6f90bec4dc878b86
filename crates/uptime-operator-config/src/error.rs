use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "マニフェストが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: uptime.local.kdl, uptime.kdl\n\
        - ./.uptime-operator/ ディレクトリ\n\
        - ~/.config/uptime-operator/uptime.kdl\n\
        または UPTIME_OPERATOR_MANIFEST 環境変数で直接指定できます"
    )]
    ManifestNotFound,

    #[error("API キーが設定されていません。UPTIMEROBOT_API_KEY を設定してください")]
    MissingApiKey,

    #[error("設定値が不正です: {0}")]
    Invalid(String),

    #[error("設定ファイルの解析に失敗しました: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
