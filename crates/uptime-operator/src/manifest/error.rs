use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("不明なノードです: {0}")]
    UnknownNode(String),

    #[error("{kind} '{name}': {message}")]
    Invalid {
        kind: &'static str,
        name: String,
        message: String,
    },

    #[error("{kind} '{key}' が重複して宣言されています")]
    Duplicate { kind: &'static str, key: String },
}

impl ManifestError {
    pub(crate) fn invalid(kind: &'static str, name: &str, message: impl Into<String>) -> Self {
        ManifestError::Invalid {
            kind,
            name: name.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ManifestError>;
