use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request failed: {status} - {body}")]
    RequestFailed { status: u16, body: String },

    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Pagination stalled at startAt={start_at} with total={total}")]
    PaginationStalled { start_at: u32, total: u32 },
}

impl Error {
    /// 保存済みフィルターが存在しない（削除済み・権限なし）ことを示すレスポンスかどうか
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::RequestFailed { status: 400 | 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
