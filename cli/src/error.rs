use harmonia_core::types::{AppConfigError, CacheKeyError, ProjectIdError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no data directory: pass --data-dir or set HARMONIA_DATA_DIR")]
    NoDataDir,

    #[error("config error: {0}")]
    Config(#[from] AppConfigError),

    #[error("invalid project id: {0}")]
    InvalidProjectId(#[from] ProjectIdError),

    #[error("invalid cache key: {0}")]
    InvalidKey(#[from] CacheKeyError),

    #[error("value is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid or expired link")]
    InvalidLink,

    #[error("{0} is not cached")]
    NotCached(String),

    #[error("{0} was not persisted: the durable cache is unavailable")]
    NotPersisted(String),
}
