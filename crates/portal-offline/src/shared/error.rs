use thiserror::Error;

/// Error taxonomy for the offline layer.
///
/// `Storage` covers the local store being unavailable or corrupt; callers
/// degrade to "offline with nothing cached" rather than surfacing it as a
/// crash. `Network` and `Server` are kept distinct so a rejected request can
/// be logged separately from a dead link, even though both route the
/// submission into the outbox.
#[derive(Debug, Error)]
pub enum OfflineError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("network unreachable: {0}")]
    Network(String),
    #[error("server rejected request: status {0}")]
    Server(u16),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<sqlx::Error> for OfflineError {
    fn from(err: sqlx::Error) -> Self {
        OfflineError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for OfflineError {
    fn from(err: serde_json::Error) -> Self {
        OfflineError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for OfflineError {
    fn from(err: reqwest::Error) -> Self {
        OfflineError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OfflineError>;
