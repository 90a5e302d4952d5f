use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::value_objects::form_kind::FormKind;
use crate::shared::error::OfflineError;

/// Result of fetching authoritative form state.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Found(Value),
    /// The server answered but has nothing on record for this user/form.
    Missing,
}

/// Transport failure and server rejection are distinct: both leave the
/// mutation queued, but a rejection is logged for diagnosis while a dead
/// link is ordinary offline operation.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network unreachable: {0}")]
    Unreachable(String),
    #[error("server returned status {0}")]
    Status(u16),
}

impl From<GatewayError> for OfflineError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unreachable(msg) => OfflineError::Network(msg),
            GatewayError::Status(status) => OfflineError::Server(status),
        }
    }
}

/// Network access for hydration fetches and outbox replay.
#[async_trait]
pub trait FormGateway: Send + Sync {
    async fn fetch_form(
        &self,
        kind: FormKind,
        user_id: &str,
    ) -> Result<FetchOutcome, GatewayError>;

    /// Sends one mutation to a relative path on the current API base.
    async fn submit(&self, path: &str, method: &str, payload: &Value)
        -> Result<(), GatewayError>;
}
