use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::ports::form_gateway::{FetchOutcome, FormGateway, GatewayError};
use crate::domain::value_objects::form_kind::FormKind;
use crate::shared::error::OfflineError;

/// `reqwest`-backed gateway bound to the current API base. Queued entries
/// only ever store relative paths (or have their origin stripped before
/// replay), so pointing a new session at a different deployment only means
/// constructing this with the new base.
pub struct HttpFormGateway {
    client: reqwest::Client,
    base: reqwest::Url,
}

impl HttpFormGateway {
    pub fn new(api_base: &str) -> Result<Self, OfflineError> {
        let base = reqwest::Url::parse(api_base)
            .map_err(|err| OfflineError::InvalidInput(format!("invalid api base: {err}")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| OfflineError::Network(err.to_string()))?;
        Ok(Self { client, base })
    }

    fn join(&self, path: &str) -> Result<reqwest::Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|err| GatewayError::Unreachable(format!("bad endpoint {path}: {err}")))
    }
}

#[async_trait]
impl FormGateway for HttpFormGateway {
    async fn fetch_form(
        &self,
        kind: FormKind,
        user_id: &str,
    ) -> Result<FetchOutcome, GatewayError> {
        let url = self.join(&kind.fetch_path(user_id))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| GatewayError::Unreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| GatewayError::Unreachable(err.to_string()))?;

        if body.get("exists").and_then(Value::as_bool) == Some(false) {
            return Ok(FetchOutcome::Missing);
        }
        let data = match body.get("data") {
            Some(data) => data.clone(),
            None => body,
        };
        Ok(FetchOutcome::Found(data))
    }

    async fn submit(
        &self,
        path: &str,
        method: &str,
        payload: &Value,
    ) -> Result<(), GatewayError> {
        let url = self.join(path)?;
        let method =
            reqwest::Method::from_bytes(method.as_bytes()).unwrap_or(reqwest::Method::POST);

        let response = self
            .client
            .request(method, url)
            .json(payload)
            .send()
            .await
            .map_err(|err| GatewayError::Unreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_api_base() {
        assert!(HttpFormGateway::new("not a url").is_err());
        assert!(HttpFormGateway::new("http://localhost:3000").is_ok());
    }

    #[tokio::test]
    async fn unreachable_host_reports_transport_failure() {
        // nothing listens on port 9 locally; connection is refused outright
        let gateway = HttpFormGateway::new("http://127.0.0.1:9/").unwrap();
        let err = gateway
            .submit("/api/save-enrolment", "POST", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unreachable(_)));
    }
}
