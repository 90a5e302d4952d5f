pub mod hydration;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use crate::application::ports::form_gateway::{FetchOutcome, FormGateway, GatewayError};
    use crate::domain::value_objects::form_kind::FormKind;
    use crate::infrastructure::sqlite_store::SqliteStore;

    /// Gateway with scripted responses, consumed in call order.
    #[derive(Default)]
    pub struct MockGateway {
        pub fetch_results: Mutex<VecDeque<Result<FetchOutcome, GatewayError>>>,
        pub submit_results: Mutex<VecDeque<Result<(), GatewayError>>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl MockGateway {
        pub fn push_fetch(&self, result: Result<FetchOutcome, GatewayError>) {
            self.fetch_results.lock().unwrap().push_back(result);
        }

        pub fn push_submit(&self, result: Result<(), GatewayError>) {
            self.submit_results.lock().unwrap().push_back(result);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FormGateway for MockGateway {
        async fn fetch_form(
            &self,
            kind: FormKind,
            user_id: &str,
        ) -> Result<FetchOutcome, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("GET {}", kind.fetch_path(user_id)));
            self.fetch_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Unreachable("no scripted fetch".into())))
        }

        async fn submit(
            &self,
            path: &str,
            method: &str,
            _payload: &Value,
        ) -> Result<(), GatewayError> {
            self.calls.lock().unwrap().push(format!("{method} {path}"));
            self.submit_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Unreachable("no scripted submit".into())))
        }
    }

    /// Gateway that must never be reached; proves a path settled locally.
    pub struct UnreachableGateway;

    #[async_trait]
    impl FormGateway for UnreachableGateway {
        async fn fetch_form(
            &self,
            _kind: FormKind,
            _user_id: &str,
        ) -> Result<FetchOutcome, GatewayError> {
            panic!("network must not be consulted on this path");
        }

        async fn submit(
            &self,
            _path: &str,
            _method: &str,
            _payload: &Value,
        ) -> Result<(), GatewayError> {
            panic!("network must not be consulted on this path");
        }
    }

    pub async fn temp_store() -> (Arc<SqliteStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("portal.db").display());
        let store = SqliteStore::open(&url).await.expect("open store");
        (Arc::new(store), dir)
    }
}
