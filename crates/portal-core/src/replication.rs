use std::future::Future;

use sqlx::{Pool, Postgres};

/// The two replication targets. The primary is the single source of truth
/// for response correctness; the secondary is advisory and may silently fall
/// behind while it is down; there is no reconciliation and no catch-up.
#[derive(Clone)]
pub struct Replicas {
    pub primary: Pool<Postgres>,
    pub secondary: Option<Pool<Postgres>>,
}

impl Replicas {
    pub fn new(primary: Pool<Postgres>, secondary: Option<Pool<Postgres>>) -> Self {
        Self { primary, secondary }
    }

    /// Connects the primary (fatal on failure) and the secondary if one is
    /// configured. A secondary that cannot be reached at startup only
    /// disables shadow writes for this process.
    pub async fn connect(
        primary_url: &str,
        secondary_url: Option<&str>,
    ) -> anyhow::Result<Self> {
        let primary = crate::db::connect(primary_url).await?;
        let secondary = match secondary_url {
            Some(url) => match crate::db::connect(url).await {
                Ok(pool) => Some(pool),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        "secondary database unreachable at startup, shadow writes disabled"
                    );
                    None
                }
            },
            None => None,
        };
        Ok(Self { primary, secondary })
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary.is_some()
    }

    /// Dispatches the equivalent write against the secondary as a one-way
    /// message: the task is spawned and its result discarded except for
    /// logging. The response path never awaits it and nothing retries it.
    pub fn shadow<F, Fut>(&self, op: &'static str, write: F)
    where
        F: FnOnce(Pool<Postgres>) -> Fut,
        Fut: Future<Output = Result<(), sqlx::Error>> + Send + 'static,
    {
        let Some(pool) = self.secondary.clone() else {
            return;
        };
        let fut = write(pool);
        tokio::spawn(async move {
            if let Err(err) = fut.await {
                tracing::warn!(op, error = %err, "shadow write failed");
            }
        });
    }
}
