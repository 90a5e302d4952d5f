use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::ports::connectivity::ConnectivityMonitor;
use crate::application::ports::form_gateway::{FormGateway, GatewayError};
use crate::application::ports::offline_store::OfflineStore;
use crate::domain::entities::forms::{CacheSnapshot, OutboxDraft};
use crate::domain::value_objects::form_kind::FormKind;
use crate::shared::error::OfflineError;

/// Per-entry sync status. In-memory only: an interrupted run leaves entries
/// `Queued` on disk and they are retried in full on the next run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Queued,
    Syncing,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct EntryOutcome {
    pub entry_id: i64,
    pub kind: FormKind,
    pub status: EntryStatus,
}

/// Aggregate result of one drain run.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub synced: u32,
    pub failed: u32,
    pub outcomes: Vec<EntryOutcome>,
}

impl SyncReport {
    pub fn summary(&self) -> String {
        format!("{} synced, {} failed", self.synced, self.failed)
    }
}

/// Where a save attempt ended up. Both variants are success-style from the
/// user's point of view; the queue variant just syncs later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    SavedOnline,
    SavedToOutbox { entry_id: i64 },
}

/// Drains the outbox against the network and routes failed or offline saves
/// into it. Entries are replayed one at a time: draining sequentially bounds
/// server load after a connectivity-restoration burst and keeps the per-item
/// status display meaningful.
pub struct SyncEngine {
    store: Arc<dyn OfflineStore>,
    gateway: Arc<dyn FormGateway>,
    connectivity: Arc<ConnectivityMonitor>,
    ack_delay: Duration,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn OfflineStore>,
        gateway: Arc<dyn FormGateway>,
        connectivity: Arc<ConnectivityMonitor>,
    ) -> Self {
        Self {
            store,
            gateway,
            connectivity,
            ack_delay: Duration::from_millis(500),
        }
    }

    /// Pause between a confirmed acknowledgment and queue deletion, so the
    /// per-item success state is visible in the queue UI.
    pub fn with_ack_delay(mut self, ack_delay: Duration) -> Self {
        self.ack_delay = ack_delay;
        self
    }

    /// Attempts a direct save; offline state, transport failure and server
    /// rejection all divert the mutation into the outbox instead of
    /// surfacing an error to the user.
    pub async fn submit(
        &self,
        user_id: &str,
        draft: OutboxDraft,
    ) -> Result<SubmitOutcome, OfflineError> {
        if !self.connectivity.is_online() {
            return self.divert_to_outbox(draft).await;
        }

        let path = normalize_path(&draft.url);
        match self
            .gateway
            .submit(&path, &draft.method, &draft.payload)
            .await
        {
            Ok(()) => {
                // the accepted payload is the freshest authoritative state
                let snapshot = CacheSnapshot::new(user_id, draft.kind, draft.payload.clone());
                if let Err(err) = self.store.store_cache(snapshot).await {
                    tracing::warn!(form = %draft.kind, error = %err, "cache update after save failed");
                }
                Ok(SubmitOutcome::SavedOnline)
            }
            Err(GatewayError::Status(status)) => {
                tracing::warn!(form = %draft.kind, status, "server rejected save, queueing for retry");
                self.divert_to_outbox(draft).await
            }
            Err(GatewayError::Unreachable(reason)) => {
                tracing::info!(form = %draft.kind, %reason, "save attempted offline, queueing");
                self.divert_to_outbox(draft).await
            }
        }
    }

    async fn divert_to_outbox(&self, draft: OutboxDraft) -> Result<SubmitOutcome, OfflineError> {
        let entry = self.store.enqueue(draft).await?;
        Ok(SubmitOutcome::SavedToOutbox { entry_id: entry.id })
    }

    pub async fn pending(&self) -> Result<u64, OfflineError> {
        self.store.outbox_len().await
    }

    /// One sequential pass over the queue, replaying in enqueue order.
    /// A failed entry stays queued untouched and the run continues.
    pub async fn drain(&self) -> Result<SyncReport, OfflineError> {
        let entries = self.store.list_outbox().await?;
        let mut report = SyncReport::default();

        for entry in entries.iter().rev() {
            let path = normalize_path(&entry.url);
            tracing::debug!(entry_id = entry.id, form = %entry.kind, %path, "syncing outbox entry");

            match self
                .gateway
                .submit(&path, &entry.method, &entry.payload)
                .await
            {
                Ok(()) => {
                    if !self.ack_delay.is_zero() {
                        tokio::time::sleep(self.ack_delay).await;
                    }
                    // the server has acknowledged; a failed delete only means
                    // an extra (idempotent) replay next run
                    if let Err(err) = self.store.remove_outbox(entry.id).await {
                        tracing::warn!(entry_id = entry.id, error = %err, "synced entry could not be removed");
                    }
                    report.synced += 1;
                    report.outcomes.push(EntryOutcome {
                        entry_id: entry.id,
                        kind: entry.kind,
                        status: EntryStatus::Success,
                    });
                }
                Err(err) => {
                    match err {
                        GatewayError::Status(status) => {
                            tracing::warn!(entry_id = entry.id, form = %entry.kind, status, "server rejected queued entry")
                        }
                        GatewayError::Unreachable(reason) => {
                            tracing::info!(entry_id = entry.id, form = %entry.kind, %reason, "queued entry unreachable")
                        }
                    }
                    report.failed += 1;
                    report.outcomes.push(EntryOutcome {
                        entry_id: entry.id,
                        kind: entry.kind,
                        status: EntryStatus::Error,
                    });
                }
            }
        }

        tracing::info!(
            synced = report.synced,
            failed = report.failed,
            "outbox drain finished"
        );
        Ok(report)
    }

    /// Resilience backstop: whenever connectivity is restored, re-check the
    /// queue length and drain whatever is pending.
    pub fn spawn_backstop(self: &Arc<Self>, mut rx: watch::Receiver<bool>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                if !*rx.borrow_and_update() {
                    continue;
                }
                match engine.pending().await {
                    Ok(0) => {}
                    Ok(count) => {
                        tracing::info!(count, "connectivity restored, draining outbox");
                        if let Err(err) = engine.drain().await {
                            tracing::warn!(error = %err, "backstop drain failed");
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "outbox length check failed");
                    }
                }
            }
        })
    }
}

/// Derives the request path from a stored endpoint. Entries queued in an
/// earlier session may carry a full origin (for instance a stale
/// `http://localhost:3000/...`); replay must target the current deployment,
/// so only the path survives.
pub fn normalize_path(stored_url: &str) -> String {
    if stored_url.starts_with("http://") || stored_url.starts_with("https://") {
        match reqwest::Url::parse(stored_url) {
            Ok(url) => url.path().to_string(),
            Err(_) => stored_url.to_string(),
        }
    } else if stored_url.starts_with('/') {
        stored_url.to_string()
    } else {
        format!("/{stored_url}")
    }
}
