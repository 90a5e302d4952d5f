use async_trait::async_trait;

use crate::domain::entities::forms::{CacheSnapshot, DraftRecord, OutboxDraft, OutboxEntry};
use crate::domain::value_objects::form_kind::FormKind;
use crate::shared::error::OfflineError;

/// Durable local persistence behind the hydration resolver and sync engine.
///
/// Implementations must open idempotently and upgrade additively: adding a
/// missing collection never drops or rewrites an existing one. When the
/// store cannot be opened at all, every method fails with a storage error
/// and callers degrade to "offline with nothing cached".
#[async_trait]
pub trait OfflineStore: Send + Sync {
    /// Appends an entry and assigns its unique id and timestamp.
    async fn enqueue(&self, draft: OutboxDraft) -> Result<OutboxEntry, OfflineError>;

    /// All pending entries, newest first (display order).
    async fn list_outbox(&self) -> Result<Vec<OutboxEntry>, OfflineError>;

    /// Pending entries for one school, newest first (facility-repair queue).
    async fn outbox_for_school(&self, school_id: &str) -> Result<Vec<OutboxEntry>, OfflineError>;

    /// Most recently queued entry of the given kind, if any.
    async fn find_queued(&self, kind: FormKind) -> Result<Option<OutboxEntry>, OfflineError>;

    /// Deletes a single entry. Called only after a confirmed server
    /// acknowledgment, or by an explicit user discard.
    async fn remove_outbox(&self, id: i64) -> Result<(), OfflineError>;

    async fn outbox_len(&self) -> Result<u64, OfflineError>;

    async fn load_cache(
        &self,
        user_id: &str,
        kind: FormKind,
    ) -> Result<Option<CacheSnapshot>, OfflineError>;

    /// Wholesale overwrite of the snapshot for (user, kind).
    async fn store_cache(&self, snapshot: CacheSnapshot) -> Result<(), OfflineError>;

    async fn load_draft(&self, draft_id: &str) -> Result<Option<DraftRecord>, OfflineError>;

    async fn save_draft(&self, draft: DraftRecord) -> Result<(), OfflineError>;

    async fn clear_draft(&self, draft_id: &str) -> Result<(), OfflineError>;
}
