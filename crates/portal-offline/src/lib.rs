//! Offline-first form storage and sync for the school reporting portal.
//!
//! Forms keep working without connectivity: reads are served from a local
//! cache and queued edits, writes that cannot reach the server are parked in
//! a durable outbox, and a sync engine drains the queue when connectivity
//! returns. The embedding UI shell supplies the connectivity signal and
//! renders whatever [`HydrationResult`] the resolver picks.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::connectivity::ConnectivityMonitor;
pub use application::ports::form_gateway::{FetchOutcome, FormGateway, GatewayError};
pub use application::ports::offline_store::OfflineStore;
pub use application::services::hydration::HydrationResolver;
pub use application::services::sync::{
    normalize_path, EntryOutcome, EntryStatus, SubmitOutcome, SyncEngine, SyncReport,
};
pub use domain::entities::forms::{
    payload_is_empty, CacheSnapshot, DraftRecord, HydrationResult, HydrationSource, OutboxDraft,
    OutboxEntry,
};
pub use domain::value_objects::form_kind::FormKind;
pub use infrastructure::http_gateway::HttpFormGateway;
pub use infrastructure::sqlite_store::SqliteStore;
pub use shared::error::OfflineError;
