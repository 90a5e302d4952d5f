use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::value_objects::form_kind::FormKind;

/// A submitted-but-unsent mutation. The only durable record of user work
/// between "save clicked" and "server confirmed receipt"; removed only after
/// a confirmed acknowledgment during sync, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: FormKind,
    pub label: String,
    pub url: String,
    pub method: String,
    pub payload: Value,
    #[serde(rename = "schoolId", skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    #[serde(rename = "timestamp")]
    pub queued_at: DateTime<Utc>,
}

/// What a form hands to the queue; id, label and timestamp are assigned on
/// enqueue. The endpoint defaults to the kind's save path but can carry an
/// absolute URL from an earlier session (normalized again before replay).
#[derive(Debug, Clone)]
pub struct OutboxDraft {
    pub kind: FormKind,
    pub payload: Value,
    pub school_id: Option<String>,
    pub url: String,
    pub method: String,
}

impl OutboxDraft {
    pub fn new(kind: FormKind, payload: Value) -> Self {
        Self {
            kind,
            payload,
            school_id: None,
            url: kind.save_path().to_string(),
            method: "POST".to_string(),
        }
    }

    pub fn with_school_id(mut self, school_id: impl Into<String>) -> Self {
        self.school_id = Some(school_id.into());
        self
    }

    pub fn with_endpoint(mut self, url: impl Into<String>, method: impl Into<String>) -> Self {
        self.url = url.into();
        self.method = method.into();
        self
    }
}

/// Last known authoritative server state for one (user, form) pair.
/// Always safe to render immediately; overwritten wholesale on every
/// successful fetch or save, never treated as a pending write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub user_id: String,
    pub kind: FormKind,
    pub payload: Value,
    pub fetched_at: DateTime<Utc>,
}

impl CacheSnapshot {
    pub fn new(user_id: impl Into<String>, kind: FormKind, payload: Value) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            payload,
            fetched_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        payload_is_empty(&self.payload)
    }
}

/// In-progress multi-step form state. Not yet submitted, so distinct from an
/// `OutboxEntry`; cleared on successful final submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRecord {
    pub draft_id: String,
    pub kind: FormKind,
    pub fields: Value,
    pub step: u32,
    pub updated_at: DateTime<Utc>,
}

impl DraftRecord {
    pub fn new(kind: FormKind, fields: Value) -> Self {
        Self {
            draft_id: uuid::Uuid::new_v4().to_string(),
            kind,
            fields,
            step: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn at_step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }
}

/// Which source won the hydration priority for a form mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HydrationSource {
    /// A queued-but-unsynced outbox entry; always outranks the cache.
    Draft,
    Cache,
    Network,
    Empty,
}

/// The single view model a form renders, replacing per-component ad hoc
/// priority logic. `locked` means the data is authoritative and non-empty,
/// so editing starts disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrationResult {
    pub source: HydrationSource,
    pub data: Value,
    pub locked: bool,
}

impl HydrationResult {
    pub fn empty() -> Self {
        Self {
            source: HydrationSource::Empty,
            data: Value::Null,
            locked: false,
        }
    }
}

/// Emptiness check used for lock-state decisions. Field-level semantics are
/// the form layer's business; here an absent, null or empty payload counts
/// as "nothing on record".
pub fn payload_is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}
