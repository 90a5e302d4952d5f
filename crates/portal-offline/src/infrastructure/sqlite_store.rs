use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, Pool, Sqlite};

use async_trait::async_trait;

use crate::application::ports::offline_store::OfflineStore;
use crate::domain::entities::forms::{CacheSnapshot, DraftRecord, OutboxDraft, OutboxEntry};
use crate::domain::value_objects::form_kind::FormKind;
use crate::shared::error::OfflineError;

/// Current local schema version, tracked via `PRAGMA user_version`.
/// v1: form_cache + outbox. v2: form_drafts + outbox school index.
const SCHEMA_VERSION: i64 = 2;

/// SQLite-backed durable local store. `open` is idempotent: every upgrade
/// step is additive (`IF NOT EXISTS`), so concurrent opens from multiple
/// form components cannot duplicate collections or race the upgrade.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn open(database_url: &str) -> Result<Self, OfflineError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|err| OfflineError::Storage(format!("cannot open local store: {err}")))?;

        let store = Self { pool };
        store.upgrade_schema().await?;
        Ok(store)
    }

    pub async fn from_memory() -> Result<Self, OfflineError> {
        Self::open("sqlite::memory:").await
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn upgrade_schema(&self) -> Result<(), OfflineError> {
        let version: i64 = sqlx::query_scalar("PRAGMA user_version")
            .fetch_one(&self.pool)
            .await?;

        if version < 1 {
            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS form_cache (
                    user_id TEXT NOT NULL,
                    form_kind TEXT NOT NULL,
                    payload TEXT NOT NULL,
                    fetched_at TEXT NOT NULL,
                    PRIMARY KEY (user_id, form_kind)
                )
                "#,
            )
            .execute(&self.pool)
            .await?;

            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS outbox (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    form_kind TEXT NOT NULL,
                    label TEXT NOT NULL,
                    url TEXT NOT NULL,
                    method TEXT NOT NULL DEFAULT 'POST',
                    payload TEXT NOT NULL,
                    school_id TEXT,
                    queued_at TEXT NOT NULL
                )
                "#,
            )
            .execute(&self.pool)
            .await?;
        }

        if version < 2 {
            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS form_drafts (
                    draft_id TEXT PRIMARY KEY,
                    form_kind TEXT NOT NULL,
                    fields TEXT NOT NULL,
                    step INTEGER NOT NULL DEFAULT 0,
                    updated_at TEXT NOT NULL
                )
                "#,
            )
            .execute(&self.pool)
            .await?;

            sqlx::query("CREATE INDEX IF NOT EXISTS idx_outbox_school ON outbox(school_id)")
                .execute(&self.pool)
                .await?;
        }

        if version < SCHEMA_VERSION {
            sqlx::query(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    async fn outbox_entry_by_id(&self, id: i64) -> Result<OutboxEntry, OfflineError> {
        let row: OutboxRow = sqlx::query_as("SELECT * FROM outbox WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        row.into_entry()
    }
}

#[derive(FromRow)]
struct OutboxRow {
    id: i64,
    form_kind: String,
    label: String,
    url: String,
    method: String,
    payload: String,
    school_id: Option<String>,
    queued_at: String,
}

impl OutboxRow {
    fn into_entry(self) -> Result<OutboxEntry, OfflineError> {
        let kind = FormKind::parse(&self.form_kind).ok_or_else(|| {
            OfflineError::Storage(format!("unknown form kind in outbox: {}", self.form_kind))
        })?;
        Ok(OutboxEntry {
            id: self.id,
            kind,
            label: self.label,
            url: self.url,
            method: self.method,
            payload: serde_json::from_str(&self.payload)?,
            school_id: self.school_id,
            queued_at: parse_timestamp(&self.queued_at)?,
        })
    }
}

#[derive(FromRow)]
struct CacheRow {
    user_id: String,
    form_kind: String,
    payload: String,
    fetched_at: String,
}

impl CacheRow {
    fn into_snapshot(self) -> Result<CacheSnapshot, OfflineError> {
        let kind = FormKind::parse(&self.form_kind).ok_or_else(|| {
            OfflineError::Storage(format!("unknown form kind in cache: {}", self.form_kind))
        })?;
        Ok(CacheSnapshot {
            user_id: self.user_id,
            kind,
            payload: serde_json::from_str(&self.payload)?,
            fetched_at: parse_timestamp(&self.fetched_at)?,
        })
    }
}

#[derive(FromRow)]
struct DraftRow {
    draft_id: String,
    form_kind: String,
    fields: String,
    step: i64,
    updated_at: String,
}

impl DraftRow {
    fn into_record(self) -> Result<DraftRecord, OfflineError> {
        let kind = FormKind::parse(&self.form_kind).ok_or_else(|| {
            OfflineError::Storage(format!("unknown form kind in draft: {}", self.form_kind))
        })?;
        Ok(DraftRecord {
            draft_id: self.draft_id,
            kind,
            fields: serde_json::from_str(&self.fields)?,
            step: self.step as u32,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, OfflineError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| OfflineError::Storage(format!("bad timestamp {value}: {err}")))
}

#[async_trait]
impl OfflineStore for SqliteStore {
    async fn enqueue(&self, draft: OutboxDraft) -> Result<OutboxEntry, OfflineError> {
        let payload = serde_json::to_string(&draft.payload)?;
        let queued_at = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO outbox (form_kind, label, url, method, payload, school_id, queued_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(draft.kind.as_str())
        .bind(draft.kind.label())
        .bind(&draft.url)
        .bind(&draft.method)
        .bind(&payload)
        .bind(&draft.school_id)
        .bind(&queued_at)
        .execute(&self.pool)
        .await?;

        self.outbox_entry_by_id(result.last_insert_rowid()).await
    }

    async fn list_outbox(&self) -> Result<Vec<OutboxEntry>, OfflineError> {
        let rows: Vec<OutboxRow> =
            sqlx::query_as("SELECT * FROM outbox ORDER BY id DESC")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(OutboxRow::into_entry).collect()
    }

    async fn outbox_for_school(&self, school_id: &str) -> Result<Vec<OutboxEntry>, OfflineError> {
        let rows: Vec<OutboxRow> =
            sqlx::query_as("SELECT * FROM outbox WHERE school_id = ?1 ORDER BY id DESC")
                .bind(school_id)
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(OutboxRow::into_entry).collect()
    }

    async fn find_queued(&self, kind: FormKind) -> Result<Option<OutboxEntry>, OfflineError> {
        let row: Option<OutboxRow> =
            sqlx::query_as("SELECT * FROM outbox WHERE form_kind = ?1 ORDER BY id DESC LIMIT 1")
                .bind(kind.as_str())
                .fetch_optional(&self.pool)
                .await?;
        row.map(OutboxRow::into_entry).transpose()
    }

    async fn remove_outbox(&self, id: i64) -> Result<(), OfflineError> {
        sqlx::query("DELETE FROM outbox WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn outbox_len(&self) -> Result<u64, OfflineError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM outbox")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn load_cache(
        &self,
        user_id: &str,
        kind: FormKind,
    ) -> Result<Option<CacheSnapshot>, OfflineError> {
        let row: Option<CacheRow> = sqlx::query_as(
            "SELECT * FROM form_cache WHERE user_id = ?1 AND form_kind = ?2",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(CacheRow::into_snapshot).transpose()
    }

    async fn store_cache(&self, snapshot: CacheSnapshot) -> Result<(), OfflineError> {
        let payload = serde_json::to_string(&snapshot.payload)?;
        sqlx::query(
            r#"
            INSERT INTO form_cache (user_id, form_kind, payload, fetched_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (user_id, form_kind) DO UPDATE SET
                payload = excluded.payload,
                fetched_at = excluded.fetched_at
            "#,
        )
        .bind(&snapshot.user_id)
        .bind(snapshot.kind.as_str())
        .bind(&payload)
        .bind(snapshot.fetched_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_draft(&self, draft_id: &str) -> Result<Option<DraftRecord>, OfflineError> {
        let row: Option<DraftRow> =
            sqlx::query_as("SELECT * FROM form_drafts WHERE draft_id = ?1")
                .bind(draft_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(DraftRow::into_record).transpose()
    }

    async fn save_draft(&self, draft: DraftRecord) -> Result<(), OfflineError> {
        let fields = serde_json::to_string(&draft.fields)?;
        sqlx::query(
            r#"
            INSERT INTO form_drafts (draft_id, form_kind, fields, step, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (draft_id) DO UPDATE SET
                fields = excluded.fields,
                step = excluded.step,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&draft.draft_id)
        .bind(draft.kind.as_str())
        .bind(&fields)
        .bind(draft.step as i64)
        .bind(draft.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_draft(&self, draft_id: &str) -> Result<(), OfflineError> {
        sqlx::query("DELETE FROM form_drafts WHERE draft_id = ?1")
            .bind(draft_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
