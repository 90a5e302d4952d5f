use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Pool, Postgres, Row};

use crate::{ApiResult, AppState};

/// Best-effort audit trail; a failed insert is logged and never fails the
/// request it annotates.
pub(crate) async fn record(
    pool: &Pool<Postgres>,
    user_uid: &str,
    action_type: &str,
    target_entity: &str,
    details: &str,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO activity_logs (user_uid, action_type, target_entity, details)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_uid)
    .bind(action_type)
    .bind(target_entity)
    .bind(details)
    .execute(pool)
    .await;

    if let Err(err) = result {
        tracing::warn!(action_type, target_entity, error = %err, "failed to record activity");
    }
}

#[derive(Serialize)]
pub struct ActivityLog {
    pub id: i64,
    pub user_uid: Option<String>,
    pub action_type: String,
    pub target_entity: String,
    pub details: Option<String>,
    pub created_at: i64,
}

pub async fn list_activities(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ActivityLog>>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_uid, action_type, target_entity, details, created_at
        FROM activity_logs
        ORDER BY created_at DESC
        LIMIT 50
        "#,
    )
    .fetch_all(&state.replicas.primary)
    .await?;

    let mut activities = Vec::with_capacity(rows.len());
    for row in rows {
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        activities.push(ActivityLog {
            id: row.try_get("id")?,
            user_uid: row.try_get("user_uid")?,
            action_type: row.try_get("action_type")?,
            target_entity: row.try_get("target_entity")?,
            details: row.try_get("details")?,
            created_at: created_at.timestamp(),
        });
    }

    Ok(Json(activities))
}
