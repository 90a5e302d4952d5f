use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sqlx::{Pool, Postgres};

use crate::schools::SaveResponse;
use crate::{activity, ApiError, ApiResult, AppState};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRepairRequest {
    /// Client-generated identity for this entry. Repairs are append-only
    /// history, so replays are deduplicated on this key instead of being
    /// collapsed into an update.
    pub entry_id: String,
    pub school_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    pub reported_by: String,
}

const INSERT_REPAIR_SQL: &str = r#"
    INSERT INTO facility_repairs (entry_id, school_id, description, severity, reported_by)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (entry_id) DO NOTHING
"#;

pub(crate) async fn insert_repair(
    pool: &Pool<Postgres>,
    req: &SaveRepairRequest,
) -> Result<(), sqlx::Error> {
    sqlx::query(INSERT_REPAIR_SQL)
        .bind(&req.entry_id)
        .bind(&req.school_id)
        .bind(&req.description)
        .bind(&req.severity)
        .bind(&req.reported_by)
        .execute(pool)
        .await
        .map(|_| ())
}

pub async fn save_repair(
    State(state): State<AppState>,
    Json(req): Json<SaveRepairRequest>,
) -> ApiResult<Json<SaveResponse>> {
    if req.entry_id.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            "entryId must not be empty",
        ));
    }

    insert_repair(&state.replicas.primary, &req).await?;
    activity::record(
        &state.replicas.primary,
        &req.reported_by,
        "REPAIR_REPORTED",
        "facility_repairs",
        &req.school_id,
    )
    .await;

    let shadow_req = req.clone();
    state.replicas.shadow("save-repair", move |pool| async move {
        insert_repair(&pool, &shadow_req).await
    });

    Ok(Json(SaveResponse {
        message: "Repair entry saved",
    }))
}
