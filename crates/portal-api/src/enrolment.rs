use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use sqlx::{Pool, Postgres};

use crate::schools::{history_entry, not_found, SaveResponse};
use crate::{activity, ApiResult, AppState};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEnrolmentRequest {
    pub school_id: String,
    #[serde(default)]
    pub curricular_offering: Option<String>,
    #[serde(default)]
    pub es_total: Option<i32>,
    #[serde(default)]
    pub jhs_total: Option<i32>,
    #[serde(default)]
    pub shs_total: Option<i32>,
    #[serde(default)]
    pub grand_total: Option<i32>,
    pub submitted_by: String,
}

/// Update-by-business-key: replaying the same payload converges on the same
/// row state, and a missing profile is a 404 rather than a blind insert.
const UPDATE_ENROLMENT_SQL: &str = r#"
    UPDATE school_profiles SET
        curricular_offering = $2,
        es_enrollment = COALESCE($3, 0),
        jhs_enrollment = COALESCE($4, 0),
        shs_enrollment = COALESCE($5, 0),
        total_enrollment = COALESCE($6, 0),
        submitted_at = CURRENT_TIMESTAMP,
        history_logs = history_logs || $7::jsonb
    WHERE school_id = $1
"#;

pub(crate) async fn update_enrolment(
    pool: &Pool<Postgres>,
    req: &SaveEnrolmentRequest,
    log_entry: &Value,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(UPDATE_ENROLMENT_SQL)
        .bind(&req.school_id)
        .bind(&req.curricular_offering)
        .bind(req.es_total)
        .bind(req.jhs_total)
        .bind(req.shs_total)
        .bind(req.grand_total)
        .bind(log_entry)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn save_enrolment(
    State(state): State<AppState>,
    Json(req): Json<SaveEnrolmentRequest>,
) -> ApiResult<Json<SaveResponse>> {
    let log_entry = history_entry(&req.submitted_by, "Enrolment Update");

    let updated = update_enrolment(&state.replicas.primary, &req, &log_entry).await?;
    if updated == 0 {
        return Err(not_found("School profile not found"));
    }

    activity::record(
        &state.replicas.primary,
        &req.submitted_by,
        "ENROLMENT_UPDATE",
        "school_profiles",
        &req.school_id,
    )
    .await;

    // the shadow target may not have the profile row yet; a zero-row update
    // there is just a missed write, observable only in logs
    let shadow_req = req.clone();
    let shadow_log = log_entry.clone();
    state
        .replicas
        .shadow("save-enrolment", move |pool| async move {
            update_enrolment(&pool, &shadow_req, &shadow_log)
                .await
                .map(|_| ())
        });

    Ok(Json(SaveResponse {
        message: "Enrolment updated successfully",
    }))
}
