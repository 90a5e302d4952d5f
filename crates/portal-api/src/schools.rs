use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{Pool, Postgres, Row};

use crate::{activity, ApiError, ApiResult, AppState};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSchoolRequest {
    pub school_id: String,
    pub school_name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub municipality: Option<String>,
    #[serde(default)]
    pub barangay: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub submitted_by: String,
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Replay-safe by construction: the row is keyed by the school id, so a
/// crash-and-retry from the client outbox lands on the same row.
const UPSERT_SCHOOL_SQL: &str = r#"
    INSERT INTO school_profiles (
        school_id, school_name, region, division, district, province,
        municipality, barangay, latitude, longitude, submitted_by,
        submitted_at, history_logs
    ) VALUES (
        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
        CURRENT_TIMESTAMP, jsonb_build_array($12::jsonb)
    )
    ON CONFLICT (school_id) DO UPDATE SET
        school_name = EXCLUDED.school_name,
        region = EXCLUDED.region,
        division = EXCLUDED.division,
        district = EXCLUDED.district,
        province = EXCLUDED.province,
        municipality = EXCLUDED.municipality,
        barangay = EXCLUDED.barangay,
        latitude = EXCLUDED.latitude,
        longitude = EXCLUDED.longitude,
        submitted_by = EXCLUDED.submitted_by,
        submitted_at = CURRENT_TIMESTAMP,
        history_logs = school_profiles.history_logs || $12::jsonb
"#;

const UPSERT_SCHOOL_HEAD_SQL: &str = r#"
    INSERT INTO school_heads (
        user_uid, last_name, first_name, middle_name,
        item_number, position_title, date_hired
    ) VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (user_uid) DO UPDATE SET
        last_name = EXCLUDED.last_name,
        first_name = EXCLUDED.first_name,
        middle_name = EXCLUDED.middle_name,
        item_number = EXCLUDED.item_number,
        position_title = EXCLUDED.position_title,
        date_hired = EXCLUDED.date_hired,
        updated_at = CURRENT_TIMESTAMP
"#;

pub(crate) fn history_entry(user: &str, action: &str) -> Value {
    json!({
        "timestamp": Utc::now().to_rfc3339(),
        "user": user,
        "action": action,
    })
}

pub(crate) async fn upsert_school(
    pool: &Pool<Postgres>,
    req: &SaveSchoolRequest,
    log_entry: &Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(UPSERT_SCHOOL_SQL)
        .bind(&req.school_id)
        .bind(&req.school_name)
        .bind(&req.region)
        .bind(&req.division)
        .bind(&req.district)
        .bind(&req.province)
        .bind(&req.municipality)
        .bind(&req.barangay)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(&req.submitted_by)
        .bind(log_entry)
        .execute(pool)
        .await
        .map(|_| ())
}

pub async fn save_school(
    State(state): State<AppState>,
    Json(req): Json<SaveSchoolRequest>,
) -> ApiResult<Json<SaveResponse>> {
    let log_entry = history_entry(&req.submitted_by, "Profile Update");

    upsert_school(&state.replicas.primary, &req, &log_entry).await?;
    activity::record(
        &state.replicas.primary,
        &req.submitted_by,
        "PROFILE_UPDATE",
        "school_profiles",
        &req.school_id,
    )
    .await;

    let shadow_req = req.clone();
    let shadow_log = log_entry.clone();
    state.replicas.shadow("save-school", move |pool| async move {
        upsert_school(&pool, &shadow_req, &shadow_log).await
    });

    Ok(Json(SaveResponse {
        message: "Profile saved successfully",
    }))
}

pub async fn school_by_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> ApiResult<Json<ExistsResponse>> {
    let row = sqlx::query(
        "SELECT row_to_json(sp) AS data FROM school_profiles sp WHERE submitted_by = $1",
    )
    .bind(&uid)
    .fetch_optional(&state.replicas.primary)
    .await?;

    match row {
        Some(row) => Ok(Json(ExistsResponse {
            exists: true,
            data: Some(row.try_get("data")?),
        })),
        None => Ok(Json(ExistsResponse {
            exists: false,
            data: None,
        })),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSchoolHeadRequest {
    pub uid: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub item_number: Option<String>,
    #[serde(default)]
    pub position_title: Option<String>,
    #[serde(default)]
    pub date_hired: Option<String>,
}

pub(crate) async fn upsert_school_head(
    pool: &Pool<Postgres>,
    req: &SaveSchoolHeadRequest,
) -> Result<(), sqlx::Error> {
    sqlx::query(UPSERT_SCHOOL_HEAD_SQL)
        .bind(&req.uid)
        .bind(&req.last_name)
        .bind(&req.first_name)
        .bind(&req.middle_name)
        .bind(&req.item_number)
        .bind(&req.position_title)
        .bind(&req.date_hired)
        .execute(pool)
        .await
        .map(|_| ())
}

pub async fn save_school_head(
    State(state): State<AppState>,
    Json(req): Json<SaveSchoolHeadRequest>,
) -> ApiResult<Json<SaveResponse>> {
    upsert_school_head(&state.replicas.primary, &req).await?;
    activity::record(
        &state.replicas.primary,
        &req.uid,
        "HEAD_UPDATE",
        "school_heads",
        &req.uid,
    )
    .await;

    let shadow_req = req.clone();
    state
        .replicas
        .shadow("save-school-head", move |pool| async move {
            upsert_school_head(&pool, &shadow_req).await
        });

    Ok(Json(SaveResponse {
        message: "School head saved successfully",
    }))
}

pub async fn school_head(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> ApiResult<Json<ExistsResponse>> {
    let row =
        sqlx::query("SELECT row_to_json(sh) AS data FROM school_heads sh WHERE user_uid = $1")
            .bind(&uid)
            .fetch_optional(&state.replicas.primary)
            .await?;

    match row {
        Some(row) => Ok(Json(ExistsResponse {
            exists: true,
            data: Some(row.try_get("data")?),
        })),
        None => Ok(Json(ExistsResponse {
            exists: false,
            data: None,
        })),
    }
}

pub(crate) fn not_found(message: &'static str) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The sync engine replays queued mutations an unknown number of times;
    // these write paths must stay keyed upserts. If one regresses to a naive
    // insert, fail loudly here.
    #[test]
    fn school_write_is_an_upsert_by_business_key() {
        assert!(UPSERT_SCHOOL_SQL.contains("ON CONFLICT (school_id) DO UPDATE"));
    }

    #[test]
    fn school_head_write_is_an_upsert_by_business_key() {
        assert!(UPSERT_SCHOOL_HEAD_SQL.contains("ON CONFLICT (user_uid) DO UPDATE"));
    }

    #[test]
    fn history_entry_carries_user_and_action() {
        let entry = history_entry("uid-1", "Profile Update");
        assert_eq!(entry["user"], "uid-1");
        assert_eq!(entry["action"], "Profile Update");
        assert!(entry["timestamp"].is_string());
    }

    #[test]
    fn save_school_request_accepts_camel_case_payload() {
        let req: SaveSchoolRequest = serde_json::from_value(serde_json::json!({
            "schoolId": "100001",
            "schoolName": "San Isidro ES",
            "region": "Region IV-A",
            "submittedBy": "uid-1"
        }))
        .unwrap();
        assert_eq!(req.school_id, "100001");
        assert_eq!(req.region.as_deref(), Some("Region IV-A"));
        assert!(req.latitude.is_none());
    }
}
