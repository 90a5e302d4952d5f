//! HTTP API for the school reporting portal. Every mutating endpoint
//! commits to the primary database synchronously and shadow-writes the same
//! change to the secondary, fire-and-forget. Write endpoints are idempotent
//! upserts keyed by a stable business key so the offline sync engine can
//! replay a queued mutation any number of times.

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use portal_core::replication::Replicas;
use portal_core::{config, http, logging, migrations, server};
use serde::Serialize;
use std::net::SocketAddr;

mod activity;
mod enrolment;
mod repairs;
mod schema;
mod schools;


const SERVICE_NAME: &str = "portal-api";

#[derive(Clone)]
pub(crate) struct AppState {
    replicas: Replicas,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DB_ERROR",
            err.to_string(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = ErrorResponse {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(payload)).into_response()
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
}

async fn healthz(State(state): State<AppState>) -> ApiResult<Json<HealthStatus>> {
    portal_core::db::check_ready(&state.replicas.primary)
        .await
        .map_err(|err| {
            ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "DB_UNAVAILABLE",
                err.to_string(),
            )
        })?;
    Ok(Json(HealthStatus { status: "ok" }))
}

pub(crate) fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/save-school", post(schools::save_school))
        .route("/api/school-by-user/{uid}", get(schools::school_by_user))
        .route("/api/save-school-head", post(schools::save_school_head))
        .route("/api/school-head/{uid}", get(schools::school_head))
        .route("/api/save-enrolment", post(enrolment::save_enrolment))
        .route("/api/save-repair", post(repairs::save_repair))
        .route("/api/activities", get(activity::list_activities))
        .with_state(state)
}

pub struct ApiConfig {
    pub addr: SocketAddr,
    pub database_url: String,
    pub shadow_database_url: Option<String>,
}

pub fn load_config() -> Result<ApiConfig> {
    let addr = config::socket_addr_from_env("PORTAL_API_ADDR", "0.0.0.0:3000")?;
    let database_url = config::required_env("DATABASE_URL")?;
    let shadow_database_url = config::optional_env("SHADOW_DATABASE_URL");
    Ok(ApiConfig {
        addr,
        database_url,
        shadow_database_url,
    })
}

pub async fn run(config: ApiConfig) -> Result<()> {
    logging::init(SERVICE_NAME);

    let replicas = Replicas::connect(
        &config.database_url,
        config.shadow_database_url.as_deref(),
    )
    .await?;

    // both targets converge independently so either could be promoted later
    migrations::run_for_replicas(&replicas, schema::MIGRATION_STEPS).await;

    let router = app_router(AppState { replicas });
    let router = http::apply_standard_layers(router, SERVICE_NAME);

    server::serve(config.addr, router).await
}
