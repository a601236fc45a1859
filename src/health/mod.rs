/*!
 * # Health Check Module
 *
 * - Liveness (`/health`) - the process is up and serving
 * - Readiness (`/health/ready`) - the database answers a ping
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::{db, AppState};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<HealthStatus>,
}

impl HealthInfo {
    fn new(status: HealthStatus, database: Option<HealthStatus>) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            database,
        }
    }
}

/// Liveness check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is alive", body = HealthInfo))
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthInfo::new(HealthStatus::Up, None))
}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Database reachable", body = HealthInfo),
        (status = 503, description = "Database unreachable", body = HealthInfo)
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match db::check_connection(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthInfo::new(HealthStatus::Up, Some(HealthStatus::Up))),
        ),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthInfo::new(HealthStatus::Down, Some(HealthStatus::Down))),
            )
        }
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
}
