use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Process is up", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<ApiResponse<HealthData>> {
    let data = HealthData {
        status: "ok".to_string(),
    };

    Json(ApiResponse::success(
        "Health check",
        data,
        Some(Meta::empty()),
    ))
}

#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Database reachable", body = ApiResponse<HealthData>),
        (status = 503, description = "Database unreachable", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthData>>) {
    let (code, status) = match state.orm.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            tracing::warn!(error = %err, "database ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let data = HealthData {
        status: status.to_string(),
    };
    (code, Json(ApiResponse::single("Readiness check", data)))
}
