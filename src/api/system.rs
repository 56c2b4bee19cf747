//! Health probes, the dashboard, the audit trail and the system reset.

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::{validate_page, validate_page_size};
use super::{ApiError, ApiResponse, AppState};
use crate::db::repositories::audit::AuditQuery;
use crate::db::seed::SeedReport;
use crate::domain::AuditAction;
use crate::services::{AuditPage, Dashboard, SessionUser};

#[derive(Debug, Serialize)]
pub struct HealthLiveResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthReadyResponse {
    pub ready: bool,
    pub database: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub phrase: String,
    pub code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogsQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub user_id: Option<i32>,
    pub action: Option<AuditAction>,
    pub entity_type: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// `GET /api/health/live`
pub async fn health_live(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthLiveResponse {
        status: "alive",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.start_time.elapsed().as_secs(),
    }))
}

/// `GET /api/health/ready`
///
/// 503 while the database does not answer.
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Response {
    let database = match state.shared.system_service.ready().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            false
        }
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse::success(HealthReadyResponse {
            ready: database,
            database,
        })),
    )
        .into_response()
}

/// `GET /api/dashboard`
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    let dashboard = state.shared.system_service.dashboard(&user.actor()).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

/// `GET /api/admin/audit-logs`
pub async fn audit_logs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Query(params): Query<AuditLogsQuery>,
) -> Result<Json<ApiResponse<AuditPage>>, ApiError> {
    let page = validate_page(params.page)?;
    let page_size = validate_page_size(params.page_size)?;

    let query = AuditQuery {
        user_id: params.user_id,
        action: params.action,
        entity_type: params.entity_type.filter(|s| !s.trim().is_empty()),
        since: params.since,
        until: params.until,
        base_id: None,
    };

    let logs = state
        .shared
        .audit_log
        .list(&user.actor(), page, page_size, query)
        .await?;
    Ok(Json(ApiResponse::success(logs)))
}

/// `POST /api/admin/system/reset`
///
/// Every account is recreated, so the caller's session ends with the reset.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    session: Session,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<ResetRequest>,
) -> Result<Json<ApiResponse<SeedReport>>, ApiError> {
    let report = state
        .shared
        .system_service
        .reset_system(&user.actor(), &payload.phrase, &payload.code)
        .await?;

    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to end session after reset");
    }

    Ok(Json(ApiResponse::success(report)))
}
