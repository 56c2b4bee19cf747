use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_id, validate_required};
use super::{ApiError, ApiResponse, AppState};
use crate::entities::operational_periods;
use crate::services::SessionUser;

#[derive(Debug, Deserialize)]
pub struct CreatePeriodRequest {
    pub base_id: i32,
    pub name: String,
    pub starts_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodsQuery {
    pub base_id: Option<i32>,
}

pub async fn list_periods(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PeriodsQuery>,
) -> Result<Json<ApiResponse<Vec<operational_periods::Model>>>, ApiError> {
    let periods = state.shared.period_service.list_periods(query.base_id).await?;
    Ok(Json(ApiResponse::success(periods)))
}

/// `POST /api/admin/periods`
///
/// A base holds at most one active period.
pub async fn create_period(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<CreatePeriodRequest>,
) -> Result<Json<ApiResponse<operational_periods::Model>>, ApiError> {
    let base_id = validate_id(payload.base_id)?;
    let name = validate_required(&payload.name, "שם התקופה")?;

    let period = state
        .shared
        .period_service
        .create_period(&user.actor(), base_id, name, payload.starts_at)
        .await?;
    Ok(Json(ApiResponse::success(period)))
}

pub async fn end_period(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<operational_periods::Model>>, ApiError> {
    let id = validate_id(id)?;
    let period = state
        .shared
        .period_service
        .end_period(&user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::success(period)))
}
