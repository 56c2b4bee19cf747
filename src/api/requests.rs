use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::entities::{movements, requests};
use crate::services::{
    HandoverInput, NewRequest, RequestDetail, RequestFilter, ReturnInput, SessionUser,
};

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

type RequestResponse = Result<Json<ApiResponse<requests::Model>>, ApiError>;

pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Query(filter): Query<RequestFilter>,
) -> Result<Json<ApiResponse<Vec<requests::Model>>>, ApiError> {
    let requests = state
        .shared
        .request_service
        .list_requests(&user.actor(), filter)
        .await?;
    Ok(Json(ApiResponse::success(requests)))
}

pub async fn create_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<NewRequest>,
) -> RequestResponse {
    let request = state
        .shared
        .request_service
        .create_request(&user.actor(), payload)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

/// `GET /api/requests/{id}` with its movements and signatures.
pub async fn get_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RequestDetail>>, ApiError> {
    let id = validate_id(id)?;
    let detail = state
        .shared
        .request_service
        .get_request(&user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::success(detail)))
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> RequestResponse {
    let id = validate_id(id)?;
    let request = state.shared.request_service.submit(&user.actor(), id).await?;
    Ok(Json(ApiResponse::success(request)))
}

pub async fn approve(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> RequestResponse {
    let id = validate_id(id)?;
    let request = state.shared.request_service.approve(&user.actor(), id).await?;
    Ok(Json(ApiResponse::success(request)))
}

pub async fn reject(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
    Json(payload): Json<RejectRequest>,
) -> RequestResponse {
    let id = validate_id(id)?;
    let request = state
        .shared
        .request_service
        .reject(&user.actor(), id, &payload.reason)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

pub async fn mark_ready(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> RequestResponse {
    let id = validate_id(id)?;
    let request = state
        .shared
        .request_service
        .mark_ready(&user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

/// `POST /api/requests/{id}/handover`
///
/// The body may be omitted when the request already names its unit.
pub async fn handover(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
    payload: Option<Json<HandoverInput>>,
) -> RequestResponse {
    let id = validate_id(id)?;
    let input = payload.map(|Json(input)| input).unwrap_or_default();
    let request = state
        .shared
        .request_service
        .handover(&user.actor(), id, input)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

pub async fn return_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
    payload: Option<Json<ReturnInput>>,
) -> RequestResponse {
    let id = validate_id(id)?;
    let input = payload.map(|Json(input)| input).unwrap_or_default();
    let request = state
        .shared
        .request_service
        .return_request(&user.actor(), id, input)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}

pub async fn close(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> RequestResponse {
    let id = validate_id(id)?;
    let request = state.shared.request_service.close(&user.actor(), id).await?;
    Ok(Json(ApiResponse::success(request)))
}

pub async fn list_movements(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<movements::Model>>>, ApiError> {
    let id = validate_id(id)?;
    let movements = state
        .shared
        .request_service
        .list_movements(&user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::success(movements)))
}
