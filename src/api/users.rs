use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::services::{NewUser, SessionUser, UserDto, UserFilter, UserUpdate};

/// `GET /api/admin/users`
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state
        .shared
        .user_service
        .list_users(&user.actor(), filter)
        .await?;
    Ok(Json(ApiResponse::success(users)))
}

/// `POST /api/admin/users`
///
/// The new account's initial password is its phone digits.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<NewUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let created = state
        .shared
        .user_service
        .create_user(&user.actor(), payload)
        .await?;
    Ok(Json(ApiResponse::success(created)))
}

/// `GET /api/admin/users/{id}`
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_id(id)?;
    let found = state.shared.user_service.get_user(&user.actor(), id).await?;
    Ok(Json(ApiResponse::success(found)))
}

/// `PUT /api/admin/users/{id}`
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_id(id)?;
    let updated = state
        .shared
        .user_service
        .update_user(&user.actor(), id, payload)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// `POST /api/admin/users/{id}/toggle-active`
pub async fn toggle_active(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_id(id)?;
    let updated = state
        .shared
        .user_service
        .toggle_user_active(&user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// `POST /api/admin/users/{id}/reset-password`
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let id = validate_id(id)?;
    let updated = state
        .shared
        .user_service
        .reset_user_password(&user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}
