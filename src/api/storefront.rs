//! Quick-request storefront. Everything except token issuing for the
//! logged-in user is reachable without a session; the signed token in the
//! path stands in for it.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::entities::requests;
use crate::services::{Identify, IssuedToken, QuickRequest, SessionUser, StorefrontCatalog};

/// `POST /api/storefront/token`
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ApiResponse<IssuedToken>>, ApiError> {
    let token = state
        .shared
        .storefront_service
        .issue_for_user(user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(token)))
}

/// `POST /api/storefront/identify`
pub async fn identify(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Identify>,
) -> Result<Json<ApiResponse<IssuedToken>>, ApiError> {
    let token = state.shared.storefront_service.identify(payload).await?;
    Ok(Json(ApiResponse::success(token)))
}

pub async fn catalog(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<StorefrontCatalog>>, ApiError> {
    let catalog = state.shared.storefront_service.catalog(&token).await?;
    Ok(Json(ApiResponse::success(catalog)))
}

pub async fn quick_request(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(payload): Json<QuickRequest>,
) -> Result<Json<ApiResponse<requests::Model>>, ApiError> {
    let request = state
        .shared
        .storefront_service
        .quick_request(&token, payload)
        .await?;
    Ok(Json(ApiResponse::success(request)))
}
