use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_id, validate_required};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::domain::UnitStatus;
use crate::entities::{categories, item_types, item_units};
use crate::services::{ItemTypeUpdate, NewItemType, SessionUser};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemTypesQuery {
    pub department_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AddUnitRequest {
    pub serial_number: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnitStatusRequest {
    pub status: UnitStatus,
    pub notes: Option<String>,
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<categories::Model>>>, ApiError> {
    let categories = state.shared.catalog_service.list_categories().await?;
    Ok(Json(ApiResponse::success(categories)))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<Json<ApiResponse<categories::Model>>, ApiError> {
    let name = validate_required(&payload.name, "שם הקטגוריה")?;
    let category = state
        .shared
        .catalog_service
        .create_category(&user.actor(), name)
        .await?;
    Ok(Json(ApiResponse::success(category)))
}

/// `GET /api/item-types`
///
/// Limited to the departments the caller can see.
pub async fn list_item_types(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<ItemTypesQuery>,
) -> Result<Json<ApiResponse<Vec<item_types::Model>>>, ApiError> {
    let items = state
        .shared
        .catalog_service
        .list_item_types(&user.actor(), query.department_id)
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

pub async fn create_item_type(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<NewItemType>,
) -> Result<Json<ApiResponse<item_types::Model>>, ApiError> {
    validate_required(&payload.name, "שם הפריט")?;
    let item = state
        .shared
        .catalog_service
        .create_item_type(&user.actor(), payload)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

pub async fn get_item_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<item_types::Model>>, ApiError> {
    let id = validate_id(id)?;
    let item = state.shared.catalog_service.get_item_type(id).await?;
    Ok(Json(ApiResponse::success(item)))
}

pub async fn update_item_type(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
    Json(payload): Json<ItemTypeUpdate>,
) -> Result<Json<ApiResponse<item_types::Model>>, ApiError> {
    let id = validate_id(id)?;
    let item = state
        .shared
        .catalog_service
        .update_item_type(&user.actor(), id, payload)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// `DELETE /api/item-types/{id}`
///
/// Removes the type's units and request history with it.
pub async fn delete_item_type(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id(id)?;
    state
        .shared
        .catalog_service
        .delete_item_type(&user.actor(), id)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("הפריט נמחק"))))
}

pub async fn list_units(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<item_units::Model>>>, ApiError> {
    let id = validate_id(id)?;
    let units = state.shared.catalog_service.list_units(id).await?;
    Ok(Json(ApiResponse::success(units)))
}

pub async fn add_unit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
    Json(payload): Json<AddUnitRequest>,
) -> Result<Json<ApiResponse<item_units::Model>>, ApiError> {
    let id = validate_id(id)?;
    let serial = validate_required(&payload.serial_number, "מספר סידורי")?;
    let unit = state
        .shared
        .catalog_service
        .add_unit(&user.actor(), id, serial, payload.notes)
        .await?;
    Ok(Json(ApiResponse::success(unit)))
}

/// `PUT /api/units/{id}/status`
///
/// `in_use` is only reachable through a handover.
pub async fn set_unit_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UnitStatusRequest>,
) -> Result<Json<ApiResponse<item_units::Model>>, ApiError> {
    let id = validate_id(id)?;
    let unit = state
        .shared
        .catalog_service
        .set_unit_status(&user.actor(), id, payload.status, payload.notes)
        .await?;
    Ok(Json(ApiResponse::success(unit)))
}
