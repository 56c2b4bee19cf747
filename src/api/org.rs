use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::entities::bases;
use crate::services::{DepartmentDto, DepartmentUpdate, NewBase, NewDepartment, SessionUser};

#[derive(Debug, Default, Deserialize)]
pub struct DepartmentsQuery {
    pub base_id: Option<i32>,
}

pub async fn list_bases(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<bases::Model>>>, ApiError> {
    let bases = state.shared.org_service.list_bases().await?;
    Ok(Json(ApiResponse::success(bases)))
}

pub async fn create_base(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<NewBase>,
) -> Result<Json<ApiResponse<bases::Model>>, ApiError> {
    let base = state
        .shared
        .org_service
        .create_base(&user.actor(), payload)
        .await?;
    Ok(Json(ApiResponse::success(base)))
}

pub async fn list_departments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DepartmentsQuery>,
) -> Result<Json<ApiResponse<Vec<DepartmentDto>>>, ApiError> {
    let departments = state
        .shared
        .org_service
        .list_departments(query.base_id)
        .await?;
    Ok(Json(ApiResponse::success(departments)))
}

pub async fn create_department(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<NewDepartment>,
) -> Result<Json<ApiResponse<DepartmentDto>>, ApiError> {
    let department = state
        .shared
        .org_service
        .create_department(&user.actor(), payload)
        .await?;
    Ok(Json(ApiResponse::success(department)))
}

pub async fn get_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<DepartmentDto>>, ApiError> {
    let id = validate_id(id)?;
    let department = state.shared.org_service.get_department(id).await?;
    Ok(Json(ApiResponse::success(department)))
}

/// `PUT /api/admin/departments/{id}`
///
/// Also replaces the store-peer list when `store_department_ids` is sent.
pub async fn update_department(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i32>,
    Json(payload): Json<DepartmentUpdate>,
) -> Result<Json<ApiResponse<DepartmentDto>>, ApiError> {
    let id = validate_id(id)?;
    let department = state
        .shared
        .org_service
        .update_department(&user.actor(), id, payload)
        .await?;
    Ok(Json(ApiResponse::success(department)))
}
