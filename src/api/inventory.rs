use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::entities::inventory_snapshots;
use crate::services::{LowStockItem, SessionUser, SyncReport};

#[derive(Debug, Default, Deserialize)]
pub struct ItemTypeQuery {
    pub item_type_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    pub count: u64,
}

/// `POST /api/inventory/sync`
///
/// Recounts one item type, or every type the caller manages.
pub async fn sync(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<ItemTypeQuery>,
) -> Result<Json<ApiResponse<SyncReport>>, ApiError> {
    let report = state
        .shared
        .inventory_service
        .sync_inventory(&user.actor(), query.item_type_id)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

pub async fn low_stock(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ApiResponse<Vec<LowStockItem>>>, ApiError> {
    let items = state.shared.catalog_service.low_stock(&user.actor()).await?;
    Ok(Json(ApiResponse::success(items)))
}

pub async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<ItemTypeQuery>,
) -> Result<Json<ApiResponse<Vec<inventory_snapshots::Model>>>, ApiError> {
    let snapshots = state
        .shared
        .inventory_service
        .list_snapshots(&user.actor(), query.item_type_id)
        .await?;
    Ok(Json(ApiResponse::success(snapshots)))
}

/// `POST /api/inventory/snapshots`
///
/// On-demand run of the scheduled snapshot job; managers only.
pub async fn take_snapshot(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<ApiResponse<SnapshotResponse>>, ApiError> {
    if !user.role.is_manager() {
        return Err(ApiError::forbidden());
    }
    let count = state.shared.inventory_service.take_snapshot().await?;
    Ok(Json(ApiResponse::success(SnapshotResponse { count })))
}
