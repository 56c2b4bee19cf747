use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::domain::RequestStatus;
use crate::entities::{movements, prelude::*, requests, signatures};

#[derive(Debug, Clone, Default)]
pub struct RequestQuery {
    pub statuses: Vec<RequestStatus>,
    /// `None` means every department.
    pub department_ids: Option<Vec<i32>>,
    pub soldier_id: Option<i32>,
    pub item_type_id: Option<i32>,
}

impl RequestQuery {
    fn apply(&self, mut select: sea_orm::Select<Requests>) -> sea_orm::Select<Requests> {
        if !self.statuses.is_empty() {
            select = select.filter(requests::Column::Status.is_in(self.statuses.iter().copied()));
        }
        if let Some(ids) = &self.department_ids {
            select = select.filter(requests::Column::DepartmentId.is_in(ids.iter().copied()));
        }
        if let Some(soldier_id) = self.soldier_id {
            select = select.filter(requests::Column::SoldierId.eq(soldier_id));
        }
        if let Some(item_type_id) = self.item_type_id {
            select = select.filter(requests::Column::ItemTypeId.eq(item_type_id));
        }
        select
    }
}

pub struct RequestRepository {
    conn: DatabaseConnection,
}

impl RequestRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<requests::Model>> {
        Requests::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query request")
    }

    pub async fn list(&self, query: &RequestQuery) -> Result<Vec<requests::Model>> {
        query
            .apply(Requests::find())
            .order_by_desc(requests::Column::CreatedAt)
            .order_by_desc(requests::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list requests")
    }

    pub async fn count(&self, query: &RequestQuery) -> Result<u64> {
        query
            .apply(Requests::find())
            .count(&self.conn)
            .await
            .context("Failed to count requests")
    }

    /// Handed-over requests whose return date is before `now`.
    pub async fn due_for_overdue(&self, now: DateTime<Utc>) -> Result<Vec<requests::Model>> {
        Requests::find()
            .filter(requests::Column::Status.eq(RequestStatus::HandedOver))
            .filter(requests::Column::ScheduledReturnAt.is_not_null())
            .filter(requests::Column::ScheduledReturnAt.lt(now))
            .order_by_asc(requests::Column::ScheduledReturnAt)
            .all(&self.conn)
            .await
            .context("Failed to query overdue candidates")
    }

    pub async fn movements(&self, request_id: i32) -> Result<Vec<movements::Model>> {
        Movements::find()
            .filter(movements::Column::RequestId.eq(request_id))
            .order_by_asc(movements::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list movements")
    }

    pub async fn signatures(&self, request_id: i32) -> Result<Vec<signatures::Model>> {
        Signatures::find()
            .filter(signatures::Column::RequestId.eq(request_id))
            .order_by_asc(signatures::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list signatures")
    }
}
