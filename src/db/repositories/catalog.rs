use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::domain::RequestStatus;
use crate::entities::{
    categories, inventory_snapshots, item_types, item_units, prelude::*, requests,
};

pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_categories(&self) -> Result<Vec<categories::Model>> {
        Categories::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list categories")
    }

    pub async fn get_category_by_name(&self, name: &str) -> Result<Option<categories::Model>> {
        Categories::find()
            .filter(categories::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .context("Failed to query category")
    }

    pub async fn get_category(&self, id: i32) -> Result<Option<categories::Model>> {
        Categories::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query category")
    }

    pub async fn get_item_type(&self, id: i32) -> Result<Option<item_types::Model>> {
        ItemTypes::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query item type")
    }

    /// `None` lists every item type.
    pub async fn list_item_types(
        &self,
        department_ids: Option<&[i32]>,
    ) -> Result<Vec<item_types::Model>> {
        let mut select = ItemTypes::find().order_by_asc(item_types::Column::Name);
        if let Some(ids) = department_ids {
            select = select.filter(item_types::Column::DepartmentId.is_in(ids.iter().copied()));
        }
        select
            .all(&self.conn)
            .await
            .context("Failed to list item types")
    }

    pub async fn get_unit(&self, id: i32) -> Result<Option<item_units::Model>> {
        ItemUnits::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query item unit")
    }

    pub async fn list_units(&self, item_type_id: i32) -> Result<Vec<item_units::Model>> {
        list_units(&self.conn, item_type_id).await
    }

    pub async fn get_unit_by_serial(
        &self,
        item_type_id: i32,
        serial_number: &str,
    ) -> Result<Option<item_units::Model>> {
        ItemUnits::find()
            .filter(item_units::Column::ItemTypeId.eq(item_type_id))
            .filter(item_units::Column::SerialNumber.eq(serial_number))
            .one(&self.conn)
            .await
            .context("Failed to query item unit by serial")
    }

    pub async fn open_loan_quantity(&self, item_type_id: i32) -> Result<i32> {
        open_loan_quantity(&self.conn, item_type_id).await
    }

    /// Newest first, at most `limit` rows.
    pub async fn list_snapshots(
        &self,
        item_type_id: Option<i32>,
        department_ids: Option<&[i32]>,
        limit: u64,
    ) -> Result<Vec<inventory_snapshots::Model>> {
        let mut select = InventorySnapshots::find()
            .order_by_desc(inventory_snapshots::Column::TakenAt)
            .order_by_desc(inventory_snapshots::Column::Id);
        if let Some(item_type_id) = item_type_id {
            select = select.filter(inventory_snapshots::Column::ItemTypeId.eq(item_type_id));
        }
        if let Some(ids) = department_ids {
            select =
                select.filter(inventory_snapshots::Column::DepartmentId.is_in(ids.iter().copied()));
        }
        select
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list inventory snapshots")
    }
}

pub async fn list_units<C: ConnectionTrait>(
    conn: &C,
    item_type_id: i32,
) -> Result<Vec<item_units::Model>> {
    ItemUnits::find()
        .filter(item_units::Column::ItemTypeId.eq(item_type_id))
        .order_by_asc(item_units::Column::SerialNumber)
        .all(conn)
        .await
        .context("Failed to list item units")
}

/// Requests whose equipment is currently out with a soldier.
pub async fn open_loans<C: ConnectionTrait>(
    conn: &C,
    item_type_id: i32,
) -> Result<Vec<requests::Model>> {
    Requests::find()
        .filter(requests::Column::ItemTypeId.eq(item_type_id))
        .filter(
            requests::Column::Status.is_in([RequestStatus::HandedOver, RequestStatus::Overdue]),
        )
        .all(conn)
        .await
        .context("Failed to query open loans")
}

pub async fn open_loan_quantity<C: ConnectionTrait>(conn: &C, item_type_id: i32) -> Result<i32> {
    Ok(open_loans(conn, item_type_id)
        .await?
        .iter()
        .map(|r| r.quantity)
        .sum())
}
