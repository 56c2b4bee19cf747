//! `SeaORM` implementation of the `CatalogService` trait.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use tracing::info;

use crate::db::Store;
use crate::db::repositories::catalog::open_loan_quantity;
use crate::domain::{Actor, AuditAction, TrackingMode, UnitStatus, entity_kind};
use crate::entities::{
    categories, departments, inventory_snapshots, item_types, item_units, movements, prelude::*,
    requests, signatures,
};
use crate::services::audit;
use crate::services::catalog_service::{
    CatalogError, CatalogService, ItemTypeUpdate, LowStockItem, NewItemType,
};
use crate::services::scope::visible_departments;

pub struct SeaOrmCatalogService {
    store: Store,
}

impl SeaOrmCatalogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn managed_department(
        &self,
        actor: &Actor,
        department_id: i32,
    ) -> Result<departments::Model, CatalogError> {
        let department = self
            .store
            .org()
            .get_department(department_id)
            .await?
            .ok_or(CatalogError::DepartmentNotFound)?;
        if !actor.can_manage_department(&department) {
            return Err(CatalogError::Forbidden);
        }
        Ok(department)
    }

    async fn find_item_type(&self, id: i32) -> Result<item_types::Model, CatalogError> {
        self.store
            .catalog()
            .get_item_type(id)
            .await?
            .ok_or(CatalogError::ItemTypeNotFound)
    }

    async fn ensure_category(&self, category_id: Option<i32>) -> Result<(), CatalogError> {
        if let Some(id) = category_id {
            self.store
                .catalog()
                .get_category(id)
                .await?
                .ok_or(CatalogError::CategoryNotFound)?;
        }
        Ok(())
    }
}

fn item_type_snapshot(item_type: &item_types::Model) -> serde_json::Value {
    json!({
        "name": item_type.name,
        "tracking": item_type.tracking,
        "total_quantity": item_type.total_quantity,
        "available_quantity": item_type.available_quantity,
        "minimum_alert": item_type.minimum_alert,
        "max_loan_days": item_type.max_loan_days,
        "requires_double_approval": item_type.requires_double_approval,
    })
}

fn positive(value: Option<i32>) -> Option<i32> {
    value.filter(|v| *v > 0)
}

#[async_trait]
impl CatalogService for SeaOrmCatalogService {
    async fn create_category(
        &self,
        actor: &Actor,
        name: &str,
    ) -> Result<categories::Model, CatalogError> {
        if !actor.role.is_manager() {
            return Err(CatalogError::Forbidden);
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::Validation("שם הקטגוריה הוא שדה חובה".to_string()));
        }
        if self.store.catalog().get_category_by_name(name).await?.is_some() {
            return Err(CatalogError::CategoryExists);
        }

        let txn = self.store.conn.begin().await?;

        let category = categories::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        audit::record(
            &txn,
            actor,
            AuditAction::CreateCategory,
            entity_kind::CATEGORY,
            Some(category.id),
            None,
            Some(json!({ "name": category.name })),
        )
        .await?;

        txn.commit().await?;
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<categories::Model>, CatalogError> {
        Ok(self.store.catalog().list_categories().await?)
    }

    async fn create_item_type(
        &self,
        actor: &Actor,
        input: NewItemType,
    ) -> Result<item_types::Model, CatalogError> {
        self.managed_department(actor, input.department_id).await?;
        self.ensure_category(input.category_id).await?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::Validation("שם סוג הפריט הוא שדה חובה".to_string()));
        }
        if input.total_quantity < 0 || input.minimum_alert < 0 {
            return Err(CatalogError::Validation("כמות אינה יכולה להיות שלילית".to_string()));
        }

        // Serial types grow one unit at a time.
        let total = match input.tracking {
            TrackingMode::Quantity => input.total_quantity,
            TrackingMode::Serial => 0,
        };
        let now = Utc::now();

        let txn = self.store.conn.begin().await?;

        let item_type = item_types::ActiveModel {
            department_id: Set(input.department_id),
            category_id: Set(input.category_id),
            name: Set(name),
            description: Set(input.description),
            tracking: Set(input.tracking),
            total_quantity: Set(total),
            available_quantity: Set(total),
            minimum_alert: Set(input.minimum_alert),
            max_loan_days: Set(positive(input.max_loan_days)),
            requires_double_approval: Set(input.requires_double_approval),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        audit::record(
            &txn,
            actor,
            AuditAction::CreateItemType,
            entity_kind::ITEM_TYPE,
            Some(item_type.id),
            None,
            Some(item_type_snapshot(&item_type)),
        )
        .await?;

        txn.commit().await?;
        Ok(item_type)
    }

    async fn update_item_type(
        &self,
        actor: &Actor,
        id: i32,
        update: ItemTypeUpdate,
    ) -> Result<item_types::Model, CatalogError> {
        let existing = self.find_item_type(id).await?;
        self.managed_department(actor, existing.department_id)
            .await?;
        self.ensure_category(update.category_id).await?;

        let old = item_type_snapshot(&existing);
        let mut active: item_types::ActiveModel = existing.clone().into();

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::Validation("שם סוג הפריט הוא שדה חובה".to_string()));
            }
            active.name = Set(name);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
        }
        if let Some(category_id) = update.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(minimum_alert) = update.minimum_alert {
            if minimum_alert < 0 {
                return Err(CatalogError::Validation("כמות אינה יכולה להיות שלילית".to_string()));
            }
            active.minimum_alert = Set(minimum_alert);
        }
        if let Some(days) = update.max_loan_days {
            active.max_loan_days = Set(positive(Some(days)));
        }
        if let Some(flag) = update.requires_double_approval {
            active.requires_double_approval = Set(flag);
        }

        let txn = self.store.conn.begin().await?;

        if let Some(total) = update.total_quantity
            && total != existing.total_quantity
        {
            if existing.tracking == TrackingMode::Serial {
                return Err(CatalogError::Validation(
                    "הכמות של פריט סדרתי נקבעת לפי הפריטים הרשומים".to_string(),
                ));
            }
            let on_loan = open_loan_quantity(&txn, id).await?;
            if total < on_loan {
                return Err(CatalogError::TotalBelowOnLoan { on_loan });
            }
            let delta = total - existing.total_quantity;
            active.total_quantity = Set(total);
            active.available_quantity = Set((existing.available_quantity + delta).max(0));
        }

        active.updated_at = Set(Utc::now());
        let item_type = active.update(&txn).await?;

        audit::record(
            &txn,
            actor,
            AuditAction::UpdateItemType,
            entity_kind::ITEM_TYPE,
            Some(id),
            Some(old),
            Some(item_type_snapshot(&item_type)),
        )
        .await?;

        txn.commit().await?;
        Ok(item_type)
    }

    async fn delete_item_type(&self, actor: &Actor, id: i32) -> Result<(), CatalogError> {
        let existing = self.find_item_type(id).await?;
        self.managed_department(actor, existing.department_id)
            .await?;

        let txn = self.store.conn.begin().await?;

        let request_ids: Vec<i32> = Requests::find()
            .select_only()
            .column(requests::Column::Id)
            .filter(requests::Column::ItemTypeId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        Signatures::delete_many()
            .filter(signatures::Column::RequestId.is_in(request_ids))
            .exec(&txn)
            .await?;
        Movements::delete_many()
            .filter(movements::Column::ItemTypeId.eq(id))
            .exec(&txn)
            .await?;
        Requests::delete_many()
            .filter(requests::Column::ItemTypeId.eq(id))
            .exec(&txn)
            .await?;
        InventorySnapshots::delete_many()
            .filter(inventory_snapshots::Column::ItemTypeId.eq(id))
            .exec(&txn)
            .await?;
        ItemUnits::delete_many()
            .filter(item_units::Column::ItemTypeId.eq(id))
            .exec(&txn)
            .await?;
        ItemTypes::delete_by_id(id).exec(&txn).await?;

        audit::record(
            &txn,
            actor,
            AuditAction::DeleteItemType,
            entity_kind::ITEM_TYPE,
            Some(id),
            Some(item_type_snapshot(&existing)),
            None,
        )
        .await?;

        txn.commit().await?;

        info!(event = "item_type_deleted", item_type_id = id, "Item type deleted");
        Ok(())
    }

    async fn get_item_type(&self, id: i32) -> Result<item_types::Model, CatalogError> {
        self.find_item_type(id).await
    }

    async fn list_item_types(
        &self,
        actor: &Actor,
        department_id: Option<i32>,
    ) -> Result<Vec<item_types::Model>, CatalogError> {
        let visible = visible_departments(&self.store, actor).await?;

        let ids = match (department_id, visible) {
            (Some(id), Some(visible)) if !visible.contains(&id) => {
                return Err(CatalogError::Forbidden);
            }
            (Some(id), _) => Some(vec![id]),
            (None, visible) => visible,
        };

        Ok(self.store.catalog().list_item_types(ids.as_deref()).await?)
    }

    async fn add_unit(
        &self,
        actor: &Actor,
        item_type_id: i32,
        serial_number: &str,
        notes: Option<String>,
    ) -> Result<item_units::Model, CatalogError> {
        let item_type = self.find_item_type(item_type_id).await?;
        self.managed_department(actor, item_type.department_id)
            .await?;

        if item_type.tracking != TrackingMode::Serial {
            return Err(CatalogError::NotSerialTracked);
        }

        let serial_number = serial_number.trim();
        if serial_number.is_empty() {
            return Err(CatalogError::Validation("מספר סידורי הוא שדה חובה".to_string()));
        }
        if self
            .store
            .catalog()
            .get_unit_by_serial(item_type_id, serial_number)
            .await?
            .is_some()
        {
            return Err(CatalogError::SerialExists);
        }

        let now = Utc::now();
        let txn = self.store.conn.begin().await?;

        let unit = item_units::ActiveModel {
            item_type_id: Set(item_type_id),
            serial_number: Set(serial_number.to_string()),
            status: Set(UnitStatus::Available),
            notes: Set(notes),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut type_active: item_types::ActiveModel = item_type.clone().into();
        type_active.total_quantity = Set(item_type.total_quantity + 1);
        type_active.available_quantity = Set(item_type.available_quantity + 1);
        type_active.updated_at = Set(now);
        type_active.update(&txn).await?;

        audit::record(
            &txn,
            actor,
            AuditAction::AddUnit,
            entity_kind::ITEM_UNIT,
            Some(unit.id),
            None,
            Some(json!({ "item_type_id": item_type_id, "serial_number": unit.serial_number })),
        )
        .await?;

        txn.commit().await?;
        Ok(unit)
    }

    async fn set_unit_status(
        &self,
        actor: &Actor,
        unit_id: i32,
        status: UnitStatus,
        notes: Option<String>,
    ) -> Result<item_units::Model, CatalogError> {
        if status == UnitStatus::InUse {
            return Err(CatalogError::InUseViaHandoverOnly);
        }

        let unit = self
            .store
            .catalog()
            .get_unit(unit_id)
            .await?
            .ok_or(CatalogError::UnitNotFound)?;
        let item_type = self.find_item_type(unit.item_type_id).await?;
        self.managed_department(actor, item_type.department_id)
            .await?;

        if unit.status == UnitStatus::InUse {
            return Err(CatalogError::UnitOnLoan);
        }
        if unit.status == status && notes.is_none() {
            return Ok(unit);
        }

        let old_status = unit.status;
        let now = Utc::now();

        let mut available_delta = 0;
        if old_status == UnitStatus::Available && status != UnitStatus::Available {
            available_delta = -1;
        } else if old_status != UnitStatus::Available && status == UnitStatus::Available {
            available_delta = 1;
        }
        let total_delta = match (
            old_status.counts_toward_total(),
            status.counts_toward_total(),
        ) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        };

        let txn = self.store.conn.begin().await?;

        let mut active: item_units::ActiveModel = unit.into();
        active.status = Set(status);
        if notes.is_some() {
            active.notes = Set(notes);
        }
        active.updated_at = Set(now);
        let unit = active.update(&txn).await?;

        if available_delta != 0 || total_delta != 0 {
            let mut type_active: item_types::ActiveModel = item_type.clone().into();
            type_active.available_quantity =
                Set((item_type.available_quantity + available_delta).max(0));
            type_active.total_quantity = Set((item_type.total_quantity + total_delta).max(0));
            type_active.updated_at = Set(now);
            type_active.update(&txn).await?;
        }

        audit::record(
            &txn,
            actor,
            AuditAction::SetUnitStatus,
            entity_kind::ITEM_UNIT,
            Some(unit.id),
            Some(json!({ "status": old_status })),
            Some(json!({ "status": unit.status })),
        )
        .await?;

        txn.commit().await?;
        Ok(unit)
    }

    async fn list_units(&self, item_type_id: i32) -> Result<Vec<item_units::Model>, CatalogError> {
        self.find_item_type(item_type_id).await?;
        Ok(self.store.catalog().list_units(item_type_id).await?)
    }

    async fn low_stock(&self, actor: &Actor) -> Result<Vec<LowStockItem>, CatalogError> {
        if !actor.role.is_manager() {
            return Err(CatalogError::Forbidden);
        }

        let visible = visible_departments(&self.store, actor).await?;
        let item_types = self
            .store
            .catalog()
            .list_item_types(visible.as_deref())
            .await?;

        Ok(item_types
            .into_iter()
            .filter(|t| t.available_quantity < t.minimum_alert)
            .map(|t| LowStockItem {
                item_type_id: t.id,
                department_id: t.department_id,
                name: t.name,
                available_quantity: t.available_quantity,
                minimum_alert: t.minimum_alert,
            })
            .collect())
    }
}
