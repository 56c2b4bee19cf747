//! `SeaORM` implementation of the `InventoryService` trait.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, TransactionTrait};
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::db::Store;
use crate::db::repositories::catalog::{list_units, open_loan_quantity, open_loans};
use crate::domain::events::NotificationEvent;
use crate::domain::{Actor, AuditAction, TrackingMode, UnitStatus, entity_kind};
use crate::entities::{inventory_snapshots, item_types, item_units, prelude::*};
use crate::services::audit;
use crate::services::inventory_service::{InventoryError, InventoryService, SyncReport};
use crate::services::scope::visible_departments;

const SNAPSHOT_LIST_LIMIT: u64 = 500;

pub struct SeaOrmInventoryService {
    store: Store,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl SeaOrmInventoryService {
    #[must_use]
    pub const fn new(store: Store, event_bus: broadcast::Sender<NotificationEvent>) -> Self {
        Self { store, event_bus }
    }

    async fn targets(
        &self,
        actor: &Actor,
        item_type_id: Option<i32>,
    ) -> Result<Vec<item_types::Model>, InventoryError> {
        if !actor.role.is_manager() {
            return Err(InventoryError::Forbidden);
        }
        let visible = visible_departments(&self.store, actor).await?;

        match item_type_id {
            Some(id) => {
                let item_type = self
                    .store
                    .catalog()
                    .get_item_type(id)
                    .await?
                    .ok_or(InventoryError::ItemTypeNotFound)?;
                if visible
                    .as_ref()
                    .is_some_and(|ids| !ids.contains(&item_type.department_id))
                {
                    return Err(InventoryError::Forbidden);
                }
                Ok(vec![item_type])
            }
            None => Ok(self
                .store
                .catalog()
                .list_item_types(visible.as_deref())
                .await?),
        }
    }
}

/// Brings one item type back in line with its units and open loans.
/// Returns the number of corrected records.
async fn reconcile<C: ConnectionTrait>(
    conn: &C,
    item_type: item_types::Model,
) -> Result<u64, InventoryError> {
    let now = Utc::now();
    let mut fixed = 0u64;

    let (total, available) = match item_type.tracking {
        TrackingMode::Serial => {
            let loaned: HashSet<i32> = open_loans(conn, item_type.id)
                .await?
                .into_iter()
                .filter_map(|r| r.item_unit_id)
                .collect();

            let mut total = 0;
            let mut available = 0;
            for unit in list_units(conn, item_type.id).await? {
                let expected = if loaned.contains(&unit.id) {
                    Some(UnitStatus::InUse)
                } else if unit.status == UnitStatus::InUse {
                    Some(UnitStatus::Available)
                } else {
                    None
                };

                let status = match expected {
                    Some(status) if status != unit.status => {
                        debug!(
                            unit_id = unit.id,
                            from = ?unit.status,
                            to = ?status,
                            "Correcting unit status"
                        );
                        let mut active: item_units::ActiveModel = unit.into();
                        active.status = Set(status);
                        active.updated_at = Set(now);
                        active.update(conn).await?;
                        fixed += 1;
                        status
                    }
                    _ => unit.status,
                };

                if status.counts_toward_total() {
                    total += 1;
                }
                if status == UnitStatus::Available {
                    available += 1;
                }
            }
            (total, available)
        }
        TrackingMode::Quantity => {
            let on_loan = open_loan_quantity(conn, item_type.id).await?;
            (
                item_type.total_quantity,
                (item_type.total_quantity - on_loan).max(0),
            )
        }
    };

    if total != item_type.total_quantity || available != item_type.available_quantity {
        let mut active: item_types::ActiveModel = item_type.into();
        active.total_quantity = Set(total);
        active.available_quantity = Set(available);
        active.updated_at = Set(now);
        active.update(conn).await?;
        fixed += 1;
    }

    Ok(fixed)
}

#[async_trait]
impl InventoryService for SeaOrmInventoryService {
    async fn sync_inventory(
        &self,
        actor: &Actor,
        item_type_id: Option<i32>,
    ) -> Result<SyncReport, InventoryError> {
        let targets = self.targets(actor, item_type_id).await?;
        let mut report = SyncReport::default();

        let txn = self.store.conn.begin().await?;
        for item_type in targets {
            report.checked += 1;
            report.fixed += reconcile(&txn, item_type).await?;
        }

        if report.fixed > 0 {
            audit::record(
                &txn,
                actor,
                AuditAction::SyncInventory,
                entity_kind::ITEM_TYPE,
                item_type_id,
                None,
                Some(json!({ "checked": report.checked, "fixed": report.fixed })),
            )
            .await?;
        }
        txn.commit().await?;

        metrics::counter!("inventory_drift_fixed_total").increment(report.fixed);
        info!(
            event = "inventory_sync",
            checked = report.checked,
            fixed = report.fixed,
            "Inventory sync finished"
        );
        let _ = self.event_bus.send(NotificationEvent::InventorySynced {
            checked: report.checked,
            fixed: report.fixed,
        });

        Ok(report)
    }

    async fn take_snapshot(&self) -> Result<u64, InventoryError> {
        let item_types = self.store.catalog().list_item_types(None).await?;
        let now = Utc::now();

        let txn = self.store.conn.begin().await?;
        let mut rows = Vec::with_capacity(item_types.len());
        for item_type in &item_types {
            let on_loan = open_loan_quantity(&txn, item_type.id).await?;
            rows.push(inventory_snapshots::ActiveModel {
                item_type_id: Set(item_type.id),
                department_id: Set(item_type.department_id),
                total_quantity: Set(item_type.total_quantity),
                available_quantity: Set(item_type.available_quantity),
                on_loan_quantity: Set(on_loan),
                taken_at: Set(now),
                ..Default::default()
            });
        }

        let count = rows.len() as u64;
        if !rows.is_empty() {
            InventorySnapshots::insert_many(rows).exec(&txn).await?;
        }
        txn.commit().await?;

        info!(event = "inventory_snapshot", count, "Inventory snapshot taken");
        let _ = self.event_bus.send(NotificationEvent::SnapshotTaken { count });

        Ok(count)
    }

    async fn list_snapshots(
        &self,
        actor: &Actor,
        item_type_id: Option<i32>,
    ) -> Result<Vec<inventory_snapshots::Model>, InventoryError> {
        if !actor.role.is_manager() {
            return Err(InventoryError::Forbidden);
        }
        let visible = visible_departments(&self.store, actor).await?;

        Ok(self
            .store
            .catalog()
            .list_snapshots(item_type_id, visible.as_deref(), SNAPSHOT_LIST_LIMIT)
            .await?)
    }
}
