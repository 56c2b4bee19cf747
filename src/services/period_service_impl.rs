//! `SeaORM` implementation of the `PeriodService` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use serde_json::json;

use crate::db::Store;
use crate::domain::{Actor, AuditAction, Role, entity_kind};
use crate::entities::{operational_periods, prelude::*};
use crate::services::audit;
use crate::services::period_service::{PeriodError, PeriodService};

pub struct SeaOrmPeriodService {
    store: Store,
}

impl SeaOrmPeriodService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PeriodService for SeaOrmPeriodService {
    async fn create_period(
        &self,
        actor: &Actor,
        base_id: i32,
        name: &str,
        starts_at: Option<DateTime<Utc>>,
    ) -> Result<operational_periods::Model, PeriodError> {
        if actor.role != Role::SuperAdmin {
            return Err(PeriodError::Forbidden);
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(PeriodError::EmptyName);
        }

        self.store
            .org()
            .get_base(base_id)
            .await?
            .ok_or(PeriodError::BaseNotFound)?;

        let now = Utc::now();
        let txn = self.store.conn.begin().await?;

        let active = OperationalPeriods::find()
            .filter(operational_periods::Column::BaseId.eq(base_id))
            .filter(operational_periods::Column::IsActive.eq(true))
            .one(&txn)
            .await?;
        if active.is_some() {
            return Err(PeriodError::ActivePeriodExists);
        }

        let period = operational_periods::ActiveModel {
            base_id: Set(base_id),
            name: Set(name.to_string()),
            starts_at: Set(starts_at.unwrap_or(now)),
            ends_at: Set(None),
            is_active: Set(true),
            created_by: Set(actor.user_id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => PeriodError::ActivePeriodExists,
            _ => e.into(),
        })?;

        audit::record(
            &txn,
            actor,
            AuditAction::CreatePeriod,
            entity_kind::PERIOD,
            Some(period.id),
            None,
            Some(json!({ "base_id": base_id, "name": period.name })),
        )
        .await?;

        txn.commit().await?;
        Ok(period)
    }

    async fn end_period(
        &self,
        actor: &Actor,
        id: i32,
    ) -> Result<operational_periods::Model, PeriodError> {
        if actor.role != Role::SuperAdmin {
            return Err(PeriodError::Forbidden);
        }

        let txn = self.store.conn.begin().await?;

        let period = OperationalPeriods::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(PeriodError::NotFound)?;
        if !period.is_active {
            return Err(PeriodError::AlreadyEnded);
        }

        let mut active: operational_periods::ActiveModel = period.into();
        active.is_active = Set(false);
        active.ends_at = Set(Some(Utc::now()));
        let period = active.update(&txn).await?;

        audit::record(
            &txn,
            actor,
            AuditAction::EndPeriod,
            entity_kind::PERIOD,
            Some(period.id),
            Some(json!({ "is_active": true })),
            Some(json!({ "is_active": false, "ends_at": period.ends_at })),
        )
        .await?;

        txn.commit().await?;
        Ok(period)
    }

    async fn list_periods(
        &self,
        base_id: Option<i32>,
    ) -> Result<Vec<operational_periods::Model>, PeriodError> {
        let mut select =
            OperationalPeriods::find().order_by_desc(operational_periods::Column::StartsAt);
        if let Some(base_id) = base_id {
            select = select.filter(operational_periods::Column::BaseId.eq(base_id));
        }
        Ok(select.all(&self.store.conn).await?)
    }

    async fn active_period(
        &self,
        base_id: i32,
    ) -> Result<Option<operational_periods::Model>, PeriodError> {
        Ok(OperationalPeriods::find()
            .filter(operational_periods::Column::BaseId.eq(base_id))
            .filter(operational_periods::Column::IsActive.eq(true))
            .one(&self.store.conn)
            .await?)
    }
}
