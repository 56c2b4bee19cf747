//! `SeaORM` implementation of the `SystemService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::TransactionTrait;
use serde_json::json;
use tokio::sync::{RwLock, broadcast};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db::Store;
use crate::db::repositories::request::RequestQuery;
use crate::db::seed::{self, SeedPasswords, SeedReport};
use crate::domain::events::NotificationEvent;
use crate::domain::{Actor, AuditAction, RequestStatus, Role, entity_kind};
use crate::services::audit;
use crate::services::scope::visible_departments;
use crate::services::system_service::{Dashboard, SystemError, SystemService};

pub struct SeaOrmSystemService {
    store: Store,
    config: Arc<RwLock<Config>>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl SeaOrmSystemService {
    #[must_use]
    pub const fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            config,
            event_bus,
        }
    }

    async fn wipe_and_seed(&self, actor: &Actor) -> anyhow::Result<SeedReport> {
        let (seed_config, security) = {
            let config = self.config.read().await;
            (config.seed.clone(), config.security.clone())
        };
        let passwords = SeedPasswords::hash(&seed_config, &security).await?;

        let txn = self.store.conn.begin().await?;
        seed::wipe_all(&txn).await?;
        let report = seed::insert_defaults(&txn, &seed_config, passwords).await?;

        // The caller's row is gone, so the entry is attributed to the system.
        audit::record(
            &txn,
            &Actor::system(),
            AuditAction::SystemReset,
            entity_kind::SYSTEM,
            None,
            None,
            Some(json!({
                "requested_by": actor.user_id,
                "base_id": report.base_id,
                "department_id": report.department_id,
                "user_ids": report.user_ids,
            })),
        )
        .await?;

        txn.commit().await?;
        Ok(report)
    }

    async fn count(
        &self,
        statuses: &[RequestStatus],
        department_ids: Option<Vec<i32>>,
        soldier_id: Option<i32>,
    ) -> Result<u64, SystemError> {
        let query = RequestQuery {
            statuses: statuses.to_vec(),
            department_ids,
            soldier_id,
            item_type_id: None,
        };
        Ok(self.store.requests().count(&query).await?)
    }
}

#[async_trait]
impl SystemService for SeaOrmSystemService {
    async fn reset_system(
        &self,
        actor: &Actor,
        phrase: &str,
        code: &str,
    ) -> Result<SeedReport, SystemError> {
        if actor.role != Role::SuperAdmin {
            return Err(SystemError::Forbidden);
        }

        {
            let config = self.config.read().await;
            if phrase != config.reset.confirmation_phrase || code != config.reset.confirmation_code
            {
                warn!(
                    event = "system_reset_rejected",
                    user_id = actor.user_id,
                    "System reset confirmation mismatch"
                );
                return Err(SystemError::ConfirmationMismatch);
            }
        }

        let report = self.wipe_and_seed(actor).await.map_err(|e| {
            error!(event = "system_reset_failed", error = %e, "System reset failed");
            SystemError::ResetFailed
        })?;

        warn!(
            event = "system_reset",
            user_id = actor.user_id,
            base_id = report.base_id,
            "System reset completed"
        );
        let _ = self.event_bus.send(NotificationEvent::SystemReset);

        Ok(report)
    }

    async fn ensure_seeded(&self) -> Result<Option<SeedReport>, SystemError> {
        if self.store.users().count().await? > 0 {
            return Ok(None);
        }

        let (seed_config, security) = {
            let config = self.config.read().await;
            (config.seed.clone(), config.security.clone())
        };
        let passwords = SeedPasswords::hash(&seed_config, &security).await?;

        let txn = self.store.conn.begin().await?;
        let report = seed::insert_defaults(&txn, &seed_config, passwords).await?;
        txn.commit().await?;

        info!(
            event = "bootstrap_seeded",
            base_id = report.base_id,
            "Seeded default base, HQ department and administrators"
        );

        Ok(Some(report))
    }

    async fn dashboard(&self, actor: &Actor) -> Result<Dashboard, SystemError> {
        let (my_open_requests, my_active_loans) = match actor.user_id {
            Some(user_id) => (
                self.count(
                    &[
                        RequestStatus::Draft,
                        RequestStatus::Submitted,
                        RequestStatus::Approved,
                        RequestStatus::ReadyForPickup,
                    ],
                    None,
                    Some(user_id),
                )
                .await?,
                self.count(
                    &[RequestStatus::HandedOver, RequestStatus::Overdue],
                    None,
                    Some(user_id),
                )
                .await?,
            ),
            None => (0, 0),
        };

        let mut dashboard = Dashboard {
            role: actor.role,
            my_open_requests,
            my_active_loans,
            pending_approvals: None,
            ready_for_pickup: None,
            on_loan: None,
            overdue: None,
            low_stock: None,
        };

        if !actor.role.is_manager() {
            return Ok(dashboard);
        }

        let scope = visible_departments(&self.store, actor).await?;
        dashboard.pending_approvals = Some(
            self.count(&[RequestStatus::Submitted], scope.clone(), None)
                .await?,
        );
        dashboard.ready_for_pickup = Some(
            self.count(&[RequestStatus::ReadyForPickup], scope.clone(), None)
                .await?,
        );
        dashboard.on_loan = Some(
            self.count(&[RequestStatus::HandedOver], scope.clone(), None)
                .await?,
        );
        dashboard.overdue = Some(
            self.count(&[RequestStatus::Overdue], scope.clone(), None)
                .await?,
        );

        let item_types = self
            .store
            .catalog()
            .list_item_types(scope.as_deref())
            .await?;
        dashboard.low_stock = Some(
            item_types
                .iter()
                .filter(|t| t.available_quantity < t.minimum_alert)
                .count() as u64,
        );

        Ok(dashboard)
    }

    async fn ready(&self) -> Result<(), SystemError> {
        self.store.ping().await?;
        Ok(())
    }
}
