//! Append-only audit trail of administrative actions.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, Set};
use serde::Serialize;

use crate::db::Store;
use crate::db::repositories::audit::AuditQuery;
use crate::domain::{Actor, AuditAction, Role};
use crate::entities::audit_logs;

/// Writes one audit row. Pass a transaction to make the entry part of it.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    actor: &Actor,
    action: AuditAction,
    entity_type: &str,
    entity_id: Option<i32>,
    old_values: Option<serde_json::Value>,
    new_values: Option<serde_json::Value>,
) -> Result<(), DbErr> {
    audit_logs::ActiveModel {
        user_id: Set(actor.user_id),
        action: Set(action),
        entity_type: Set(entity_type.to_string()),
        entity_id: Set(entity_id),
        old_values: Set(old_values),
        new_values: Set(new_values),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(())
}

#[derive(Debug, Serialize)]
pub struct AuditPage {
    pub logs: Vec<audit_logs::Model>,
    pub total_pages: u64,
}

pub struct AuditLogService {
    store: Store,
}

impl AuditLogService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Super admins see every entry; anyone else only their own base.
    pub async fn list(
        &self,
        actor: &Actor,
        page: u64,
        page_size: u64,
        query: AuditQuery,
    ) -> anyhow::Result<AuditPage> {
        let query = if actor.role == Role::SuperAdmin {
            query
        } else {
            let Some(base_id) = actor.base_id else {
                return Ok(AuditPage {
                    logs: Vec::new(),
                    total_pages: 0,
                });
            };
            AuditQuery {
                base_id: Some(base_id),
                ..query
            }
        };

        let (logs, total_pages) = self.store.audit().list(page, page_size, &query).await?;
        Ok(AuditPage { logs, total_pages })
    }
}
