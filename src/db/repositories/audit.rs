use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Query;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::domain::AuditAction;
use crate::entities::{audit_logs, prelude::*, users};

#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub user_id: Option<i32>,
    pub action: Option<AuditAction>,
    pub entity_type: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// Only entries written by users of this base. System entries are excluded.
    pub base_id: Option<i32>,
}

pub struct AuditRepository {
    conn: DatabaseConnection,
}

impl AuditRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Newest first. `page` is 1-based.
    pub async fn list(
        &self,
        page: u64,
        page_size: u64,
        query: &AuditQuery,
    ) -> Result<(Vec<audit_logs::Model>, u64)> {
        let mut select = AuditLogs::find()
            .order_by_desc(audit_logs::Column::CreatedAt)
            .order_by_desc(audit_logs::Column::Id);

        if let Some(user_id) = query.user_id {
            select = select.filter(audit_logs::Column::UserId.eq(user_id));
        }
        if let Some(action) = query.action {
            select = select.filter(audit_logs::Column::Action.eq(action));
        }
        if let Some(entity_type) = &query.entity_type {
            select = select.filter(audit_logs::Column::EntityType.eq(entity_type.as_str()));
        }
        if let Some(since) = query.since {
            select = select.filter(audit_logs::Column::CreatedAt.gte(since));
        }
        if let Some(until) = query.until {
            select = select.filter(audit_logs::Column::CreatedAt.lte(until));
        }
        if let Some(base_id) = query.base_id {
            select = select.filter(
                audit_logs::Column::UserId.in_subquery(
                    Query::select()
                        .column(users::Column::Id)
                        .from(Users)
                        .and_where(users::Column::BaseId.eq(base_id))
                        .to_owned(),
                ),
            );
        }

        let paginator = select.paginate(&self.conn, page_size.max(1));
        let total_pages = paginator.num_pages().await?;
        let items = paginator.fetch_page(page.max(1) - 1).await?;

        Ok((items, total_pages))
    }
}
