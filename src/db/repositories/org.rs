use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{bases, department_store_links, departments, prelude::*};

pub struct OrgRepository {
    conn: DatabaseConnection,
}

impl OrgRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_base(&self, id: i32) -> Result<Option<bases::Model>> {
        Bases::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query base")
    }

    pub async fn list_bases(&self) -> Result<Vec<bases::Model>> {
        Bases::find()
            .order_by_asc(bases::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list bases")
    }

    pub async fn get_department(&self, id: i32) -> Result<Option<departments::Model>> {
        Departments::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query department")
    }

    pub async fn list_departments(&self, base_id: Option<i32>) -> Result<Vec<departments::Model>> {
        let mut select = Departments::find().order_by_asc(departments::Column::Name);
        if let Some(base_id) = base_id {
            select = select.filter(departments::Column::BaseId.eq(base_id));
        }
        select
            .all(&self.conn)
            .await
            .context("Failed to list departments")
    }

    pub async fn department_ids_in_base(&self, base_id: i32) -> Result<Vec<i32>> {
        Ok(self
            .list_departments(Some(base_id))
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect())
    }

    pub async fn store_peers(&self, department_id: i32) -> Result<Vec<i32>> {
        store_peers(&self.conn, department_id).await
    }

    /// Departments a user may borrow from: the home department, extra soldier
    /// links, and the store peers of both.
    pub async fn borrowable_departments(
        &self,
        user_id: i32,
        home_department_id: Option<i32>,
    ) -> Result<Vec<i32>> {
        let mut ids: Vec<i32> = home_department_id.into_iter().collect();
        ids.extend(super::user::linked_departments(&self.conn, user_id).await?);

        let mut peers = Vec::new();
        for id in &ids {
            peers.extend(store_peers(&self.conn, *id).await?);
        }
        ids.extend(peers);

        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}

pub async fn store_peers<C: ConnectionTrait>(conn: &C, department_id: i32) -> Result<Vec<i32>> {
    let links = DepartmentStoreLinks::find()
        .filter(department_store_links::Column::DepartmentId.eq(department_id))
        .all(conn)
        .await
        .context("Failed to query store departments")?;

    Ok(links.into_iter().map(|l| l.store_department_id).collect())
}

/// Replaces the store-peer list of a department wholesale.
pub async fn replace_store_peers<C: ConnectionTrait>(
    conn: &C,
    department_id: i32,
    peer_ids: &[i32],
) -> Result<()> {
    DepartmentStoreLinks::delete_many()
        .filter(department_store_links::Column::DepartmentId.eq(department_id))
        .exec(conn)
        .await
        .context("Failed to clear store departments")?;

    if peer_ids.is_empty() {
        return Ok(());
    }

    let rows = peer_ids
        .iter()
        .map(|&store_department_id| department_store_links::ActiveModel {
            department_id: Set(department_id),
            store_department_id: Set(store_department_id),
        });

    DepartmentStoreLinks::insert_many(rows)
        .exec(conn)
        .await
        .context("Failed to insert store departments")?;

    Ok(())
}
