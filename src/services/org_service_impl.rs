//! `SeaORM` implementation of the `OrgService` trait.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde_json::json;
use std::collections::HashMap;

use crate::db::Store;
use crate::db::repositories::org::{replace_store_peers, store_peers};
use crate::domain::{Actor, AuditAction, BaseStatus, Role, entity_kind, phone_digits};
use crate::entities::{bases, departments};
use crate::services::audit;
use crate::services::org_service::{
    DepartmentDto, DepartmentUpdate, NewBase, NewDepartment, OrgError, OrgService,
};

pub struct SeaOrmOrgService {
    store: Store,
}

impl SeaOrmOrgService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn find_department(&self, id: i32) -> Result<departments::Model, OrgError> {
        self.store
            .org()
            .get_department(id)
            .await?
            .ok_or(OrgError::DepartmentNotFound)
    }

    /// Peers must exist, share the base and not be the department itself.
    async fn validate_peers(
        &self,
        department: &departments::Model,
        peer_ids: &[i32],
    ) -> Result<Vec<i32>, OrgError> {
        let mut ids = peer_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let same_base: HashMap<i32, departments::Model> = self
            .store
            .org()
            .list_departments(Some(department.base_id))
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();

        for id in &ids {
            if *id == department.id {
                return Err(OrgError::InvalidStorePeer(
                    "מחלקה אינה יכולה לשמש מחסן של עצמה".to_string(),
                ));
            }
            if !same_base.contains_key(id) {
                return Err(OrgError::InvalidStorePeer(format!(
                    "מחלקה {id} אינה שייכת לאותו בסיס"
                )));
            }
        }

        Ok(ids)
    }
}

fn department_snapshot(department: &departments::Model, peers: &[i32]) -> serde_json::Value {
    json!({
        "name": department.name,
        "allow_immediate": department.allow_immediate,
        "allow_scheduled": department.allow_scheduled,
        "auto_approve_requests": department.auto_approve_requests,
        "store_department_ids": peers,
    })
}

#[async_trait]
impl OrgService for SeaOrmOrgService {
    async fn create_base(&self, actor: &Actor, input: NewBase) -> Result<bases::Model, OrgError> {
        if actor.role != Role::SuperAdmin {
            return Err(OrgError::Forbidden);
        }

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(OrgError::Validation("שם הבסיס הוא שדה חובה".to_string()));
        }

        let txn = self.store.conn.begin().await?;

        let base = bases::ActiveModel {
            name: Set(name),
            commander_name: Set(input
                .commander_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())),
            commander_phone: Set(input
                .commander_phone
                .map(|p| phone_digits(&p))
                .filter(|p| !p.is_empty())),
            status: Set(BaseStatus::Active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        audit::record(
            &txn,
            actor,
            AuditAction::CreateBase,
            entity_kind::BASE,
            Some(base.id),
            None,
            Some(json!({ "name": base.name })),
        )
        .await?;

        txn.commit().await?;
        Ok(base)
    }

    async fn list_bases(&self) -> Result<Vec<bases::Model>, OrgError> {
        Ok(self.store.org().list_bases().await?)
    }

    async fn create_department(
        &self,
        actor: &Actor,
        input: NewDepartment,
    ) -> Result<DepartmentDto, OrgError> {
        if !actor.is_any(&[Role::SuperAdmin, Role::HqCommander]) {
            return Err(OrgError::Forbidden);
        }

        self.store
            .org()
            .get_base(input.base_id)
            .await?
            .ok_or(OrgError::BaseNotFound)?;

        if !actor.can_manage_base(input.base_id) {
            return Err(OrgError::Forbidden);
        }

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(OrgError::Validation("שם המחלקה הוא שדה חובה".to_string()));
        }

        let txn = self.store.conn.begin().await?;

        let department = departments::ActiveModel {
            base_id: Set(input.base_id),
            name: Set(name),
            allow_immediate: Set(input.allow_immediate),
            allow_scheduled: Set(input.allow_scheduled),
            auto_approve_requests: Set(input.auto_approve_requests),
            is_hq: Set(input.is_hq),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        audit::record(
            &txn,
            actor,
            AuditAction::CreateDepartment,
            entity_kind::DEPARTMENT,
            Some(department.id),
            None,
            Some(department_snapshot(&department, &[])),
        )
        .await?;

        txn.commit().await?;

        Ok(DepartmentDto {
            department,
            store_department_ids: Vec::new(),
        })
    }

    async fn update_department(
        &self,
        actor: &Actor,
        id: i32,
        update: DepartmentUpdate,
    ) -> Result<DepartmentDto, OrgError> {
        let existing = self.find_department(id).await?;
        if !actor.role.is_admin() || !actor.can_manage_department(&existing) {
            return Err(OrgError::Forbidden);
        }

        let old_peers = self.store.org().store_peers(id).await?;
        let new_peers = match &update.store_department_ids {
            Some(ids) => Some(self.validate_peers(&existing, ids).await?),
            None => None,
        };

        let old = department_snapshot(&existing, &old_peers);
        let mut active: departments::ActiveModel = existing.clone().into();

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(OrgError::Validation("שם המחלקה הוא שדה חובה".to_string()));
            }
            active.name = Set(name);
        }
        if let Some(flag) = update.allow_immediate {
            active.allow_immediate = Set(flag);
        }
        if let Some(flag) = update.allow_scheduled {
            active.allow_scheduled = Set(flag);
        }
        if let Some(flag) = update.auto_approve_requests {
            active.auto_approve_requests = Set(flag);
        }

        let txn = self.store.conn.begin().await?;

        let department = if active.is_changed() {
            active.update(&txn).await?
        } else {
            existing
        };

        if let Some(peers) = &new_peers {
            replace_store_peers(&txn, id, peers).await?;
        }
        let peers = store_peers(&txn, id).await?;

        audit::record(
            &txn,
            actor,
            AuditAction::UpdateDepartment,
            entity_kind::DEPARTMENT,
            Some(id),
            Some(old),
            Some(department_snapshot(&department, &peers)),
        )
        .await?;

        txn.commit().await?;

        Ok(DepartmentDto {
            department,
            store_department_ids: peers,
        })
    }

    async fn get_department(&self, id: i32) -> Result<DepartmentDto, OrgError> {
        let department = self.find_department(id).await?;
        let store_department_ids = self.store.org().store_peers(id).await?;
        Ok(DepartmentDto {
            department,
            store_department_ids,
        })
    }

    async fn list_departments(
        &self,
        base_id: Option<i32>,
    ) -> Result<Vec<DepartmentDto>, OrgError> {
        let departments = self.store.org().list_departments(base_id).await?;
        let mut result = Vec::with_capacity(departments.len());
        for department in departments {
            let store_department_ids = self.store.org().store_peers(department.id).await?;
            result.push(DepartmentDto {
                department,
                store_department_ids,
            });
        }
        Ok(result)
    }
}
