//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::db::repositories::user::{
    UserQuery, hash_password_blocking, linked_departments, replace_linked_departments,
};
use crate::domain::{Actor, AuditAction, Role, entity_kind, phone_digits};
use crate::entities::users;
use crate::services::audit;
use crate::services::user_service::{
    NewUser, UserDto, UserError, UserFilter, UserService, UserUpdate,
};

const MIN_PHONE_DIGITS: usize = 9;

pub struct SeaOrmUserService {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }

    fn require_admin(actor: &Actor) -> Result<(), UserError> {
        if actor.role.is_admin() {
            Ok(())
        } else {
            Err(UserError::Forbidden)
        }
    }

    /// HQ commanders only touch users of their own base and never super admins.
    fn require_scope(actor: &Actor, target: &users::Model) -> Result<(), UserError> {
        Self::require_admin(actor)?;
        if actor.role == Role::SuperAdmin {
            return Ok(());
        }
        if target.role == Role::SuperAdmin {
            return Err(UserError::Forbidden);
        }
        match target.base_id {
            Some(base_id) if actor.can_manage_base(base_id) => Ok(()),
            _ => Err(UserError::Forbidden),
        }
    }

    fn normalize_phone(phone: &str) -> Result<String, UserError> {
        let digits = phone_digits(phone);
        if digits.len() < MIN_PHONE_DIGITS {
            return Err(UserError::Validation("מספר טלפון לא תקין".to_string()));
        }
        Ok(digits)
    }

    async fn ensure_phone_free(&self, phone: &str, except: Option<i32>) -> Result<(), UserError> {
        match self.store.users().get_by_phone(phone).await? {
            Some(existing) if Some(existing.id) != except => Err(UserError::PhoneTaken),
            _ => Ok(()),
        }
    }

    async fn ensure_barcode_free(
        &self,
        barcode: &str,
        except: Option<i32>,
    ) -> Result<(), UserError> {
        match self.store.users().get_by_barcode(barcode).await? {
            Some(existing) if Some(existing.id) != except => Err(UserError::BarcodeTaken),
            _ => Ok(()),
        }
    }

    /// Resolves the base a department belongs to.
    async fn department_base(&self, department_id: i32) -> Result<i32, UserError> {
        self.store
            .org()
            .get_department(department_id)
            .await?
            .map(|d| d.base_id)
            .ok_or_else(|| UserError::Validation("המחלקה לא נמצאה".to_string()))
    }

    async fn dto(&self, user: users::Model) -> Result<UserDto, UserError> {
        let department_ids = self.store.users().linked_departments(user.id).await?;
        Ok(UserDto::from_model(user, department_ids))
    }

    async fn find(&self, id: i32) -> Result<users::Model, UserError> {
        self.store
            .users()
            .get(id)
            .await?
            .ok_or(UserError::NotFound)
    }
}

fn snapshot(user: &users::Model) -> serde_json::Value {
    json!({
        "name": user.name,
        "phone": user.phone,
        "role": user.role,
        "department_id": user.department_id,
        "base_id": user.base_id,
        "barcode": user.barcode,
        "is_active": user.is_active,
    })
}

fn clean_barcode(barcode: Option<String>) -> Option<String> {
    barcode
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn create_user(&self, actor: &Actor, input: NewUser) -> Result<UserDto, UserError> {
        Self::require_admin(actor)?;
        if input.role == Role::SuperAdmin && actor.role != Role::SuperAdmin {
            return Err(UserError::Forbidden);
        }

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(UserError::Validation("שם המשתמש הוא שדה חובה".to_string()));
        }
        let phone = Self::normalize_phone(&input.phone)?;
        let barcode = clean_barcode(input.barcode);

        let base_id = match input.department_id {
            Some(department_id) => Some(self.department_base(department_id).await?),
            None => input.base_id.or(actor.base_id),
        };
        if actor.role != Role::SuperAdmin && !base_id.is_some_and(|b| actor.can_manage_base(b)) {
            return Err(UserError::Forbidden);
        }

        self.ensure_phone_free(&phone, None).await?;
        if let Some(barcode) = &barcode {
            self.ensure_barcode_free(barcode, None).await?;
        }

        let security = self.config.read().await.security.clone();
        let password_hash = hash_password_blocking(&phone, &security).await?;
        let now = Utc::now();

        let txn = self.store.conn.begin().await?;

        let user = users::ActiveModel {
            name: Set(name),
            phone: Set(phone),
            password_hash: Set(password_hash),
            role: Set(input.role),
            department_id: Set(input.department_id),
            base_id: Set(base_id),
            must_change_password: Set(true),
            barcode: Set(barcode),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if input.role == Role::Soldier && !input.department_ids.is_empty() {
            replace_linked_departments(&txn, user.id, &input.department_ids).await?;
        }

        audit::record(
            &txn,
            actor,
            AuditAction::CreateUser,
            entity_kind::USER,
            Some(user.id),
            None,
            Some(snapshot(&user)),
        )
        .await?;

        let department_ids = linked_departments(&txn, user.id).await?;
        txn.commit().await?;

        info!(event = "user_created", user_id = user.id, role = %user.role, "User created");

        Ok(UserDto::from_model(user, department_ids))
    }

    async fn update_user(
        &self,
        actor: &Actor,
        id: i32,
        update: UserUpdate,
    ) -> Result<UserDto, UserError> {
        let existing = self.find(id).await?;
        Self::require_scope(actor, &existing)?;

        if update.role == Some(Role::SuperAdmin) && actor.role != Role::SuperAdmin {
            return Err(UserError::Forbidden);
        }

        let old = snapshot(&existing);
        let role = update.role.unwrap_or(existing.role);
        let mut active: users::ActiveModel = existing.clone().into();

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(UserError::Validation("שם המשתמש הוא שדה חובה".to_string()));
            }
            active.name = Set(name);
        }

        if let Some(phone) = update.phone {
            let phone = Self::normalize_phone(&phone)?;
            self.ensure_phone_free(&phone, Some(id)).await?;
            active.phone = Set(phone);
        }

        if let Some(barcode) = update.barcode {
            let barcode = clean_barcode(Some(barcode));
            if let Some(barcode) = &barcode {
                self.ensure_barcode_free(barcode, Some(id)).await?;
            }
            active.barcode = Set(barcode);
        }

        if let Some(department_id) = update.department_id {
            let base_id = self.department_base(department_id).await?;
            if !actor.can_manage_base(base_id) {
                return Err(UserError::Forbidden);
            }
            active.department_id = Set(Some(department_id));
            active.base_id = Set(Some(base_id));
        }

        active.role = Set(role);
        active.updated_at = Set(Utc::now());

        let txn = self.store.conn.begin().await?;
        let user = active.update(&txn).await?;

        if let Some(department_ids) = &update.department_ids {
            let ids: &[i32] = if role == Role::Soldier {
                department_ids
            } else {
                &[]
            };
            replace_linked_departments(&txn, user.id, ids).await?;
        }

        audit::record(
            &txn,
            actor,
            AuditAction::UpdateUser,
            entity_kind::USER,
            Some(user.id),
            Some(old),
            Some(snapshot(&user)),
        )
        .await?;

        let department_ids = linked_departments(&txn, user.id).await?;
        txn.commit().await?;

        Ok(UserDto::from_model(user, department_ids))
    }

    async fn toggle_user_active(&self, actor: &Actor, id: i32) -> Result<UserDto, UserError> {
        if actor.role != Role::SuperAdmin {
            return Err(UserError::Forbidden);
        }
        if actor.user_id == Some(id) {
            return Err(UserError::CannotDeactivateSelf);
        }

        let existing = self.find(id).await?;
        let was_active = existing.is_active;

        let txn = self.store.conn.begin().await?;

        let mut active: users::ActiveModel = existing.into();
        active.is_active = Set(!was_active);
        active.updated_at = Set(Utc::now());
        let user = active.update(&txn).await?;

        audit::record(
            &txn,
            actor,
            AuditAction::ToggleUserActive,
            entity_kind::USER,
            Some(user.id),
            Some(json!({ "is_active": was_active })),
            Some(json!({ "is_active": user.is_active })),
        )
        .await?;

        txn.commit().await?;

        info!(
            event = "user_active_toggled",
            user_id = user.id,
            is_active = user.is_active,
            "User active flag changed"
        );

        self.dto(user).await
    }

    async fn reset_user_password(&self, actor: &Actor, id: i32) -> Result<UserDto, UserError> {
        let existing = self.find(id).await?;
        Self::require_scope(actor, &existing)?;

        let security = self.config.read().await.security.clone();
        let password_hash = hash_password_blocking(&existing.phone, &security).await?;

        let txn = self.store.conn.begin().await?;

        let mut active: users::ActiveModel = existing.into();
        active.password_hash = Set(password_hash);
        active.must_change_password = Set(true);
        active.updated_at = Set(Utc::now());
        let user = active.update(&txn).await?;

        audit::record(
            &txn,
            actor,
            AuditAction::ResetUserPassword,
            entity_kind::USER,
            Some(user.id),
            None,
            Some(json!({ "must_change_password": true })),
        )
        .await?;

        txn.commit().await?;

        self.dto(user).await
    }

    async fn get_user(&self, actor: &Actor, id: i32) -> Result<UserDto, UserError> {
        let user = self.find(id).await?;
        if actor.user_id != Some(id) {
            Self::require_scope(actor, &user)?;
        }
        self.dto(user).await
    }

    async fn list_users(
        &self,
        actor: &Actor,
        filter: UserFilter,
    ) -> Result<Vec<UserDto>, UserError> {
        Self::require_admin(actor)?;

        let base_id = match actor.role {
            Role::SuperAdmin => None,
            _ => Some(actor.base_id.ok_or(UserError::Forbidden)?),
        };

        let users = self
            .store
            .users()
            .list(&UserQuery {
                role: filter.role,
                department_id: filter.department_id,
                base_id,
                is_active: filter.is_active,
                search: filter.search,
            })
            .await?;

        let mut result = Vec::with_capacity(users.len());
        for user in users {
            result.push(self.dto(user).await?);
        }
        Ok(result)
    }
}
