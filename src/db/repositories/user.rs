use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::domain::Role;
use crate::entities::{prelude::*, soldier_departments, users};

#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub department_id: Option<i32>,
    pub base_id: Option<i32>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    /// `phone` must already be normalized to digits.
    pub async fn get_by_phone(&self, phone: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Phone.eq(phone))
            .one(&self.conn)
            .await
            .context("Failed to query user by phone")
    }

    pub async fn get_by_barcode(&self, barcode: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Barcode.eq(barcode))
            .one(&self.conn)
            .await
            .context("Failed to query user by barcode")
    }

    pub async fn count(&self) -> Result<u64> {
        Users::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Vec<users::Model>> {
        let mut select = Users::find().order_by_asc(users::Column::Name);

        if let Some(role) = query.role {
            select = select.filter(users::Column::Role.eq(role));
        }
        if let Some(department_id) = query.department_id {
            select = select.filter(users::Column::DepartmentId.eq(department_id));
        }
        if let Some(base_id) = query.base_id {
            select = select.filter(users::Column::BaseId.eq(base_id));
        }
        if let Some(active) = query.is_active {
            select = select.filter(users::Column::IsActive.eq(active));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let search = search.trim();
            select = select.filter(
                users::Column::Name
                    .contains(search)
                    .or(users::Column::Phone.contains(search)),
            );
        }

        select
            .all(&self.conn)
            .await
            .context("Failed to list users")
    }

    /// Extra department links of a soldier.
    pub async fn linked_departments(&self, user_id: i32) -> Result<Vec<i32>> {
        linked_departments(&self.conn, user_id).await
    }

    /// Verifies a password against the stored hash.
    /// Argon2 is CPU heavy, so this runs on the blocking pool.
    pub async fn verify_password(&self, user: &users::Model, password: &str) -> Result<bool> {
        verify_password(&user.password_hash, password).await
    }
}

pub async fn linked_departments<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<Vec<i32>> {
    let links = SoldierDepartments::find()
        .filter(soldier_departments::Column::UserId.eq(user_id))
        .all(conn)
        .await
        .context("Failed to query soldier departments")?;

    Ok(links.into_iter().map(|l| l.department_id).collect())
}

/// Replaces a soldier's extra department links wholesale.
pub async fn replace_linked_departments<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    department_ids: &[i32],
) -> Result<()> {
    SoldierDepartments::delete_many()
        .filter(soldier_departments::Column::UserId.eq(user_id))
        .exec(conn)
        .await
        .context("Failed to clear soldier departments")?;

    let mut ids = department_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(());
    }

    let rows = ids.into_iter().map(|department_id| soldier_departments::ActiveModel {
        user_id: Set(user_id),
        department_id: Set(department_id),
    });

    SoldierDepartments::insert_many(rows)
        .exec(conn)
        .await
        .context("Failed to insert soldier departments")?;

    Ok(())
}

pub async fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let password_hash = password_hash.to_string();
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

/// Hashes on the blocking pool with the configured Argon2 parameters.
pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();

    task::spawn_blocking(move || hash_password(&password, Some(&config)))
        .await
        .context("Password hashing task panicked")?
}

/// Hash a password using Argon2id with optional custom params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password_blocking("0501234567", &fast_params())
            .await
            .unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "0501234567").await.unwrap());
        assert!(!verify_password(&hash, "0501234568").await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("not-a-hash", "x").await.is_err());
    }
}
