//! Default records for an empty database, and the wipe used by a system reset.

use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use serde::Serialize;

use crate::config::{SecurityConfig, SeedConfig};
use crate::db::repositories::user::hash_password_blocking;
use crate::domain::{BaseStatus, Role, phone_digits};
use crate::entities::{bases, departments, prelude::*, users};

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub base_id: i32,
    pub department_id: i32,
    pub user_ids: Vec<i32>,
}

/// Hashes computed before a transaction is opened.
pub struct SeedPasswords {
    super_admin: String,
    hq_commander: String,
}

impl SeedPasswords {
    /// Each seeded user's initial password is their phone digits.
    pub async fn hash(seed: &SeedConfig, security: &SecurityConfig) -> Result<Self> {
        Ok(Self {
            super_admin: hash_password_blocking(&phone_digits(&seed.super_admin_phone), security)
                .await?,
            hq_commander: hash_password_blocking(
                &phone_digits(&seed.hq_commander_phone),
                security,
            )
            .await?,
        })
    }
}

pub async fn insert_defaults<C: ConnectionTrait>(
    conn: &C,
    seed: &SeedConfig,
    passwords: SeedPasswords,
) -> Result<SeedReport> {
    let now = Utc::now();

    let base = bases::ActiveModel {
        name: Set(seed.base_name.clone()),
        commander_name: Set(Some(seed.hq_commander_name.clone())),
        commander_phone: Set(Some(phone_digits(&seed.hq_commander_phone))),
        status: Set(BaseStatus::Active),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
    .context("Failed to seed base")?;

    let department = departments::ActiveModel {
        base_id: Set(base.id),
        name: Set(seed.hq_department_name.clone()),
        allow_immediate: Set(true),
        allow_scheduled: Set(true),
        auto_approve_requests: Set(false),
        is_hq: Set(true),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
    .context("Failed to seed HQ department")?;

    let mut user_ids = Vec::with_capacity(2);
    for (name, phone, role, hash) in [
        (
            &seed.super_admin_name,
            &seed.super_admin_phone,
            Role::SuperAdmin,
            passwords.super_admin,
        ),
        (
            &seed.hq_commander_name,
            &seed.hq_commander_phone,
            Role::HqCommander,
            passwords.hq_commander,
        ),
    ] {
        let user = users::ActiveModel {
            name: Set(name.clone()),
            phone: Set(phone_digits(phone)),
            password_hash: Set(hash),
            role: Set(role),
            department_id: Set(Some(department.id)),
            base_id: Set(Some(base.id)),
            must_change_password: Set(true),
            barcode: Set(None),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .with_context(|| format!("Failed to seed {role} user"))?;
        user_ids.push(user.id);
    }

    Ok(SeedReport {
        base_id: base.id,
        department_id: department.id,
        user_ids,
    })
}

/// Deletes every operational row, children before parents.
pub async fn wipe_all<C: ConnectionTrait>(conn: &C) -> Result<()> {
    Signatures::delete_many().exec(conn).await?;
    Movements::delete_many().exec(conn).await?;
    InventorySnapshots::delete_many().exec(conn).await?;
    Requests::delete_many().exec(conn).await?;
    ItemUnits::delete_many().exec(conn).await?;
    ItemTypes::delete_many().exec(conn).await?;
    Categories::delete_many().exec(conn).await?;
    OperationalPeriods::delete_many().exec(conn).await?;
    AuditLogs::delete_many().exec(conn).await?;
    SoldierDepartments::delete_many().exec(conn).await?;
    Users::delete_many().exec(conn).await?;
    DepartmentStoreLinks::delete_many().exec(conn).await?;
    Departments::delete_many().exec(conn).await?;
    Bases::delete_many().exec(conn).await?;
    Ok(())
}
