//! Domain vocabulary shared by entities, services and the HTTP layer.
//!
//! Every enum here is persisted as a short snake_case string so the database
//! stays readable from a plain `sqlite3` shell.

pub mod actor;
pub mod events;
pub mod request_flow;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use actor::Actor;
pub use request_flow::Transition;

/// Access level of a user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
    #[sea_orm(string_value = "hq_commander")]
    HqCommander,
    #[sea_orm(string_value = "dept_commander")]
    DeptCommander,
    #[sea_orm(string_value = "soldier")]
    Soldier,
}

impl Role {
    /// Roles allowed on `/admin/*` routes.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::HqCommander)
    }

    /// Roles that may act on stock and requests of some department.
    #[must_use]
    pub const fn is_manager(self) -> bool {
        !matches!(self, Self::Soldier)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::HqCommander => "hq_commander",
            Self::DeptCommander => "dept_commander",
            Self::Soldier => "soldier",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum BaseStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

/// How stock of an item type is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    /// A single aggregate count.
    #[sea_orm(string_value = "quantity")]
    Quantity,
    /// One row per physical unit.
    #[sea_orm(string_value = "serial")]
    Serial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "in_use")]
    InUse,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "lost")]
    Lost,
    #[sea_orm(string_value = "damaged")]
    Damaged,
    #[sea_orm(string_value = "destroyed")]
    Destroyed,
}

impl UnitStatus {
    /// Units that still count toward an item type's total.
    #[must_use]
    pub const fn counts_toward_total(self) -> bool {
        !matches!(self, Self::Destroyed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    #[sea_orm(string_value = "immediate")]
    Immediate,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
}

/// Lifecycle of a loan request. See [`request_flow`] for the allowed edges.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "ready_for_pickup")]
    ReadyForPickup,
    #[sea_orm(string_value = "handed_over")]
    HandedOver,
    #[sea_orm(string_value = "returned")]
    Returned,
    #[sea_orm(string_value = "overdue")]
    Overdue,
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl RequestStatus {
    /// Equipment is physically with the soldier.
    #[must_use]
    pub const fn is_open_loan(self) -> bool {
        matches!(self, Self::HandedOver | Self::Overdue)
    }

    /// Still waiting on a manager decision or pickup.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Submitted | Self::Approved | Self::ReadyForPickup)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::ReadyForPickup => "ready_for_pickup",
            Self::HandedOver => "handed_over",
            Self::Returned => "returned",
            Self::Overdue => "overdue",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    #[sea_orm(string_value = "handover")]
    Handover,
    #[sea_orm(string_value = "return")]
    Return,
}

/// Administrative actions recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(40))")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    #[sea_orm(string_value = "create_base")]
    CreateBase,
    #[sea_orm(string_value = "create_department")]
    CreateDepartment,
    #[sea_orm(string_value = "update_department")]
    UpdateDepartment,
    #[sea_orm(string_value = "create_user")]
    CreateUser,
    #[sea_orm(string_value = "update_user")]
    UpdateUser,
    #[sea_orm(string_value = "toggle_user_active")]
    ToggleUserActive,
    #[sea_orm(string_value = "reset_user_password")]
    ResetUserPassword,
    #[sea_orm(string_value = "create_period")]
    CreatePeriod,
    #[sea_orm(string_value = "end_period")]
    EndPeriod,
    #[sea_orm(string_value = "create_category")]
    CreateCategory,
    #[sea_orm(string_value = "create_item_type")]
    CreateItemType,
    #[sea_orm(string_value = "update_item_type")]
    UpdateItemType,
    #[sea_orm(string_value = "delete_item_type")]
    DeleteItemType,
    #[sea_orm(string_value = "add_unit")]
    AddUnit,
    #[sea_orm(string_value = "set_unit_status")]
    SetUnitStatus,
    #[sea_orm(string_value = "request_transition")]
    RequestTransition,
    #[sea_orm(string_value = "sync_inventory")]
    SyncInventory,
    #[sea_orm(string_value = "system_reset")]
    SystemReset,
}

/// Entity names used in the audit log `entity_type` column.
pub mod entity_kind {
    pub const BASE: &str = "base";
    pub const DEPARTMENT: &str = "department";
    pub const USER: &str = "user";
    pub const PERIOD: &str = "operational_period";
    pub const CATEGORY: &str = "category";
    pub const ITEM_TYPE: &str = "item_type";
    pub const ITEM_UNIT: &str = "item_unit";
    pub const REQUEST: &str = "request";
    pub const SYSTEM: &str = "system";
}

/// Keeps only the digits of a phone number; the result is the login key.
#[must_use]
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_digits() {
        assert_eq!(phone_digits("050-123 4567"), "0501234567");
        assert_eq!(phone_digits("+972 (50) 1234567"), "972501234567");
        assert_eq!(phone_digits("abc"), "");
    }

    #[test]
    fn test_role_groups() {
        assert!(Role::SuperAdmin.is_admin());
        assert!(Role::HqCommander.is_admin());
        assert!(!Role::DeptCommander.is_admin());
        assert!(Role::DeptCommander.is_manager());
        assert!(!Role::Soldier.is_manager());
    }

    #[test]
    fn test_role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::HqCommander).unwrap();
        assert_eq!(json, "\"hq_commander\"");
        let parsed: RequestStatus = serde_json::from_str("\"ready_for_pickup\"").unwrap();
        assert_eq!(parsed, RequestStatus::ReadyForPickup);
    }
}
