pub mod prelude;

pub mod audit_logs;
pub mod bases;
pub mod categories;
pub mod department_store_links;
pub mod departments;
pub mod inventory_snapshots;
pub mod item_types;
pub mod item_units;
pub mod movements;
pub mod operational_periods;
pub mod requests;
pub mod signatures;
pub mod soldier_departments;
pub mod users;
