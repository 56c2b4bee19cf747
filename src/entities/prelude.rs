pub use super::audit_logs::Entity as AuditLogs;
pub use super::bases::Entity as Bases;
pub use super::categories::Entity as Categories;
pub use super::department_store_links::Entity as DepartmentStoreLinks;
pub use super::departments::Entity as Departments;
pub use super::inventory_snapshots::Entity as InventorySnapshots;
pub use super::item_types::Entity as ItemTypes;
pub use super::item_units::Entity as ItemUnits;
pub use super::movements::Entity as Movements;
pub use super::operational_periods::Entity as OperationalPeriods;
pub use super::requests::Entity as Requests;
pub use super::signatures::Entity as Signatures;
pub use super::soldier_departments::Entity as SoldierDepartments;
pub use super::users::Entity as Users;
