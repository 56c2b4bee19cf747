pub mod audit;
pub use audit::{AuditLogService, AuditPage};

pub mod scope;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, RouteDecision, SessionUser, UserProfile};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{NewUser, UserDto, UserError, UserFilter, UserService, UserUpdate};
pub use user_service_impl::SeaOrmUserService;

pub mod org_service;
pub mod org_service_impl;
pub use org_service::{
    DepartmentDto, DepartmentUpdate, NewBase, NewDepartment, OrgError, OrgService,
};
pub use org_service_impl::SeaOrmOrgService;

pub mod period_service;
pub mod period_service_impl;
pub use period_service::{PeriodError, PeriodService};
pub use period_service_impl::SeaOrmPeriodService;

pub mod catalog_service;
pub mod catalog_service_impl;
pub use catalog_service::{
    CatalogError, CatalogService, ItemTypeUpdate, LowStockItem, NewItemType,
};
pub use catalog_service_impl::SeaOrmCatalogService;

pub mod request_service;
pub mod request_service_impl;
pub use request_service::{
    HandoverInput, NewRequest, RequestDetail, RequestError, RequestFilter, RequestService,
    ReturnInput,
};
pub use request_service_impl::SeaOrmRequestService;

pub mod inventory_service;
pub mod inventory_service_impl;
pub use inventory_service::{InventoryError, InventoryService, SyncReport};
pub use inventory_service_impl::SeaOrmInventoryService;

pub mod storefront_service;
pub mod storefront_service_impl;
pub use storefront_service::{
    Identify, IssuedToken, QuickRequest, StorefrontCatalog, StorefrontError, StorefrontService,
};
pub use storefront_service_impl::SeaOrmStorefrontService;

pub mod system_service;
pub mod system_service_impl;
pub use system_service::{Dashboard, SystemError, SystemService};
pub use system_service_impl::SeaOrmSystemService;
