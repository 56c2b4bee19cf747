use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::domain::events::NotificationEvent;
use crate::state::SharedState;

pub mod auth;
mod catalog;
mod error;
pub mod events;
mod inventory;
mod observability;
mod org;
mod periods;
mod requests;
mod storefront;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn event_bus(&self) -> &tokio::sync::broadcast::Sender<NotificationEvent> {
        &self.shared.event_bus
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, idle_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_idle_minutes,
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(idle_minutes)));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/health/live", get(system::health_live))
        .route("/health/ready", get(system::health_ready))
        .route("/storefront/identify", post(storefront::identify))
        .route("/storefront/{token}/catalog", get(storefront::catalog))
        .route("/storefront/{token}/requests", post(storefront::quick_request))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password))
        .route("/storefront/token", post(storefront::issue_token))
        .route("/dashboard", get(system::dashboard))
        .route(
            "/requests",
            get(requests::list_requests).post(requests::create_request),
        )
        .route("/requests/{id}", get(requests::get_request))
        .route("/requests/{id}/submit", post(requests::submit))
        .route("/requests/{id}/approve", post(requests::approve))
        .route("/requests/{id}/reject", post(requests::reject))
        .route("/requests/{id}/ready", post(requests::mark_ready))
        .route("/requests/{id}/handover", post(requests::handover))
        .route("/requests/{id}/return", post(requests::return_request))
        .route("/requests/{id}/close", post(requests::close))
        .route("/requests/{id}/movements", get(requests::list_movements))
        .route(
            "/categories",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route(
            "/item-types",
            get(catalog::list_item_types).post(catalog::create_item_type),
        )
        .route(
            "/item-types/{id}",
            get(catalog::get_item_type)
                .put(catalog::update_item_type)
                .delete(catalog::delete_item_type),
        )
        .route(
            "/item-types/{id}/units",
            get(catalog::list_units).post(catalog::add_unit),
        )
        .route("/units/{id}/status", put(catalog::set_unit_status))
        .route("/inventory/sync", post(inventory::sync))
        .route("/inventory/low-stock", get(inventory::low_stock))
        .route(
            "/inventory/snapshots",
            get(inventory::list_snapshots).post(inventory::take_snapshot),
        )
        .route(
            "/admin/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/admin/users/{id}",
            get(users::get_user).put(users::update_user),
        )
        .route(
            "/admin/users/{id}/toggle-active",
            post(users::toggle_active),
        )
        .route(
            "/admin/users/{id}/reset-password",
            post(users::reset_password),
        )
        .route("/admin/bases", get(org::list_bases).post(org::create_base))
        .route(
            "/admin/departments",
            get(org::list_departments).post(org::create_department),
        )
        .route(
            "/admin/departments/{id}",
            get(org::get_department).put(org::update_department),
        )
        .route(
            "/admin/periods",
            get(periods::list_periods).post(periods::create_period),
        )
        .route("/admin/periods/{id}/end", post(periods::end_period))
        .route("/admin/audit-logs", get(system::audit_logs))
        .route("/admin/system/reset", post(system::reset))
        .route("/metrics", get(observability::get_metrics))
        .merge(events::router())
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
