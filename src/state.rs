use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::config::Config;
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::services::{
    AuditLogService, AuthService, CatalogService, InventoryService, OrgService, PeriodService,
    RequestService, SeaOrmAuthService, SeaOrmCatalogService, SeaOrmInventoryService,
    SeaOrmOrgService, SeaOrmPeriodService, SeaOrmRequestService, SeaOrmStorefrontService,
    SeaOrmSystemService, SeaOrmUserService, StorefrontService, SystemService, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub event_bus: broadcast::Sender<NotificationEvent>,

    pub audit_log: Arc<AuditLogService>,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: Arc<dyn UserService>,

    pub org_service: Arc<dyn OrgService>,

    pub period_service: Arc<dyn PeriodService>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub request_service: Arc<dyn RequestService>,

    pub inventory_service: Arc<dyn InventoryService>,

    pub storefront_service: Arc<dyn StorefrontService>,

    pub system_service: Arc<dyn SystemService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::init_with_event_bus(config, event_bus).await
    }

    async fn init_with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let config = Arc::new(RwLock::new(config));

        let request_service = Arc::new(SeaOrmRequestService::new(
            store.clone(),
            event_bus.clone(),
        )) as Arc<dyn RequestService>;

        let storefront_service = Arc::new(SeaOrmStorefrontService::new(
            store.clone(),
            config.clone(),
            request_service.clone(),
        )) as Arc<dyn StorefrontService>;

        let system_service = Arc::new(SeaOrmSystemService::new(
            store.clone(),
            config.clone(),
            event_bus.clone(),
        )) as Arc<dyn SystemService>;

        if let Some(report) = system_service.ensure_seeded().await? {
            tracing::info!(
                users = report.user_ids.len(),
                "Empty database, default accounts created"
            );
        }

        Ok(Self {
            audit_log: Arc::new(AuditLogService::new(store.clone())),
            auth_service: Arc::new(SeaOrmAuthService::new(store.clone(), config.clone())),
            user_service: Arc::new(SeaOrmUserService::new(store.clone(), config.clone())),
            org_service: Arc::new(SeaOrmOrgService::new(store.clone())),
            period_service: Arc::new(SeaOrmPeriodService::new(store.clone())),
            catalog_service: Arc::new(SeaOrmCatalogService::new(store.clone())),
            inventory_service: Arc::new(SeaOrmInventoryService::new(
                store.clone(),
                event_bus.clone(),
            )),
            request_service,
            storefront_service,
            system_service,
            config,
            store,
            event_bus,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
