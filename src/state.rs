use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, QrService, RedirectService, SeaOrmAuthService, SeaOrmQrService, StatsService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub qr_service: Arc<dyn QrService>,

    pub redirect_service: RedirectService,

    pub stats_service: StatsService,
}

impl SharedState {
    /// Opens the pool (running pending migrations) and wires the services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        ));

        let qr_service: Arc<dyn QrService> = Arc::new(SeaOrmQrService::new(store.clone()));

        Self {
            config: Arc::new(config),
            redirect_service: RedirectService::new(store.clone()),
            stats_service: StatsService::new(store.clone()),
            auth_service,
            qr_service,
            store,
        }
    }

    /// Upserts the configured administrator and backfills ownerless codes.
    pub async fn bootstrap(&self) -> anyhow::Result<()> {
        self.auth_service
            .bootstrap_admin(&self.config.bootstrap)
            .await
            .map_err(|e| anyhow::anyhow!("Admin bootstrap failed: {e}"))?;
        Ok(())
    }
}
