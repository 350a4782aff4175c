use std::{fmt, sync::Arc};

use sqlx::PgPool;

use horizon_config::Config;
use horizon_core::{
    CatalogService, gate::ValidatorClient, repository::PostgresImageRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub validator: Arc<ValidatorClient>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: &Config, pool: PgPool) -> anyhow::Result<Self> {
        let repo = Arc::new(PostgresImageRepository::new(pool));
        Ok(Self {
            catalog: Arc::new(CatalogService::new(repo)),
            validator: Arc::new(ValidatorClient::new(&config.gate)?),
            config: Arc::new(config.clone()),
        })
    }

    /// Assemble state from prebuilt parts; the seam tests use to swap
    /// in a mock repository.
    pub fn from_parts(
        catalog: Arc<CatalogService>,
        validator: Arc<ValidatorClient>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            catalog,
            validator,
            config,
        }
    }
}
