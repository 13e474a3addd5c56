use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use crate::config::{AppConfig, StoreBackend};
use crate::store::{MemoryStore, PostgresStore, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store: Arc<dyn RecordStore> = match config.store_backend {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres backend")?;
                let store = PostgresStore::connect(url).await?;
                if let Err(e) = sqlx::migrate!("./migrations").run(store.pool()).await {
                    warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(store)
            }
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };

        Ok(Self { store, config })
    }

    pub fn from_parts(store: Arc<dyn RecordStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store_backend: StoreBackend::Memory,
            database_url: None,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
        });
        Self {
            store: Arc::new(MemoryStore::new()),
            config,
        }
    }
}
