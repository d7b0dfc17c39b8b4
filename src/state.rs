use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::config::{AppConfig, JwtConfig};
use crate::db::RecordStore;
use crate::storage::{FileBackend, MemoryBackend, StorageBackend};

#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let backend = FileBackend::new(&config.data_file);
        info!(path = %backend.path().display(), "using file-backed record store");
        let store = RecordStore::new(Arc::new(backend) as Arc<dyn StorageBackend>);
        Ok(Self { store, config })
    }

    pub fn from_parts(store: RecordStore, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// In-memory state with a fixed test configuration.
    pub fn fake() -> Self {
        Self::fake_with(Arc::new(MemoryBackend::new()))
    }

    pub fn fake_with(backend: Arc<dyn StorageBackend>) -> Self {
        let config = Arc::new(AppConfig {
            data_file: PathBuf::from("memory"),
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60 * 24 * 7,
            },
            client_origins: vec!["*".into()],
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(RecordStore::new(backend), config)
    }
}
