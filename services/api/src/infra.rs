use internship_registry::config::{StorageConfig, StoreBackend};
use internship_registry::error::AppError;
use internship_registry::registry::{InMemoryStore, JsonFileStore, RegistryStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open the configured backend. The file backend loads any existing document.
pub(crate) fn open_store(config: &StorageConfig) -> Result<Arc<dyn RegistryStore>, AppError> {
    let store: Arc<dyn RegistryStore> = match config.backend {
        StoreBackend::Memory => Arc::new(InMemoryStore::new()),
        StoreBackend::File => Arc::new(JsonFileStore::open(&config.path)?),
    };

    info!(
        backend = config.backend.label(),
        path = %config.path.display(),
        "registry store opened"
    );
    Ok(store)
}
