use crate::cli::ServeArgs;
use crate::infra::{open_store, AppState};
use crate::routes::with_registry_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use internship_registry::config::AppConfig;
use internship_registry::error::AppError;
use internship_registry::registry::{InternshipRegistry, RegistryPolicy};
use internship_registry::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(backend) = args.store.take() {
        config.storage.backend = backend;
    }
    if let Some(path) = args.store_path.take() {
        config.storage.path = path;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = open_store(&config.storage)?;
    let registry = Arc::new(InternshipRegistry::with_policy(
        store,
        RegistryPolicy::from(&config.registry),
    ));

    let app = with_registry_routes(registry)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        store = config.storage.backend.label(),
        "internship portal ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
