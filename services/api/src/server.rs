use crate::cli::ServeArgs;
use crate::infra::{load_registry, selection_service, AppState};
use crate::routes::with_selection_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use school_select::config::AppConfig;
use school_select::error::AppError;
use school_select::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let import = load_registry(args.registry.paths, &config.selection)?;
    let registry_summary = import.summary;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        registry: registry_summary,
    };

    let service = Arc::new(selection_service(import, &config.selection));
    let app = with_selection_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        schools = registry_summary.loaded,
        year = config.selection.selection_year,
        "school selection service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
