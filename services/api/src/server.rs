use crate::cli::ServeArgs;
use crate::infra::{file_sources, AppState, InMemoryReportStore};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use isf_assess::config::AppConfig;
use isf_assess::error::AppError;
use isf_assess::telemetry;
use isf_assess::workflows::assessment::{
    AssessmentApi, AssessmentService, ScoringEngine, WeightTable,
};
use isf_assess::workflows::companies_house::RegistryRelay;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = AssessmentService::new(
        file_sources(&config.data),
        ScoringEngine::new(WeightTable::default()),
    );
    let api = Arc::new(AssessmentApi {
        service,
        reports: Arc::new(InMemoryReportStore::default()),
    });

    let relay = RegistryRelay::from_config(&config.relay)?.map(Arc::new);
    if relay.is_none() {
        warn!("CH_API_KEY not set; registry relay disabled");
    }

    let app = with_application_routes(api, relay)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.data.directory.display(),
        relay = config.relay.enabled(),
        "school assessment service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
