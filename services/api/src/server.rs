use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAlertPublisher, InMemoryApplicationRepository};
use crate::routes::with_verification_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tenant_verify::config::AppConfig;
use tenant_verify::error::AppError;
use tenant_verify::telemetry;
use tenant_verify::workflows::screening::VerificationService;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let alerts = Arc::new(InMemoryAlertPublisher::default());
    let verification_service = Arc::new(VerificationService::new(
        repository,
        alerts,
        config.matching,
    ));

    let app = with_verification_routes(verification_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        amount_tolerance = config.matching.amount_tolerance,
        early_days = config.matching.early_days,
        late_days = config.matching.late_days,
        "verification service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
