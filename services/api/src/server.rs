use crate::cli::ServeArgs;
use crate::infra::{
    collaborators_from, sample_trip, AppState, InMemoryOperationsHub, InMemoryTripRepository,
};
use crate::routes::with_trip_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tour_ops::config::AppConfig;
use tour_ops::error::AppError;
use tour_ops::telemetry;
use tour_ops::workflows::trips::TripService;
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

    let repository = Arc::new(InMemoryTripRepository::default());
    let hub = Arc::new(InMemoryOperationsHub::default());
    let trip_service = Arc::new(TripService::new(
        repository,
        collaborators_from(&hub),
        config.gates.risk_policy(),
    ));

    let seeded = trip_service.create_trip(sample_trip(
        "trip-demo-001",
        Local::now().date_naive(),
    ))?;
    info!(trip = %seeded.trip.id, "seeded sample trip");

    let app = with_trip_routes(trip_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "trip readiness gate engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
