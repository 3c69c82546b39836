//! Turnover Prediction API Server
//!
//! HTTP surface for the employee turnover model: `/predict` (GET and POST),
//! `/health` and, when enabled, Prometheus `/metrics`.

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use inference_engine::InferenceEngine;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
mod error;
pub mod rate_limit;
mod routes;

pub use config::{LoggingConfig, MetricsConfig, ServiceConfig};
pub use error::{ApiError, ErrorResponse};
pub use rate_limit::RateLimitConfig;

/// Application state shared across handlers, read-only after startup
pub struct AppState {
    /// Loaded scaler and classifier
    pub engine: InferenceEngine,
    /// Prometheus exporter, when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: InferenceEngine) -> Self {
        Self {
            engine,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle and expose `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route(
            "/predict",
            get(routes::predict::predict_get).post(routes::predict::predict_post),
        )
        .route("/health", get(health_handler));

    if state.metrics.is_some() {
        router = router.route("/metrics", get(metrics_handler));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check handler, independent of model state
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

/// Initialize logging
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = Level::from_str(&config.level).ok();
    let builder = FmtSubscriber::builder()
        .with_max_level(level.unwrap_or(Level::INFO))
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    if level.is_none() {
        warn!("Unknown log level {:?}, using info", config.level);
    }
    Ok(())
}

/// Build state and router from configuration and a loaded engine
pub fn build_app(config: &ServiceConfig, engine: InferenceEngine) -> anyhow::Result<Router> {
    info!("Serving predictions with the {} classifier", engine.classifier_name());
    let mut state = AppState::new(engine);
    if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install Prometheus recorder")?;
        spawn_metrics_upkeep(
            handle.clone(),
            Duration::from_secs(config.metrics.upkeep_interval_secs),
        )?;
        state = state.with_metrics(handle);
        info!("Prometheus metrics enabled at /metrics");
    }

    let mut app = create_router(Arc::new(state));
    if let Some(governor) = rate_limit::create_governor_config(&config.rate_limit) {
        info!(
            "Rate limiting enabled: one request per {}s, burst {}",
            config.rate_limit.per_second, config.rate_limit.burst_size
        );
        app = app.layer(GovernorLayer { config: governor });
    } else if config.rate_limit.enabled {
        warn!("Rate limiting requested with an invalid quota, running without it");
    }
    Ok(app)
}

/// Periodically run exporter upkeep so histogram samples do not pile up
/// between scrapes. Needs a running Tokio runtime.
pub fn spawn_metrics_upkeep(
    handle: PrometheusHandle,
    period: Duration,
) -> anyhow::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Handle::try_current()
        .context("metrics upkeep needs a Tokio runtime")?;
    let period = period.max(Duration::from_secs(1));
    Ok(runtime.spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            handle.run_upkeep();
        }
    }))
}

/// Run the server until Ctrl-C
pub async fn run_server(config: &ServiceConfig, engine: InferenceEngine) -> anyhow::Result<()> {
    let app = build_app(config, engine)?;

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
