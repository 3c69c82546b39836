//! Turnover Prediction Service - Main Entry Point
//!
//! Usage: `turnover-service [CONFIG_FILE]`. Without an argument the path is
//! taken from `TURNOVER_CONFIG`, falling back to `config/turnover.toml`.

use anyhow::Context;
use api::{init_logging, run_server, ServiceConfig};
use inference_engine::InferenceEngine;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TURNOVER_CONFIG").ok())
        .map(PathBuf::from);
    let config =
        ServiceConfig::load(config_path.as_deref()).context("failed to load configuration")?;

    init_logging(&config.logging).context("failed to initialize logging")?;

    info!("=== Turnover Prediction Service v{} ===", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &config_path {
        info!("Configuration file: {}", path.display());
    }

    // Artifacts are loaded once and shared read-only by every request
    let engine = InferenceEngine::load(&config.model_path, &config.scaler_path)
        .context("failed to load model artifacts")?;

    run_server(&config, engine).await
}
