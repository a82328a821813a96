use std::sync::Arc;

use anyhow::Context;
use scam_honeypot::config::HoneypotConfig;
use scam_honeypot::detection::{Detector, TfidfLogisticModel};
use scam_honeypot::engagement::{EngagementEngine, ResponseGenerator};
use scam_honeypot::report::HttpReportSink;
use scam_honeypot::server::{AppState, honeypot_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = HoneypotConfig::from_env().context("invalid configuration")?;

    eprintln!("🍯 Scam Honeypot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model_path.display());
    eprintln!("   Callback: {}", config.callback_url);
    eprintln!("   API: http://0.0.0.0:{}/honeypot", config.port);
    eprintln!("   Demo: http://0.0.0.0:{}/\n", config.port);

    // No keyword-only fallback: a missing model stops startup.
    let model = TfidfLogisticModel::load(&config.model_path).with_context(|| {
        format!(
            "scam classifier unavailable at {} (run `cargo run --bin train-model` first)",
            config.model_path.display()
        )
    })?;
    let detector = Detector::with_threshold(Arc::new(model), config.scam_threshold);

    let sink = HttpReportSink::new(config.callback_url.clone(), config.report_timeout)
        .context("failed to build report sink")?;

    let engine = EngagementEngine::new(
        detector,
        ResponseGenerator::from_seed(config.rng_seed),
        Arc::new(sink),
    )
    .with_report_timeout(config.report_timeout);

    let app = honeypot_routes(AppState::new(Arc::new(engine), config.api_key.clone()));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Honeypot server started");
    axum::serve(listener, app).await?;

    Ok(())
}
