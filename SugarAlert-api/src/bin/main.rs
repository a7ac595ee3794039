use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use sugar_alert_api::api::{create_application, AppState};
use sugar_alert_api::config::AppConfig;
use sugar_alert_data::llm::GeminiClient;
use sugar_alert_data::sms::SmsGatewayDispatcher;
use sugar_alert_domain::scheduler::{JobScheduler, SchedulerConfig, SystemClock};

/// The main entry point for the SugarAlert API server
///
/// This function:
/// 1. Loads environment variables from a .env file
/// 2. Sets up tracing for logging
/// 3. Reads and checks the configuration, exiting if a key is missing
/// 4. Starts the reminder scheduler and the Axum application
/// 5. Handles graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("🚀 Starting SugarAlert API server");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!(?config, "Configuration loaded");

    let client = reqwest::Client::new();

    let model = GeminiClient::new(client.clone(), config.gemini_api_key.clone())
        .with_model(config.gemini_model.clone())
        .with_api_base(config.gemini_api_base.clone());
    let dispatcher = SmsGatewayDispatcher::new(client, config.sms_gateway_url.clone(), config.sms_api_key.clone());

    let scheduler = JobScheduler::start(
        Arc::new(SystemClock),
        SchedulerConfig {
            tick: config.scheduler_tick,
        },
    );

    let state = AppState::new(Arc::new(model), Arc::new(dispatcher), scheduler.clone())
        .with_environment(config.environment.clone());
    let app = create_application(state);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    match scheduler.stop().await {
        Ok(0) => info!("Job scheduler stopped"),
        Ok(discarded) => warn!("Job scheduler stopped, {} pending reminder(s) discarded", discarded),
        Err(e) => warn!("Job scheduler was already stopped: {}", e),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
