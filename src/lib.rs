pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

use crate::app::AppState;
use crate::infrastructure::config::AppConfig;
use crate::interfaces::http::{add_log, start_server, LogEntry};
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub fn run() -> std::io::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let config = AppConfig::load().map_err(|err| {
        error!(error = %err, "Failed to load configuration");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
    })?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        blob_backend = ?config.blob_store.backend,
        relayer = config.ledger.relayer_url.is_some(),
        explain = config.explain.is_enabled(),
        "Starting fairness audit service"
    );

    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));
    let state = Arc::new(AppState::new(config, logs.clone()));

    actix_web::rt::System::new().block_on(serve(state, logs))
}

async fn serve(state: Arc<AppState>, logs: Arc<Mutex<Vec<LogEntry>>>) -> std::io::Result<()> {
    let server = start_server(state.clone(), logs.clone())?;
    add_log(
        &logs,
        "INFO",
        "HttpApi",
        &format!(
            "HTTP server listening on {}:{}",
            state.config.server.host, state.config.server.port
        ),
    );
    server.await
}
