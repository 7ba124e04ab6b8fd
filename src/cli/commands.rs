//! CLI command implementations
//!
//! Startup sequence for `serve`:
//! 1. Configuration resolution and validation
//! 2. Logging
//! 3. Store handle (connects in the background)
//! 4. HTTP listener, until Ctrl-C or SIGTERM
//! 5. Store handle closed after the listener drains

use serde_json::json;
use tokio::runtime::Runtime;
use tracing::info;

use crate::http_server::HttpServer;
use crate::observability::{init_logging, Event};
use crate::storage::StoreHandle;

use super::args::{Command, ConfigArgs};
use super::config::AppConfig;
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(&config),
        Command::Clear { config } => clear(&config),
        Command::CheckConfig { config } => check_config(&config),
    }
}

fn runtime() -> CliResult<Runtime> {
    Runtime::new()
        .map_err(|e| CliError::startup_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Resolves configuration and installs logging.
fn boot(args: &ConfigArgs) -> CliResult<AppConfig> {
    let config = AppConfig::resolve(args)?;
    init_logging(&config.log_filter);

    info!(
        event = %Event::ConfigLoaded,
        environment = ?config.environment,
        port = config.port,
        "configuration loaded"
    );
    Ok(config)
}

/// Run the HTTP service until a shutdown signal arrives
pub fn serve(args: &ConfigArgs) -> CliResult<()> {
    let config = boot(args)?;
    let target = config.store_target()?;

    info!(event = %Event::BootStart, version = env!("CARGO_PKG_VERSION"), "starting game data service");

    runtime()?.block_on(async {
        let store = StoreHandle::connect(target, config.store_config());
        let server = HttpServer::new(config.http_config(), store.clone());

        let served = server
            .start()
            .await
            .map_err(|e| CliError::startup_failed(format!("HTTP server failed: {}", e)));

        store.close().await.map_err(CliError::from)?;
        info!(event = %Event::ShutdownComplete, "shutdown complete");
        served
    })
}

/// Remove every stored session, print how many were removed
pub fn clear(args: &ConfigArgs) -> CliResult<()> {
    let config = boot(args)?;
    let target = config.store_target()?;
    let store_config = config.store_config();

    let deleted = runtime()?.block_on(async {
        let store = StoreHandle::connect(target, store_config);
        let result = store.delete_all().await;
        store.close().await.and(result)
    })?;

    info!(event = %Event::CollectionCleared, deleted_count = deleted, "game data cleared");
    write_json(&json!({ "success": true, "deletedCount": deleted }))
}

/// Print the effective configuration
pub fn check_config(args: &ConfigArgs) -> CliResult<()> {
    let config = AppConfig::resolve(args)?;
    write_json(&config)
}
