//! Tracing setup and command runners.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use contexta_api::{AppState, InterfaceConfig, InterfaceServer};
use contexta_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use contexta_protocols::Query;

use crate::output::render_response;
use crate::wiring::build_orchestrator;

/// Initialize tracing with console and file output.
///
/// Console logs go to stderr so `query` output stays clean on stdout. The
/// file layer rotates daily under `logging.directory`.
pub(crate) fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = PathBuf::from(ConfigLoader::expand_path(&logging.directory));
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("contexta")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The writer stops flushing once its guard is dropped.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = if logging.json {
        fmt::layer()
            .json()
            .with_writer(non_blocking)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Serve the HTTP API until Ctrl-C.
pub(crate) async fn run_server(config: Config) -> anyhow::Result<()> {
    info!("Starting contexta v{}", env!("CARGO_PKG_VERSION"));

    let orchestrator = Arc::new(build_orchestrator(&config).await?);
    let state = Arc::new(AppState::new(orchestrator));
    let server = InterfaceServer::new(
        InterfaceConfig::new(config.server.host.clone(), config.server.port),
        state,
    );

    info!("contexta ready on http://{}", server.addr());
    info!("  POST /query   - answer a query");
    info!("  GET  /health  - health check");

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;
    Ok(())
}

/// Run one query and print the result.
pub(crate) async fn run_single_query(
    config: Config,
    text: String,
    session: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(&config).await?;

    let mut query = Query::new(text);
    if let Some(session) = session {
        query = query.with_session(session);
    }

    let response = orchestrator.run(&query).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_response(&response));
    }
    Ok(())
}

/// Load and validate a config file, reporting every finding.
pub(crate) fn check_config(path: &Path) -> anyhow::Result<()> {
    let config = ConfigLoader::load(path)?;
    let result = ConfigValidator::validate(&config);

    for warning in &result.warnings {
        println!("warning: {warning}");
    }
    for error in &result.errors {
        println!("error: {error}");
    }

    if !result.is_valid() {
        anyhow::bail!("{} configuration error(s) in {}", result.errors.len(), path.display());
    }
    println!("{} is valid", path.display());
    Ok(())
}
