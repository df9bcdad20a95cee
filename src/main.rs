//! contexta - context-aware query assistant.
//!
//! Main entry point for the contexta CLI and server.

mod cli;
mod output;
mod server;
mod wiring;

use clap::Parser;

use contexta_config::{ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::CheckConfig) = cli.command {
        return server::check_config(&cli.config);
    }

    let config = ConfigLoader::load_or_default(&cli.config)?;
    server::init_tracing(&config.logging)?;

    let warnings = ConfigValidator::validate(&config).into_result()?;
    for warning in &warnings {
        tracing::warn!(path = %warning.path, "Config: {}", warning.message);
    }

    match cli.command {
        None => server::run_server(config).await,
        Some(Commands::Serve { host, port }) => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::run_server(config).await
        }
        Some(Commands::Query { text, session, json }) => {
            server::run_single_query(config, text, session, json).await
        }
        Some(Commands::CheckConfig) => Ok(()),
    }
}
