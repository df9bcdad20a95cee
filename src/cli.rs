//! CLI definitions for contexta.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// contexta CLI.
#[derive(Parser)]
#[command(name = "contexta")]
#[command(about = "Context-aware query assistant: retrieval, classification, live data and synthesis")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Serve the HTTP API (default)
    Serve {
        /// Overrides server.host
        #[arg(long)]
        host: Option<String>,

        /// Overrides server.port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Answer one query and print the result
    Query {
        /// The question to ask
        text: String,

        /// Optional session identifier
        #[arg(long)]
        session: Option<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration file and exit
    CheckConfig,
}
