//! CLI argument definitions using clap
//!
//! Commands:
//! - gamedata serve [options]
//! - gamedata clear [options]
//! - gamedata check-config [options]
//!
//! Every option can also come from the environment variable named in its
//! help text.

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Game session record service
#[derive(Parser, Debug)]
#[command(name = "gamedata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP service
    Serve {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Delete every stored session and exit
    Clear {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Resolve configuration, print it as JSON and exit
    CheckConfig {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Deployment environment
#[derive(ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Configuration overrides, applied over the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Store connection string: file://<dir>, <dir> or memory://
    #[arg(long, env = "STORE_URI")]
    pub store_uri: Option<String>,

    /// Address to bind
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to bind
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Allowed browser origins, comma-separated
    #[arg(long = "frontend-url", env = "FRONTEND_URL", value_delimiter = ',')]
    pub frontend_urls: Option<Vec<String>>,

    /// Deployment environment
    #[arg(long = "env", env = "APP_ENV", value_enum)]
    pub environment: Option<Environment>,

    /// Per-operation store timeout in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS")]
    pub store_timeout_ms: Option<u64>,

    /// Delay between store connection attempts in milliseconds
    #[arg(long, env = "STORE_RECONNECT_MS")]
    pub store_reconnect_ms: Option<u64>,

    /// Log filter directive (RUST_LOG takes precedence)
    #[arg(long, env = "LOG_FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
