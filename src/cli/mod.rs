//! CLI module
//!
//! Provides command-line interface for:
//! - serve: run the HTTP service
//! - clear: administrative reset of the collection
//! - check-config: print the resolved configuration

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, ConfigArgs, Environment};
pub use commands::{check_config, clear, run, run_command, serve};
pub use config::AppConfig;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_json, write_json_to};
