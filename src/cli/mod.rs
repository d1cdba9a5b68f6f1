//! CLI module for chinook-api
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP server
//! - query: One-shot template execution
//! - templates: List the query catalog

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, QueryFormat};
pub use commands::{query, run, run_command, run_template, serve, templates, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response, write_text};
