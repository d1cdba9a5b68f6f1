//! CLI argument definitions using clap
//!
//! Commands:
//! - chinook-api serve --config <path> [--port <port>]
//! - chinook-api query --config <path> <template> [--filter K=V]... [--literal K=V]...
//! - chinook-api templates

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// chinook-api - HTTP query endpoints over the Chinook database
#[derive(Parser, Debug)]
#[command(name = "chinook-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Output format for one-shot queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./chinook.json")]
        config: PathBuf,

        /// Port override
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one catalog template and print the result
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./chinook.json")]
        config: PathBuf,

        /// Template name (see `templates`)
        template: String,

        /// Equality filter, e.g. FirstName=Bob
        #[arg(long = "filter", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,

        /// Literal slot value, e.g. track_id=5
        #[arg(long = "literal", value_parser = parse_key_value)]
        literals: Vec<(String, String)>,

        /// Output format
        #[arg(long, value_enum, default_value_t = QueryFormat::Json)]
        format: QueryFormat,
    },

    /// List catalog templates with their filters and literal slots
    Templates,
}

/// Parse `key=value`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
