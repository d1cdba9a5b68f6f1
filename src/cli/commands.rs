//! CLI command implementations
//!
//! `serve` boots the HTTP server. `query` runs a single catalog template
//! through the query pipeline and prints the projection, which is handy for
//! checking a database file without going through HTTP.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::http_server::{HttpServer, HttpServerConfig, UpstreamClient, UpstreamConfig};
use crate::observability::{log_event, log_event_with_fields, Event, LogConfig, LogFormat};
use crate::query::template::CATALOG;
use crate::query::{
    DisplayFormat, Literals, ProjectedResult, Projection, QueryPipeline, QueryTemplate, SqlValue,
    SqliteExecutor,
};

use super::args::{Command, QueryFormat};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response, write_text};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the Chinook SQLite file (required)
    pub database_path: String,

    /// SQLite busy timeout in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// HTTP server settings
    #[serde(default)]
    pub server: HttpServerConfig,

    /// External services used by the lookup routes
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Log level filter (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (default compact)
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    /// Parse and validate configuration JSON
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.database_path.trim().is_empty() {
            return Err(CliError::config_error("database_path must not be empty"));
        }

        if self.upstream.timeout_secs == 0 {
            return Err(CliError::config_error("upstream.timeout_secs must be > 0"));
        }

        if self.log_level.trim().is_empty() {
            return Err(CliError::config_error("log_level must not be empty"));
        }

        Ok(())
    }

    /// Get database path as Path
    pub fn database_path(&self) -> &Path {
        Path::new(&self.database_path)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::new(self.log_level.clone(), self.log_format)
    }

    fn open_executor(&self) -> CliResult<SqliteExecutor> {
        let executor = SqliteExecutor::open_with_timeout(self.database_path(), self.busy_timeout())
            .map_err(|e| CliError::boot_failed(format!("Failed to open database: {}", e)))?;
        log_event_with_fields(Event::DatabaseOpened, &[("path", self.database_path.as_str())]);
        Ok(executor)
    }
}

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
        Command::Serve { config, port } => serve(&config, port),
        Command::Query {
            config,
            template,
            filters,
            literals,
            format,
        } => query(&config, &template, &filters, &literals, format),
        Command::Templates => templates(),
    }
}

fn load_and_init_logging(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    config
        .log_config()
        .init()
        .map_err(|e| CliError::config_error(e.to_string()))?;
    let shown = config_path.display().to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("config", shown.as_str())]);
    Ok(config)
}

/// Start the HTTP server
///
/// 1. Load configuration and install logging
/// 2. Open the database read-only
/// 3. Build the upstream client
/// 4. Serve until the listener fails
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = load_and_init_logging(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let executor = Arc::new(config.open_executor()?);
    let upstream = UpstreamClient::new(config.upstream.clone())
        .map_err(|e| CliError::boot_failed(format!("Failed to build HTTP client: {}", e)))?;

    let server = HttpServer::new(config.server.clone(), executor, upstream);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    log_event(Event::ServerStart);
    let result = rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    });
    log_event(Event::ServerStop);

    result
}

/// Run one catalog template and print its projection
pub fn query(
    config_path: &Path,
    template_name: &str,
    filters: &[(String, String)],
    literals: &[(String, String)],
    format: QueryFormat,
) -> CliResult<()> {
    let template = QueryTemplate::by_name(template_name).ok_or_else(|| {
        CliError::invalid_argument(format!(
            "Unknown template '{}'. Run 'chinook-api templates' for the list.",
            template_name
        ))
    })?;

    let config = load_and_init_logging(config_path)?;
    let pipeline = QueryPipeline::new(Arc::new(config.open_executor()?));

    let result = run_template(&pipeline, template, filters, literals, format)?;
    log_event_with_fields(Event::QueryComplete, &[("template", template.name)]);

    match result {
        ProjectedResult::NoData => write_error("CHINOOK_NO_DATA", "No matching data"),
        ProjectedResult::Display(text) => write_text(&text),
        ProjectedResult::Records(rows) => write_response(&rows),
    }
}

/// Build the filter set and literals from raw `key=value` pairs and run
pub fn run_template(
    pipeline: &QueryPipeline,
    template: &QueryTemplate,
    filters: &[(String, String)],
    literals: &[(String, String)],
    format: QueryFormat,
) -> CliResult<ProjectedResult> {
    let mut filter_set = template.filter_set();
    for (key, value) in filters {
        filter_set.insert(key, Some(parse_scalar(value)))?;
    }

    let mut literal_values = Literals::new();
    for (name, value) in literals {
        literal_values.set(name.clone(), parse_scalar(value));
    }

    let projection = match format {
        QueryFormat::Json => Projection::Structured,
        QueryFormat::Text => Projection::Display(DisplayFormat::PLAIN),
    };

    Ok(pipeline.run(template, &filter_set, &literal_values, projection)?)
}

/// Integers bind as integers, everything else as text
pub fn parse_scalar(raw: &str) -> SqlValue {
    match raw.parse::<i64>() {
        Ok(i) => SqlValue::Integer(i),
        Err(_) => SqlValue::Text(raw.to_string()),
    }
}

/// List catalog templates
pub fn templates() -> CliResult<()> {
    let listing: Vec<_> = CATALOG
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "filters": t.filters,
                "literals": t.literals,
                "aggregates": t.aggregates,
            })
        })
        .collect();
    write_response(&listing)
}
