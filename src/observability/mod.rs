//! Observability for chinook-api
//!
//! Logging goes through `tracing`. This module owns subscriber setup and the
//! small set of lifecycle events the CLI reports.

mod events;
mod logging;

pub use events::Event;
pub use logging::{LogConfig, LogFormat, LogInitError};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    tracing::info!(event = event.as_str());
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let rendered: Vec<String> = fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    tracing::info!(event = event.as_str(), fields = %rendered.join(" "));
}
