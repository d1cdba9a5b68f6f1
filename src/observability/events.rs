//! Lifecycle events
//!
//! Process-level events logged with a stable `event` field so they can be
//! picked out of the request noise.

use std::fmt;

/// Observable lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration file loaded and validated
    ConfigLoaded,
    /// Database opened for reading
    DatabaseOpened,
    /// Server bound and accepting requests
    ServerStart,
    /// Server loop exited
    ServerStop,
    /// One-shot query finished
    QueryComplete,
}

impl Event {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DatabaseOpened => "DATABASE_OPENED",
            Event::ServerStart => "SERVER_START",
            Event::ServerStop => "SERVER_STOP",
            Event::QueryComplete => "QUERY_COMPLETE",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
