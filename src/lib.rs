//! chinook-api - HTTP query endpoints over the Chinook music-store database
//!
//! Request parameters become equality filters and literal values, which are
//! composed into a fixed per-endpoint SQL template with bound parameters,
//! executed read-only against SQLite and projected back as text or JSON.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod query;
