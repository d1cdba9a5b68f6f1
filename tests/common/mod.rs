//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use chinook_api::query::{QueryPipeline, SqliteExecutor};
use rusqlite::Connection;

pub const CHINOOK_MINI: &str = include_str!("../fixtures/chinook_mini.sql");

/// In-memory database loaded with the mini Chinook fixture
pub fn fixture_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(CHINOOK_MINI).unwrap();
    conn
}

pub fn fixture_executor() -> Arc<SqliteExecutor> {
    Arc::new(SqliteExecutor::with_connection(fixture_connection()))
}

pub fn fixture_pipeline() -> QueryPipeline {
    QueryPipeline::new(fixture_executor())
}

/// Write the fixture to `path` as a SQLite file
pub fn write_fixture_file(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(CHINOOK_MINI).unwrap();
}
