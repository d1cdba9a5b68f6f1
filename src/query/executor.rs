//! # Query Executor
//!
//! Runs one composed [`Statement`] against the store and collects its rows.
//! Each call acquires a connection, executes a single read-only statement and
//! releases the connection on every exit path.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rusqlite::{params_from_iter, Connection, OpenFlags};

use super::errors::{QueryError, QueryResult};
use super::row::RowSet;
use super::statement::Statement;
use super::value::SqlValue;

/// Default time SQLite waits on a locked database before failing
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Executes statements against a relational store
pub trait QueryExecutor: Send + Sync {
    /// Run `statement` and return its rows in engine order
    fn execute(&self, statement: &Statement) -> QueryResult<RowSet>;
}

enum ConnectionSource {
    /// A fresh read-only connection per call
    Path {
        path: PathBuf,
        busy_timeout: Duration,
    },
    /// One connection shared behind a lock
    Shared(Mutex<Connection>),
}

/// SQLite-backed executor
pub struct SqliteExecutor {
    source: ConnectionSource,
}

impl SqliteExecutor {
    /// Executor opening `path` read-only for every statement.
    ///
    /// The file is opened once up front so a bad path fails at startup rather
    /// than on the first request.
    pub fn open(path: impl Into<PathBuf>) -> QueryResult<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    pub fn open_with_timeout(path: impl Into<PathBuf>, busy_timeout: Duration) -> QueryResult<Self> {
        let path = path.into();
        open_read_only(&path, busy_timeout)?;
        Ok(Self {
            source: ConnectionSource::Path { path, busy_timeout },
        })
    }

    /// Executor sharing an already open connection
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            source: ConnectionSource::Shared(Mutex::new(conn)),
        }
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, statement: &Statement) -> QueryResult<RowSet> {
        tracing::debug!(
            template = statement.template,
            sql = %statement.sql,
            params = statement.params.len(),
            "executing statement"
        );
        let started = Instant::now();

        let result = match &self.source {
            ConnectionSource::Path { path, busy_timeout } => {
                let conn = open_read_only(path, *busy_timeout)?;
                run(&conn, statement)
            }
            ConnectionSource::Shared(conn) => {
                let conn = conn
                    .lock()
                    .map_err(|_| QueryError::Connection("Connection lock poisoned".to_string()))?;
                run(&conn, statement)
            }
        };

        match &result {
            Ok(rows) => tracing::debug!(
                template = statement.template,
                rows = rows.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "statement complete"
            ),
            Err(e) => tracing::error!(
                template = statement.template,
                error = %e,
                "statement failed"
            ),
        }

        result
    }
}

fn open_read_only(path: &Path, busy_timeout: Duration) -> QueryResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)
        .map_err(|e| QueryError::Connection(format!("{}: {}", path.display(), e)))?;
    conn.busy_timeout(busy_timeout)?;
    Ok(conn)
}

fn run(conn: &Connection, statement: &Statement) -> QueryResult<RowSet> {
    let mut stmt = conn.prepare(&statement.sql)?;
    if !stmt.readonly() {
        return Err(QueryError::NotReadOnly);
    }

    let column_count = stmt.column_count();
    let mut set = RowSet::new(stmt.column_names());

    let mut rows = stmt.query(params_from_iter(statement.params.iter()))?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(SqlValue::from(row.get_ref(i)?));
        }
        set.push_values(values);
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn executor() -> SqliteExecutor {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE genres (GenreId INTEGER PRIMARY KEY, Name TEXT);
             INSERT INTO genres VALUES (1, 'Rock'), (2, 'Jazz'), (3, NULL);",
        )
        .unwrap();
        SqliteExecutor::with_connection(conn)
    }

    fn statement(sql: &str, params: Vec<SqlValue>) -> Statement {
        Statement {
            template: "test",
            sql: sql.to_string(),
            params,
        }
    }

    #[test]
    fn test_rows_come_back_in_engine_order() {
        let rows = executor()
            .execute(&statement(
                "SELECT GenreId, Name FROM genres ORDER BY GenreId",
                vec![],
            ))
            .unwrap();

        assert_eq!(rows.columns().len(), 2);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.rows()[0].get("Name"), Some(&SqlValue::from("Rock")));
        assert_eq!(rows.rows()[2].get("Name"), Some(&SqlValue::Null));
    }

    #[test]
    fn test_params_are_bound() {
        let rows = executor()
            .execute(&statement(
                "SELECT GenreId FROM genres WHERE Name = ?",
                vec![SqlValue::from("Jazz")],
            ))
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows.rows()[0].get("GenreId"), Some(&SqlValue::Integer(2)));
    }

    #[test]
    fn test_mutating_statement_rejected() {
        let exec = executor();
        let err = exec
            .execute(&statement("DELETE FROM genres", vec![]))
            .unwrap_err();
        assert!(matches!(err, QueryError::NotReadOnly));

        let rows = exec
            .execute(&statement("SELECT COUNT(*) AS n FROM genres", vec![]))
            .unwrap();
        assert_eq!(rows.rows()[0].get("n"), Some(&SqlValue::Integer(3)));
    }

    #[test]
    fn test_malformed_sql_surfaces_error() {
        let err = executor()
            .execute(&statement("SELEKT * FROM genres", vec![]))
            .unwrap_err();
        assert!(matches!(err, QueryError::Sqlite(_)));
        assert!(!err.is_parameter_error());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        let result = SqliteExecutor::open(tmp.path().join("missing.db"));
        assert!(matches!(result, Err(QueryError::Connection(_))));
    }

    #[test]
    fn test_open_by_path_reads_rows() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chinook.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE artists (ArtistId INTEGER PRIMARY KEY, Name TEXT);
                 INSERT INTO artists VALUES (1, 'AC/DC');",
            )
            .unwrap();
        }

        let exec = SqliteExecutor::open(&path).unwrap();
        let rows = exec
            .execute(&statement("SELECT Name FROM artists", vec![]))
            .unwrap();
        assert_eq!(rows.rows()[0].get("Name"), Some(&SqlValue::from("AC/DC")));
    }
}
