//! # Query Pipeline Module
//!
//! Parameterized query construction and tabular result projection shared by
//! the Chinook endpoints.

pub mod errors;
pub mod executor;
pub mod filter;
pub mod pipeline;
pub mod projector;
pub mod row;
pub mod statement;
pub mod template;
pub mod value;

pub use errors::{QueryError, QueryResult};
pub use executor::{QueryExecutor, SqliteExecutor};
pub use filter::{build_clause, Clause, FilterSet};
pub use pipeline::QueryPipeline;
pub use projector::{CellEscape, DisplayFormat, ProjectedResult, Projection, Projector};
pub use row::{Cell, Row, RowSet};
pub use statement::{compose, compose_filtered, Literals, Statement};
pub use template::QueryTemplate;
pub use value::SqlValue;
