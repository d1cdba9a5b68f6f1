//! # Query Pipeline
//!
//! FilterSet → clause → statement → rows → projection, for one request.

use std::sync::Arc;

use super::errors::QueryResult;
use super::executor::QueryExecutor;
use super::filter::FilterSet;
use super::projector::{ProjectedResult, Projection, Projector};
use super::statement::{compose_filtered, Literals, Statement};
use super::template::QueryTemplate;

/// Stateless pipeline over a shared executor
#[derive(Clone)]
pub struct QueryPipeline {
    executor: Arc<dyn QueryExecutor>,
}

impl QueryPipeline {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Compose without executing
    pub fn prepare(
        &self,
        template: &QueryTemplate,
        filters: &FilterSet,
        literals: &Literals,
    ) -> QueryResult<Statement> {
        compose_filtered(template, filters, literals)
    }

    /// Compose, execute and project.
    ///
    /// Composition errors are returned before the executor is touched.
    pub fn run(
        &self,
        template: &QueryTemplate,
        filters: &FilterSet,
        literals: &Literals,
        projection: Projection,
    ) -> QueryResult<ProjectedResult> {
        let statement = self.prepare(template, filters, literals)?;
        let rows = self.executor.execute(&statement)?;
        Ok(Projector::for_template(template).project(rows, projection))
    }
}
