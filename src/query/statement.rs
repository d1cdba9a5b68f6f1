//! # Statement Composer
//!
//! Merges a [`QueryTemplate`] with a clause fragment and literal parameters.
//! Every value ends up in [`Statement::params`]; the SQL text only ever
//! contains template text, declared column names and `?` markers.

use std::fmt;

use super::errors::{QueryError, QueryResult};
use super::filter::{build_clause, Clause, FilterSet};
use super::template::{QueryTemplate, FILTER_SLOT};
use super::value::SqlValue;

/// Literal values for a template's named slots
#[derive(Debug, Clone, Default)]
pub struct Literals {
    entries: Vec<(String, SqlValue)>,
}

impl Literals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a literal
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A composed statement ready for the executor
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Name of the originating template
    pub template: &'static str,

    /// SQL text with positional `?` markers
    pub sql: String,

    /// Values for the markers, in text order
    pub params: Vec<SqlValue>,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}

/// Compose a statement from a template, a clause and literal values.
///
/// Fails with [`QueryError::MissingParameter`] before any text is produced if
/// a declared literal slot has no value.
pub fn compose(
    template: &QueryTemplate,
    clause: &Clause,
    literals: &Literals,
) -> QueryResult<Statement> {
    if let Some(missing) = template
        .literals
        .iter()
        .find(|name| literals.get(name).is_none())
    {
        return Err(QueryError::MissingParameter(missing.to_string()));
    }

    if !clause.is_empty() && !template.has_filter_slot() {
        return Err(unknown_slot(template, FILTER_SLOT));
    }

    let mut sql = String::with_capacity(template.sql.len() + clause.sql.len());
    let mut params = Vec::with_capacity(clause.params.len() + template.literals.len());
    let mut rest = template.sql;

    while let Some(open) = rest.find('{') {
        let close = rest[open..]
            .find('}')
            .map(|offset| open + offset)
            .ok_or_else(|| unknown_slot(template, &rest[open..]))?;

        sql.push_str(&rest[..open]);
        let slot = &rest[open + 1..close];

        if slot == FILTER_SLOT {
            sql.push_str(&clause.sql);
            params.extend(clause.params.iter().cloned());
        } else if template.literals.iter().any(|name| *name == slot) {
            let value = literals
                .get(slot)
                .ok_or_else(|| QueryError::MissingParameter(slot.to_string()))?;
            sql.push('?');
            params.push(value.clone());
        } else {
            return Err(unknown_slot(template, slot));
        }

        rest = &rest[close + 1..];
    }
    sql.push_str(rest);

    Ok(Statement {
        template: template.name,
        sql: sql.split_whitespace().collect::<Vec<_>>().join(" "),
        params,
    })
}

/// Build the clause for `filters` and compose it into `template`
pub fn compose_filtered(
    template: &QueryTemplate,
    filters: &FilterSet,
    literals: &Literals,
) -> QueryResult<Statement> {
    compose(template, &build_clause(filters), literals)
}

fn unknown_slot(template: &QueryTemplate, slot: &str) -> QueryError {
    QueryError::UnknownSlot {
        template: template.name.to_string(),
        slot: slot.to_string(),
    }
}
