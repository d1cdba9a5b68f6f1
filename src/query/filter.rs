//! # Filter Sets and the Clause Builder
//!
//! A [`FilterSet`] holds the equality filters supplied for one request.
//! [`build_clause`] turns it into a conjunctive `WHERE` fragment whose values
//! travel separately as bound parameters.

use super::errors::{QueryError, QueryResult};
use super::value::SqlValue;

/// Equality filters for a single request, bound to the keys an endpoint
/// declares.
///
/// Keys are stored as the schema's own `&'static str`, so a clause built from
/// a `FilterSet` can only name declared columns.
#[derive(Debug, Clone)]
pub struct FilterSet {
    schema: &'static [&'static str],
    entries: Vec<(&'static str, SqlValue)>,
}

impl FilterSet {
    /// Create an empty filter set accepting only `schema` keys
    pub fn new(schema: &'static [&'static str]) -> Self {
        Self {
            schema,
            entries: Vec::new(),
        }
    }

    /// Record a filter if a value was supplied.
    ///
    /// `None` leaves the set untouched. Re-inserting a key replaces its value
    /// in place.
    pub fn insert<V: Into<SqlValue>>(&mut self, key: &str, value: Option<V>) -> QueryResult<()> {
        let declared = self
            .schema
            .iter()
            .copied()
            .find(|k| *k == key)
            .ok_or_else(|| QueryError::UndeclaredFilter(key.to_string()))?;

        let Some(value) = value else {
            return Ok(());
        };
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == declared) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((declared, value)),
        }
        Ok(())
    }

    /// Builder form of [`FilterSet::insert`]
    pub fn and<V: Into<SqlValue>>(mut self, key: &str, value: Option<V>) -> QueryResult<Self> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&SqlValue> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SqlValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

/// A `WHERE` fragment and the values for its markers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clause {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Clause {
    /// The fragment for "no filters"
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Build the conjunctive equality clause for `filters`.
///
/// Produces `WHERE k1 = ? AND ... AND kn = ?` in insertion order, or the
/// empty clause when no filters were supplied.
pub fn build_clause(filters: &FilterSet) -> Clause {
    if filters.is_empty() {
        return Clause::empty();
    }

    let terms: Vec<String> = filters.iter().map(|(key, _)| format!("{} = ?", key)).collect();

    Clause {
        sql: format!("WHERE {}", terms.join(" AND ")),
        params: filters.iter().map(|(_, value)| value.clone()).collect(),
    }
}
