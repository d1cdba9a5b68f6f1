//! # Row Sets
//!
//! Rows are sequences of tagged values: each cell remembers the column it
//! came from, so projection never assumes a fixed arity.

use std::sync::Arc;

use super::value::SqlValue;

/// A value tagged with its source column
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub column: Arc<str>,
    pub value: SqlValue,
}

/// One result row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value of the first cell tagged with `column`
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.cells
            .iter()
            .find(|c| &*c.column == column)
            .map(|c| &c.value)
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.cells.iter().map(|c| &c.value)
    }
}

/// Rows in the order the store produced them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    columns: Vec<Arc<str>>,
    rows: Vec<Row>,
}

impl RowSet {
    /// Empty row set projecting `columns`
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            columns: columns.into_iter().map(|c| Arc::from(c.as_ref())).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a row set from untagged value rows.
    pub fn from_values<I, S>(columns: I, rows: Vec<Vec<SqlValue>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new(columns);
        for values in rows {
            set.push_values(values);
        }
        set
    }

    /// Append a row, tagging values positionally.
    ///
    /// Values beyond the declared columns are tagged `column{index}`.
    pub fn push_values(&mut self, values: Vec<SqlValue>) {
        let cells = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Cell {
                column: self
                    .columns
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| Arc::from(format!("column{}", i))),
                value,
            })
            .collect();
        self.rows.push(Row::new(cells));
    }

    pub fn columns(&self) -> &[Arc<str>] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
