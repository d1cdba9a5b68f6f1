//! # Result Projector
//!
//! Turns a [`RowSet`] into what the HTTP layer sends back: a display string
//! or a list of labeled records. Empty results and the all-null row an
//! ungrouped aggregate returns when nothing matches both become
//! [`ProjectedResult::NoData`].

use std::borrow::Cow;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::row::{Row, RowSet};
use super::template::QueryTemplate;
use super::value::SqlValue;

/// How cell text is made safe for the output medium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellEscape {
    /// `\n` and `\r` written as backslash escapes, so a row stays on one line
    LineBreaks,
    /// HTML-escaped for a `text/html` body
    Html,
}

impl CellEscape {
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            CellEscape::LineBreaks if text.contains(['\n', '\r']) => {
                Cow::Owned(text.replace('\n', "\\n").replace('\r', "\\r"))
            }
            CellEscape::LineBreaks => Cow::Borrowed(text),
            CellEscape::Html => html_escape::encode_text(text),
        }
    }
}

/// Separators and escaping used in display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFormat {
    pub column_separator: &'static str,
    pub row_separator: &'static str,
    pub null_placeholder: &'static str,
    pub escape: CellEscape,
}

impl DisplayFormat {
    /// One line of comma-separated values per row
    pub const PLAIN: DisplayFormat = DisplayFormat {
        column_separator: ", ",
        row_separator: "\n",
        null_placeholder: "",
        escape: CellEscape::LineBreaks,
    };

    /// Same as [`DisplayFormat::PLAIN`] with `<br>` between rows and
    /// HTML-escaped cells
    pub const HTML: DisplayFormat = DisplayFormat {
        column_separator: ", ",
        row_separator: "<br>",
        null_placeholder: "",
        escape: CellEscape::Html,
    };
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self::PLAIN
    }
}

/// How a row set should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Display(DisplayFormat),
    Structured,
}

/// Caller-facing rendering of a row set
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectedResult {
    /// Nothing matched
    NoData,
    /// Display text, one line per row
    Display(String),
    /// Rows labeled by column name
    Records(Vec<Row>),
}

impl ProjectedResult {
    pub fn is_no_data(&self) -> bool {
        matches!(self, ProjectedResult::NoData)
    }
}

/// Rows serialize as JSON objects in column order
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for cell in self.cells() {
            map.serialize_entry(&*cell.column, &cell.value)?;
        }
        map.end()
    }
}

/// Projects row sets for one template
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    aggregates: &'static [&'static str],
}

impl Projector {
    /// Projector that knows which of `template`'s columns are aggregates
    pub fn for_template(template: &QueryTemplate) -> Self {
        Self {
            aggregates: template.aggregates,
        }
    }

    /// Projector for row sets without aggregate columns
    pub fn plain() -> Self {
        Self { aggregates: &[] }
    }

    pub fn project(&self, rows: RowSet, projection: Projection) -> ProjectedResult {
        match projection {
            Projection::Display(format) => self.display(&rows, &format),
            Projection::Structured => self.structured(rows),
        }
    }

    /// One line per row, values in column order
    pub fn display(&self, rows: &RowSet, format: &DisplayFormat) -> ProjectedResult {
        if self.is_empty_result(rows) {
            return ProjectedResult::NoData;
        }

        let lines: Vec<String> = rows
            .rows()
            .iter()
            .map(|row| render_row(row, format))
            .collect();

        ProjectedResult::Display(lines.join(format.row_separator))
    }

    /// Rows as labeled records, preserving row order
    pub fn structured(&self, rows: RowSet) -> ProjectedResult {
        if self.is_empty_result(&rows) {
            return ProjectedResult::NoData;
        }
        ProjectedResult::Records(rows.rows().to_vec())
    }

    /// True for zero rows or a lone sentinel aggregation row
    pub fn is_empty_result(&self, rows: &RowSet) -> bool {
        match rows.rows() {
            [] => true,
            [only] => self.is_sentinel_row(only),
            _ => false,
        }
    }

    /// Every aggregate column is null or zero and every other column is null.
    ///
    /// Only templates that declare aggregate columns can produce a sentinel.
    pub fn is_sentinel_row(&self, row: &Row) -> bool {
        if self.aggregates.is_empty() || row.is_empty() {
            return false;
        }

        row.cells().iter().all(|cell| {
            if self.aggregates.contains(&&*cell.column) {
                cell.value.is_null() || cell.value.is_zero()
            } else {
                cell.value.is_null()
            }
        })
    }
}

fn render_row(row: &Row, format: &DisplayFormat) -> String {
    row.values()
        .map(|value| match value {
            SqlValue::Null => format.null_placeholder.to_string(),
            other => format.escape.apply(&other.to_string()).into_owned(),
        })
        .collect::<Vec<_>>()
        .join(format.column_separator)
}
