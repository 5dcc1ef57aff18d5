//! # Table
//!
//! Column-oriented in-memory table shared by every pipeline stage.
//!
//! External decoders (CSV/XML/etc.) materialize their bytes into this type
//! before the pipeline runs; the core never parses raw file bytes. The
//! table is deliberately non-destructive: renames only relabel headers,
//! filters return new tables, and no operation ever drops rows or columns
//! from the source.
//!
//! Numeric coercion treats `0.0` as a legitimate value everywhere. Only a
//! null cell, a blank text cell, or text that does not parse as a number
//! coerces to "absent".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Explicitly absent value (empty CSV field, missing XML attribute).
    Null,
    /// Numeric value as decoded by the producer.
    Number(f64),
    /// Raw text value; may still coerce to a number on demand.
    Text(String),
}

impl Cell {
    /// Coerce to a numeric value. Text is trimmed and parsed; failures
    /// yield `None`, never a substitute value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Null => None,
        }
    }

    /// Whether the cell carries no value at all (null or blank text).
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// String form used for equality matching (entity filtering).
    ///
    /// Integral numbers render without a trailing `.0` so that a numeric
    /// `player_id` column still matches the caller's `"7"`.
    pub fn as_key_string(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Number(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    Some(format!("{}", *v as i64))
                } else {
                    Some(v.to_string())
                }
            }
            Cell::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
        }
    }
}

/// Column-oriented table: ordered headers plus rows of cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given headers.
    pub fn new(columns: Vec<String>) -> Result<Self, TableError> {
        let mut seen = BTreeMap::new();
        for c in &columns {
            if seen.insert(c.clone(), ()).is_some() {
                return Err(TableError::DuplicateColumn { name: c.clone() });
            }
        }
        Ok(Self { columns, rows: Vec::new() })
    }

    /// Append a row. Width must match the header count exactly.
    pub fn push_row(&mut self, cells: Vec<Cell>) -> Result<(), TableError> {
        if cells.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of an exactly-named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, in row order.
    pub fn column_cells(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Numeric view of one column: one entry per row, `None` where the
    /// cell is absent or does not coerce.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_f64()).collect())
    }

    /// Fraction of rows whose cell in `name` is missing. `None` when the
    /// column does not exist or the table has no rows.
    pub fn null_fraction(&self, name: &str) -> Option<f64> {
        let idx = self.column_index(name)?;
        if self.rows.is_empty() {
            return None;
        }
        let nulls = self.rows.iter().filter(|r| r[idx].is_missing()).count();
        Some(nulls as f64 / self.rows.len() as f64)
    }

    /// Relabel headers according to `renames` (source name -> new name).
    ///
    /// Only the header changes; cells, row order, and unmatched columns
    /// are untouched. A rename whose target already exists as a column is
    /// skipped (never destructive).
    pub fn rename_columns(&mut self, renames: &BTreeMap<String, String>) {
        for (source, target) in renames {
            if self.columns.iter().any(|c| c == target) {
                continue;
            }
            if let Some(idx) = self.column_index(source) {
                self.columns[idx] = target.clone();
            }
        }
    }

    /// New table containing the rows whose `column` cell matches `value`
    /// by key-string equality. The source table is untouched.
    pub fn filter_eq(&self, column: &str, value: &str) -> Option<Table> {
        let idx = self.column_index(column)?;
        let wanted = value.trim();
        let rows = self
            .rows
            .iter()
            .filter(|r| r[idx].as_key_string().as_deref() == Some(wanted))
            .cloned()
            .collect();
        Some(Table { columns: self.columns.clone(), rows })
    }
}
