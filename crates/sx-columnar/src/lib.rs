#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Read-only access to named numeric columns.
///
/// Expressions only ever look columns up by name, at parse time. The
/// positional accessors exist for callers that enumerate what is available
/// (e.g. to offer column names in an editor).
pub trait ColumnProvider {
    fn column_count(&self) -> usize;

    fn column_name(&self, index: usize) -> Option<&str>;

    fn column_values(&self, name: &str) -> Option<&[f64]>;

    fn column_names(&self) -> Vec<&str> {
        (0..self.column_count())
            .filter_map(|idx| self.column_name(idx))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColumnError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
}

/// Measurement results: an ordered set of uniquely named numeric columns.
///
/// Columns may differ in length; nothing here aligns rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    columns: Vec<Column>,
}

impl ResultsTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn insert_column(&mut self, column: Column) -> Result<(), ColumnError> {
        if self.column(column.name()).is_some() {
            return Err(ColumnError::DuplicateColumn(column.name.clone()));
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, ColumnError> {
        self.insert_column(Column::new(name, values))?;
        Ok(self)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl ColumnProvider for ResultsTable {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(Column::name)
    }

    fn column_values(&self, name: &str) -> Option<&[f64]> {
        self.column(name).map(Column::values)
    }
}
