#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use sx_columnar::{Column, ColumnError, ResultsTable};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("csv input has no headers")]
    MissingHeaders,
    #[error("non-numeric value {value:?} in column {column:?} at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Column(#[from] ColumnError),
}

/// Read a results table from CSV text with a header row.
///
/// Blank cells are absent measurements and are skipped, so columns may end
/// up with different lengths. Rows are numbered from 1, excluding the header.
pub fn read_csv_str(input: &str) -> Result<ResultsTable, IoError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());

    let headers = reader.headers().cloned().map_err(IoError::from)?;

    if headers.is_empty() {
        return Err(IoError::MissingHeaders);
    }

    let mut columns = headers
        .iter()
        .map(|name| (name.trim().to_owned(), Vec::<f64>::new()))
        .collect::<Vec<_>>();

    let mut row_count = 0_usize;
    for row in reader.records() {
        let record = row?;
        row_count += 1;
        for (idx, (name, values)) in columns.iter_mut().enumerate() {
            let field = record.get(idx).unwrap_or_default().trim();
            if field.is_empty() {
                continue;
            }
            let value = field.parse::<f64>().map_err(|_| IoError::NonNumeric {
                column: name.clone(),
                row: row_count,
                value: field.to_owned(),
            })?;
            values.push(value);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "sx_io",
        columns = columns.len(),
        rows = row_count,
        "read results table from csv"
    );

    let mut table = ResultsTable::new();
    for (name, values) in columns {
        table.insert_column(Column::new(name, values))?;
    }
    Ok(table)
}

pub fn read_csv_path(path: &Path) -> Result<ResultsTable, IoError> {
    let input = fs::read_to_string(path)?;
    read_csv_str(&input)
}
