//! `evaluation.csv` reader and writer.

use std::path::Path;

use tracing::warn;

use super::ReportRow;
use crate::errors::{EvalError, Result};

fn csv_error(path: &Path, e: csv::Error) -> EvalError {
    let source = match e.into_kind() {
        csv::ErrorKind::Io(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{:?}", other)),
    };
    EvalError::io(path, source)
}

pub fn write_rows(path: &Path, rows: &[ReportRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    if rows.is_empty() {
        writer
            .write_record([
                "case",
                "aspect",
                "human_score",
                "input_score",
                "reasoning",
                "item",
                "sub_index",
                "outcome",
            ])
            .map_err(|e| csv_error(path, e))?;
    }
    for row in rows {
        writer.serialize(row).map_err(|e| csv_error(path, e))?;
    }
    writer.flush().map_err(|e| EvalError::io(path, e))?;
    Ok(())
}

/// Reads every well-formed row; malformed records are skipped with a warning.
pub fn read_rows(path: &Path) -> Result<Vec<ReportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<ReportRow>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => warn!(path = %path.display(), record = i + 1, "skipping report row: {}", e),
        }
    }
    Ok(rows)
}
