//! CSV rows as JSON objects, with cells typed the way pandas infers them.

use std::path::{Path, PathBuf};

use serde_json::{Map, Number, Value};
use thiserror::Error;

pub type Row = Map<String, Value>;

const MISSING_MARKERS: [&str; 6] = ["", "NaN", "nan", "NA", "N/A", "null"];

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("{} not found", file_name(.0))]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub async fn load_rows(path: &Path) -> Result<Vec<Row>, RecordsError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(RecordsError::NotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(RecordsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_rows(&bytes)
}

/// Last data row of the file, if it has any.
pub async fn latest_row(path: &Path) -> Result<Option<Row>, RecordsError> {
    Ok(load_rows(path).await?.pop())
}

pub fn parse_rows(bytes: &[u8]) -> Result<Vec<Row>, RecordsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name.to_string(), typed_cell(cell)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Integer, then finite float, then text. Missing markers become `null`.
pub fn typed_cell(raw: &str) -> Value {
    if MISSING_MARKERS.contains(&raw) {
        return Value::Null;
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Some(n) = raw
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
    {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}
