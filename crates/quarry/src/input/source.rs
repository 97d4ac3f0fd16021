//! Data source abstraction and metadata.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::Value;
use crate::error::{QuarryError, Result};
use crate::inference::{parse_series_date, TypeInference};
use crate::schema::ColumnType;

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, json, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was read.
    pub analyzed_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            analyzed_at: Utc::now(),
        }
    }
}

/// Row-oriented table of typed cells.
///
/// Every row has exactly `headers.len()` cells and `types[i]` describes
/// column `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Column types, parallel to `headers`.
    pub types: Vec<ColumnType>,
    /// Row data (row-major order).
    pub rows: Vec<Vec<Value>>,
}

impl DataTable {
    /// Create a table from typed parts. Short rows are padded with nulls.
    pub fn new(headers: Vec<String>, types: Vec<ColumnType>, rows: Vec<Vec<Value>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        let mut types = types;
        types.resize(width, ColumnType::Unknown);

        Self {
            headers,
            types,
            rows,
        }
    }

    /// Build a typed table from raw text cells, inferring each column's type.
    pub fn from_raw(headers: Vec<String>, raw_rows: Vec<Vec<String>>) -> Self {
        let inference = TypeInference::new();

        let types: Vec<ColumnType> = (0..headers.len())
            .map(|col| {
                let values: Vec<&str> = raw_rows
                    .iter()
                    .filter_map(|row| row.get(col).map(|s| s.as_str()))
                    .filter(|v| !Self::is_null_value(v))
                    .collect();
                inference.infer_type(&values)
            })
            .collect();

        let rows = raw_rows
            .iter()
            .map(|row| {
                types
                    .iter()
                    .enumerate()
                    .map(|(col, ty)| match row.get(col) {
                        Some(raw) if !Self::is_null_value(raw) => inference.convert(raw, *ty),
                        _ => Value::Null,
                    })
                    .collect()
            })
            .collect();

        Self::new(headers, types, rows)
    }

    /// Build a table from JSON records, keeping keys in first-appearance order.
    pub fn from_records(records: &[serde_json::Map<String, serde_json::Value>]) -> Result<Self> {
        if records.is_empty() {
            return Err(QuarryError::EmptyData("No records found".to_string()));
        }

        let mut headers: IndexSet<String> = IndexSet::new();
        for record in records {
            headers.extend(record.keys().cloned());
        }
        let headers: Vec<String> = headers.into_iter().collect();

        let raw: Vec<Vec<Value>> = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(h).map(Value::from).unwrap_or_default())
                    .collect()
            })
            .collect();

        let inference = TypeInference::new();
        let types: Vec<ColumnType> = (0..headers.len())
            .map(|col| {
                let values: Vec<&Value> = raw.iter().map(|row| &row[col]).collect();
                inference.infer_value_type(&values)
            })
            .collect();

        let rows = raw
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&types)
                    .map(|(value, ty)| inference.coerce(value, *ty))
                    .collect()
            })
            .collect();

        Ok(Self::new(headers, types, rows))
    }

    /// Parse a JSON array of objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(json)?;
        Self::from_records(&records)
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`column_index`](Self::column_index), failing on unknown names.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| QuarryError::UnknownColumn(name.to_string()))
    }

    /// Type of a column by name.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|i| self.types[i])
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Numeric view of a column; non-numeric cells are skipped.
    pub fn numeric_values(&self, index: usize) -> Vec<f64> {
        self.column_values(index).filter_map(Value::as_f64).collect()
    }

    /// Distinct values of a column in first-appearance order.
    pub fn distinct_values(&self, index: usize) -> Vec<Value> {
        let set: IndexSet<&Value> = self.column_values(index).collect();
        set.into_iter().cloned().collect()
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Keep only rows for which `keep` returns true.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&[Value]) -> bool) {
        self.rows.retain(|row| keep(row));
    }

    /// Remove columns by index.
    pub fn drop_columns(&mut self, indices: &[usize]) {
        let keep: Vec<bool> = (0..self.column_count())
            .map(|i| !indices.contains(&i))
            .collect();
        let retain = |i: &mut usize| {
            let k = keep[*i];
            *i += 1;
            k
        };

        let mut i = 0;
        self.headers.retain(|_| retain(&mut i));
        let mut i = 0;
        self.types.retain(|_| retain(&mut i));
        for row in &mut self.rows {
            let mut i = 0;
            row.retain(|_| retain(&mut i));
        }
    }

    /// Append a column. The value vector must have one entry per row.
    pub fn push_column(&mut self, name: impl Into<String>, column_type: ColumnType, values: Vec<Value>) {
        self.headers.push(name.into());
        self.types.push(column_type);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Reinterpret a column as a date series.
    ///
    /// Period labels such as `2014`, `201403` or `2014-03-09` become dates;
    /// labels that do not parse become null.
    pub fn force_series(&mut self, name: &str) -> Result<()> {
        let index = self.require_column(name)?;
        if self.types[index].is_temporal() {
            return Ok(());
        }

        for row in &mut self.rows {
            let cell = &row[index];
            let label = match cell {
                Value::Null => continue,
                Value::Text(s) => s.clone(),
                other => other.to_string(),
            };
            row[index] = parse_series_date(&label).map(Value::Date).unwrap_or_default();
        }
        self.types[index] = ColumnType::Date;
        Ok(())
    }

    /// Rows as JSON objects keyed by header.
    pub fn to_records(&self) -> Vec<IndexMap<&str, &Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .map(|h| h.as_str())
                    .zip(row.iter())
                    .collect()
            })
            .collect()
    }

    /// Write the table as delimited text with a header row.
    pub fn write_csv<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        out.write_record(&self.headers)?;
        for row in &self.rows {
            out.write_record(row.iter().map(|v| match v {
                Value::Null => String::new(),
                other => other.to_string(),
            }))?;
        }
        out.flush().map_err(|e| QuarryError::Io {
            path: PathBuf::from("<output>"),
            source: e,
        })?;
        Ok(())
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }
}
