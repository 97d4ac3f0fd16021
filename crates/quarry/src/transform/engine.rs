//! Transformation engine that derives new measures from grouped data.

use std::collections::BTreeMap;

use crate::error::{QuarryError, Result};
use crate::input::{DataTable, Value};
use crate::schema::{ColumnType, Measure, MeasureType};

use super::operations::{TransformKind, TransformResult};

/// Engine for grouping a measure and appending a derived column.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformEngine;

impl TransformEngine {
    /// Create a new transform engine.
    pub fn new() -> Self {
        Self
    }

    /// Group `table` by `column` and derive a new measure.
    ///
    /// Quantity measures aggregate with `sum`, ratio measures with `max`.
    /// Groups come out in ascending order of `column`; rows with a null key
    /// or a null measure are ignored.
    pub fn apply(
        &self,
        table: &DataTable,
        column: &str,
        measure: &Measure,
        kind: TransformKind,
    ) -> Result<TransformResult> {
        let key_index = table.require_column(column)?;
        let measure_index = table.require_column(&measure.column)?;
        let measure_type = table.types[measure_index];
        if !measure_type.is_numeric() {
            return Err(QuarryError::Transform(format!(
                "measure column '{}' is not numeric",
                measure.column
            )));
        }

        let mut groups: BTreeMap<Value, Vec<f64>> = BTreeMap::new();
        for row in &table.rows {
            let key = &row[key_index];
            if let (false, Some(y)) = (key.is_null(), row[measure_index].as_f64()) {
                groups.entry(key.clone()).or_default().push(y);
            }
        }
        if groups.is_empty() {
            return Err(QuarryError::EmptyData(format!(
                "no rows to group by '{}'",
                column
            )));
        }

        let agg = measure.measure_type.default_agg();
        let (keys, values): (Vec<Value>, Vec<f64>) = groups
            .into_iter()
            .map(|(key, ys)| (key, agg.apply(&ys)))
            .unzip();

        let (derived_type, derived) = derive(kind, &values);

        let integer = measure_type == ColumnType::Integer && agg.preserves_integers();
        let source_type = if integer { ColumnType::Integer } else { ColumnType::Float };
        let to_source = |y: f64| {
            if integer {
                Value::Int(y as i64)
            } else {
                Value::Float(y)
            }
        };

        // Increase has no value for the first group.
        let skip = usize::from(kind == TransformKind::Increase);
        let rows: Vec<Vec<Value>> = keys
            .into_iter()
            .zip(values)
            .zip(derived)
            .skip(skip)
            .map(|((key, y), d)| vec![key, to_source(y), d])
            .collect();

        let derived_column = kind.derived_column(&measure.column);
        let result_table = DataTable::new(
            vec![
                table.headers[key_index].clone(),
                measure.column.clone(),
                derived_column.clone(),
            ],
            vec![table.types[key_index], source_type, derived_type],
            rows,
        );

        let derived_measure_type = match kind {
            TransformKind::Rate => MeasureType::Ratio,
            _ => measure.measure_type,
        };
        let derived_measure = Measure::new(derived_column.clone(), derived_column, derived_measure_type)
            .with_extend_type(kind.extend_type());

        tracing::debug!(
            transform = %kind,
            column,
            measure = %measure.column,
            groups = result_table.row_count(),
            "applied transform"
        );

        Ok(TransformResult {
            kind,
            table: result_table,
            measure: derived_measure,
            rows_dropped: skip,
        })
    }
}

/// Compute the derived values for grouped measure values.
fn derive(kind: TransformKind, values: &[f64]) -> (ColumnType, Vec<Value>) {
    let float = |v: f64| {
        if v.is_finite() {
            Value::Float(v)
        } else {
            Value::Null
        }
    };

    match kind {
        TransformKind::Rate => {
            let total: f64 = values.iter().sum();
            (
                ColumnType::Float,
                values.iter().map(|v| float(v / total)).collect(),
            )
        }
        TransformKind::Increase => {
            let mut out = vec![Value::Null];
            out.extend(values.windows(2).map(|w| float(w[1] - w[0])));
            out.truncate(values.len());
            (ColumnType::Float, out)
        }
        TransformKind::SubAvg => {
            let avg = values.iter().sum::<f64>() / values.len() as f64;
            (
                ColumnType::Float,
                values.iter().map(|v| float(v - avg)).collect(),
            )
        }
        TransformKind::Rank => {
            let mut distinct: Vec<f64> = values.to_vec();
            distinct.sort_by(|a, b| b.total_cmp(a));
            distinct.dedup();
            let ranks = values
                .iter()
                .map(|v| {
                    let position = distinct.iter().position(|d| d == v).unwrap_or(distinct.len());
                    Value::Int(position as i64 + 1)
                })
                .collect();
            (ColumnType::Integer, ranks)
        }
    }
}
