//! Validated dataset plus the measure under analysis.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{QuarryError, Result};
use crate::input::DataTable;
use crate::schema::{Column, ColumnType, Measure};

/// A table paired with one measure, cleaned for mining.
///
/// Construction drops rows whose measure is null or not finite, and non-measure columns
/// holding a single value. The model is immutable afterwards and is shared
/// between sibling groups behind an `Arc`.
#[derive(Debug, Clone, Serialize)]
pub struct DataModel {
    id: Uuid,
    measure: Measure,
    columns: Vec<Column>,
    #[serde(skip)]
    table: DataTable,
    #[serde(skip)]
    measure_index: usize,
}

impl DataModel {
    /// Build a model using every remaining non-measure column.
    pub fn new(table: DataTable, measure: Measure) -> Result<Self> {
        Self::with_columns(table, measure, None)
    }

    /// Build a model restricted to the named columns.
    ///
    /// Names that do not survive cleaning are ignored; if none survive, all
    /// columns are used.
    pub fn with_columns(
        mut table: DataTable,
        measure: Measure,
        columns: Option<&[String]>,
    ) -> Result<Self> {
        let measure_index = table.require_column(&measure.column)?;

        // NaN and infinite cells count as missing, like empty ones.
        table.retain_rows(|row| match row[measure_index].as_f64() {
            Some(y) => y.is_finite(),
            None => !row[measure_index].is_null(),
        });
        if table.row_count() == 0 {
            return Err(QuarryError::EmptyData(format!(
                "no rows with a value for measure column '{}'",
                measure.column
            )));
        }

        let measure_type = table.types[measure_index];
        if !measure_type.is_numeric() {
            return Err(QuarryError::InvalidMeasure {
                column: measure.column.clone(),
                reason: format!("expected a numeric column, found {:?}", measure_type),
            });
        }

        let constant: Vec<usize> = (0..table.column_count())
            .filter(|&i| i != measure_index && table.distinct_values(i).len() <= 1)
            .collect();
        if !constant.is_empty() {
            tracing::debug!(
                dropped = ?constant.iter().map(|&i| table.headers[i].as_str()).collect::<Vec<_>>(),
                "dropping constant columns"
            );
            table.drop_columns(&constant);
        }
        let measure_index = table.require_column(&measure.column)?;

        let selected: Vec<&str> = match columns {
            Some(names) => {
                let existing: Vec<&str> = names
                    .iter()
                    .map(|n| n.as_str())
                    .filter(|n| table.column_index(n).is_some())
                    .collect();
                if existing.is_empty() {
                    table.headers.iter().map(|h| h.as_str()).collect()
                } else {
                    existing
                }
            }
            None => table.headers.iter().map(|h| h.as_str()).collect(),
        };

        let columns = selected
            .into_iter()
            .filter(|name| *name != measure.column)
            .filter_map(|name| {
                table
                    .column_type(name)
                    .map(|ty| Column::from_type(name, ty))
            })
            .collect();

        Ok(Self {
            id: Uuid::new_v4(),
            measure,
            columns,
            table,
            measure_index,
        })
    }

    /// Opaque identity of this model.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn measure(&self) -> &Measure {
        &self.measure
    }

    /// Analyzable dimensions.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up an analyzable dimension by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The cleaned table.
    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.table.column_type(name)
    }

    pub fn measure_index(&self) -> usize {
        self.measure_index
    }

    /// Whether the measure column holds whole numbers.
    pub fn measure_is_integer(&self) -> bool {
        self.table.types[self.measure_index] == ColumnType::Integer
    }

    /// Measure values of every row.
    pub fn measure_values(&self) -> Vec<f64> {
        self.table.numeric_values(self.measure_index)
    }

    pub fn len(&self) -> usize {
        self.table.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.table.row_count() == 0
    }
}

impl PartialEq for DataModel {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.measure.to_string() == other.measure.to_string()
            && self.columns == other.columns
    }
}

impl fmt::Display for DataModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self.columns.iter().map(|c| c.to_string()).collect();
        write!(
            f,
            "DataModel(id={}, measure={}, columns=[{}])",
            self.id,
            self.measure,
            columns.join(", ")
        )
    }
}
