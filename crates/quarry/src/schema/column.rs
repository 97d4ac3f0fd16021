//! Analyzable dimensions and equality filters over them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::ColumnType;
use crate::input::Value;

/// One analyzable dimension of a data model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name in the source table.
    pub name: String,
    /// Temporal (ordered) dimension.
    #[serde(default)]
    pub is_series: bool,
    /// Numeric dimension, usable for correlation.
    #[serde(default)]
    pub is_number: bool,
}

impl Column {
    /// Create a column with explicit flags.
    pub fn new(name: impl Into<String>, is_series: bool, is_number: bool) -> Self {
        Self {
            name: name.into(),
            is_series,
            is_number,
        }
    }

    /// Derive the flags from an inferred column type.
    pub fn from_type(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::new(name, column_type.is_temporal(), column_type.is_numeric())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column(name={}, is_series={}, is_number={})",
            self.name, self.is_series, self.is_number
        )
    }
}

/// Comparison used by a [`FilterColumn`]. Only equality is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Condition {
    #[default]
    #[serde(rename = "==")]
    Eq,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Eq => "==",
        }
    }

    /// Evaluate the condition against a cell.
    pub fn matches(&self, cell: &Value, value: &Value) -> bool {
        match self {
            Condition::Eq => cell == value,
        }
    }
}

/// Restricts a sibling group to rows where `column == value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterColumn {
    pub column: Column,
    pub condition: Condition,
    pub value: Value,
}

impl FilterColumn {
    /// Create an equality filter.
    pub fn eq(column: Column, value: Value) -> Self {
        Self {
            column,
            condition: Condition::Eq,
            value,
        }
    }
}

impl fmt::Display for FilterColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.column.name, self.condition.as_str(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_display() {
        let col = Column::new("Year", true, false);
        assert_eq!(
            col.to_string(),
            "Column(name=Year, is_series=true, is_number=false)"
        );
    }

    #[test]
    fn test_column_from_type() {
        let col = Column::from_type("Year", ColumnType::Date);
        assert!(col.is_series);
        assert!(!col.is_number);

        let col = Column::from_type("Price", ColumnType::Float);
        assert!(!col.is_series);
        assert!(col.is_number);
    }

    #[test]
    fn test_filter_display_and_serialize() {
        let filter = FilterColumn::eq(Column::new("Brand", false, false), Value::from("H"));
        assert_eq!(filter.to_string(), "Brand==H");

        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["condition"], "==");
        assert_eq!(json["value"], "H");
        assert_eq!(json["column"]["name"], "Brand");
    }
}
