//! Derived-measure transformations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuarryError;
use crate::input::DataTable;
use crate::schema::{ExtendType, Measure};

/// How a derived measure is computed from a grouped measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Share of the total: `v / Σv`.
    Rate,
    /// Dense rank, largest value first.
    Rank,
    /// Change from the previous group in ascending order.
    Increase,
    /// Difference from the mean of all groups.
    SubAvg,
}

impl TransformKind {
    pub const ALL: [TransformKind; 4] = [
        TransformKind::Rate,
        TransformKind::Rank,
        TransformKind::Increase,
        TransformKind::SubAvg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformKind::Rate => "rate",
            TransformKind::Rank => "rank",
            TransformKind::Increase => "increase",
            TransformKind::SubAvg => "sub_avg",
        }
    }

    /// Name of the derived column for a measure column.
    pub fn derived_column(&self, measure: &str) -> String {
        match self {
            TransformKind::Rate => format!("Rate({})", measure),
            TransformKind::Rank => format!("Rank({})", measure),
            TransformKind::Increase => format!("Increase({})", measure),
            TransformKind::SubAvg => format!("{}-avg", measure),
        }
    }

    /// Tag carried by measures produced by this transform.
    pub fn extend_type(&self) -> ExtendType {
        match self {
            TransformKind::Rate => ExtendType::Rate,
            TransformKind::Rank => ExtendType::Rank,
            TransformKind::Increase => ExtendType::Increase,
            TransformKind::SubAvg => ExtendType::SubAvg,
        }
    }

    /// Get a human-readable description of the operation.
    pub fn description(&self, column: &str, measure: &str) -> String {
        match self {
            TransformKind::Rate => format!("Share of '{}' per '{}'", measure, column),
            TransformKind::Rank => format!("Rank of '{}' per '{}' (largest first)", measure, column),
            TransformKind::Increase => format!("Change in '{}' along '{}'", measure, column),
            TransformKind::SubAvg => format!("'{}' per '{}' minus its mean", measure, column),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "rate" => Ok(TransformKind::Rate),
            "rank" => Ok(TransformKind::Rank),
            "increase" => Ok(TransformKind::Increase),
            "sub_avg" | "subavg" => Ok(TransformKind::SubAvg),
            _ => Err(QuarryError::Transform(format!(
                "unknown transform '{}'; use rate, rank, increase or sub_avg",
                s
            ))),
        }
    }
}

/// Output of a transform: the grouped table and the derived measure.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub kind: TransformKind,
    /// Columns: group column, aggregated measure, derived measure.
    pub table: DataTable,
    /// Measure pointing at the derived column.
    pub measure: Measure,
    /// Groups dropped because no derived value exists for them.
    pub rows_dropped: usize,
}

impl TransformResult {
    pub fn description(&self) -> String {
        let column = self.table.headers.first().map(String::as_str).unwrap_or_default();
        let source = self.table.headers.get(1).map(String::as_str).unwrap_or_default();
        self.kind.description(column, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_column_names() {
        assert_eq!(TransformKind::Rate.derived_column("Sale"), "Rate(Sale)");
        assert_eq!(TransformKind::Rank.derived_column("Sale"), "Rank(Sale)");
        assert_eq!(TransformKind::Increase.derived_column("Sale"), "Increase(Sale)");
        assert_eq!(TransformKind::SubAvg.derived_column("Sale"), "Sale-avg");
    }

    #[test]
    fn test_parse() {
        assert_eq!("sub-avg".parse::<TransformKind>().unwrap(), TransformKind::SubAvg);
        assert_eq!("RANK".parse::<TransformKind>().unwrap(), TransformKind::Rank);
        assert!("median".parse::<TransformKind>().is_err());
        for kind in TransformKind::ALL {
            assert_eq!(kind.as_str().parse::<TransformKind>().unwrap(), kind);
        }
    }
}
