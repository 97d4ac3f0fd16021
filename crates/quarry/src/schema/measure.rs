//! Measure definitions: which column is analyzed and how it aggregates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of quantity a measure represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureType {
    /// Additive counts and amounts (sales, orders).
    Quantity,
    /// Non-additive rates (conversion rate, share).
    Ratio,
}

impl MeasureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureType::Quantity => "quantity",
            MeasureType::Ratio => "ratio",
        }
    }

    /// Aggregation used when none is given.
    pub fn default_agg(&self) -> Aggregation {
        match self {
            MeasureType::Quantity => Aggregation::Sum,
            MeasureType::Ratio => Aggregation::Max,
        }
    }
}

impl FromStr for MeasureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quantity" => Ok(MeasureType::Quantity),
            "ratio" => Ok(MeasureType::Ratio),
            _ => Err(format!("Unknown measure type: {}. Use quantity or ratio.", s)),
        }
    }
}

impl fmt::Display for MeasureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregation applied when several rows share one breakdown value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Count => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }

    /// Aggregate a slice of values. Empty input yields NaN except for sum/count.
    pub fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Count => values.len() as f64,
            Aggregation::Mean => {
                if values.is_empty() {
                    f64::NAN
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            Aggregation::Min => values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN),
            Aggregation::Max => values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN),
        }
    }

    /// Whether aggregating integers keeps an integer result.
    pub fn preserves_integers(&self) -> bool {
        !matches!(self, Aggregation::Mean)
    }
}

impl FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "mean" | "avg" => Ok(Aggregation::Mean),
            "count" => Ok(Aggregation::Count),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            _ => Err(format!(
                "Unknown aggregation: {}. Use sum, mean, count, min, or max.",
                s
            )),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the measure column is already a derived transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendType {
    #[default]
    Original,
    Rank,
    Rate,
    SubAvg,
    Increase,
}

impl ExtendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtendType::Original => "original",
            ExtendType::Rank => "rank",
            ExtendType::Rate => "rate",
            ExtendType::SubAvg => "sub_avg",
            ExtendType::Increase => "increase",
        }
    }
}

/// The numeric column being analyzed, with its aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MeasureSpec")]
pub struct Measure {
    /// Display name used in descriptions.
    pub name: String,
    /// Source column in the table.
    pub column: String,
    #[serde(rename = "type")]
    pub measure_type: MeasureType,
    pub agg: Aggregation,
    pub extend_type: ExtendType,
}

/// Wire form of a measure, where `agg` and `extend_type` may be omitted.
#[derive(Deserialize)]
struct MeasureSpec {
    name: String,
    column: String,
    #[serde(rename = "type")]
    measure_type: MeasureType,
    #[serde(default)]
    agg: Option<Aggregation>,
    #[serde(default)]
    extend_type: ExtendType,
}

impl From<MeasureSpec> for Measure {
    fn from(spec: MeasureSpec) -> Self {
        Measure::new(spec.name, spec.column, spec.measure_type)
            .with_agg(spec.agg)
            .with_extend_type(spec.extend_type)
    }
}

impl Measure {
    /// Create a measure with the default aggregation for its type.
    pub fn new(name: impl Into<String>, column: impl Into<String>, measure_type: MeasureType) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            measure_type,
            agg: measure_type.default_agg(),
            extend_type: ExtendType::Original,
        }
    }

    /// Quantity measure named after its column.
    pub fn quantity(column: impl Into<String>) -> Self {
        let column = column.into();
        Self::new(column.clone(), column, MeasureType::Quantity)
    }

    /// Override the aggregation; `None` keeps the type default.
    pub fn with_agg(mut self, agg: Option<Aggregation>) -> Self {
        if let Some(agg) = agg {
            self.agg = agg;
        }
        self
    }

    pub fn with_extend_type(mut self, extend_type: ExtendType) -> Self {
        self.extend_type = extend_type;
        self
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Measure({}({}))", self.agg, self.column)
    }
}
