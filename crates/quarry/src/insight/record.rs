//! A single scored finding and its JSON form.

use std::cmp::Ordering;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Map, Value as Json};

use super::InsightKind;
use crate::input::Value;

/// Map a cell value to native JSON.
///
/// Dates render as `YYYY-MM-DD` and non-finite floats become `null`.
pub fn normalize(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => json_number(*f),
        Value::Date(_) | Value::DateTime(_) => Json::String(value.to_string()),
        Value::Text(s) => Json::String(s.clone()),
    }
}

/// A float as JSON, `null` when it is NaN or infinite.
pub fn json_number(value: f64) -> Json {
    serde_json::Number::from_f64(value)
        .map(Json::Number)
        .unwrap_or(Json::Null)
}

/// One finding emitted by a detector.
///
/// Insights compare by [`score`](Insight::score) alone.
#[derive(Debug, Clone)]
pub struct Insight {
    pub kind: InsightKind,
    /// Description plus type-specific fields.
    pub insight: Map<String, Json>,
    pub impact: f64,
    /// Confidence in `[0, 1]`.
    pub significance: f64,
    /// Rows the finding was computed from.
    pub data: Option<Vec<Map<String, Json>>>,
}

impl Insight {
    /// Build an insight; significance is clamped to `[0, 1]` and NaN becomes 0.
    pub fn new(kind: InsightKind, insight: Map<String, Json>, impact: f64, significance: f64) -> Self {
        let significance = if significance.is_nan() {
            0.0
        } else {
            significance.clamp(0.0, 1.0)
        };
        Self {
            kind,
            insight,
            impact,
            significance,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Vec<Map<String, Json>>) -> Self {
        self.data = Some(data);
        self
    }

    /// `impact × significance`.
    pub fn score(&self) -> f64 {
        self.impact * self.significance
    }

    /// The human-readable description.
    pub fn description(&self) -> &str {
        self.insight
            .get("description")
            .and_then(Json::as_str)
            .unwrap_or_default()
    }
}

impl PartialEq for Insight {
    fn eq(&self, other: &Self) -> bool {
        self.score().total_cmp(&other.score()) == Ordering::Equal
    }
}

impl Eq for Insight {}

impl PartialOrd for Insight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Insight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score().total_cmp(&other.score())
    }
}

impl Serialize for Insight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.data.is_some() { 6 } else { 5 };
        let mut state = serializer.serialize_struct("Insight", fields)?;
        state.serialize_field("type", self.kind.as_str())?;
        state.serialize_field("insight", &self.insight)?;
        state.serialize_field("impact", &json_number(self.impact))?;
        state.serialize_field("significance", &json_number(self.significance))?;
        state.serialize_field("score", &json_number(self.score()))?;
        if let Some(data) = &self.data {
            state.serialize_field("data", data)?;
        }
        state.end()
    }
}
