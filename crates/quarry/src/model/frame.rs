//! The two-column view a detector works on.

use std::cmp::Ordering;

use serde_json::Map;

use crate::input::Value;
use crate::insight::normalize;

/// One row per breakdown value with its measure value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupFrame {
    /// Breakdown column name.
    pub breakdown: String,
    /// Measure column name.
    pub measure: String,
    /// `(breakdown value, measure value)` rows.
    pub rows: Vec<(Value, f64)>,
    /// Whether measure values should render as integers.
    pub integer_measure: bool,
}

impl GroupFrame {
    pub fn new(
        breakdown: impl Into<String>,
        measure: impl Into<String>,
        rows: Vec<(Value, f64)>,
        integer_measure: bool,
    ) -> Self {
        Self {
            breakdown: breakdown.into(),
            measure: measure.into(),
            rows,
            integer_measure,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Measure values in row order.
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|(_, y)| *y).collect()
    }

    /// Breakdown values in row order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(|(k, _)| k)
    }

    /// Copy sorted by measure, largest first. Ties keep row order.
    pub fn sorted_desc(&self) -> Self {
        let mut sorted = self.clone();
        sorted
            .rows
            .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        sorted
    }

    /// Copy sorted by breakdown value, ascending.
    pub fn sorted_by_key(&self) -> Self {
        let mut sorted = self.clone();
        sorted.rows.sort_by(|a, b| a.0.cmp(&b.0));
        sorted
    }

    /// Typed view of a measure value.
    pub fn measure_value(&self, y: f64) -> Value {
        if self.integer_measure && y.is_finite() && y.fract() == 0.0 {
            Value::Int(y as i64)
        } else {
            Value::Float(y)
        }
    }

    /// Rows as JSON objects `{breakdown: .., measure: ..}`.
    pub fn to_records(&self) -> Vec<Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|(key, y)| {
                let mut row = Map::new();
                row.insert(self.breakdown.clone(), normalize(key));
                row.insert(self.measure.clone(), normalize(&self.measure_value(*y)));
                row
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn frame() -> GroupFrame {
        GroupFrame::new(
            "Brand",
            "Sale",
            vec![
                (Value::from("H"), 40.0),
                (Value::from("T"), 38.0),
                (Value::from("F"), 13.0),
                (Value::from("B"), 20.0),
            ],
            true,
        )
    }

    #[test]
    fn test_sorted_desc() {
        let sorted = frame().sorted_desc();
        assert_eq!(sorted.values(), vec![40.0, 38.0, 20.0, 13.0]);
        assert_eq!(sorted.rows[2].0, Value::from("B"));
    }

    #[test]
    fn test_sorted_by_key() {
        let sorted = frame().sorted_by_key();
        let keys: Vec<String> = sorted.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["B", "F", "H", "T"]);
    }

    #[test]
    fn test_records_render_dates_and_integers() {
        let d = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        let f = GroupFrame::new("Year", "Sale", vec![(Value::Date(d), 58.0)], true);
        let records = f.to_records();
        assert_eq!(records[0]["Year"], "2014-01-01");
        assert_eq!(records[0]["Sale"], serde_json::json!(58));

        let f = GroupFrame::new("Year", "Sale", vec![(Value::Date(d), 2.5)], false);
        assert_eq!(f.to_records()[0]["Sale"], serde_json::json!(2.5));
    }
}
