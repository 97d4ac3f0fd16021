//! Column type inference and cell conversion.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::input::Value;
use crate::schema::ColumnType;

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================
// Date patterns compiled once on first use.

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap(), // ISO date
        Regex::new(r"^\d{2}/\d{2}/\d{4}").unwrap(), // US date
        Regex::new(r"^\d{2}-\d{2}-\d{4}").unwrap(), // European date
        Regex::new(r"^\d{4}/\d{2}/\d{2}").unwrap(), // Alt ISO
    ]
});

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Infers column types from raw text and converts cells to typed values.
#[derive(Debug, Clone, Default)]
pub struct TypeInference;

impl TypeInference {
    pub fn new() -> Self {
        Self
    }

    /// Infer the column type from its non-null text values.
    ///
    /// The most common per-value type wins; integer columns containing any
    /// float are promoted to float.
    pub fn infer_type(&self, values: &[&str]) -> ColumnType {
        if values.is_empty() {
            return ColumnType::Unknown;
        }

        let mut type_counts: HashMap<ColumnType, usize> = HashMap::new();
        for value in values {
            *type_counts.entry(self.detect_value_type(value)).or_insert(0) += 1;
        }

        let best_type = majority(&type_counts).unwrap_or(ColumnType::String);

        if best_type == ColumnType::Integer && type_counts.contains_key(&ColumnType::Float) {
            return ColumnType::Float;
        }

        best_type
    }

    /// Infer the column type from already-typed values (JSON input).
    ///
    /// Text is only reinterpreted when it looks like a date.
    pub fn infer_value_type(&self, values: &[&Value]) -> ColumnType {
        let mut type_counts: HashMap<ColumnType, usize> = HashMap::new();
        for value in values {
            let detected = match value {
                Value::Null => continue,
                Value::Bool(_) => ColumnType::Boolean,
                Value::Int(_) => ColumnType::Integer,
                Value::Float(_) => ColumnType::Float,
                Value::Date(_) => ColumnType::Date,
                Value::DateTime(_) => ColumnType::DateTime,
                Value::Text(s) => match self.detect_value_type(s) {
                    t @ (ColumnType::Date | ColumnType::DateTime) => t,
                    _ => ColumnType::String,
                },
            };
            *type_counts.entry(detected).or_insert(0) += 1;
        }

        let Some(best_type) = majority(&type_counts) else {
            return ColumnType::Unknown;
        };

        if best_type == ColumnType::Integer && type_counts.contains_key(&ColumnType::Float) {
            return ColumnType::Float;
        }

        best_type
    }

    /// Detect the type of a single value.
    pub fn detect_value_type(&self, value: &str) -> ColumnType {
        let trimmed = value.trim();

        if matches!(
            trimmed.to_lowercase().as_str(),
            "true" | "false" | "yes" | "no"
        ) {
            return ColumnType::Boolean;
        }

        if trimmed.parse::<i64>().is_ok() {
            return ColumnType::Integer;
        }

        if trimmed.parse::<f64>().is_ok() {
            return ColumnType::Float;
        }

        if self.looks_like_date(trimmed) {
            if trimmed.contains(':') || trimmed.contains('T') {
                return ColumnType::DateTime;
            }
            return ColumnType::Date;
        }

        ColumnType::String
    }

    /// Check if a value looks like a date.
    fn looks_like_date(&self, value: &str) -> bool {
        DATE_PATTERNS.iter().any(|pattern| pattern.is_match(value))
    }

    /// Convert raw text to a value of the given column type.
    ///
    /// Text that cannot be represented in the column type becomes null.
    pub fn convert(&self, raw: &str, column_type: ColumnType) -> Value {
        let trimmed = raw.trim();
        match column_type {
            ColumnType::Integer => trimmed.parse::<i64>().map(Value::Int).unwrap_or(Value::Null),
            ColumnType::Float => trimmed.parse::<f64>().map(Value::Float).unwrap_or(Value::Null),
            ColumnType::Boolean => match trimmed.to_lowercase().as_str() {
                "true" | "yes" => Value::Bool(true),
                "false" | "no" => Value::Bool(false),
                _ => Value::Null,
            },
            ColumnType::Date => parse_date(trimmed).map(Value::Date).unwrap_or(Value::Null),
            ColumnType::DateTime => parse_datetime(trimmed)
                .map(Value::DateTime)
                .unwrap_or(Value::Null),
            ColumnType::String | ColumnType::Unknown => Value::Text(raw.to_string()),
        }
    }

    /// Convert an already-typed value to the column type.
    pub fn coerce(&self, value: &Value, column_type: ColumnType) -> Value {
        match (value, column_type) {
            (Value::Null, _) => Value::Null,
            (Value::Int(i), ColumnType::Float) => Value::Float(*i as f64),
            (Value::Text(s), ColumnType::Date | ColumnType::DateTime) => self.convert(s, column_type),
            (Value::Date(d), ColumnType::DateTime) => Value::DateTime(d.and_time(chrono::NaiveTime::MIN)),
            (v, ColumnType::String | ColumnType::Unknown) => match v {
                Value::Text(_) => v.clone(),
                other => Value::Text(other.to_string()),
            },
            (v, t) if value_matches(v, t) => v.clone(),
            _ => Value::Null,
        }
    }
}

fn majority(type_counts: &HashMap<ColumnType, usize>) -> Option<ColumnType> {
    type_counts
        .iter()
        // Ties resolve by type so inference does not depend on hash order.
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| rank(*b.0).cmp(&rank(*a.0))))
        .map(|(t, _)| *t)
}

fn rank(column_type: ColumnType) -> u8 {
    match column_type {
        ColumnType::Integer => 0,
        ColumnType::Float => 1,
        ColumnType::Boolean => 2,
        ColumnType::Date => 3,
        ColumnType::DateTime => 4,
        ColumnType::String => 5,
        ColumnType::Unknown => 6,
    }
}

fn value_matches(value: &Value, column_type: ColumnType) -> bool {
    matches!(
        (value, column_type),
        (Value::Int(_), ColumnType::Integer)
            | (Value::Float(_), ColumnType::Float)
            | (Value::Bool(_), ColumnType::Boolean)
            | (Value::Date(_), ColumnType::Date)
            | (Value::DateTime(_), ColumnType::DateTime)
    )
}

/// Parse a calendar date in one of the supported layouts.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Parse a timestamp; bare dates become midnight.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            value
                .get(..10)
                .and_then(parse_date)
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

/// Parse a period label of a series dimension into a date.
///
/// The layout is chosen by length: `2014` (year), `201403`, `2014-03`,
/// `20140309`, otherwise `2014-03-09`. Missing month and day default to 1.
pub fn parse_series_date(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    // Length picks byte offsets, so only ASCII labels can match a layout.
    if !v.is_ascii() {
        return None;
    }
    let digits = |s: &str| s.parse::<u32>().ok();
    let (year, month, day) = match v.len() {
        4 => (v.parse::<i32>().ok()?, 1, 1),
        6 => (v[..4].parse::<i32>().ok()?, digits(&v[4..6])?, 1),
        7 if v.as_bytes()[4] == b'-' => (v[..4].parse::<i32>().ok()?, digits(&v[5..7])?, 1),
        8 => (
            v[..4].parse::<i32>().ok()?,
            digits(&v[4..6])?,
            digits(&v[6..8])?,
        ),
        _ => return NaiveDate::parse_from_str(v.get(..10).unwrap_or(v), "%Y-%m-%d").ok(),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_integer_type() {
        let inference = TypeInference::new();
        assert_eq!(inference.infer_type(&["1", "2", "3", "100"]), ColumnType::Integer);
    }

    #[test]
    fn test_infer_float_promotion() {
        let inference = TypeInference::new();
        assert_eq!(inference.infer_type(&["1", "2", "3.5"]), ColumnType::Float);
    }

    #[test]
    fn test_infer_dates() {
        let inference = TypeInference::new();
        assert_eq!(
            inference.infer_type(&["2020-01-01", "2020-02-01"]),
            ColumnType::Date
        );
        assert_eq!(
            inference.infer_type(&["2020-01-01T10:00:00", "2020-02-01T11:30:00"]),
            ColumnType::DateTime
        );
    }

    #[test]
    fn test_convert_bad_cell_to_null() {
        let inference = TypeInference::new();
        assert_eq!(inference.convert("abc", ColumnType::Integer), Value::Null);
        assert_eq!(inference.convert(" 7 ", ColumnType::Integer), Value::Int(7));
        assert_eq!(inference.convert("yes", ColumnType::Boolean), Value::Bool(true));
    }

    #[test]
    fn test_infer_value_type_keeps_numeric_strings_as_text() {
        let inference = TypeInference::new();
        let a = Value::from("2010");
        let b = Value::from("2011");
        assert_eq!(inference.infer_value_type(&[&a, &b]), ColumnType::String);

        let c = Value::from("2010-01-01");
        assert_eq!(inference.infer_value_type(&[&c]), ColumnType::Date);

        let i = Value::Int(1);
        let f = Value::Float(2.5);
        assert_eq!(inference.infer_value_type(&[&i, &f]), ColumnType::Float);
    }

    #[test]
    fn test_parse_series_date_by_length() {
        let d = |y, m, dd| NaiveDate::from_ymd_opt(y, m, dd);
        assert_eq!(parse_series_date("2014"), d(2014, 1, 1));
        assert_eq!(parse_series_date("201403"), d(2014, 3, 1));
        assert_eq!(parse_series_date("2014-03"), d(2014, 3, 1));
        assert_eq!(parse_series_date("20140309"), d(2014, 3, 9));
        assert_eq!(parse_series_date("2014-03-09"), d(2014, 3, 9));
        assert_eq!(parse_series_date("spring"), None);
    }

    #[test]
    fn test_parse_series_date_rejects_non_ascii_labels() {
        assert_eq!(parse_series_date("一月"), None);
        assert_eq!(parse_series_date("二〇一四"), None);
        assert_eq!(parse_series_date("2014年3"), None);
    }
}
