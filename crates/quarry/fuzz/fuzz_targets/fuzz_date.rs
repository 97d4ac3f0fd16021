//! Fuzz target for date parsing and series coercion.
//!
//! Regex-based date detection must not crash on pathological input, and a
//! forced series column must come out as dates or nulls.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quarry::inference::{parse_date, parse_datetime, parse_series_date};
use quarry::{ColumnType, Parser, Value};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse_date(content);
    let _ = parse_datetime(content);
    let _ = parse_series_date(content);

    let cell = content.replace(['\n', '\r', ',', '"'], " ");
    let csv = format!("Period,Sale\n{},1\n2014,2\n", cell);
    if let Ok(mut table) = Parser::new().parse_str(&csv) {
        if table.force_series("Period").is_ok() {
            assert_eq!(table.column_type("Period"), Some(ColumnType::Date));
            for value in table.column_values(0) {
                assert!(matches!(value, Value::Date(_) | Value::Null));
            }
        }
    }
});
