//! Type inference for raw tabular input.

mod typing;

pub use typing::{parse_date, parse_datetime, parse_series_date, TypeInference};
