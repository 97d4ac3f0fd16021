//! Schema types: column types, analyzable dimensions and measures.

mod column;
mod measure;
mod types;

pub use column::{Column, Condition, FilterColumn};
pub use measure::{Aggregation, ExtendType, Measure, MeasureType};
pub use types::ColumnType;
