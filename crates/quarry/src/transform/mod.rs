//! Measure transformations: rate, rank, increase and difference from average.

mod engine;
mod operations;

pub use engine::TransformEngine;
pub use operations::{TransformKind, TransformResult};
