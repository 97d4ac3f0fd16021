//! Quarry: insight mining engine for tabular datasets.
//!
//! Quarry takes a table and one numeric measure, enumerates every
//! "sibling group" (a breakdown dimension, optionally narrowed by one
//! equality filter), and runs a catalogue of statistical detectors over
//! each group. Detected patterns come back as scored, JSON-serializable
//! [`Insight`] records.
//!
//! # Core Principles
//!
//! - **Scored**: every insight carries `score = impact × significance`
//! - **Typed**: cells are parsed once into [`Value`] and columns into [`ColumnType`]
//! - **Non-destructive**: the input table is never modified in place
//!
//! # Example
//!
//! ```no_run
//! use quarry::{Measure, Miner, MiningContext};
//!
//! let miner = Miner::new();
//! let report = miner
//!     .mine_file("sales.csv", Measure::quantity("Sale"), None, &MiningContext::new())
//!     .unwrap();
//!
//! for insight in &report.insights {
//!     println!("{:.3} {}", insight.score(), insight.description());
//! }
//! ```

pub mod error;
pub mod inference;
pub mod input;
pub mod insight;
pub mod model;
pub mod schema;
pub mod transform;

mod miner;

pub use crate::miner::{Miner, MinerConfig, MiningContext, MiningReport, MiningSummary};
pub use error::{QuarryError, Result};
pub use input::{DataTable, Parser, ParserConfig, SourceMetadata, Value};
pub use insight::{rank, DetectOptions, Insight, InsightKind, RankOptions};
pub use model::{DataModel, GroupFrame, SiblingGroup, SiblingGroupContainer};
pub use schema::{Aggregation, Column, ColumnType, Condition, ExtendType, FilterColumn, Measure, MeasureType};
pub use transform::{TransformEngine, TransformKind, TransformResult};
