//! Insight detection.
//!
//! Each [`InsightKind`] is one statistical test over a sibling group. A
//! detector first checks whether it applies to the group's data, then fits
//! its model and scores the result; [`rank`] orders the survivors.

mod attribution;
mod change_point;
mod correlation;
mod evenness;
mod kind;
mod outstanding;
mod rank;
mod record;
pub mod stats;
mod trend;

#[cfg(test)]
pub(crate) mod test_support;

pub use kind::{DetectOptions, InsightKind, DEFAULT_INSIGHT_THRESHOLD};
pub use rank::{rank, RankOptions};
pub use record::{json_number, normalize, Insight};
