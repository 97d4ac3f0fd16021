//! Data model and sibling-group enumeration.
//!
//! A [`DataModel`] wraps a cleaned table and one measure. A [`SiblingGroup`]
//! breaks the measure down by one column, optionally under equality filters,
//! and the [`SiblingGroupContainer`] enumerates every such group ranked by
//! impact.

mod container;
mod data_model;
mod frame;
mod sibling;

pub use container::{SiblingGroupContainer, DEFAULT_GROUP_THRESHOLD};
pub use data_model::DataModel;
pub use frame::GroupFrame;
pub use sibling::SiblingGroup;
