//! Filtering and ordering of collected insights.

use serde::{Deserialize, Serialize};

use super::Insight;

/// How [`rank`] filters and truncates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankOptions {
    /// Drop insights scoring below this.
    pub min_score: f64,
    /// Keep at most this many.
    pub top_n: Option<usize>,
}

/// Highest score first; equal scores keep their input order.
pub fn rank(mut insights: Vec<Insight>, options: &RankOptions) -> Vec<Insight> {
    insights.retain(|i| i.score() >= options.min_score);
    insights.sort_by(|a, b| b.cmp(a));
    if let Some(n) = options.top_n {
        insights.truncate(n);
    }
    insights
}
