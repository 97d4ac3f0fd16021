//! The insight catalogue and the detector contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value as Json};

use super::{attribution, change_point, correlation, evenness, normalize, outstanding, trend, Insight};
use crate::error::QuarryError;
use crate::model::{GroupFrame, SiblingGroup};

/// Insights scoring or significant below this are discarded.
pub const DEFAULT_INSIGHT_THRESHOLD: f64 = 0.01;

/// Every pattern the miner can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightKind {
    /// One value clearly above the rest.
    OutstandingFirst,
    /// One value clearly below the rest.
    OutstandingLast,
    /// One value holding at least half of the total.
    Attribution,
    /// Values spread evenly.
    Evenness,
    /// Monotone rise or fall over a series.
    Trend,
    /// Breakdown and measure move together.
    Correlation,
    /// A turning point in a series.
    ChangePoint,
}

impl InsightKind {
    pub const ALL: [InsightKind; 7] = [
        InsightKind::OutstandingFirst,
        InsightKind::OutstandingLast,
        InsightKind::Attribution,
        InsightKind::Evenness,
        InsightKind::Trend,
        InsightKind::Correlation,
        InsightKind::ChangePoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::OutstandingFirst => "OutstandingFirst",
            InsightKind::OutstandingLast => "OutstandingLast",
            InsightKind::Attribution => "Attribution",
            InsightKind::Evenness => "Evenness",
            InsightKind::Trend => "Trend",
            InsightKind::Correlation => "Correlation",
            InsightKind::ChangePoint => "ChangePoint",
        }
    }

    /// Whether this detector applies to the group's data.
    pub fn check(&self, group: &SiblingGroup, frame: &GroupFrame) -> bool {
        match self {
            InsightKind::OutstandingFirst => outstanding::check_first(group, frame),
            InsightKind::OutstandingLast => outstanding::check_last(group, frame),
            InsightKind::Attribution => attribution::check(group, frame),
            InsightKind::Evenness => evenness::check(group, frame),
            InsightKind::Trend => trend::check(group, frame),
            InsightKind::Correlation => correlation::check(group, frame),
            InsightKind::ChangePoint => change_point::check(group, frame),
        }
    }

    /// Run the statistical fit. `None` when the fit is degenerate.
    pub fn fit(&self, group: &SiblingGroup, frame: &GroupFrame) -> Option<Insight> {
        match self {
            InsightKind::OutstandingFirst => outstanding::fit_first(group, frame),
            InsightKind::OutstandingLast => outstanding::fit_last(group, frame),
            InsightKind::Attribution => attribution::fit(group, frame),
            InsightKind::Evenness => evenness::fit(group, frame),
            InsightKind::Trend => trend::fit(group, frame),
            InsightKind::Correlation => correlation::fit(group, frame),
            InsightKind::ChangePoint => change_point::fit(group, frame),
        }
    }

    /// Check, fit and threshold one group.
    ///
    /// Returned insights carry `breakdown` and `filters` in their fields.
    pub fn evaluate(&self, group: &SiblingGroup, options: &DetectOptions) -> Option<Insight> {
        let frame = group.get_data();

        if !options.debug && !self.check(group, &frame) {
            tracing::debug!(kind = %self, group = %GroupLabel(group), "detector not applicable");
            return None;
        }

        let Some(mut insight) = self.fit(group, &frame) else {
            tracing::debug!(kind = %self, group = %GroupLabel(group), "fit produced no insight");
            return None;
        };

        if insight.score() < options.threshold {
            tracing::debug!(
                kind = %self,
                group = %GroupLabel(group),
                score = insight.score(),
                threshold = options.threshold,
                "score below threshold"
            );
            return None;
        }

        if insight.significance < options.threshold {
            tracing::debug!(
                kind = %self,
                group = %GroupLabel(group),
                significance = insight.significance,
                threshold = options.threshold,
                "significance below threshold"
            );
            return None;
        }

        insight
            .insight
            .insert("breakdown".into(), Json::from(group.breakdown().name.clone()));
        insight
            .insight
            .insert("filters".into(), filters_json(group));
        Some(insight)
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = QuarryError;

    /// Accepts catalogue names case-insensitively, with or without `_`/`-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        InsightKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().to_lowercase() == key)
            .ok_or_else(|| QuarryError::UnknownInsightType(s.to_string()))
    }
}

/// Knobs for [`InsightKind::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectOptions {
    /// Minimum score and significance.
    pub threshold: f64,
    /// Skip applicability checks.
    pub debug: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_INSIGHT_THRESHOLD,
            debug: false,
        }
    }
}

struct GroupLabel<'a>(&'a SiblingGroup);

impl fmt::Display for GroupLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.0.filter_label();
        if label.is_empty() {
            write!(f, "{}", self.0.breakdown().name)
        } else {
            write!(f, "{} {}", self.0.breakdown().name, label)
        }
    }
}

fn filters_json(group: &SiblingGroup) -> Json {
    Json::Array(
        group
            .filters()
            .iter()
            .map(|f| {
                json!({
                    "column": {
                        "name": f.column.name,
                        "is_series": f.column.is_series,
                        "is_number": f.column.is_number,
                    },
                    "condition": f.condition.as_str(),
                    "value": normalize(&f.value),
                })
            })
            .collect(),
    )
}

/// Prefix a description with the group's filters, if any.
pub(super) fn describe(group: &SiblingGroup, body: String) -> String {
    let label = group.filter_label();
    if label.is_empty() {
        body
    } else {
        format!("{} {}", label, body)
    }
}

/// Fields map holding just the description.
pub(super) fn fields(description: String) -> Map<String, Json> {
    let mut map = Map::new();
    map.insert("description".into(), Json::String(description));
    map
}
