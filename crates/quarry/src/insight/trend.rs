//! Trend: a linear rise or fall along a series dimension.

use serde_json::Value as Json;

use super::kind::{describe, fields};
use super::record::json_number;
use super::stats::{linregress, logistic_sf};
use super::{Insight, InsightKind};
use crate::model::{GroupFrame, SiblingGroup};
use crate::schema::ExtendType;

/// Slopes flatter than this are not reported.
const MIN_SLOPE: f64 = 0.02;

pub(super) fn check(group: &SiblingGroup, frame: &GroupFrame) -> bool {
    group.measure().extend_type != ExtendType::Rank
        && frame.len() > 2
        && group.breakdown().is_series
}

pub(super) fn fit(group: &SiblingGroup, frame: &GroupFrame) -> Option<Insight> {
    let sorted = frame.sorted_by_key();
    let line = linregress(&sorted.values())?;

    if line.slope.abs() < MIN_SLOPE {
        return None;
    }

    let p_value = logistic_sf(line.slope.abs(), 0.2, 2.0);
    let direction = if line.slope > 0.0 { "上升" } else { "下降" };

    let description = describe(
        group,
        format!(
            "{} 维度的 {} 指标呈现{}趋势，趋势为 {:.4} * x + {:.4}",
            sorted.breakdown,
            group.measure().name,
            direction,
            line.slope,
            line.intercept
        ),
    );
    let mut fields = fields(description);
    fields.insert("trend".into(), Json::from(direction));
    fields.insert("slope".into(), json_number(line.slope));
    fields.insert("intercept".into(), json_number(line.intercept));

    Some(
        Insight::new(
            InsightKind::Trend,
            fields,
            group.impact(),
            (1.0 - p_value) * line.r * line.r,
        )
        .with_data(sorted.to_records()),
    )
}
