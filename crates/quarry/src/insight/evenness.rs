//! Evenness: the measure is spread uniformly across the breakdown.

use super::kind::{describe, fields};
use super::stats::{normalized_entropy, student_t_sf};
use super::{Insight, InsightKind};
use crate::model::{GroupFrame, SiblingGroup};
use crate::schema::ExtendType;

pub(super) fn check(group: &SiblingGroup, frame: &GroupFrame) -> bool {
    if group.measure().extend_type != ExtendType::Original {
        return false;
    }
    let y = frame.values();
    let single_signed = y.iter().all(|v| *v >= 0.0) || y.iter().all(|v| *v < 0.0);
    y.len() > 2 && single_signed && y.iter().sum::<f64>() != 0.0
}

/// Test statistic for a normalized entropy `h`.
fn entropy_statistic(h: f64) -> f64 {
    if h >= 1.0 {
        f64::INFINITY
    } else {
        h * (0.001 / (1.0 - h * h)).sqrt()
    }
}

pub(super) fn fit(group: &SiblingGroup, frame: &GroupFrame) -> Option<Insight> {
    let sorted = frame.sorted_desc();
    let y = sorted.values();
    if y.len() < 3 {
        return None;
    }

    let h = normalized_entropy(&y)?;
    let statistic = entropy_statistic(h);
    let p_value = 2.0 * student_t_sf(statistic, (y.len() - 2) as f64)?;

    let description = describe(
        group,
        format!("在{}下 {} 分布较为均匀", sorted.breakdown, group.measure().name),
    );

    Some(
        Insight::new(InsightKind::Evenness, fields(description), group.impact(), 1.0 - p_value)
            .with_data(sorted.to_records()),
    )
}
