//! Outstanding first / last: one value far from a power-law baseline.
//!
//! Values are sorted in descending order and a curve `α·x^-0.7 + min(y)` is
//! fitted to every point except the one under test. The residual of that
//! point is then scored against a normal fit of the other residuals.
//!
//! Outstanding last mirrors outstanding first: it scores the lower tail
//! (normal cdf) of the last residual and reports the last row as
//! `min_value`, rather than reusing the upper tail of the first residual.

use std::ops::Range;

use serde_json::{Map, Value as Json};

use super::kind::{describe, fields};
use super::stats::{normal_cdf, normal_fit, normal_sf, power_curve, power_fit};
use super::{normalize, Insight, InsightKind};
use crate::model::{GroupFrame, SiblingGroup};
use crate::schema::ExtendType;

/// Residuals of `y` against the baseline fitted on the points in `fit_on`.
fn residuals(y: &[f64], fit_on: Range<usize>) -> Option<Vec<f64>> {
    let bias = y.iter().copied().reduce(f64::min)?;
    let x: Vec<f64> = (1..=y.len()).map(|i| i as f64).collect();
    let shifted: Vec<f64> = y[fit_on.clone()].iter().map(|v| v - bias).collect();
    let alpha = power_fit(&x[fit_on], &shifted)?;

    Some(
        y.iter()
            .zip(&x)
            .map(|(yi, xi)| yi - (power_curve(alpha, *xi) + bias))
            .collect(),
    )
}

/// Probability that the top value is this far above the baseline by chance.
pub(super) fn top_p_value(y: &[f64]) -> Option<f64> {
    if y.len() < 2 {
        return None;
    }
    let r = residuals(y, 1..y.len())?;
    let (mean, std) = normal_fit(&r[1..])?;
    normal_sf(r[0], mean, std)
}

/// Probability that the bottom value is this far below the baseline by chance.
fn bottom_p_value(y: &[f64]) -> Option<f64> {
    let n = y.len();
    if n < 2 {
        return None;
    }
    let r = residuals(y, 0..n - 1)?;
    let (mean, std) = normal_fit(&r[..n - 1])?;
    normal_cdf(r[n - 1], mean, std)
}

pub(super) fn check_first(group: &SiblingGroup, frame: &GroupFrame) -> bool {
    if group.measure().extend_type == ExtendType::Rank {
        return false;
    }
    let y = frame.sorted_desc().values();
    let n = y.len();
    if n <= 3 {
        return false;
    }
    let share = y[0] / y.iter().sum::<f64>();
    y[n - 1] >= 0.0 && y[0] > y[1] + y[2] && share > 0.0 && share < 0.5
}

pub(super) fn check_last(group: &SiblingGroup, frame: &GroupFrame) -> bool {
    if group.measure().extend_type == ExtendType::Rank {
        return false;
    }
    let y = frame.sorted_desc().values();
    let n = y.len();
    n > 3 && y[n - 1] < 0.0 && y[n - 1] < y[n - 2] + y[n - 3]
}

pub(super) fn fit_first(group: &SiblingGroup, frame: &GroupFrame) -> Option<Insight> {
    let sorted = frame.sorted_desc();
    let y = sorted.values();
    let p_value = top_p_value(&y)?;

    let (key, top) = sorted.rows.first()?;
    let top = sorted.measure_value(*top);
    let measure = group.measure();

    let description = describe(
        group,
        format!(
            "{} = {} 时，{} 达到最高值为 {}",
            sorted.breakdown, key, measure.name, top
        ),
    );
    let mut max_value = Map::new();
    max_value.insert(measure.name.clone(), normalize(&top));
    max_value.insert(sorted.breakdown.clone(), normalize(key));

    let mut fields = fields(description);
    fields.insert("max_value".into(), Json::Object(max_value));

    Some(
        Insight::new(InsightKind::OutstandingFirst, fields, group.impact(), 1.0 - p_value)
            .with_data(sorted.to_records()),
    )
}

pub(super) fn fit_last(group: &SiblingGroup, frame: &GroupFrame) -> Option<Insight> {
    let sorted = frame.sorted_desc();
    let y = sorted.values();
    let p_value = bottom_p_value(&y)?;

    let (key, bottom) = sorted.rows.last()?;
    let bottom = sorted.measure_value(*bottom);
    let measure = group.measure();

    let description = describe(
        group,
        format!(
            "{} = {} 时，{} 最低为 {}",
            sorted.breakdown, key, measure.name, bottom
        ),
    );
    let mut min_value = Map::new();
    min_value.insert(measure.name.clone(), normalize(&bottom));
    min_value.insert(sorted.breakdown.clone(), normalize(key));

    let mut fields = fields(description);
    fields.insert("min_value".into(), Json::Object(min_value));

    Some(
        Insight::new(InsightKind::OutstandingLast, fields, group.impact(), 1.0 - p_value)
            .with_data(sorted.to_records()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::test_support::group_of;

    #[test]
    fn test_first_needs_top_above_next_two() {
        // 40 < 38 + 13
        let group = group_of(&[("H", 40.0), ("T", 38.0), ("F", 13.0), ("B", 20.0)]);
        assert!(!check_first(&group, &group.get_data()));

        let group = group_of(&[("H", 90.0), ("T", 30.0), ("F", 25.0), ("B", 20.0), ("K", 18.0), ("M", 15.0)]);
        assert!(check_first(&group, &group.get_data()));
    }

    #[test]
    fn test_first_fit() {
        let group = group_of(&[
            ("A", 100.0),
            ("B", 40.0),
            ("C", 30.0),
            ("D", 25.0),
            ("E", 21.0),
            ("F", 19.0),
            ("G", 17.0),
            ("H", 15.0),
        ]);
        let frame = group.get_data();
        assert!(check_first(&group, &frame));

        let insight = fit_first(&group, &frame).unwrap();
        assert_eq!(insight.kind, InsightKind::OutstandingFirst);
        assert!(insight.significance > 0.9);
        assert_eq!(insight.insight["max_value"]["Brand"], "A");
        assert_eq!(insight.insight["max_value"]["销售额"], 100);
        assert_eq!(insight.description(), "Brand = A 时，销售额 达到最高值为 100");
        assert_eq!(insight.data.as_ref().map(|d| d.len()), Some(8));
    }

    #[test]
    fn test_first_share_upper_bound() {
        // Top share 0.5 or more belongs to attribution.
        let group = group_of(&[("A", 100.0), ("B", 30.0), ("C", 10.0), ("D", 5.0)]);
        assert!(!check_first(&group, &group.get_data()));
    }

    #[test]
    fn test_degenerate_noise_is_none() {
        // Residuals after the top point are all equal.
        let y: Vec<f64> = vec![10.0, 0.0, 0.0];
        assert_eq!(top_p_value(&y), None);
    }

    #[test]
    fn test_last() {
        let group = group_of(&[("A", 10.0), ("B", 9.0), ("C", 8.0), ("D", 7.0), ("E", -40.0)]);
        let frame = group.get_data();
        assert!(check_last(&group, &frame));

        let insight = fit_last(&group, &frame).unwrap();
        assert_eq!(insight.insight["min_value"]["Brand"], "E");
        assert_eq!(insight.insight["min_value"]["销售额"], -40);
        assert!(insight.significance > 0.5);
    }

    #[test]
    fn test_last_requires_negative_bottom() {
        let group = group_of(&[("A", 10.0), ("B", 9.0), ("C", 8.0), ("D", 1.0)]);
        assert!(!check_last(&group, &group.get_data()));
    }
}
