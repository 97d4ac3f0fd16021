//! Change point: the peak that best splits a series into two levels.

use serde_json::Value as Json;

use super::kind::{describe, fields};
use super::stats::{find_peaks, normal_cdf};
use super::{normalize, Insight, InsightKind};
use crate::model::{GroupFrame, SiblingGroup};
use crate::schema::ExtendType;

pub(super) fn check(group: &SiblingGroup, frame: &GroupFrame) -> bool {
    group.measure().extend_type != ExtendType::Rank
        && frame.len() > 4
        && group.breakdown().is_series
}

/// Index of the peak with the smallest two-sided p-value, and that p-value.
///
/// Ties go to the later peak.
fn best_peak(y: &[f64]) -> Option<(usize, f64)> {
    let peaks = find_peaks(y);
    if peaks.is_empty() {
        return None;
    }

    let n = y.len() as f64;
    let sum: f64 = y.iter().sum();
    let sum_sq: f64 = y.iter().map(|v| v * v).sum();
    let sigma = ((sum_sq / (2.0 * n) - (sum / (2.0 * n)).powi(2)) / n).sqrt();
    if !(sigma > 0.0 && sigma.is_finite()) {
        return None;
    }

    let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;

    let mut best: Option<(usize, f64)> = None;
    for peak in peaks {
        let k = (mean(&y[..peak]) - mean(&y[peak..])).abs() / sigma;
        let p_value = 2.0 * (1.0 - normal_cdf(k, 0.0, 1.0)?);
        if best.is_none_or(|(_, p)| p_value <= p) {
            best = Some((peak, p_value));
        }
    }
    best
}

pub(super) fn fit(group: &SiblingGroup, frame: &GroupFrame) -> Option<Insight> {
    let sorted = frame.sorted_by_key();
    let (index, p_value) = best_peak(&sorted.values())?;
    let (key, peak) = &sorted.rows[index];
    let peak = sorted.measure_value(*peak);

    let description = describe(
        group,
        format!(
            "{} 指标在 {}={} 处发生转折，转折点值为 {}",
            group.measure().name,
            sorted.breakdown,
            key,
            peak
        ),
    );
    let mut fields = fields(description);
    fields.insert(
        "change_point".into(),
        Json::from(format!("{}={}", sorted.breakdown, key)),
    );
    fields.insert("change_value".into(), normalize(&peak));

    Some(
        Insight::new(InsightKind::ChangePoint, fields, group.impact(), 1.0 - p_value)
            .with_data(sorted.to_records()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::test_support::series_of;

    #[test]
    fn test_single_spike() {
        let group = series_of(&[1.0, 2.0, 10.0, 3.0, 2.0, 1.0]);
        let frame = group.get_data();
        assert!(check(&group, &frame));

        let insight = fit(&group, &frame).unwrap();
        assert_eq!(insight.insight["change_point"], "Year=2012-01-01");
        assert_eq!(insight.insight["change_value"], 10);
        assert!((insight.significance - 0.9756).abs() < 1e-3);
    }

    #[test]
    fn test_no_peak_is_none() {
        let group = series_of(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(fit(&group, &group.get_data()).is_none());
    }

    #[test]
    fn test_short_series_not_applicable() {
        let group = series_of(&[1.0, 5.0, 1.0, 2.0]);
        assert!(!check(&group, &group.get_data()));
    }

    #[test]
    fn test_best_peak_prefers_stronger_split() {
        // The peak at the step separates the two levels best.
        let (index, _) = best_peak(&[0.0, 0.0, 9.0, 8.0, 8.5, 8.0, 8.2, 8.0]).unwrap();
        assert_eq!(index, 2);
    }
}
