//! Correlation between a numeric breakdown and the measure.

use serde_json::Value as Json;

use super::kind::{describe, fields};
use super::record::json_number;
use super::stats::pearson;
use super::{Insight, InsightKind};
use crate::model::{GroupFrame, SiblingGroup};

pub(super) fn check(group: &SiblingGroup, frame: &GroupFrame) -> bool {
    group.breakdown().is_number && frame.len() > 5
}

pub(super) fn fit(group: &SiblingGroup, frame: &GroupFrame) -> Option<Insight> {
    let (x, y): (Vec<f64>, Vec<f64>) = frame
        .rows
        .iter()
        .filter_map(|(key, y)| key.as_f64().map(|x| (x, *y)))
        .unzip();
    let (r, p_value) = pearson(&x, &y)?;

    let measure = group.measure();
    let direction = if r > 0.0 { "正相关" } else { "负相关" };
    let description = describe(
        group,
        format!(
            "{} 和 {} 指标呈现{}，相关系数为 {:.4}",
            frame.breakdown, measure.name, direction, r
        ),
    );

    let mut fields = fields(description);
    fields.insert("correlation".into(), Json::from(direction));
    fields.insert("coefficient".into(), json_number(r));
    fields.insert(
        "columns".into(),
        Json::from(vec![frame.breakdown.clone(), measure.column.clone()]),
    );

    Some(
        Insight::new(InsightKind::Correlation, fields, group.impact(), 1.0 - p_value)
            .with_data(frame.to_records()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::test_support::numeric_of;

    #[test]
    fn test_positive_correlation() {
        let group = numeric_of(&[(1.0, 2.0), (2.0, 4.1), (3.0, 5.9), (4.0, 8.2), (5.0, 9.9), (6.0, 12.1)]);
        let frame = group.get_data();
        assert!(check(&group, &frame));

        let insight = fit(&group, &frame).unwrap();
        assert_eq!(insight.insight["correlation"], "正相关");
        assert_eq!(insight.insight["columns"], serde_json::json!(["Price", "Sale"]));
        assert!(insight.significance > 0.99);
    }

    #[test]
    fn test_negative_correlation() {
        let group = numeric_of(&[(1.0, 9.0), (2.0, 8.0), (3.0, 8.5), (4.0, 5.0), (5.0, 4.0), (6.0, 1.0)]);
        let insight = fit(&group, &group.get_data()).unwrap();
        assert_eq!(insight.insight["correlation"], "负相关");
        assert!(insight.insight["coefficient"].as_f64().unwrap() < 0.0);
    }

    #[test]
    fn test_needs_more_than_five_rows() {
        let group = numeric_of(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.5), (4.0, 4.0), (5.0, 5.0)]);
        assert!(!check(&group, &group.get_data()));
    }

    #[test]
    fn test_constant_measure_is_none() {
        let group = numeric_of(&[(1.0, 3.0), (2.0, 3.0), (3.0, 3.0), (4.0, 3.0), (5.0, 3.0), (6.0, 3.0)]);
        assert!(fit(&group, &group.get_data()).is_none());
    }
}
