//! Attribution: one value accounts for at least half of the total.

use serde_json::{Map, Value as Json};

use super::kind::{describe, fields};
use super::outstanding::top_p_value;
use super::record::json_number;
use super::{normalize, Insight, InsightKind};
use crate::model::{GroupFrame, SiblingGroup};
use crate::schema::ExtendType;

/// p-value used when the baseline fit is undefined.
const FALLBACK_P_VALUE: f64 = 0.05;

pub(super) fn check(group: &SiblingGroup, frame: &GroupFrame) -> bool {
    if group.measure().extend_type == ExtendType::Rank {
        return false;
    }
    let y = frame.sorted_desc().values();
    if y.len() <= 2 || y.iter().any(|v| *v < 0.0) {
        return false;
    }
    let max = y[0];
    let share = max / y.iter().sum::<f64>();
    // The last test rejects ratio measures whose top value already is its share.
    share >= 0.5 && (max * 100.0).trunc() != (share * 100.0).trunc()
}

pub(super) fn fit(group: &SiblingGroup, frame: &GroupFrame) -> Option<Insight> {
    let sorted = frame.sorted_desc();
    let y = sorted.values();
    let (key, top) = sorted.rows.first()?;

    let p_value = top_p_value(&y).unwrap_or(FALLBACK_P_VALUE);
    let share = top / y.iter().sum::<f64>();
    let top = sorted.measure_value(*top);
    let measure = group.measure();

    let description = describe(
        group,
        format!(
            "{} = {} 的 {} 为 {}，占比超 {:.2}%",
            sorted.breakdown,
            key,
            measure.name,
            top,
            share * 100.0
        ),
    );
    let mut max_value = Map::new();
    max_value.insert(measure.name.clone(), normalize(&top));
    max_value.insert(sorted.breakdown.clone(), normalize(key));
    max_value.insert("rate".into(), json_number(share));

    let mut fields = fields(description);
    fields.insert("max_value".into(), Json::Object(max_value));

    Some(
        Insight::new(InsightKind::Attribution, fields, group.impact(), 1.0 - p_value)
            .with_data(sorted.to_records()),
    )
}
