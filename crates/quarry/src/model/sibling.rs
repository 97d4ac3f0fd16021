//! Sibling groups: a measure broken down by one dimension.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;

use super::{DataModel, GroupFrame};
use crate::input::Value;
use crate::schema::{Aggregation, Column, FilterColumn, Measure};

/// A breakdown of the model's measure by one column, optionally restricted by
/// equality filters.
///
/// The impact score is computed once at construction and always lies in
/// `[0, 1]`.
#[derive(Debug, Clone)]
pub struct SiblingGroup {
    data: Arc<DataModel>,
    breakdown: Column,
    filters: Vec<FilterColumn>,
    impact: f64,
}

impl SiblingGroup {
    /// Unfiltered group.
    pub fn new(data: Arc<DataModel>, breakdown: Column) -> Self {
        Self::build(data, breakdown, Vec::new(), None)
    }

    /// Group restricted to rows matching every filter.
    pub fn with_filters(data: Arc<DataModel>, breakdown: Column, filters: Vec<FilterColumn>) -> Self {
        Self::build(data, breakdown, filters, None)
    }

    /// Group with a caller-supplied impact.
    pub fn with_impact(
        data: Arc<DataModel>,
        breakdown: Column,
        filters: Vec<FilterColumn>,
        impact: f64,
    ) -> Self {
        Self::build(data, breakdown, filters, Some(impact))
    }

    fn build(
        data: Arc<DataModel>,
        breakdown: Column,
        filters: Vec<FilterColumn>,
        impact_override: Option<f64>,
    ) -> Self {
        let mut group = Self {
            data,
            breakdown,
            filters,
            impact: 0.0,
        };
        let impact = match impact_override {
            Some(impact) => impact,
            None if !group.filters.is_empty() => 1.0,
            None => group.compute_impact(),
        };
        group.impact = if impact.is_nan() { 0.0 } else { impact.clamp(0.0, 1.0) };
        group
    }

    /// Share of the whole measure (above its minimum) this group covers.
    fn compute_impact(&self) -> f64 {
        let y_full = self.data.measure_values();
        let Some(y_min) = y_full.iter().copied().reduce(f64::min) else {
            return 0.0;
        };

        let denominator: f64 = y_full.iter().map(|y| y - y_min).sum();
        if denominator == 0.0 {
            return 0.0;
        }

        let numerator: f64 = self.get_data().values().iter().map(|y| y - y_min).sum();
        numerator / denominator
    }

    pub fn data(&self) -> &Arc<DataModel> {
        &self.data
    }

    pub fn measure(&self) -> &Measure {
        self.data.measure()
    }

    pub fn breakdown(&self) -> &Column {
        &self.breakdown
    }

    pub fn filters(&self) -> &[FilterColumn] {
        &self.filters
    }

    pub fn impact(&self) -> f64 {
        self.impact
    }

    /// Filters rendered for descriptions: `[Brand==H]`, or empty.
    pub fn filter_label(&self) -> String {
        if self.filters.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = self.filters.iter().map(|f| f.to_string()).collect();
        format!("[{}]", parts.join(", "))
    }

    /// The rows this group covers, one per breakdown value.
    ///
    /// Filters on columns no longer in the model are ignored. A non-numeric
    /// breakdown with repeated values is aggregated with the measure's
    /// aggregation; groups come out in ascending breakdown order and null
    /// breakdown values are dropped.
    pub fn get_data(&self) -> GroupFrame {
        let table = self.data.table();
        let measure = self.data.measure();
        let measure_index = self.data.measure_index();
        let integer = self.data.measure_is_integer();

        let Some(breakdown_index) = table.column_index(&self.breakdown.name) else {
            return GroupFrame::new(&self.breakdown.name, &measure.column, Vec::new(), integer);
        };

        let predicates: Vec<(usize, &FilterColumn)> = self
            .filters
            .iter()
            .filter_map(|f| table.column_index(&f.column.name).map(|i| (i, f)))
            .collect();

        let rows: Vec<(Value, f64)> = table
            .rows
            .iter()
            .filter(|row| {
                predicates
                    .iter()
                    .all(|(i, f)| f.condition.matches(&row[*i], &f.value))
            })
            .filter_map(|row| {
                row[measure_index]
                    .as_f64()
                    .map(|y| (row[breakdown_index].clone(), y))
            })
            .collect();

        let distinct: IndexSet<&Value> = rows.iter().map(|(k, _)| k).collect();
        if self.breakdown.is_number || distinct.len() == rows.len() {
            return GroupFrame::new(&self.breakdown.name, &measure.column, rows, integer);
        }

        let mut groups: BTreeMap<Value, Vec<f64>> = BTreeMap::new();
        for (key, y) in rows {
            if !key.is_null() {
                groups.entry(key).or_default().push(y);
            }
        }

        let aggregated = groups
            .into_iter()
            .map(|(key, values)| (key, measure.agg.apply(&values)))
            .collect();
        let integer = measure.agg == Aggregation::Count || (integer && measure.agg.preserves_integers());

        GroupFrame::new(&self.breakdown.name, &measure.column, aggregated, integer)
    }
}

impl PartialEq for SiblingGroup {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data && self.filters == other.filters && self.breakdown == other.breakdown
    }
}

impl fmt::Display for SiblingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filters: Vec<String> = self.filters.iter().map(|f| f.to_string()).collect();
        write!(
            f,
            "SiblingGroup(data={}, filters=[{}], breakdown={})",
            self.data,
            filters.join(", "),
            self.breakdown
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Parser;
    use crate::schema::MeasureType;

    const SALES: &str = "Year,Brand,Sale\n\
        2010,H,40\n2010,T,38\n2010,F,13\n2010,B,20\n\
        2011,H,35\n2011,T,34\n2011,F,10\n2011,B,18\n";

    fn model(measure: Measure) -> Arc<DataModel> {
        let table = Parser::new().parse_str(SALES).unwrap();
        Arc::new(DataModel::new(table, measure).unwrap())
    }

    fn brand(model: &DataModel) -> Column {
        model.column("Brand").cloned().unwrap()
    }

    #[test]
    fn test_aggregates_duplicate_breakdown_values() {
        let model = model(Measure::quantity("Sale"));
        let group = SiblingGroup::new(model.clone(), brand(&model));
        let frame = group.get_data();

        let keys: Vec<String> = frame.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["B", "F", "H", "T"]);
        assert_eq!(frame.values(), vec![38.0, 23.0, 75.0, 72.0]);
        assert!(frame.integer_measure);
    }

    #[test]
    fn test_mean_aggregation_is_not_integer() {
        let model = model(Measure::new("s", "Sale", MeasureType::Quantity).with_agg(Some(Aggregation::Mean)));
        let frame = SiblingGroup::new(model.clone(), brand(&model)).get_data();
        assert_eq!(frame.values()[0], 19.0);
        assert!(!frame.integer_measure);
    }

    #[test]
    fn test_filters_and_impact() {
        let model = model(Measure::quantity("Sale"));
        let year = model.column("Year").cloned().unwrap();
        let filter = FilterColumn::eq(year, Value::Int(2010));
        let group = SiblingGroup::with_filters(model.clone(), brand(&model), vec![filter]);

        assert_eq!(group.impact(), 1.0);
        assert_eq!(group.filter_label(), "[Year==2010]");
        let frame = group.get_data();
        assert_eq!(frame.len(), 4);
        assert_eq!(frame.values(), vec![40.0, 38.0, 13.0, 20.0]);
    }

    #[test]
    fn test_unfiltered_impact_covers_everything() {
        let model = model(Measure::quantity("Sale"));
        let group = SiblingGroup::new(model.clone(), brand(&model));
        assert!((group.impact() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_impact_override_is_clamped() {
        let model = model(Measure::quantity("Sale"));
        let group = SiblingGroup::with_impact(model.clone(), brand(&model), Vec::new(), 3.0);
        assert_eq!(group.impact(), 1.0);
        let group = SiblingGroup::with_impact(model.clone(), brand(&model), Vec::new(), 0.3);
        assert_eq!(group.impact(), 0.3);
    }

    #[test]
    fn test_zero_spread_has_zero_impact() {
        let table = Parser::new().parse_str("Brand,Sale\nH,5\nT,5\n").unwrap();
        let model = Arc::new(DataModel::new(table, Measure::quantity("Sale")).unwrap());
        let group = SiblingGroup::new(model.clone(), brand(&model));
        assert_eq!(group.impact(), 0.0);
    }

    #[test]
    fn test_get_data_is_idempotent() {
        let model = model(Measure::quantity("Sale"));
        let group = SiblingGroup::new(model.clone(), brand(&model));
        assert_eq!(group.get_data(), group.get_data());
    }
}
