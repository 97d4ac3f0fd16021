//! Enumeration and ranking of sibling groups.

use std::sync::Arc;

use super::{DataModel, SiblingGroup};
use crate::schema::{ColumnType, FilterColumn};

/// Groups below this impact are not kept.
pub const DEFAULT_GROUP_THRESHOLD: f64 = 0.01;

/// Sibling groups ordered by descending impact.
///
/// Groups with impact below the threshold are dropped on insert; groups of
/// equal impact keep insertion order.
#[derive(Debug, Clone)]
pub struct SiblingGroupContainer {
    groups: Vec<SiblingGroup>,
    threshold: f64,
}

impl Default for SiblingGroupContainer {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_THRESHOLD)
    }
}

impl SiblingGroupContainer {
    /// Empty container.
    pub fn new(threshold: f64) -> Self {
        Self {
            groups: Vec::new(),
            threshold,
        }
    }

    /// Container holding the qualifying groups from `groups`.
    pub fn from_groups(groups: impl IntoIterator<Item = SiblingGroup>, threshold: f64) -> Self {
        let mut container = Self::new(threshold);
        container.extend(groups);
        container
    }

    /// Every sibling group derivable from a model.
    ///
    /// One unfiltered group per column, then for each ordered pair of
    /// distinct columns `(c1, c2)` where `c1` is not floating point, one
    /// group per value of `c1` filtered on that value and broken down by `c2`.
    pub fn construct_from_data_model(model: Arc<DataModel>, threshold: f64) -> Self {
        let columns = model.columns();
        let table = model.table();
        let mut groups: Vec<SiblingGroup> = columns
            .iter()
            .map(|c| SiblingGroup::new(model.clone(), c.clone()))
            .collect();

        for (i, c1) in columns.iter().enumerate() {
            if model.column_type(&c1.name) == Some(ColumnType::Float) {
                continue;
            }
            let Some(index) = table.column_index(&c1.name) else {
                continue;
            };
            let values = table.distinct_values(index);
            if values.len() <= 1 {
                continue;
            }

            for (j, c2) in columns.iter().enumerate() {
                if i == j {
                    continue;
                }
                // Null never equals a cell, so it would only produce empty groups.
                groups.extend(values.iter().filter(|v| !v.is_null()).map(|value| {
                    SiblingGroup::with_filters(
                        model.clone(),
                        c2.clone(),
                        vec![FilterColumn::eq(c1.clone(), value.clone())],
                    )
                }));
            }
        }

        let candidates = groups.len();
        let container = Self::from_groups(groups, threshold);
        tracing::debug!(
            candidates,
            kept = container.len(),
            threshold,
            "constructed sibling groups"
        );
        container
    }

    /// Insert one group if it meets the threshold.
    pub fn push(&mut self, group: SiblingGroup) {
        if group.impact() >= self.threshold {
            self.groups.push(group);
            self.sort();
        }
    }

    fn sort(&mut self) {
        self.groups
            .sort_by(|a, b| b.impact().total_cmp(&a.impact()));
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SiblingGroup> {
        self.groups.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SiblingGroup> {
        self.groups.iter()
    }

    pub fn as_slice(&self) -> &[SiblingGroup] {
        &self.groups
    }
}

impl Extend<SiblingGroup> for SiblingGroupContainer {
    /// Insert every qualifying group, then re-sort once.
    fn extend<I: IntoIterator<Item = SiblingGroup>>(&mut self, groups: I) {
        let threshold = self.threshold;
        self.groups
            .extend(groups.into_iter().filter(|g| g.impact() >= threshold));
        self.sort();
    }
}

impl IntoIterator for SiblingGroupContainer {
    type Item = SiblingGroup;
    type IntoIter = std::vec::IntoIter<SiblingGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<'a> IntoIterator for &'a SiblingGroupContainer {
    type Item = &'a SiblingGroup;
    type IntoIter = std::slice::Iter<'a, SiblingGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
