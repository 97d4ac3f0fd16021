//! Small fixtures for detector tests.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::input::{DataTable, Value};
use crate::model::{DataModel, SiblingGroup};
use crate::schema::{ColumnType, ExtendType, Measure, MeasureType};

fn measure_type_of(values: &[f64]) -> ColumnType {
    if values.iter().all(|v| v.fract() == 0.0) {
        ColumnType::Integer
    } else {
        ColumnType::Float
    }
}

fn measure_value(column_type: ColumnType, y: f64) -> Value {
    match column_type {
        ColumnType::Integer => Value::Int(y as i64),
        _ => Value::Float(y),
    }
}

fn build(breakdown: &str, breakdown_type: ColumnType, rows: Vec<(Value, f64)>) -> SiblingGroup {
    let ys: Vec<f64> = rows.iter().map(|(_, y)| *y).collect();
    let sale_type = measure_type_of(&ys);
    let table = DataTable::new(
        vec![breakdown.to_string(), "Sale".to_string()],
        vec![breakdown_type, sale_type],
        rows.into_iter()
            .map(|(k, y)| vec![k, measure_value(sale_type, y)])
            .collect(),
    );
    let measure = Measure::new("销售额", "Sale", MeasureType::Quantity);
    let model = Arc::new(DataModel::new(table, measure).expect("fixture model"));
    let column = model.column(breakdown).cloned().expect("fixture column");
    SiblingGroup::new(model, column)
}

/// Unfiltered `Brand` breakdown.
pub(crate) fn group_of(rows: &[(&str, f64)]) -> SiblingGroup {
    build(
        "Brand",
        ColumnType::String,
        rows.iter().map(|(k, y)| (Value::from(*k), *y)).collect(),
    )
}

/// Unfiltered yearly `Year` series starting in 2010.
pub(crate) fn series_of(values: &[f64]) -> SiblingGroup {
    build(
        "Year",
        ColumnType::Date,
        values
            .iter()
            .enumerate()
            .map(|(i, y)| {
                let date = NaiveDate::from_ymd_opt(2010 + i as i32, 1, 1).expect("valid year");
                (Value::Date(date), *y)
            })
            .collect(),
    )
}

/// Unfiltered numeric `Price` breakdown.
pub(crate) fn numeric_of(rows: &[(f64, f64)]) -> SiblingGroup {
    build(
        "Price",
        ColumnType::Float,
        rows.iter().map(|(x, y)| (Value::Float(*x), *y)).collect(),
    )
}

/// Same group over a measure tagged with `extend_type`.
pub(crate) fn with_extend(group: SiblingGroup, extend_type: ExtendType) -> SiblingGroup {
    let model = group.data();
    let measure = model.measure().clone().with_extend_type(extend_type);
    let model = DataModel::new(model.table().clone(), measure).expect("fixture model");
    SiblingGroup::new(Arc::new(model), group.breakdown().clone())
}
