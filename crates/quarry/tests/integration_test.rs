//! Integration tests for Quarry.

use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;

use quarry::{
    Column, DataModel, DetectOptions, InsightKind, Measure, Miner, MinerConfig, MiningContext,
    Parser, ParserConfig, QuarryError, SiblingGroup, SiblingGroupContainer, TransformEngine,
    TransformKind, Value,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

const SALES: &str = "Year,Brand,Sale\n\
    2010,H,40\n2010,T,38\n2010,F,13\n2010,B,20\n\
    2011,H,35\n2011,T,34\n2011,F,10\n2011,B,18\n\
    2012,H,36\n2012,T,34\n2012,F,14\n2012,B,20\n\
    2013,H,43\n2013,T,29\n2013,F,23\n2013,B,17\n\
    2014,H,58\n2014,T,36\n2014,F,27\n2014,B,19\n";

fn model_from(csv: &str) -> Arc<DataModel> {
    let table = Parser::new().parse_str(csv).expect("parse");
    Arc::new(DataModel::new(table, Measure::quantity("Sale")).expect("model"))
}

fn unfiltered(model: &Arc<DataModel>, breakdown: &str) -> SiblingGroup {
    let column = model.column(breakdown).cloned().expect("breakdown column");
    SiblingGroup::new(model.clone(), column)
}

// =============================================================================
// Detector Scenarios
// =============================================================================

#[test]
fn test_brand_breakdown_is_even_not_outstanding() {
    let model = model_from("Brand,Sale\nH,40\nT,38\nF,13\nB,20\n");
    let group = unfiltered(&model, "Brand");
    let options = DetectOptions::default();

    let evenness = InsightKind::Evenness
        .evaluate(&group, &options)
        .expect("evenness should fire");
    assert_eq!(evenness.insight["breakdown"], "Brand");
    assert_eq!(evenness.impact, 1.0);

    assert!(!InsightKind::OutstandingFirst.check(&group, &group.get_data()));
    assert!(InsightKind::OutstandingFirst.evaluate(&group, &options).is_none());
}

#[test]
fn test_yearly_rise_is_an_upward_trend() {
    let miner = Miner::new();
    let table = Parser::new()
        .parse_str("Year,Sale\n2010,10\n2011,14\n2012,19\n2013,25\n2014,31\n")
        .unwrap();

    let insight = miner
        .analyze(table, "Year", Measure::quantity("Sale"), InsightKind::Trend)
        .unwrap()
        .expect("trend should fire");

    assert_eq!(insight.insight["trend"], "上升");
    assert!(insight.insight["slope"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_dominant_category_is_attribution_not_outstanding() {
    let model = model_from("Brand,Sale\nH,80\nT,10\nF,5\nB,5\n");
    let group = unfiltered(&model, "Brand");
    let frame = group.get_data();

    assert!(InsightKind::Attribution.check(&group, &frame));
    assert!(!InsightKind::OutstandingFirst.check(&group, &frame));

    let insight = InsightKind::Attribution
        .evaluate(&group, &DetectOptions::default())
        .expect("attribution should fire");
    assert!(insight.significance > 0.99);
    let max_value = insight.insight["max_value"].as_object().unwrap();
    assert_eq!(max_value["Brand"], "H");
    assert_eq!(max_value["Sale"], 80);
    assert!((max_value["rate"].as_f64().unwrap() - 0.8).abs() < 1e-12);
}

#[test]
fn test_analyze_reports_nothing_for_flat_series() {
    let table = Parser::new()
        .parse_str("Year,Sale\n2010,10\n2011,10\n2012,10\n2013,10\n")
        .unwrap();
    let result = Miner::new()
        .analyze(table, "Year", Measure::quantity("Sale"), InsightKind::Trend)
        .unwrap();
    assert!(result.is_none());
}

// =============================================================================
// Data Model and Sibling Groups
// =============================================================================

#[test]
fn test_all_null_measure_is_rejected() {
    let table = Parser::new().parse_str("Brand,Sale\nH,\nT,NA\nF,\n").unwrap();
    let err = DataModel::new(table, Measure::quantity("Sale")).unwrap_err();
    assert!(matches!(err, QuarryError::EmptyData(_)));
}

#[test]
fn test_constant_columns_never_become_dimensions() {
    let model = model_from("Region,Brand,Sale\nEU,H,1\nEU,T,2\nEU,F,3\n");
    let names: Vec<&str> = model.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Brand"]);
}

#[test]
fn test_container_is_sorted_and_above_threshold() {
    let model = model_from(SALES);
    let container = SiblingGroupContainer::construct_from_data_model(model, 0.05);

    assert!(!container.is_empty());
    let impacts: Vec<f64> = container.iter().map(|g| g.impact()).collect();
    assert!(impacts.windows(2).all(|w| w[0] >= w[1]));
    for group in &container {
        assert!(group.impact() >= 0.05);
        if group.filters().is_empty() {
            assert!((0.0..=1.0).contains(&group.impact()));
        } else {
            assert_eq!(group.impact(), 1.0);
        }
    }
}

#[test]
fn test_get_data_is_idempotent() {
    let model = model_from(SALES);
    let column = model.column("Year").cloned().unwrap();
    let filter = quarry::FilterColumn::eq(model.column("Brand").cloned().unwrap(), Value::from("H"));
    let group = SiblingGroup::with_filters(model, column, vec![filter]);

    let first = group.get_data();
    let second = group.get_data();
    assert_eq!(first.rows, second.rows);
    assert_eq!(first.values(), vec![40.0, 35.0, 36.0, 43.0, 58.0]);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_insight_json_holds_native_values() {
    let report = Miner::new()
        .mine_table(
            Parser::new().parse_str(SALES).unwrap(),
            Measure::quantity("Sale"),
            None,
            &MiningContext::new(),
        )
        .unwrap();
    assert!(!report.insights.is_empty());

    let json = serde_json::to_value(&report).unwrap();
    for insight in json["insights"].as_array().unwrap() {
        assert!(insight["type"].is_string());
        assert!(insight["score"].is_number());
        assert!(insight["insight"]["description"].is_string());
        for record in insight["data"].as_array().into_iter().flatten() {
            for value in record.as_object().unwrap().values() {
                assert!(value.is_number() || value.is_string() || value.is_null());
            }
        }
    }
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn test_mine_file_with_series_column() {
    let file = create_test_file(SALES, ".csv");
    let config = MinerConfig {
        parser: ParserConfig {
            series_columns: vec!["Year".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };

    let report = Miner::with_config(config)
        .mine_file(file.path(), Measure::quantity("Sale"), None, &MiningContext::new())
        .expect("mining failed");

    let source = report.source.as_ref().unwrap();
    assert_eq!(source.row_count, 20);
    assert_eq!(source.format, "csv");
    assert!(report.columns.contains(&Column::new("Year", true, false)));
    assert!(report
        .insights
        .iter()
        .any(|i| i.kind == InsightKind::Trend && i.insight["breakdown"] == "Year"));
}

#[test]
fn test_mine_json_records() {
    let json = r#"[
        {"Brand": "H", "Sale": 40},
        {"Brand": "T", "Sale": 38},
        {"Brand": "F", "Sale": 13},
        {"Brand": "B", "Sale": 20}
    ]"#;
    let file = create_test_file(json, ".json");
    let report = Miner::new()
        .mine_file(file.path(), Measure::quantity("Sale"), None, &MiningContext::new())
        .unwrap();

    assert_eq!(report.source.as_ref().unwrap().format, "json");
    assert!(report.insights.iter().any(|i| i.kind == InsightKind::Evenness));
}

#[test]
fn test_transform_then_mine() {
    let table = Parser::new().parse_str(SALES).unwrap();
    let result = TransformEngine::new()
        .apply(&table, "Brand", &Measure::quantity("Sale"), TransformKind::Rank)
        .unwrap();
    assert_eq!(result.table.headers[2], "Rank(Sale)");

    // Rank measures are excluded from the value-shape detectors.
    let model = Arc::new(DataModel::new(result.table, result.measure).unwrap());
    let group = unfiltered(&model, "Brand");
    let frame = group.get_data();
    assert!(!InsightKind::OutstandingFirst.check(&group, &frame));
    assert!(!InsightKind::Attribution.check(&group, &frame));
}

#[test]
fn test_unknown_measure_column() {
    let err = Miner::new()
        .mine_table(
            Parser::new().parse_str(SALES).unwrap(),
            Measure::quantity("Profit"),
            None,
            &MiningContext::new(),
        )
        .unwrap_err();
    assert!(matches!(err, QuarryError::UnknownColumn(_)));
}
