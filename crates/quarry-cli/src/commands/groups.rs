//! Groups command - list sibling groups by impact.

use std::sync::Arc;

use colored::Colorize;
use quarry::{DataModel, ParserConfig, SiblingGroupContainer};
use serde::Serialize;

use super::{load_table, CommandResult};
use crate::cli::GroupsArgs;

#[derive(Serialize)]
struct GroupRow<'a> {
    breakdown: &'a str,
    filters: String,
    impact: f64,
    points: usize,
}

pub fn run(args: GroupsArgs) -> CommandResult {
    let table = load_table(&args.input.file, args.input.parser_config(ParserConfig::default()))?;
    let columns = (!args.columns.is_empty()).then_some(args.columns.as_slice());
    let model = DataModel::with_columns(table, args.measure.measure(), columns)?;
    let container = SiblingGroupContainer::construct_from_data_model(Arc::new(model), args.threshold);

    let rows: Vec<GroupRow<'_>> = container
        .iter()
        .map(|group| GroupRow {
            breakdown: &group.breakdown().name,
            filters: group.filter_label(),
            impact: group.impact(),
            points: group.get_data().len(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{} sibling groups with impact >= {}",
        rows.len().to_string().white().bold(),
        args.threshold
    );
    println!();
    println!("  {:>8}  {:>6}  {:20} {}", "impact", "points", "breakdown", "filters");
    for row in &rows {
        println!(
            "  {:>8}  {:>6}  {:20} {}",
            format!("{:.4}", row.impact).green(),
            row.points,
            row.breakdown,
            row.filters.dimmed()
        );
    }

    Ok(())
}
