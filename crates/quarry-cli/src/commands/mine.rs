//! Mine command - run every detector over every sibling group.

use std::fs;
use std::time::Duration;

use colored::Colorize;
use quarry::{Miner, MinerConfig, MiningContext, MiningReport};

use super::CommandResult;
use crate::cli::MineArgs;

/// Merge the optional config file with command-line overrides.
fn build_config(args: &MineArgs) -> Result<MinerConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => MinerConfig::from_json_file(path)?,
        None => MinerConfig::default(),
    };

    config.parser = args.input.parser_config(config.parser);
    if !args.kinds.is_empty() {
        config.kinds = args.kinds.clone();
    }
    if args.top.is_some() {
        config.top_n = args.top;
    }
    if let Some(min_score) = args.min_score {
        config.min_score = min_score;
    }
    if let Some(threshold) = args.group_threshold {
        config.group_threshold = threshold;
    }
    if let Some(threshold) = args.insight_threshold {
        config.insight_threshold = threshold;
    }
    if args.sequential {
        config.parallel = false;
    }
    if args.debug {
        config.debug = true;
    }

    config.validate()?;
    Ok(config)
}

pub fn run(args: MineArgs) -> CommandResult {
    if !args.input.file.exists() {
        return Err(format!("File not found: {}", args.input.file.display()).into());
    }

    let config = build_config(&args)?;
    let miner = Miner::with_config(config);

    let mut ctx = MiningContext::new();
    if let Some(ms) = args.timeout {
        ctx = ctx.with_timeout(Duration::from_millis(ms));
    }

    let columns = (!args.columns.is_empty()).then_some(args.columns.as_slice());
    let report = miner.mine_file(&args.input.file, args.measure.measure(), columns, &ctx)?;

    if let Some(output) = &args.output {
        fs::write(output, serde_json::to_string_pretty(&report)?)?;
        if !args.json {
            println!(
                "{} {}",
                "Report written to".green(),
                output.display().to_string().white()
            );
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &MiningReport) {
    if let Some(source) = &report.source {
        println!(
            "{} {} ({} rows, {} columns, {})",
            "Mined".cyan().bold(),
            source.file.white(),
            source.row_count,
            source.column_count,
            source.format
        );
    }
    println!("Measure: {}", report.measure.to_string().white());
    let names: Vec<&str> = report.columns.iter().map(|c| c.name.as_str()).collect();
    println!("Dimensions: {}", names.join(", "));
    println!();

    let summary = &report.summary;
    println!(
        "Evaluated {} sibling groups ({} detector runs), found {} insights",
        summary.groups.to_string().white().bold(),
        summary.evaluations,
        summary.insights_found.to_string().white().bold()
    );
    for (kind, count) in &summary.insights_by_type {
        println!("  {:18} {}", kind, count);
    }
    if report.truncated {
        println!("{}", "Deadline reached; some groups were skipped.".yellow());
    }
    println!();

    if report.insights.is_empty() {
        println!("{}", "No insights above the thresholds.".yellow());
        return;
    }

    println!("{}", "Top insights:".yellow().bold());
    for (i, insight) in report.insights.iter().enumerate() {
        println!(
            "  {:>3}. {} {} {}",
            i + 1,
            format!("{:.4}", insight.score()).green(),
            format!("[{}]", insight.kind).cyan(),
            insight.description()
        );
    }
}
