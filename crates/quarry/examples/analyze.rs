//! Example: Mine a tabular data file with Quarry.
//!
//! Usage:
//!   cargo run --example analyze -- <file_path> <measure_column> [top_n]
//!
//! Example:
//!   cargo run --example analyze -- sales.csv Sale 10

use std::env;
use std::path::Path;

use quarry::{Measure, Miner, MinerConfig, MiningContext};

fn main() -> quarry::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: cargo run --example analyze -- <file_path> <measure_column> [top_n]");
        eprintln!("\nExample:");
        eprintln!("  cargo run --example analyze -- sales.csv Sale 10");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    let top_n = args.get(3).and_then(|n| n.parse().ok()).or(Some(10));
    let miner = Miner::with_config(MinerConfig {
        top_n,
        ..Default::default()
    });
    let report = miner.mine_file(path, Measure::quantity(&args[2]), None, &MiningContext::new())?;

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Quarry Mining: {}", path.display());
    println!("{}", separator);
    println!();

    if let Some(source) = &report.source {
        println!("## Source Metadata");
        println!("  Format: {}", source.format);
        println!("  Rows: {}", source.row_count);
        println!("  Columns: {}", source.column_count);
        println!();
    }

    println!("## Summary");
    println!("  Measure: {}", report.measure);
    println!("  Sibling groups: {}", report.summary.groups);
    println!("  Evaluations: {}", report.summary.evaluations);
    println!("  Insights found: {}", report.summary.insights_found);
    for (kind, count) in &report.summary.insights_by_type {
        println!("    {}: {}", kind, count);
    }
    println!();

    println!("## Top Insights");
    for (i, insight) in report.insights.iter().enumerate() {
        println!(
            "  {:>2}. [{}] score={:.4} {}",
            i + 1,
            insight.kind,
            insight.score(),
            insight.description()
        );
    }

    Ok(())
}
