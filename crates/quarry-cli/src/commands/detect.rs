//! Detect command - evaluate one insight type on one breakdown.

use colored::Colorize;
use quarry::{Miner, MinerConfig, ParserConfig};

use super::{load_table, CommandResult};
use crate::cli::DetectArgs;

/// Printed when the detector finds nothing.
const NO_CONCLUSION: &str = "无分析结论";

pub fn run(args: DetectArgs) -> CommandResult {
    let table = load_table(&args.input.file, args.input.parser_config(ParserConfig::default()))?;

    let miner = Miner::with_config(MinerConfig {
        debug: args.debug,
        ..Default::default()
    });
    let found = miner.analyze(table, &args.breakdown, args.measure.measure(), args.kind)?;

    match (found, args.json) {
        (Some(insight), true) => println!("{}", serde_json::to_string_pretty(&insight)?),
        (None, true) => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "description": NO_CONCLUSION }))?
        ),
        (Some(insight), false) => {
            println!(
                "{} {}",
                format!("[{}]", insight.kind).cyan().bold(),
                insight.description()
            );
            println!(
                "  impact={:.4} significance={:.4} score={:.4}",
                insight.impact,
                insight.significance,
                insight.score()
            );
        }
        (None, false) => println!("{}", NO_CONCLUSION.yellow()),
    }

    Ok(())
}
