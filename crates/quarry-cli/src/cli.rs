//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use quarry::{Aggregation, InsightKind, Measure, MeasureType, ParserConfig, TransformKind};

/// Quarry: insight mining for tabular datasets
#[derive(Parser)]
#[command(name = "quarry")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mine every sibling group of a file for insights
    Mine(MineArgs),

    /// Run one detector on one breakdown column
    Detect(DetectArgs),

    /// List the sibling groups above the impact threshold
    Groups(GroupsArgs),

    /// Derive a new measure (rate, rank, increase, sub_avg)
    Transform(TransformArgs),
}

/// Input file and parsing options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to the data file (CSV/TSV/JSON)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Columns to read as date series (e.g. Year, Month)
    #[arg(long, value_delimiter = ',')]
    pub series: Vec<String>,
}

impl InputArgs {
    pub fn parser_config(&self, mut base: ParserConfig) -> ParserConfig {
        base.series_columns.extend(self.series.iter().cloned());
        base
    }
}

/// Measure selection shared by every command.
#[derive(Args, Debug, Clone)]
pub struct MeasureArgs {
    /// Measure column
    #[arg(short, long)]
    pub measure: String,

    /// Display name for the measure (default: the column name)
    #[arg(long)]
    pub name: Option<String>,

    /// Measure type
    #[arg(long = "type", default_value = "quantity")]
    pub measure_type: MeasureType,

    /// Aggregation (default: sum for quantity, max for ratio)
    #[arg(long)]
    pub agg: Option<Aggregation>,
}

impl MeasureArgs {
    pub fn measure(&self) -> Measure {
        let name = self.name.clone().unwrap_or_else(|| self.measure.clone());
        Measure::new(name, self.measure.clone(), self.measure_type).with_agg(self.agg)
    }
}

#[derive(Args, Debug)]
pub struct MineArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub measure: MeasureArgs,

    /// Dimensions to analyze (default: all non-constant columns)
    #[arg(short, long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// JSON configuration file; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Insight types to run (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub kinds: Vec<InsightKind>,

    /// Keep only the N best insights
    #[arg(short = 'n', long)]
    pub top: Option<usize>,

    /// Drop insights scoring below this
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Minimum sibling group impact
    #[arg(long)]
    pub group_threshold: Option<f64>,

    /// Minimum insight score and significance
    #[arg(long)]
    pub insight_threshold: Option<f64>,

    /// Evaluate groups on one thread
    #[arg(long)]
    pub sequential: bool,

    /// Skip detector applicability checks
    #[arg(long)]
    pub debug: bool,

    /// Stop evaluating groups after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Write the JSON report to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the JSON report instead of a summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub measure: MeasureArgs,

    /// Breakdown column
    #[arg(short, long)]
    pub breakdown: String,

    /// Insight type (e.g. Trend, OutstandingFirst)
    #[arg(short, long)]
    pub kind: InsightKind,

    /// Skip the detector applicability check
    #[arg(long)]
    pub debug: bool,

    /// Print the insight as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct GroupsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub measure: MeasureArgs,

    /// Dimensions to analyze (default: all non-constant columns)
    #[arg(short, long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Minimum sibling group impact
    #[arg(short, long, default_value = "0.01")]
    pub threshold: f64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TransformArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub measure: MeasureArgs,

    /// Column to group by
    #[arg(short, long)]
    pub column: String,

    /// Transform to apply
    #[arg(short, long)]
    pub kind: TransformKind,

    /// Output path for the derived table
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "csv")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use csv, tsv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_mine() {
        let cli = Cli::parse_from([
            "quarry", "mine", "sales.csv", "-m", "Sale", "--kinds", "Trend,evenness", "-n", "5",
            "--series", "Year",
        ]);
        let Commands::Mine(args) = cli.command else {
            panic!("expected mine");
        };
        assert_eq!(args.kinds, vec![InsightKind::Trend, InsightKind::Evenness]);
        assert_eq!(args.top, Some(5));
        assert_eq!(args.input.series, vec!["Year"]);
        assert_eq!(args.measure.measure().column, "Sale");
    }

    #[test]
    fn test_parse_transform() {
        let cli = Cli::parse_from([
            "quarry", "transform", "sales.csv", "-m", "Sale", "-c", "Year", "-k", "sub-avg",
            "--type", "ratio",
        ]);
        let Commands::Transform(args) = cli.command else {
            panic!("expected transform");
        };
        assert_eq!(args.kind, TransformKind::SubAvg);
        assert_eq!(args.measure.measure().measure_type, MeasureType::Ratio);
        assert_eq!(args.format, OutputFormat::Csv);
    }
}
