//! Transform command - derive a measure and export the grouped table.

use std::fs::File;
use std::io::{self, Write};

use colored::Colorize;
use quarry::{ParserConfig, TransformEngine};

use super::{load_table, CommandResult};
use crate::cli::{OutputFormat, TransformArgs};

pub fn run(args: TransformArgs) -> CommandResult {
    let table = load_table(&args.input.file, args.input.parser_config(ParserConfig::default()))?;
    let result = TransformEngine::new().apply(&table, &args.column, &args.measure.measure(), args.kind)?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    match args.format {
        OutputFormat::Csv => result.table.write_csv(&mut writer, b',')?,
        OutputFormat::Tsv => result.table.write_csv(&mut writer, b'\t')?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &result.table.to_records())?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;

    if let Some(path) = &args.output {
        eprintln!(
            "{} {} ({} groups) to {}",
            "Wrote".green(),
            result.description(),
            result.table.row_count(),
            path.display().to_string().white()
        );
        eprintln!("Derived measure: {}", result.measure.to_string().cyan());
    }

    Ok(())
}
