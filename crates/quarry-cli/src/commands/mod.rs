//! CLI command implementations.

pub mod detect;
pub mod groups;
pub mod mine;
pub mod transform;

use std::path::Path;

use quarry::{DataTable, Parser, ParserConfig};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Parse an input file, failing early with a readable message when it is missing.
pub fn load_table(file: &Path, config: ParserConfig) -> Result<DataTable, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    let (table, _) = Parser::with_config(config).parse_file(file)?;
    Ok(table)
}
