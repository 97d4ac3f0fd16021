//! Input parsing and data source handling.

mod parser;
mod source;
mod value;

pub use parser::{detect_delimiter, Parser, ParserConfig};
pub use source::{DataTable, SourceMetadata};
pub use value::{format_number, Value};
