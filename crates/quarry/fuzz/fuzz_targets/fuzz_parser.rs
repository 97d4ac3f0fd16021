//! Fuzz target for the data parser.
//!
//! The delimited and JSON parsers must never panic on malformed input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quarry::Parser;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    let _ = parser.parse_json(data);

    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            let _ = parser.parse_file(temp_file.path());
        }
    }
});
