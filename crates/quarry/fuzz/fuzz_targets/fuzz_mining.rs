//! Fuzz target for the mining pipeline.
//!
//! Arbitrary small tables must mine without panicking, and every insight
//! must keep its scores inside [0, 1].

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quarry::{DataTable, Measure, Miner, MinerConfig, MiningContext};

#[derive(Debug, Arbitrary)]
struct Input {
    rows: Vec<(u8, u8, i16, Option<f32>)>,
    debug: bool,
}

fuzz_target!(|input: Input| {
    if input.rows.len() > 200 {
        return;
    }

    let rows: Vec<Vec<String>> = input
        .rows
        .iter()
        .map(|(a, b, year, sale)| {
            vec![
                format!("A{}", a % 8),
                format!("B{}", b % 4),
                (2000 + i32::from(*year % 30)).to_string(),
                sale.map(|s| s.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    let headers = ["Brand", "Region", "Year", "Sale"].map(String::from).to_vec();
    let table = DataTable::from_raw(headers, rows);

    let miner = Miner::with_config(MinerConfig {
        debug: input.debug,
        parallel: false,
        ..Default::default()
    });
    let Ok(report) = miner.mine_table(table, Measure::quantity("Sale"), None, &MiningContext::new()) else {
        return;
    };

    for insight in &report.insights {
        assert!((0.0..=1.0).contains(&insight.impact));
        assert!((0.0..=1.0).contains(&insight.significance));
        let _ = serde_json::to_string(insight);
    }
});
