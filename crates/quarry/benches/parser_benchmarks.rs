//! Parser performance benchmarks.
//!
//! Measures parsing and type inference across table sizes and formats.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quarry::Parser;
use std::io::Write;
use tempfile::NamedTempFile;

/// Generate a synthetic sales table with the specified number of rows.
fn generate_sales_csv(rows: usize) -> String {
    let brands = ["Honda", "Toyota", "Ford", "BMW", "Kia", "Audi"];
    let regions = ["North", "South", "East", "West"];

    let mut data = String::from("Year,Month,Brand,Region,Price,Sale\n");
    for row in 0..rows {
        data.push_str(&format!(
            "{},{:02},{},{},{:.2},{}\n",
            2010 + (row % 10),
            (row % 12) + 1,
            brands[row % brands.len()],
            regions[(row / 7) % regions.len()],
            10_000.0 + (row % 97) as f64 * 125.5,
            (row * 37) % 500 + 20,
        ));
    }
    data
}

/// Same records as a JSON array.
fn generate_sales_json(rows: usize) -> String {
    let records: Vec<serde_json::Value> = generate_sales_csv(rows)
        .lines()
        .skip(1)
        .map(|line| {
            let cells: Vec<&str> = line.split(',').collect();
            serde_json::json!({
                "Year": cells[0].parse::<i64>().unwrap(),
                "Month": cells[1],
                "Brand": cells[2],
                "Region": cells[3],
                "Price": cells[4].parse::<f64>().unwrap(),
                "Sale": cells[5].parse::<i64>().unwrap(),
            })
        })
        .collect();
    serde_json::to_string(&records).unwrap()
}

/// Benchmark parsing CSV files of various sizes.
fn bench_parse_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_csv");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_sales_csv(*rows);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter_with_setup(
                || {
                    let mut temp = NamedTempFile::with_suffix(".csv").unwrap();
                    temp.write_all(data.as_bytes()).unwrap();
                    temp
                },
                |temp| {
                    let parser = Parser::new();
                    black_box(parser.parse_file(temp.path()).unwrap())
                },
            )
        });
    }

    group.finish();
}

/// Benchmark in-memory parsing, without file I/O or hashing.
fn bench_parse_str(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_str");

    for rows in [1_000, 10_000].iter() {
        let data = generate_sales_csv(*rows);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            let parser = Parser::new();
            b.iter(|| black_box(parser.parse_str(data).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark parsing JSON record arrays.
fn bench_parse_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_json");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_sales_json(*rows);

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            let parser = Parser::new();
            b.iter(|| black_box(parser.parse_json(data.as_bytes()).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_csv, bench_parse_str, bench_parse_json);
criterion_main!(benches);
