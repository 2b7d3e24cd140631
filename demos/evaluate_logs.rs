//! Convert a file of captured agent runs into evaluation records.
//!
//! Reads newline-delimited JSON (or a JSON array when the file ends in `.json`),
//! prints one evaluation record per line to stdout and a summary to stderr.
//!
//! Run with: cargo run --example evaluate_logs -- runs.jsonl
//!
//! Set `MERGE_AUXILIARY_CONTEXT=1` to append tools, metadata and run info to each
//! record's context, and `RUST_LOG=debug` to see which fallback each record used.

use cloudeval::batch::{extract_batch, read_json_array, read_jsonl, write_jsonl, EvaluationSummary};
use cloudeval::{ExtractorConfig, RecordExtractor};
use std::env;
use std::fs::File;
use std::io;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    cloudeval::init_logger();

    let path = env::args()
        .nth(1)
        .ok_or("usage: evaluate_logs <runs.jsonl | runs.json>")?;

    let file = File::open(&path)?;
    let inputs = if path.ends_with(".json") {
        read_json_array(file)?
    } else {
        read_jsonl(file)?
    };

    let config = ExtractorConfig {
        merge_auxiliary_context: env::var("MERGE_AUXILIARY_CONTEXT").map_or(false, |v| v == "1"),
        ..ExtractorConfig::default()
    };
    let records = extract_batch(&RecordExtractor::with_config(config), &inputs);

    write_jsonl(io::stdout().lock(), &records)?;
    eprintln!("{}", EvaluationSummary::from_records(&records));
    Ok(())
}
