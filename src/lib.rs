//! # CloudEval
//!
//! CloudEval turns the conversation logs produced by multi-agent runs (concurrent,
//! sequential, group-chat, handoff or magentic orchestrations) into flat evaluation
//! records that downstream scoring tooling can consume.
//!
//! Agent frameworks and logging pipelines disagree on how a conversation is recorded.
//! Some write a `query`/`response` pair of message arrays with typed content blocks,
//! some a flat `messages` array, some a `conversation` transcript. CloudEval reconciles
//! these shapes into one [`EvaluationRecord`]:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `query` | The user's question |
//! | `ground_truth` | Expected answer supplied by the caller |
//! | `response` | The final assistant answer |
//! | `context` | System instructions joined by the context separator |
//! | `latency` | Caller-measured latency, or the `8.5` sentinel |
//! | `response_length` | Character count of `response` |
//!
//! Extraction never fails. Missing or malformed input degrades to empty fields.
//!
//! ## Core Concepts
//!
//! ### Extracting a record
//!
//! [`extract_agent_data`] is the one-call entry point:
//!
//! ```rust
//! use cloudeval::extract_agent_data;
//! use serde_json::json;
//!
//! let log = json!({
//!     "messages": [
//!         {"role": "user", "content": "hi"},
//!         {"role": "assistant", "content": "hello"}
//!     ]
//! });
//!
//! let record = extract_agent_data(&log, "hello", Some(0.8));
//! assert_eq!(record.query, "hi");
//! assert_eq!(record.response, "hello");
//! assert_eq!(record.response_length, 5);
//! ```
//!
//! ### Typed decoding
//!
//! The [`conversation`] module decodes the untrusted JSON once into tagged variants
//! ([`conversation::Content`], [`conversation::ResponseField`], ...). The
//! [`extractor`] module then resolves each field by pattern matching over them.
//!
//! ### Configuration
//!
//! [`RecordExtractor`] takes an [`ExtractorConfig`] to change the latency sentinel,
//! the context separator, or to merge auxiliary context (`tools`, `metadata`, response
//! timestamps and run ids) into the `context` string.
//!
//! ### Batches
//!
//! The [`batch`] module reads JSONL or JSON-array files of captured runs, extracts
//! records in order, writes them back out as JSONL and summarises them.
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use cloudeval::batch::{extract_batch, read_jsonl, write_jsonl, EvaluationSummary};
//! use cloudeval::RecordExtractor;
//! use std::fs::File;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     cloudeval::init_logger();
//!
//!     let inputs = read_jsonl(File::open("runs.jsonl")?)?;
//!     let records = extract_batch(&RecordExtractor::new(), &inputs);
//!     write_jsonl(File::create("records.jsonl")?, &records)?;
//!
//!     log::info!("{}", EvaluationSummary::from_records(&records));
//!     Ok(())
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// The helper is intentionally lightweight so that applications embedding CloudEval can opt-in
/// to simple `RUST_LOG` driven diagnostics without having to choose a specific logging backend
/// upfront.
///
/// ```rust
/// cloudeval::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `cloudeval` module.
pub mod cloudeval;

// Re-exporting key items for easier external access.
pub use cloudeval::batch;
pub use cloudeval::config;
pub use cloudeval::config::ExtractorConfig;
pub use cloudeval::conversation;
pub use cloudeval::conversation::{Content, ContentBlock, ConversationLog, LogMessage, ResponseField};
pub use cloudeval::extractor;
pub use cloudeval::extractor::{extract_agent_data, AuxiliaryContext, RecordExtractor};
pub use cloudeval::record::EvaluationRecord;
