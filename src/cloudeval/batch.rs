//! Batch ingestion for evaluation harnesses.
//!
//! Captured agent runs are usually stored as newline-delimited JSON (`.jsonl`), one
//! run per line, or as a single JSON array. This module reads those files into
//! [`EvaluationInput`]s, runs them through a [`RecordExtractor`], writes the resulting
//! [`EvaluationRecord`]s back out as JSONL and summarises them.
//!
//! # Input Format
//!
//! Each entry is either a bare conversation log, or an envelope carrying the log
//! together with its expected answer and measured latency:
//!
//! ```text
//! {"query":[...],"response":[...]}
//! {"log":{"messages":[...]},"ground_truth":"4","latency":1.7}
//! {"agent_data":{"conversation":[...]},"ground_truth":"Paris"}
//! ```
//!
//! Only I/O and JSON syntax are errors here. A line that is valid JSON but has no
//! recognizable conversation structure still produces a (default) record.
//!
//! # Example
//!
//! ```rust
//! use cloudeval::batch::{extract_batch, read_jsonl, write_jsonl, EvaluationSummary};
//! use cloudeval::RecordExtractor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = r#"
//! {"messages":[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]}
//! {"log":{"response":"42"},"ground_truth":"42","latency":0.5}
//! "#;
//!
//! let inputs = read_jsonl(input.as_bytes())?;
//! let records = extract_batch(&RecordExtractor::new(), &inputs);
//! assert_eq!(records[0].query, "hi");
//! assert_eq!(records[1].ground_truth, "42");
//!
//! let mut out = Vec::new();
//! write_jsonl(&mut out, &records)?;
//! assert_eq!(String::from_utf8(out)?.lines().count(), 2);
//!
//! let summary = EvaluationSummary::from_records(&records);
//! assert_eq!(summary.total, 2);
//! # Ok(())
//! # }
//! ```

use crate::cloudeval::extractor::RecordExtractor;
use crate::cloudeval::record::EvaluationRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};

/// Errors raised while reading or writing a batch.
#[derive(Debug)]
pub enum BatchError {
    /// The underlying reader or writer failed.
    Io(io::Error),
    /// A line (1-based) or document (line 0) is not valid JSON.
    InvalidJson { line: usize, message: String },
    /// A record could not be serialized for output.
    Serialize(String),
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Io(err) => write!(f, "I/O error: {}", err),
            BatchError::InvalidJson { line, message } if *line > 0 => {
                write!(f, "Invalid JSON on line {}: {}", line, message)
            }
            BatchError::InvalidJson { message, .. } => write!(f, "Invalid JSON: {}", message),
            BatchError::Serialize(message) => write!(f, "Serialization failed: {}", message),
        }
    }
}

impl Error for BatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BatchError::Io(err) => Some(err),
            BatchError::InvalidJson { .. } | BatchError::Serialize(_) => None,
        }
    }
}

impl From<io::Error> for BatchError {
    fn from(err: io::Error) -> Self {
        BatchError::Io(err)
    }
}

/// One conversation log paired with its caller-supplied evaluation data.
///
/// Deserializes through [`EvaluationInput::from_value`], so bare logs and envelopes
/// are accepted the same way by serde and by the batch readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct EvaluationInput {
    /// The raw conversation log.
    pub log: Value,
    /// Expected answer; empty when unknown.
    pub ground_truth: String,
    /// Measured latency; the extractor's default applies when `None`.
    pub latency: Option<f64>,
}

impl From<Value> for EvaluationInput {
    fn from(value: Value) -> Self {
        EvaluationInput::from_value(value)
    }
}

impl EvaluationInput {
    /// Wrap a bare log with no ground truth and no latency.
    pub fn new(log: Value) -> Self {
        Self {
            log,
            ground_truth: String::new(),
            latency: None,
        }
    }

    pub fn with_ground_truth(mut self, ground_truth: &str) -> Self {
        self.ground_truth = ground_truth.to_string();
        self
    }

    pub fn with_latency(mut self, latency: f64) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Interpret one JSON value as an input.
    ///
    /// Objects with a `log` or `agent_data` key are envelopes; `ground_truth` and
    /// `latency` are read from them when they hold a string and a number. Any other
    /// value is taken as the log itself.
    ///
    /// ```rust
    /// use cloudeval::batch::EvaluationInput;
    /// use serde_json::json;
    ///
    /// let input = EvaluationInput::from_value(json!({
    ///     "agent_data": {"response": "ok"},
    ///     "ground_truth": "ok",
    ///     "latency": 2
    /// }));
    /// assert_eq!(input.log, json!({"response": "ok"}));
    /// assert_eq!(input.ground_truth, "ok");
    /// assert_eq!(input.latency, Some(2.0));
    ///
    /// let bare = EvaluationInput::from_value(json!({"response": "ok"}));
    /// assert_eq!(bare.log, json!({"response": "ok"}));
    /// assert_eq!(bare.latency, None);
    /// ```
    pub fn from_value(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) if map.contains_key("log") || map.contains_key("agent_data") => map,
            other => return EvaluationInput::new(other),
        };

        let log = map
            .remove("log")
            .or_else(|| map.remove("agent_data"))
            .unwrap_or(Value::Null);
        let ground_truth = map
            .get("ground_truth")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let latency = map.get("latency").and_then(Value::as_f64);

        Self {
            log,
            ground_truth,
            latency,
        }
    }
}

/// Read newline-delimited JSON inputs. Blank lines are skipped.
///
/// A line that is not valid UTF-8 or not valid JSON is reported with its 1-based
/// line number.
pub fn read_jsonl<R: Read>(reader: R) -> Result<Vec<EvaluationInput>, BatchError> {
    let mut inputs = Vec::new();
    for (index, line) in BufReader::new(reader).split(b'\n').enumerate() {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let value: Value = serde_json::from_slice(&line).map_err(|err| {
            log::warn!("cloudeval::batch::read_jsonl(...): line {}: {}", index + 1, err);
            BatchError::InvalidJson {
                line: index + 1,
                message: err.to_string(),
            }
        })?;
        inputs.push(EvaluationInput::from_value(value));
    }
    log::debug!("cloudeval::batch::read_jsonl(...): {} inputs", inputs.len());
    Ok(inputs)
}

/// Read a JSON document holding an array of inputs. A single non-array value is a
/// one-element batch.
pub fn read_json_array<R: Read>(reader: R) -> Result<Vec<EvaluationInput>, BatchError> {
    let value: Value = serde_json::from_reader(reader).map_err(|err| {
        if err.is_io() {
            BatchError::Io(err.into())
        } else {
            BatchError::InvalidJson {
                line: err.line(),
                message: err.to_string(),
            }
        }
    })?;

    Ok(match value {
        Value::Array(items) => items.into_iter().map(EvaluationInput::from_value).collect(),
        other => vec![EvaluationInput::from_value(other)],
    })
}

/// Extract one record per input, preserving order.
pub fn extract_batch(extractor: &RecordExtractor, inputs: &[EvaluationInput]) -> Vec<EvaluationRecord> {
    inputs
        .iter()
        .map(|input| extractor.extract(&input.log, &input.ground_truth, input.latency))
        .collect()
}

/// Write records as newline-delimited JSON.
pub fn write_jsonl<W: Write>(mut writer: W, records: &[EvaluationRecord]) -> Result<(), BatchError> {
    for record in records {
        let line =
            serde_json::to_string(record).map_err(|err| BatchError::Serialize(err.to_string()))?;
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

/// Aggregate figures over a batch of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub total: usize,
    /// Records whose query could not be resolved.
    pub empty_queries: usize,
    /// Records whose response could not be resolved.
    pub empty_responses: usize,
    pub mean_latency: f64,
    pub mean_response_length: f64,
    pub generated_at: DateTime<Utc>,
}

impl EvaluationSummary {
    /// Summarise a batch. An empty batch has zero means.
    ///
    /// ```rust
    /// use cloudeval::batch::EvaluationSummary;
    /// use cloudeval::EvaluationRecord;
    ///
    /// let mut answered = EvaluationRecord::empty("", 1.0);
    /// answered.query = "q".into();
    /// answered.response = "abcd".into();
    /// answered.response_length = 4;
    ///
    /// let summary = EvaluationSummary::from_records(&[answered, EvaluationRecord::empty("", 3.0)]);
    /// assert_eq!(summary.total, 2);
    /// assert_eq!(summary.empty_queries, 1);
    /// assert_eq!(summary.empty_responses, 1);
    /// assert_eq!(summary.mean_latency, 2.0);
    /// assert_eq!(summary.mean_response_length, 2.0);
    /// ```
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        let total = records.len();
        let (mean_latency, mean_response_length) = if total == 0 {
            (0.0, 0.0)
        } else {
            let latency: f64 = records.iter().map(|r| r.latency).sum();
            let length: usize = records.iter().map(|r| r.response_length).sum();
            (latency / total as f64, length as f64 / total as f64)
        };

        Self {
            total,
            empty_queries: records.iter().filter(|r| r.query.is_empty()).count(),
            empty_responses: records.iter().filter(|r| r.response.is_empty()).count(),
            mean_latency,
            mean_response_length,
            generated_at: Utc::now(),
        }
    }
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records ({} without query, {} without response), mean latency {:.2}s, mean response length {:.1} chars",
            self.total,
            self.empty_queries,
            self.empty_responses,
            self.mean_latency,
            self.mean_response_length
        )
    }
}
