//! The flat evaluation record produced for every conversation log.

use serde::{Deserialize, Serialize};

/// One normalized row for downstream evaluation and scoring tooling.
///
/// All six fields are always present. Missing input data degrades to empty strings
/// and a zero `response_length`, never to an absent field.
///
/// Serializes with the field order `query`, `ground_truth`, `response`, `context`,
/// `latency`, `response_length`:
///
/// ```rust
/// use cloudeval::EvaluationRecord;
///
/// let record = EvaluationRecord::empty("4", 8.5);
/// assert_eq!(
///     serde_json::to_string(&record).unwrap(),
///     r#"{"query":"","ground_truth":"4","response":"","context":"","latency":8.5,"response_length":0}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// The user's question.
    pub query: String,
    /// Expected answer supplied by the caller.
    pub ground_truth: String,
    /// The final assistant answer.
    pub response: String,
    /// System instructions joined with the context separator.
    pub context: String,
    /// Measured latency in seconds, or the configured sentinel.
    pub latency: f64,
    /// Character count of `response`.
    pub response_length: usize,
}

impl EvaluationRecord {
    /// The all-default record: empty query, response and context.
    pub fn empty(ground_truth: &str, latency: f64) -> Self {
        Self {
            query: String::new(),
            ground_truth: ground_truth.to_string(),
            response: String::new(),
            context: String::new(),
            latency,
            response_length: 0,
        }
    }
}
