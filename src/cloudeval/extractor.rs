//! Conversation record extraction.
//!
//! [`RecordExtractor`] turns one heterogeneous conversation log into one
//! [`EvaluationRecord`]. Extraction is total: malformed or partial input degrades to
//! empty fields and never produces an error.
//!
//! # Resolution order
//!
//! ```text
//! query     1. last user message in `query`     (first text block, or plain string)
//!           2. first user message in `messages` (only if `messages` is present)
//!           3. first entry of `conversation`    (`content`, else `message`)
//!
//! context   system messages of `query`, joined with " | "
//!
//! response  1. last non-empty assistant message in `response`, or `response` as a string
//!           2. first assistant message in `messages`
//!           3. last assistant message in `conversation` (plain `content` only)
//! ```
//!
//! Each fallback only runs while the value resolved so far is empty.
//!
//! # Example
//!
//! ```rust
//! use cloudeval::extract_agent_data;
//! use serde_json::json;
//!
//! let log = json!({
//!     "query": [
//!         {"role": "system", "content": "You are helpful."},
//!         {"role": "user", "content": [{"type": "text", "text": "What is 2+2?"}]}
//!     ],
//!     "response": [
//!         {"role": "assistant", "content": [{"type": "text", "text": "4"}]}
//!     ]
//! });
//!
//! let record = extract_agent_data(&log, "4", None);
//! assert_eq!(record.query, "What is 2+2?");
//! assert_eq!(record.response, "4");
//! assert_eq!(record.context, "You are helpful.");
//! assert_eq!(record.latency, 8.5);
//! assert_eq!(record.response_length, 1);
//! ```

use crate::cloudeval::config::ExtractorConfig;
use crate::cloudeval::conversation::{ConversationLog, ResponseField};
use crate::cloudeval::record::EvaluationRecord;
use serde_json::Value;

/// Extract an [`EvaluationRecord`] with the default [`ExtractorConfig`].
///
/// `latency` falls back to `8.5` when `None`. Non-object input yields the
/// all-default record.
///
/// ```rust
/// use cloudeval::extract_agent_data;
/// use serde_json::json;
///
/// let record = extract_agent_data(&json!(42), "", Some(1.25));
/// assert_eq!(record.query, "");
/// assert_eq!(record.response, "");
/// assert_eq!(record.latency, 1.25);
/// ```
pub fn extract_agent_data(raw: &Value, ground_truth: &str, latency: Option<f64>) -> EvaluationRecord {
    RecordExtractor::new().extract(raw, ground_truth, latency)
}

/// Context fragments carried by a log besides its system messages.
///
/// These are always computed but only appended to the record's `context` when
/// [`ExtractorConfig::merge_auxiliary_context`] is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxiliaryContext {
    /// Compact JSON of the `tools` field, when present.
    pub tools: Option<String>,
    /// Compact JSON of the `metadata` field, when present.
    pub metadata: Option<String>,
    /// `createdAt` of the first assistant message in `response`, when non-empty.
    pub response_created_at: Option<String>,
    /// `run_id` of the first assistant message in `response`, when non-empty.
    pub run_id: Option<String>,
}

impl AuxiliaryContext {
    /// Collect the auxiliary fragments of a decoded log.
    pub fn from_log(log: &ConversationLog) -> Self {
        let mut aux = AuxiliaryContext {
            tools: log.tools.as_ref().map(Value::to_string),
            metadata: log.metadata.as_ref().map(Value::to_string),
            ..AuxiliaryContext::default()
        };

        if let ResponseField::Messages(items) = &log.response {
            if let Some(first) = items.iter().flatten().find(|m| m.role_is("assistant")) {
                aux.response_created_at = first.created_at.clone().filter(|s| !s.is_empty());
                aux.run_id = first.run_id.clone().filter(|s| !s.is_empty());
            }
        }

        aux
    }

    /// Labelled fragments in merge order.
    ///
    /// ```rust
    /// use cloudeval::extractor::AuxiliaryContext;
    ///
    /// let aux = AuxiliaryContext {
    ///     tools: Some("[\"search\"]".into()),
    ///     run_id: Some("run_42".into()),
    ///     ..AuxiliaryContext::default()
    /// };
    /// assert_eq!(aux.fragments(), vec!["Tools: [\"search\"]", "Run ID: run_42"]);
    /// ```
    pub fn fragments(&self) -> Vec<String> {
        let labelled = [
            ("Tools", &self.tools),
            ("Metadata", &self.metadata),
            ("Response created", &self.response_created_at),
            ("Run ID", &self.run_id),
        ];
        labelled
            .iter()
            .filter_map(|(label, value)| value.as_deref().map(|v| format!("{}: {}", label, v)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_none()
            && self.metadata.is_none()
            && self.response_created_at.is_none()
            && self.run_id.is_none()
    }
}

/// Normalizes conversation logs into [`EvaluationRecord`]s.
///
/// The extractor holds only its configuration and can be shared freely across
/// threads.
///
/// # Example
///
/// ```rust
/// use cloudeval::{ExtractorConfig, RecordExtractor};
/// use serde_json::json;
///
/// let extractor = RecordExtractor::with_config(ExtractorConfig {
///     merge_auxiliary_context: true,
///     ..ExtractorConfig::default()
/// });
///
/// let log = json!({
///     "query": [{"role": "system", "content": "Be brief."}],
///     "metadata": {"team": "physics"}
/// });
///
/// let record = extractor.extract(&log, "", Some(0.3));
/// assert_eq!(record.context, r#"Be brief. | Metadata: {"team":"physics"}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordExtractor {
    config: ExtractorConfig,
}

impl RecordExtractor {
    /// Create an extractor with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract a record from a raw JSON value.
    ///
    /// Returns the all-default record (keeping `ground_truth` and `latency`) when
    /// `raw` is not a JSON object.
    pub fn extract(&self, raw: &Value, ground_truth: &str, latency: Option<f64>) -> EvaluationRecord {
        match ConversationLog::decode(raw) {
            Some(log) => self.extract_log(&log, ground_truth, latency),
            None => {
                log::debug!("cloudeval: input is not an object, emitting default record");
                EvaluationRecord::empty(ground_truth, self.resolve_latency(latency))
            }
        }
    }

    /// Extract a record from an already decoded log.
    pub fn extract_log(
        &self,
        log: &ConversationLog,
        ground_truth: &str,
        latency: Option<f64>,
    ) -> EvaluationRecord {
        let query = resolve_query(log);
        let response = resolve_response(log);
        let mut context = self.resolve_context(log);

        if self.config.merge_auxiliary_context {
            let fragments = self.auxiliary_context(log).fragments();
            if !fragments.is_empty() {
                let extra = fragments.join(self.config.context_separator.as_str());
                context = if context.is_empty() {
                    extra
                } else {
                    format!("{}{}{}", context, self.config.context_separator, extra)
                };
            }
        }

        let response_length = response.chars().count();
        EvaluationRecord {
            query,
            ground_truth: ground_truth.to_string(),
            response,
            context,
            latency: self.resolve_latency(latency),
            response_length,
        }
    }

    /// Auxiliary fragments of a log, whether or not they are merged into `context`.
    pub fn auxiliary_context(&self, log: &ConversationLog) -> AuxiliaryContext {
        AuxiliaryContext::from_log(log)
    }

    fn resolve_latency(&self, latency: Option<f64>) -> f64 {
        latency.unwrap_or(self.config.default_latency)
    }

    fn resolve_context(&self, log: &ConversationLog) -> String {
        let parts: Vec<&str> = log
            .query_messages()
            .filter(|m| m.role_is("system"))
            .map(|m| m.content.extract_text().unwrap_or(""))
            .collect();
        parts.join(self.config.context_separator.as_str())
    }
}

fn resolve_query(log: &ConversationLog) -> String {
    let mut query = String::new();

    // Every user turn overwrites the previous one; the last usable turn wins.
    for message in log.query_messages().filter(|m| m.role_is("user")) {
        if let Some(text) = message.content.extract_text() {
            query = text.to_string();
        }
    }

    if !query.is_empty() {
        return query;
    }

    if log.messages.is_some() {
        if let Some(first_user) = log.fallback_messages().find(|m| m.role_is("user")) {
            log::debug!("cloudeval: query resolved from `messages`");
            query = first_user.content.extract_text().unwrap_or("").to_string();
        }
    } else if let Some(conversation) = &log.conversation {
        if let Some(Some(first)) = conversation.first() {
            log::debug!("cloudeval: query resolved from `conversation`");
            query = first
                .content
                .as_plain_text()
                .filter(|s| !s.is_empty())
                .or_else(|| first.message.as_plain_text())
                .unwrap_or("")
                .to_string();
        }
    }

    query
}

fn resolve_response(log: &ConversationLog) -> String {
    let mut response = match &log.response {
        ResponseField::Messages(items) => items
            .iter()
            .flatten()
            .filter(|m| m.role_is("assistant"))
            .filter_map(|m| m.content.extract_text())
            .filter(|text| !text.is_empty())
            .last()
            .unwrap_or("")
            .to_string(),
        ResponseField::Text(text) => text.clone(),
        ResponseField::Unknown => String::new(),
    };

    if !response.is_empty() {
        return response;
    }

    if log.messages.is_some() {
        if let Some(first_assistant) = log.fallback_messages().find(|m| m.role_is("assistant")) {
            log::debug!("cloudeval: response resolved from `messages`");
            response = first_assistant.content.extract_text().unwrap_or("").to_string();
        }
    } else if let Some(conversation) = &log.conversation {
        if let Some(last_assistant) = conversation.iter().rev().flatten().find(|m| m.role_is("assistant")) {
            log::debug!("cloudeval: response resolved from `conversation`");
            response = last_assistant.content.as_plain_text().unwrap_or("").to_string();
        }
    }

    response
}
