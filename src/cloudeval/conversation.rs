//! Typed view over untrusted conversation logs.
//!
//! Conversation logs arrive from upstream agent runs in several inconsistent shapes:
//! a `query`/`response` pair of message arrays, a flat `messages` array, or a
//! `conversation` transcript whose entries use either `content` or `message`. Message
//! content itself is either a plain string or an array of typed content blocks.
//!
//! This module decodes a raw [`serde_json::Value`] into a small set of variants exactly
//! once. Anything that does not match a known shape decodes to an explicit `Unknown` /
//! `None` arm instead of an error, so the extraction code in
//! [`extractor`](crate::extractor) only ever pattern-matches.
//!
//! # Shapes
//!
//! ```text
//! ConversationLog
//!   ├─ query:        [LogMessage]            (system + user turns)
//!   ├─ response:     "text" | [LogMessage]   (assistant turns, with createdAt / run_id)
//!   ├─ messages:     [LogMessage]            (fallback source)
//!   ├─ conversation: [LogMessage]            (second fallback, `content` or `message`)
//!   ├─ tools:        any
//!   └─ metadata:     any
//!
//! Content = "plain string" | [ContentBlock] | Absent | Unknown
//! ContentBlock = { "type": "text", "text": "..." } | Other
//! ```
//!
//! # Example
//!
//! ```rust
//! use cloudeval::conversation::ConversationLog;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "query": [
//!         {"role": "user", "content": [{"type": "text", "text": "What is 2+2?"}]}
//!     ]
//! });
//!
//! let log = ConversationLog::decode(&raw).unwrap();
//! let first = log.query.as_ref().unwrap()[0].as_ref().unwrap();
//! assert_eq!(first.role_is("user"), true);
//! assert_eq!(first.content.extract_text(), Some("What is 2+2?"));
//!
//! // Non-mapping input has no conversation structure at all.
//! assert!(ConversationLog::decode(&json!("just a string")).is_none());
//! ```

use serde_json::{Map, Value};

/// One typed fragment of a message's content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// An object with `"type": "text"`. `text` is `None` when the key is missing or
    /// does not hold a string.
    Text { text: Option<String> },
    /// Any other block type, or an array element that is not an object at all.
    Other,
}

impl ContentBlock {
    fn decode(value: &Value) -> Self {
        match value {
            Value::Object(map) if map.get("type").and_then(Value::as_str) == Some("text") => {
                ContentBlock::Text {
                    text: map.get("text").and_then(Value::as_str).map(str::to_owned),
                }
            }
            _ => ContentBlock::Other,
        }
    }
}

/// The content of a [`LogMessage`].
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Plain string content.
    Text(String),
    /// An ordered list of content blocks.
    Blocks(Vec<ContentBlock>),
    /// The key is missing. Reads as the empty string.
    Absent,
    /// `null`, or any other JSON shape.
    Unknown,
}

impl Content {
    /// Decode an optional JSON value into a [`Content`] variant.
    pub fn decode(value: Option<&Value>) -> Self {
        match value {
            None => Content::Absent,
            Some(Value::String(s)) => Content::Text(s.clone()),
            Some(Value::Array(items)) => {
                Content::Blocks(items.iter().map(ContentBlock::decode).collect())
            }
            Some(_) => Content::Unknown,
        }
    }

    /// Text of the first `"type": "text"` block.
    ///
    /// The scan stops at the first text block even if its `text` is missing, in which
    /// case the empty string is returned. Plain-string and unknown content yield `None`.
    ///
    /// ```rust
    /// use cloudeval::conversation::{Content, ContentBlock};
    ///
    /// let content = Content::Blocks(vec![
    ///     ContentBlock::Other,
    ///     ContentBlock::Text { text: Some("first".into()) },
    ///     ContentBlock::Text { text: Some("second".into()) },
    /// ]);
    /// assert_eq!(content.first_text_block(), Some("first"));
    /// assert_eq!(Content::Text("plain".into()).first_text_block(), None);
    /// ```
    pub fn first_text_block(&self) -> Option<&str> {
        match self {
            Content::Blocks(blocks) => blocks.iter().find_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_deref().unwrap_or("")),
                ContentBlock::Other => None,
            }),
            _ => None,
        }
    }

    /// Plain string content as is, or the first text block of a block list.
    ///
    /// `None` means the content carries no usable text: a block list without a text
    /// block, or a value of some other JSON type.
    pub fn extract_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s.as_str()),
            Content::Blocks(_) => self.first_text_block(),
            Content::Absent => Some(""),
            Content::Unknown => None,
        }
    }

    /// Plain string content only. Block lists are not unwrapped.
    pub fn as_plain_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s.as_str()),
            Content::Absent => Some(""),
            _ => None,
        }
    }
}

/// A single turn in a conversation log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMessage {
    /// `"system"`, `"user"`, `"assistant"`, ... (`None` when missing or not a string).
    pub role: Option<String>,
    /// The `content` field.
    pub content: Content,
    /// The `message` field used by some transcript formats instead of `content`.
    pub message: Content,
    /// The `createdAt` timestamp attached to response messages.
    pub created_at: Option<String>,
    /// The `run_id` attached to response messages.
    pub run_id: Option<String>,
}

impl LogMessage {
    /// Decode one sequence entry. Entries that are not objects yield `None`.
    pub fn decode(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(LogMessage {
            role: string_field(map, "role"),
            content: Content::decode(map.get("content")),
            message: Content::decode(map.get("message")),
            created_at: string_field(map, "createdAt"),
            run_id: string_field(map, "run_id"),
        })
    }

    /// Whether this message carries exactly the given role.
    pub fn role_is(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }
}

/// The `response` field of a conversation log.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseField {
    /// A plain-string response.
    Text(String),
    /// A sequence of response messages. Non-object entries are kept as `None`.
    Messages(Vec<Option<LogMessage>>),
    /// Absent, or any other JSON shape.
    Unknown,
}

impl ResponseField {
    fn decode(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => ResponseField::Text(s.clone()),
            Some(Value::Array(items)) => ResponseField::Messages(decode_messages(items)),
            _ => ResponseField::Unknown,
        }
    }
}

/// A decoded conversation log.
///
/// Sequence fields use `Option<Vec<Option<LogMessage>>>`:
///
/// * `query` is `Some` only when the key holds an array.
/// * `messages` and `conversation` are `Some` whenever the key is present; a present
///   value that is not an array decodes to an empty list. Key presence alone decides
///   which fallback source is consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationLog {
    pub query: Option<Vec<Option<LogMessage>>>,
    pub response: ResponseField,
    pub messages: Option<Vec<Option<LogMessage>>>,
    pub conversation: Option<Vec<Option<LogMessage>>>,
    pub tools: Option<Value>,
    pub metadata: Option<Value>,
}

impl ConversationLog {
    /// Decode a raw JSON value. Returns `None` when the value is not a JSON object.
    pub fn decode(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(ConversationLog {
            query: match map.get("query") {
                Some(Value::Array(items)) => Some(decode_messages(items)),
                _ => None,
            },
            response: ResponseField::decode(map.get("response")),
            messages: present_sequence(map, "messages"),
            conversation: present_sequence(map, "conversation"),
            tools: map.get("tools").cloned(),
            metadata: map.get("metadata").cloned(),
        })
    }

    /// Iterate over the well-formed messages of the `query` sequence.
    pub fn query_messages(&self) -> impl Iterator<Item = &LogMessage> {
        flatten(self.query.as_deref())
    }

    /// Iterate over the well-formed messages of the `messages` sequence.
    pub fn fallback_messages(&self) -> impl Iterator<Item = &LogMessage> {
        flatten(self.messages.as_deref())
    }
}

fn flatten(items: Option<&[Option<LogMessage>]>) -> impl Iterator<Item = &LogMessage> {
    items.unwrap_or(&[]).iter().filter_map(Option::as_ref)
}

fn decode_messages(items: &[Value]) -> Vec<Option<LogMessage>> {
    items.iter().map(LogMessage::decode).collect()
}

fn present_sequence(map: &Map<String, Value>, key: &str) -> Option<Vec<Option<LogMessage>>> {
    map.get(key).map(|value| match value {
        Value::Array(items) => decode_messages(items),
        _ => Vec::new(),
    })
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}
