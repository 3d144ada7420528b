//! Self-contained type definitions for the supported chat export formats,
//! plus the normalizers that turn them into the common archive record.
//!
//! Both exports are a single JSON document: a top-level array of
//! conversation objects in the vendor's native shape.
//!
//! Claude (claude.ai data export, `conversations.json`):
//! ```json
//! {
//!   "name": "Test Conversation",
//!   "created_at": "2026-01-16T10:00:00Z",
//!   "chat_messages": [
//!     {"sender": "human", "text": "Hello"},
//!     {"sender": "assistant", "text": "Hi there!"}
//!   ]
//! }
//! ```
//!
//! ChatGPT (chat.openai.com data export, `conversations.json`):
//! ```json
//! {
//!   "title": "GPT Test",
//!   "create_time": 1642357200.0,
//!   "mapping": {
//!     "node-id": {
//!       "message": {
//!         "author": {"role": "user"},
//!         "content": {"content_type": "text", "parts": ["Hello"]}
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! The ChatGPT `mapping` is a message graph keyed by node id; this importer
//! walks it in the document's own insertion order (`serde_json` is built
//! with `preserve_order`) rather than reconstructing parent links.

use chrono::{DateTime, Utc};
use eyre::{Result, WrapErr};
use serde::Deserialize;

use crate::classify::{self, DomainVocabulary};
use crate::context::Context;

// ---------------------------------------------------------------------------
// Common record
// ---------------------------------------------------------------------------

/// Origin of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Claude,
    ChatGpt,
}

impl Source {
    /// Lowercase identifier used in front matter.
    pub fn id(self) -> &'static str {
        match self {
            Source::Claude => "claude",
            Source::ChatGpt => "chatgpt",
        }
    }

    /// Human-readable name for the metadata line.
    pub fn display_name(self) -> &'static str {
        match self {
            Source::Claude => "Claude",
            Source::ChatGpt => "ChatGPT",
        }
    }
}

/// The normalized, source-independent form of one conversation.
/// Immutable once built; everything the archive writer needs.
#[derive(Debug, Clone)]
pub struct ConversationRecord {
    pub date: DateTime<Utc>,
    pub title: String,
    /// Sanitized slug of the title, used in the filename.
    pub topic: String,
    /// Sigil-prefixed domain identifier, e.g. `@system`. Never empty.
    pub domain: String,
    /// At most 5 tags, sorted, unique.
    pub tags: Vec<String>,
    pub source: Source,
    /// `**<Role>:** <text>` turns, blank-line separated. May be empty for
    /// Claude conversations with no non-empty turns.
    pub transcript: String,
}

fn build_record(
    date: DateTime<Utc>,
    title: &str,
    source: Source,
    transcript: String,
    vocabulary: &DomainVocabulary,
    context: &Context,
) -> ConversationRecord {
    let topic = classify::sanitize_topic(title);
    let domain = vocabulary.detect(&transcript, title);
    let tags = classify::generate_tags(&transcript, title, vocabulary, context);
    ConversationRecord {
        date,
        title: title.to_string(),
        topic,
        domain,
        tags,
        source,
        transcript,
    }
}

fn default_title() -> String {
    "Untitled".to_string()
}

fn unknown_label() -> String {
    "unknown".to_string()
}

/// Title-case each whitespace-separated word ("human" → "Human").
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Claude export
// ---------------------------------------------------------------------------

/// One conversation from a claude.ai export.
#[derive(Debug, Deserialize)]
pub struct ClaudeConversation {
    #[serde(default = "default_title")]
    pub name: String,
    /// ISO 8601 creation timestamp. Anything absent, null, or unparsable
    /// falls back to now — a Claude conversation is never rejected for it.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub chat_messages: Vec<ClaudeMessage>,
}

/// One turn of a Claude conversation.
#[derive(Debug, Deserialize)]
pub struct ClaudeMessage {
    #[serde(default = "unknown_label")]
    pub sender: String,
    #[serde(default)]
    pub text: String,
}

/// Normalize a Claude conversation. Never skips: an unparsable timestamp
/// becomes the current time, and zero non-empty turns still produce a
/// record with an empty transcript.
pub fn parse_claude_conversation(
    chat: &ClaudeConversation,
    vocabulary: &DomainVocabulary,
    context: &Context,
) -> ConversationRecord {
    let date = chat
        .created_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let transcript = chat
        .chat_messages
        .iter()
        .filter(|msg| !msg.text.is_empty())
        .map(|msg| format!("**{}:** {}", title_case(&msg.sender), msg.text))
        .collect::<Vec<String>>()
        .join("\n\n");

    build_record(date, &chat.name, Source::Claude, transcript, vocabulary, context)
}

// ---------------------------------------------------------------------------
// ChatGPT export
// ---------------------------------------------------------------------------

/// One conversation from a ChatGPT export.
#[derive(Debug, Deserialize)]
pub struct ChatGptConversation {
    #[serde(default = "default_title")]
    pub title: String,
    /// Unix epoch seconds (fractional). An absent field defaults to epoch
    /// zero; an explicit null or unrepresentable value skips the
    /// conversation.
    #[serde(default = "default_epoch")]
    pub create_time: Option<f64>,
    /// Message graph keyed by node id. Node values are kept raw and decoded
    /// one at a time so a single malformed node fails only its conversation.
    #[serde(default)]
    pub mapping: serde_json::Map<String, serde_json::Value>,
}

/// One node of the ChatGPT message graph. Nodes without a message
/// (roots, tombstones) are skipped.
#[derive(Debug, Deserialize)]
pub struct ChatGptNode {
    #[serde(default)]
    pub message: Option<ChatGptMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatGptMessage {
    #[serde(default)]
    pub author: ChatGptAuthor,
    #[serde(default)]
    pub content: ChatGptContent,
}

#[derive(Debug, Deserialize)]
pub struct ChatGptAuthor {
    #[serde(default = "unknown_label")]
    pub role: String,
}

impl Default for ChatGptAuthor {
    fn default() -> Self {
        Self { role: unknown_label() }
    }
}

/// Message content. Only `content_type == "text"` contributes transcript
/// lines; parts stay raw because exports mix strings with non-string parts.
#[derive(Debug, Default, Deserialize)]
pub struct ChatGptContent {
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub parts: Vec<serde_json::Value>,
}

/// Normalize a ChatGPT conversation.
///
/// Returns `Ok(None)` — skipped, not an error — when the creation time is
/// unrepresentable or the mapping yields no transcript lines. Returns `Err`
/// only for a malformed mapping node, which counts as a per-conversation
/// processing error.
pub fn parse_chatgpt_conversation(
    chat: &ChatGptConversation,
    vocabulary: &DomainVocabulary,
    context: &Context,
) -> Result<Option<ConversationRecord>> {
    let Some(date) = chat.create_time.and_then(epoch_to_datetime) else {
        return Ok(None);
    };

    let mut lines = Vec::new();
    for (node_id, value) in &chat.mapping {
        let node: ChatGptNode = serde_json::from_value(value.clone())
            .wrap_err_with(|| format!("Malformed mapping node: {node_id}"))?;
        let Some(message) = node.message else {
            continue;
        };
        if message.content.content_type != "text" {
            continue;
        }
        let role = title_case(&message.author.role);
        for part in &message.content.parts {
            if let Some(text) = part.as_str()
                && !text.trim().is_empty()
            {
                lines.push(format!("**{role}:** {text}"));
            }
        }
    }

    if lines.is_empty() {
        return Ok(None);
    }
    let transcript = lines.join("\n\n");

    Ok(Some(build_record(
        date,
        &chat.title,
        Source::ChatGpt,
        transcript,
        vocabulary,
        context,
    )))
}

fn default_epoch() -> Option<f64> {
    Some(0.0)
}

fn epoch_to_datetime(epoch: f64) -> Option<DateTime<Utc>> {
    if !epoch.is_finite() {
        return None;
    }
    let secs = epoch.floor();
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }
    let nanos = ((epoch - secs) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}
