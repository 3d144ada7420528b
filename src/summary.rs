//! Summary and key-output extraction for archive entries.
//!
//! Two interchangeable strategies behind the [`Summarizer`] trait: the
//! rule-based heuristics, and the Anthropic Messages API. The API-backed
//! strategy degrades to the rule-based one per call, so a dead network or a
//! bad key never fails a conversation, let alone the batch.

use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;

use crate::config::AnthropicConfig;

pub trait Summarizer {
    /// 2-3 sentence summary of the conversation.
    fn summary(&self, title: &str, transcript: &str, domain: &str) -> String;

    /// Up to 3 `- `-prefixed bullets of decisions/outputs.
    fn key_outputs(&self, transcript: &str) -> Vec<String>;
}

/// Bullet used when nothing worth extracting was found.
pub const PLACEHOLDER_OUTPUT: &str = "- [Key decisions or outputs from this conversation]";

// ---------------------------------------------------------------------------
// Rule-based strategy
// ---------------------------------------------------------------------------

/// Descriptive phrase per domain for the "Related to …" sentence.
const DOMAIN_DESCRIPTIONS: &[(&str, &str)] = &[
    ("@loopwalker", "music and creative work"),
    ("@pulsekeeper", "heart coherence and ADHD"),
    ("@shadow-institute", "2E and dyslexia"),
    ("@unlimited-band", "music collaboration"),
    ("@brent", "brand and personal systems"),
    ("@gal", "connections and outreach"),
    ("@system", "systems and workflows"),
];

const THEME_KEYWORDS: &[(&str, &[&str])] = &[
    ("brand strategy", &["brand", "positioning", "offer"]),
    ("music creation", &["song", "lyrics", "melody"]),
    ("technical implementation", &["code", "script", "function"]),
    ("workflow", &["workflow", "process", "system"]),
    ("2E awareness", &["2e", "dyslexia", "neurodivergent"]),
];

const DECISION_MARKERS: &[&str] = &["decided to", "will", "going to", "plan to", "final"];

/// How many leading transcript lines the summary heuristics look at.
const EARLY_LINES: usize = 20;

pub struct RuleBased;

impl Summarizer for RuleBased {
    fn summary(&self, title: &str, transcript: &str, domain: &str) -> String {
        let early = transcript
            .lines()
            .take(EARLY_LINES)
            .collect::<Vec<&str>>()
            .join(" ")
            .to_lowercase();

        let mut parts = Vec::new();

        if !title.trim().is_empty() {
            parts.push(format!("Conversation about {}.", title.to_lowercase()));
        } else if early.contains("music") || early.contains("song") {
            parts.push("Conversation about music creation or lyrics.".to_string());
        } else if early.contains("code") || early.contains("script") {
            parts.push("Technical discussion about code or automation.".to_string());
        } else if early.contains("brand") || early.contains("positioning") {
            parts.push("Discussion about brand strategy or positioning.".to_string());
        } else {
            parts.push("General conversation on various topics.".to_string());
        }

        let description = DOMAIN_DESCRIPTIONS
            .iter()
            .find(|(name, _)| *name == domain)
            .map(|(_, description)| *description)
            .unwrap_or("general topics");
        parts.push(format!("Related to {description}."));

        let themes: Vec<&str> = THEME_KEYWORDS
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|kw| early.contains(kw)))
            .map(|(theme, _)| *theme)
            .take(2)
            .collect();
        if !themes.is_empty() {
            parts.push(format!("Key themes: {}.", themes.join(", ")));
        }

        parts.join(" ")
    }

    fn key_outputs(&self, transcript: &str) -> Vec<String> {
        let lines: Vec<&str> = transcript.lines().collect();
        let mut outputs = Vec::new();

        for line in &lines {
            if line.chars().count() >= 200 {
                continue;
            }
            let lowered = line.to_lowercase();
            if DECISION_MARKERS.iter().any(|marker| lowered.contains(marker)) {
                let cleaned = strip_bold_labels(line);
                let len = cleaned.chars().count();
                if len > 10 && len < 150 {
                    outputs.push(format!("- {}", truncate_chars(&cleaned, 100)));
                    if outputs.len() >= 3 {
                        break;
                    }
                }
            }
        }

        // No decision lines: fall back to the first assistant replies.
        if outputs.is_empty() {
            'markers: for (idx, line) in lines.iter().enumerate() {
                if !line.contains("**Assistant:**") && !line.to_lowercase().contains("**assistant**:") {
                    continue;
                }
                for next_line in lines.iter().skip(idx + 1).take(3) {
                    let cleaned = next_line.trim();
                    if cleaned.is_empty() || next_line.starts_with("**") {
                        continue;
                    }
                    let len = cleaned.chars().count();
                    if len > 20 && len < 150 {
                        outputs.push(format!("- {}", truncate_chars(cleaned, 100)));
                        if outputs.len() >= 3 {
                            break 'markers;
                        }
                    }
                }
            }
        }

        if outputs.is_empty() {
            outputs.push(PLACEHOLDER_OUTPUT.to_string());
        }
        outputs.truncate(3);
        outputs
    }
}

/// Remove every `**Label:**` span from a line.
fn strip_bold_labels(line: &str) -> String {
    let mut out = String::new();
    let mut rest = line;
    while let Some(start) = rest.find("**") {
        match rest[start + 2..].find(":**") {
            Some(close) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + 2 + close + 3..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// Anthropic API strategy
// ---------------------------------------------------------------------------

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
/// Transcript preview cap, to stay well under the model's input limits.
const TRANSCRIPT_PREVIEW_CHARS: usize = 8000;

/// Summarizer backed by the Anthropic Messages API.
///
/// Every call that fails — transport, auth, overload, unexpected payload —
/// is answered by the owned [`RuleBased`] fallback instead.
pub struct ClaudeSummarizer {
    client: reqwest::blocking::Client,
    api_key: String,
    config: AnthropicConfig,
    fallback: RuleBased,
}

#[derive(Deserialize)]
struct ApiMessage {
    content: Vec<ApiContentBlock>,
}

#[derive(Deserialize)]
struct ApiContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl ClaudeSummarizer {
    pub fn new(api_key: String, config: &AnthropicConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key,
            config: config.clone(),
            fallback: RuleBased,
        }
    }

    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": max_tokens,
            "temperature": 0.3,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .wrap_err("Request to the Anthropic API failed")?
            .error_for_status()
            .wrap_err("Anthropic API returned an error status")?;

        let message: ApiMessage = response.json().wrap_err("Failed to decode API response")?;
        message
            .content
            .into_iter()
            .find_map(|block| (block.kind == "text").then_some(block.text))
            .map(|text| text.trim().to_string())
            .ok_or_else(|| eyre!("API response contained no text block"))
    }
}

impl Summarizer for ClaudeSummarizer {
    fn summary(&self, title: &str, transcript: &str, domain: &str) -> String {
        let preview = truncate_chars(transcript, TRANSCRIPT_PREVIEW_CHARS);
        let prompt = format!(
            "Analyze this AI conversation and generate a concise 2-3 sentence summary.\n\n\
             Title: {title}\n\
             Domain: {domain}\n\n\
             Transcript:\n{preview}\n\n\
             Focus on:\n\
             1. What was discussed/main topic\n\
             2. Any decisions made or key insights\n\
             3. Relevance to the domain\n\n\
             Keep it to 2-3 sentences maximum. Be specific and concise."
        );

        match self.complete(&prompt, self.config.max_tokens_summary) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Warning: Claude API error ({e:#}), falling back to rule-based summary");
                self.fallback.summary(title, transcript, domain)
            }
        }
    }

    fn key_outputs(&self, transcript: &str) -> Vec<String> {
        let preview = truncate_chars(transcript, TRANSCRIPT_PREVIEW_CHARS);
        let prompt = format!(
            "Extract 2-3 key outputs, decisions, or insights from this conversation.\n\n\
             Transcript:\n{preview}\n\n\
             Return as a bulleted list with one line per item. Focus on:\n\
             - Decisions made\n\
             - Action items\n\
             - Key insights\n\
             - Files/code created\n\
             - Agreements reached\n\n\
             Format:\n\
             - First key point\n\
             - Second key point\n\
             - Third key point"
        );

        match self.complete(&prompt, self.config.max_tokens_outputs) {
            Ok(text) => {
                let outputs: Vec<String> = text
                    .lines()
                    .map(str::trim)
                    .filter(|line| line.starts_with('-'))
                    .take(3)
                    .map(String::from)
                    .collect();
                if outputs.is_empty() {
                    vec!["- [Key insights from this conversation]".to_string()]
                } else {
                    outputs
                }
            }
            Err(e) => {
                eprintln!("Warning: Claude API error ({e:#}), falling back to rule-based extraction");
                self.fallback.key_outputs(transcript)
            }
        }
    }
}
