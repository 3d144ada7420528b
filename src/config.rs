use std::path::PathBuf;

use clap::ValueEnum;

use crate::classify::DomainVocabulary;
use crate::importer::Source;

/// Fallback domain identifier when no keywords score.
pub const DEFAULT_DOMAIN: &str = "system";

/// Which export sources to import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceFilter {
    Claude,
    Chatgpt,
    All,
}

impl SourceFilter {
    pub fn includes(self, source: Source) -> bool {
        matches!(
            (self, source),
            (SourceFilter::All, _)
                | (SourceFilter::Claude, Source::Claude)
                | (SourceFilter::Chatgpt, Source::ChatGpt)
        )
    }
}

/// Human OS context settings.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub enabled: bool,
    pub root: Option<PathBuf>,
    /// Domain names (without sigil) whose INDEX files are scraped.
    pub domains: Vec<String>,
}

/// Anthropic API settings for the optional external summarizer.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub model: String,
    pub max_tokens_summary: u32,
    pub max_tokens_outputs: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: "claude-haiku-4-5".to_string(),
            max_tokens_summary: 200,
            max_tokens_outputs: 300,
        }
    }
}

/// Fully-resolved configuration for one import run.
/// This decouples the pipeline from how the arguments were parsed
/// (CLI/config file) and replaces any process-wide mutable state.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub archive_dir: PathBuf,
    pub claude_export: PathBuf,
    pub chatgpt_export: PathBuf,
    pub source: SourceFilter,
    /// Some(n) in sample mode: import at most n conversations per source.
    pub sample: Option<usize>,
    pub vocabulary: DomainVocabulary,
    pub context: ContextConfig,
    pub anthropic: AnthropicConfig,
    /// Some(key) enables the Claude API summarizer.
    pub api_key: Option<String>,
    pub verbose: bool,
    pub quiet: bool,
}

/// Built-in domain vocabulary, used when the config file defines none.
pub fn default_vocabulary() -> Vec<(String, Vec<String>)> {
    let table: &[(&str, &[&str])] = &[
        (
            "@loopwalker",
            &["music", "song", "loopwalker", "shadow work", "frequency", "audio", "lyrics", "melody"],
        ),
        (
            "@pulsekeeper",
            &["heart", "coherence", "adhd", "2e", "frequency", "nervous system", "regulation"],
        ),
        (
            "@shadow-institute",
            &["dyslexia", "twice-exceptional", "2e", "gifted", "neurodivergent", "learning difference"],
        ),
        ("@unlimited-band", &["band", "collaboration", "music group", "bandmate"]),
        (
            "@brent",
            &["hyperfocus", "dyslexia", "pattern recognition", "brand", "positioning", "website"],
        ),
        ("@gal", &["connection", "outreach", "networking", "crm", "warm", "dm", "comment"]),
        ("@system", &["sprint", "workflow", "process", "system", "automation", "skill"]),
    ];
    table
        .iter()
        .map(|(name, keywords)| {
            (name.to_string(), keywords.iter().map(|kw| kw.to_string()).collect())
        })
        .collect()
}

/// Domains whose INDEX files are scraped by default.
pub fn default_context_domains() -> Vec<String> {
    ["brent", "gal", "loopwalker", "pulsekeeper", "shadow-institute", "unlimited-band"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}
