use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{eyre, Context, Result};
use serde::Deserialize;

use chat_archive_import::classify::DomainVocabulary;
use chat_archive_import::config::{
    self, AnthropicConfig, ContextConfig, ImportConfig, SourceFilter,
};
use chat_archive_import::process;

/// Import Claude and ChatGPT conversation exports into a dated
/// Markdown archive.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Archive root directory.
    /// Defaults to ~/AI-CHAT-ARCHIVE if not set in config.
    #[arg(value_name = "ARCHIVE_DIR")]
    archive_dir: Option<PathBuf>,

    /// Path to the Claude export (conversations.json).
    #[arg(long, value_name = "PATH")]
    claude: Option<PathBuf>,

    /// Path to the ChatGPT export (conversations.json).
    #[arg(long, value_name = "PATH")]
    chatgpt: Option<PathBuf>,

    /// Which source to import.
    #[arg(long, value_enum, default_value_t = SourceFilter::All)]
    source: SourceFilter,

    /// Run in sample mode: import only the first --count conversations
    /// per source, for reviewing the output before a full import.
    #[arg(long)]
    sample: bool,

    /// Number of conversations per source in sample mode.
    #[arg(long, value_name = "N", default_value_t = 5)]
    count: usize,

    /// Use the Claude API for higher-quality summaries.
    #[arg(long)]
    claude_api: bool,

    /// Anthropic API key (or set ANTHROPIC_API_KEY).
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/chat-archive-import/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Skip loading Human OS sprint context.
    #[arg(long)]
    no_context: bool,

    /// Print each file written or skipped.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress standard output (progress bars).
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    archive_dir: Option<PathBuf>,
    claude_export: Option<PathBuf>,
    chatgpt_export: Option<PathBuf>,
    #[serde(default)]
    context: ContextFileConfig,
    #[serde(default)]
    domains: DomainsFileConfig,
    #[serde(default)]
    anthropic: AnthropicFileConfig,
}

#[derive(Deserialize, Default)]
struct ContextFileConfig {
    enabled: Option<bool>,
    root: Option<PathBuf>,
    domains: Option<Vec<String>>,
}

#[derive(Deserialize, Default)]
struct DomainsFileConfig {
    default: Option<String>,
    #[serde(default)]
    custom: Vec<DomainEntry>,
}

#[derive(Deserialize)]
struct DomainEntry {
    name: String,
    keywords: Vec<String>,
}

#[derive(Deserialize, Default)]
struct AnthropicFileConfig {
    model: Option<String>,
    max_tokens_summary: Option<u32>,
    max_tokens_outputs: Option<u32>,
}

fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        // Search: XDG/OS config dir, then nothing
        dirs::config_dir()
            .map(|d| d.join("chat-archive-import/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

fn home_path(suffix: &str) -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(suffix))
        .ok_or_else(|| eyre!("Could not determine the home directory."))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load config file (CLI path > default path)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    // 2. Resolve paths (CLI > Config > Default)
    let archive_dir = match cli.archive_dir.or(file_cfg.archive_dir) {
        Some(dir) => dir,
        None => home_path("AI-CHAT-ARCHIVE")?,
    };
    let claude_export = match cli.claude.or(file_cfg.claude_export) {
        Some(path) => path,
        None => home_path("RAW-AI-CHAT-IMPORT/claude export/conversations.json")?,
    };
    let chatgpt_export = match cli.chatgpt.or(file_cfg.chatgpt_export) {
        Some(path) => path,
        None => home_path("RAW-AI-CHAT-IMPORT/CHAT GPT Archive/conversations.json")?,
    };

    // 3. Build the domain vocabulary (config file entries replace the
    //    built-in table; order is preserved for tie-breaking)
    let domains = if file_cfg.domains.custom.is_empty() {
        config::default_vocabulary()
    } else {
        file_cfg
            .domains
            .custom
            .into_iter()
            .map(|entry| (entry.name, entry.keywords))
            .collect()
    };
    let default_domain = file_cfg
        .domains
        .default
        .unwrap_or_else(|| config::DEFAULT_DOMAIN.to_string());
    let vocabulary = DomainVocabulary::new(domains, &default_domain);

    // 4. Resolve Human OS context settings
    let context_enabled = !cli.no_context && file_cfg.context.enabled.unwrap_or(true);
    let context_root = match file_cfg.context.root {
        Some(root) => Some(root),
        None => dirs::home_dir().map(|home| home.join("Human")),
    };
    let context = ContextConfig {
        enabled: context_enabled,
        root: context_root,
        domains: file_cfg
            .context
            .domains
            .unwrap_or_else(config::default_context_domains),
    };

    // 5. Resolve the Anthropic settings and API key
    let defaults = AnthropicConfig::default();
    let anthropic = AnthropicConfig {
        model: file_cfg.anthropic.model.unwrap_or(defaults.model),
        max_tokens_summary: file_cfg
            .anthropic
            .max_tokens_summary
            .unwrap_or(defaults.max_tokens_summary),
        max_tokens_outputs: file_cfg
            .anthropic
            .max_tokens_outputs
            .unwrap_or(defaults.max_tokens_outputs),
    };
    let api_key = if cli.claude_api {
        let key = cli
            .api_key
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or_else(|| {
                eyre!("--claude-api requires the ANTHROPIC_API_KEY environment variable or --api-key")
            })?;
        Some(key)
    } else {
        None
    };

    if !cli.quiet {
        eprintln!("Archive location: {}", archive_dir.display());
        eprintln!(
            "Human OS integration: {}",
            if context.enabled { "Enabled" } else { "Disabled" }
        );
    }

    // 6. Run the import
    let config = ImportConfig {
        archive_dir,
        claude_export,
        chatgpt_export,
        source: cli.source,
        sample: cli.sample.then_some(cli.count),
        vocabulary,
        context,
        anthropic,
        api_key,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    process::run(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_parses_ordered_domains() {
        let cfg: FileConfig = toml::from_str(
            r#"
            archive_dir = "/tmp/archive"

            [context]
            enabled = false

            [domains]
            default = "work"

            [[domains.custom]]
            name = "work"
            keywords = ["sprint"]

            [[domains.custom]]
            name = "music"
            keywords = ["song"]

            [anthropic]
            model = "claude-haiku-4-5"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.archive_dir.as_deref(), Some(Path::new("/tmp/archive")));
        assert_eq!(cfg.context.enabled, Some(false));
        assert_eq!(cfg.domains.default.as_deref(), Some("work"));
        // File order is preserved; it doubles as the scoring tie-break order.
        let names: Vec<&str> = cfg.domains.custom.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["work", "music"]);
        assert_eq!(cfg.anthropic.model.as_deref(), Some("claude-haiku-4-5"));
        assert_eq!(cfg.anthropic.max_tokens_summary, None);
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let cfg: FileConfig = toml::from_str("").unwrap();
        assert!(cfg.archive_dir.is_none());
        assert!(cfg.domains.custom.is_empty());
        assert!(cfg.context.enabled.is_none());
    }

    #[test]
    fn explicit_missing_config_path_is_an_error() {
        assert!(load_file_config(Some(Path::new("/no/such/config.toml"))).is_err());
    }
}
