//! # chat-archive-import
//!
//! A CLI tool that imports AI chat exports (Claude and ChatGPT) into a
//! dated Markdown archive.
//!
//! ## What it does
//!
//! Both vendors let you export your conversation history as a JSON file.
//! This tool reads those exports, normalizes each conversation into a
//! common record, classifies it against a keyword vocabulary (domain +
//! up to five tags), generates a short summary and key-output bullets,
//! and writes one Markdown file per conversation with YAML frontmatter
//! into `<archive>/<year>/<month>/`.
//!
//! Existing archive files are never touched — a name collision gets a
//! numeric suffix instead, so re-running an import can never destroy
//! prior output.
//!
//! ## Summaries
//!
//! Summaries and key outputs are rule-based by default. With `--claude-api`
//! (and an `ANTHROPIC_API_KEY`), the Anthropic Messages API generates them
//! instead; any API failure falls back to the rule-based path for that one
//! conversation, never aborting the batch.
//!
//! ## Usage
//!
//! ```sh
//! # Sample five conversations from each source into ~/AI-CHAT-ARCHIVE
//! chat-archive-import --sample
//!
//! # Import everything from a specific Claude export
//! chat-archive-import ~/notes/chat-archive --claude ~/exports/conversations.json --source claude
//! ```
//!
//! Preferences can be persisted in `~/.config/chat-archive-import/config.toml`.

pub mod archive;
pub mod classify;
pub mod config;
pub mod context;
pub mod importer;
pub mod process;
pub mod summary;
