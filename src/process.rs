use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};

use crate::archive::ArchiveWriter;
use crate::config::ImportConfig;
use crate::context::{self, Context};
use crate::importer::{self, ChatGptConversation, ClaudeConversation, Source};
use crate::summary::{ClaudeSummarizer, RuleBased, Summarizer};

/// The main entry point for the import pipeline.
/// Loads context once, picks the summarizer strategy, then processes each
/// enabled source sequentially.
pub fn run(config: ImportConfig) -> Result<()> {
    let summarizer: Box<dyn Summarizer> = match &config.api_key {
        Some(key) => {
            if !config.quiet {
                eprintln!("Claude API enabled (using {} for summaries)", config.anthropic.model);
            }
            Box::new(ClaudeSummarizer::new(key.clone(), &config.anthropic))
        }
        None => Box::new(RuleBased),
    };

    let context = if config.context.enabled {
        let ctx = context::load_context(&config.context);
        if !config.quiet {
            eprintln!("Loading context from Human OS...");
            eprintln!("  Flagship: {}", ctx.flagship.as_deref().unwrap_or("N/A"));
            eprintln!("  Domains loaded: {}", ctx.active_projects.len());
        }
        ctx
    } else {
        if !config.quiet {
            eprintln!("Skipping Human OS context (using keyword detection only)");
        }
        Context::default()
    };

    let writer = ArchiveWriter::new(&config.archive_dir);
    let mut tally = Tally::default();

    if config.source.includes(Source::Claude) {
        import_source(
            Source::Claude,
            &config.claude_export,
            &config,
            &context,
            &writer,
            summarizer.as_ref(),
            &mut tally,
        );
    }
    if config.source.includes(Source::ChatGpt) {
        import_source(
            Source::ChatGpt,
            &config.chatgpt_export,
            &config,
            &context,
            &writer,
            summarizer.as_ref(),
            &mut tally,
        );
    }

    if !config.quiet {
        let mut line = format!("Done. {} imported.", tally.imported);
        if tally.errors > 0 {
            line.push_str(&format!(" Completed with {} error(s).", tally.errors));
        }
        eprintln!("{line}");
    }

    Ok(())
}

#[derive(Default)]
struct Tally {
    imported: usize,
    errors: usize,
}

enum Outcome {
    Imported(PathBuf),
    Skipped,
}

/// Import every conversation of one source file. A missing or malformed
/// file skips the whole source; any single-conversation failure is counted
/// and the loop moves on.
fn import_source(
    source: Source,
    path: &Path,
    config: &ImportConfig,
    context: &Context,
    writer: &ArchiveWriter,
    summarizer: &dyn Summarizer,
    tally: &mut Tally,
) {
    if !path.exists() {
        if !config.quiet {
            eprintln!("{} export not found: {}", source.display_name(), path.display());
        }
        return;
    }

    let conversations = match read_source(path) {
        Ok(values) => values,
        Err(e) => {
            eprintln!("Error reading {} export: {e:#}", source.display_name());
            return;
        }
    };

    let limit = config.sample.unwrap_or(conversations.len()).min(conversations.len());

    let pb = if config.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(limit as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.println(format!(
            "Processing {} {} conversation(s) from {}.",
            limit,
            source.display_name(),
            path.display()
        ));
        bar
    };

    for (idx, value) in conversations.into_iter().take(limit).enumerate() {
        match import_conversation(source, value, config, context, writer, summarizer) {
            Ok(Outcome::Imported(path)) => {
                tally.imported += 1;
                if config.verbose {
                    pb.println(format!("Imported: {}", path.display()));
                }
            }
            Ok(Outcome::Skipped) => {
                if config.verbose {
                    pb.println(format!("Skipped conversation {idx} (no usable content)"));
                }
            }
            Err(e) => {
                tally.errors += 1;
                pb.println(format!("Error [{idx}]: {e:#}"));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
}

fn import_conversation(
    source: Source,
    value: serde_json::Value,
    config: &ImportConfig,
    context: &Context,
    writer: &ArchiveWriter,
    summarizer: &dyn Summarizer,
) -> Result<Outcome> {
    let record = match source {
        Source::Claude => {
            let chat: ClaudeConversation =
                serde_json::from_value(value).wrap_err("Could not deserialize Claude conversation")?;
            Some(importer::parse_claude_conversation(&chat, &config.vocabulary, context))
        }
        Source::ChatGpt => {
            let chat: ChatGptConversation =
                serde_json::from_value(value).wrap_err("Could not deserialize ChatGPT conversation")?;
            importer::parse_chatgpt_conversation(&chat, &config.vocabulary, context)?
        }
    };

    match record {
        Some(record) => {
            let path = writer
                .write_entry(&record, summarizer)
                .wrap_err("Failed to write archive entry")?;
            Ok(Outcome::Imported(path))
        }
        None => Ok(Outcome::Skipped),
    }
}

fn read_source(path: &Path) -> Result<Vec<serde_json::Value>> {
    let content =
        fs::read_to_string(path).wrap_err_with(|| format!("Failed to read: {}", path.display()))?;
    serde_json::from_str(&content).wrap_err_with(|| format!("Failed to parse: {}", path.display()))
}
