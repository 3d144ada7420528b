use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use serde::Serialize;

use crate::importer::ConversationRecord;
use crate::summary::Summarizer;

#[derive(Serialize)]
struct Frontmatter<'a> {
    date: String,
    topic: &'a str,
    domains: [&'a str; 1],
    tags: &'a [String],
    ai: &'a str,
}

/// Writes archive entries under a date-partitioned tree:
/// `<root>/<year>/<MM>-<MonthName>/<YYYY>-<MM>-<DD>-<topic>.md`.
pub struct ArchiveWriter {
    root: PathBuf,
}

impl ArchiveWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Render a record to markdown and write it at a fresh path.
    ///
    /// Never overwrites: a taken filename gets `-1`, `-2`, … appended until a
    /// free one is found, so re-importing the same record creates a new file.
    pub fn write_entry(&self, record: &ConversationRecord, summarizer: &dyn Summarizer) -> Result<PathBuf> {
        let folder = self
            .root
            .join(record.date.format("%Y").to_string())
            .join(record.date.format("%m-%B").to_string());
        fs::create_dir_all(&folder)
            .wrap_err_with(|| format!("Failed to create archive folder: {}", folder.display()))?;

        let date = record.date.format("%Y-%m-%d").to_string();
        let path = allocate_path(&folder, &format!("{}-{}", date, record.topic));

        let summary = summarizer.summary(&record.title, &record.transcript, &record.domain);
        let key_outputs = summarizer.key_outputs(&record.transcript);

        let file = File::create(&path).wrap_err_with(|| format!("Failed to create: {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        let fm = Frontmatter {
            date: date.clone(),
            topic: &record.title,
            domains: [record.domain.as_str()],
            tags: &record.tags,
            ai: record.source.id(),
        };
        writeln!(writer, "---")?;
        let yaml = serde_yaml::to_string(&fm).wrap_err("Failed to render front matter")?;
        write!(writer, "{yaml}")?;
        writeln!(writer, "---")?;
        writeln!(writer)?;

        writeln!(writer, "# {}", record.title)?;
        writeln!(writer)?;
        writeln!(writer, "**Date:** {date}")?;
        writeln!(writer, "**Source:** {}", record.source.display_name())?;
        writeln!(writer)?;
        writeln!(writer, "## Summary")?;
        writeln!(writer, "{summary}")?;
        writeln!(writer)?;
        writeln!(writer, "## Key Outputs")?;
        for output in &key_outputs {
            writeln!(writer, "{output}")?;
        }
        writeln!(writer)?;
        writeln!(writer, "## Transcript")?;
        writeln!(writer)?;
        writeln!(writer, "{}", record.transcript)?;

        writer.flush().wrap_err("Failed to flush markdown file")?;
        Ok(path)
    }
}

fn allocate_path(folder: &Path, stem: &str) -> PathBuf {
    let mut path = folder.join(format!("{stem}.md"));
    let mut counter = 1u32;
    while path.exists() {
        path = folder.join(format!("{stem}-{counter}.md"));
        counter += 1;
    }
    path
}
