use std::fs;

use crate::config::ContextConfig;

/// Sprint/project context scraped from a Human OS tree.
///
/// Everything here is optional enrichment: a missing root, file, or section
/// degrades silently to keyword-only tagging.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Current flagship line from `SYSTEM/00-Index/Sprint.md`.
    pub flagship: Option<String>,
    /// Active project names per domain, scraped from the `## NOW` section
    /// of each `@<domain>-INDEX.md`. Loaded for the startup report only.
    pub active_projects: Vec<(String, Vec<String>)>,
}

/// Load sprint context from the configured Human OS root.
pub fn load_context(config: &ContextConfig) -> Context {
    let mut context = Context::default();
    if !config.enabled {
        return context;
    }
    let Some(root) = &config.root else {
        return context;
    };

    let sprint_path = root.join("SYSTEM/00-Index/Sprint.md");
    if let Ok(content) = fs::read_to_string(&sprint_path) {
        context.flagship = content
            .lines()
            .find_map(|line| line.trim_start().strip_prefix("**Flagship:**"))
            .map(|rest| rest.trim().to_string())
            .filter(|f| !f.is_empty());
    }

    for domain in &config.domains {
        let index_path = root.join(format!("@{domain}-INDEX.md"));
        let Ok(content) = fs::read_to_string(&index_path) else {
            continue;
        };
        let projects = scrape_now_section(&content);
        context.active_projects.push((format!("@{domain}"), projects));
    }

    context
}

/// Pull bolded project names out of the `## NOW` table of an INDEX file.
fn scrape_now_section(content: &str) -> Vec<String> {
    let mut projects = Vec::new();
    let mut in_now = false;
    for line in content.lines() {
        if line.trim_end() == "## NOW" {
            in_now = true;
            continue;
        }
        if in_now && line.starts_with("##") {
            break;
        }
        if in_now
            && line.contains('|')
            && let Some(name) = bold_span(line)
        {
            projects.push(name);
        }
    }
    projects
}

/// First `**…**` span of a line, trimmed. None when absent or empty.
fn bold_span(line: &str) -> Option<String> {
    let start = line.find("**")? + 2;
    let end = line[start..].find("**")? + start;
    let name = line[start..end].trim();
    (!name.is_empty()).then(|| name.to_string())
}
