use std::collections::BTreeSet;

use crate::context::Context;

/// Slug used when a title sanitizes down to nothing.
pub const UNTITLED_TOPIC: &str = "untitled-conversation";

/// Convert a conversation title into a hyphenated, filesystem-safe topic slug.
///
/// Lowercases, strips everything outside ASCII alphanumerics / whitespace /
/// hyphens, collapses separator runs, and keeps at most the first four words.
/// Always returns a non-empty slug.
pub fn sanitize_topic(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let words: Vec<&str> = stripped
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty())
        .take(4)
        .collect();

    if words.is_empty() {
        UNTITLED_TOPIC.to_string()
    } else {
        words.join("-")
    }
}

/// Keyword vocabulary mapping domains to trigger phrases.
///
/// Domains are kept in insertion order (config-file order, or the built-in
/// default order); that order is also the tie-break when two domains score
/// equally, so classification is reproducible across runs.
#[derive(Debug, Clone)]
pub struct DomainVocabulary {
    domains: Vec<(String, Vec<String>)>,
    default_domain: String,
}

impl DomainVocabulary {
    pub fn new(domains: Vec<(String, Vec<String>)>, default_domain: &str) -> Self {
        let domains = domains
            .into_iter()
            .map(|(name, keywords)| {
                let keywords = keywords.into_iter().map(|kw| kw.to_lowercase()).collect();
                (with_sigil(&name), keywords)
            })
            .collect();
        Self {
            domains,
            default_domain: with_sigil(default_domain),
        }
    }

    /// Pick the domain whose keywords match the text most often.
    ///
    /// A keyword matches as a plain substring of the lowercased title+content.
    /// Zero matches anywhere falls back to the default domain. Total: always
    /// returns exactly one `@`-sigiled identifier.
    pub fn detect(&self, content: &str, title: &str) -> String {
        let combined = format!("{title} {content}").to_lowercase();

        let mut best: Option<(&str, usize)> = None;
        for (domain, keywords) in &self.domains {
            let score = keywords.iter().filter(|kw| combined.contains(kw.as_str())).count();
            // Strictly greater: earlier-inserted domains win ties.
            if score > 0 && best.is_none_or(|(_, s)| score > s) {
                best = Some((domain, score));
            }
        }

        match best {
            Some((domain, _)) => domain.to_string(),
            None => self.default_domain.clone(),
        }
    }

    pub fn default_domain(&self) -> &str {
        &self.default_domain
    }
}

fn with_sigil(name: &str) -> String {
    if name.starts_with('@') {
        name.to_string()
    } else {
        format!("@{name}")
    }
}

/// Fixed topic-tag table: tag → keywords that trigger it.
const TOPIC_TAGS: &[(&str, &[&str])] = &[
    ("positioning", &["positioning", "brand strategy", "offer"]),
    ("music", &["song", "lyrics", "melody", "music", "audio"]),
    ("code", &["python", "javascript", "function", "script", "code"]),
    ("2e", &["2e", "dyslexia", "twice-exceptional", "neurodivergent"]),
    ("shadow-work", &["shadow", "integration", "shadow-work"]),
    ("website", &["website", "site", "landing page", "domain"]),
];

/// Derive up to five sorted, unique tags for a conversation.
///
/// The classified domain (sigil stripped) always contributes one tag; the
/// sprint flagship, when present, adds its fixed trigger tags; the topic
/// table adds one tag per matched keyword group.
pub fn generate_tags(
    content: &str,
    title: &str,
    vocabulary: &DomainVocabulary,
    context: &Context,
) -> Vec<String> {
    let combined = format!("{title} {content}").to_lowercase();
    let mut tags = BTreeSet::new();

    let domain = vocabulary.detect(content, title);
    tags.insert(domain.trim_start_matches('@').to_string());

    if let Some(flagship) = &context.flagship {
        let flagship = flagship.to_lowercase();
        if flagship.contains("brand") {
            tags.insert("brand".to_string());
        }
        if flagship.contains("visual") {
            tags.insert("visual-direction".to_string());
        }
    }

    for (tag, keywords) in TOPIC_TAGS {
        if keywords.iter().any(|kw| combined.contains(kw)) {
            tags.insert((*tag).to_string());
        }
    }

    tags.into_iter().take(5).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_vocabulary;

    fn vocabulary() -> DomainVocabulary {
        DomainVocabulary::new(default_vocabulary(), "system")
    }

    #[test]
    fn sanitize_basic_conversion() {
        assert_eq!(sanitize_topic("Hello World"), "hello-world");
        assert_eq!(sanitize_topic("Test Topic Here"), "test-topic-here");
    }

    #[test]
    fn sanitize_strips_special_chars() {
        assert_eq!(sanitize_topic("Test's Topic"), "tests-topic");
        assert_eq!(sanitize_topic("Rust 1.89 & beyond!"), "rust-189-beyond");
    }

    #[test]
    fn sanitize_caps_at_four_words() {
        assert_eq!(sanitize_topic("one two three four five"), "one-two-three-four");
        assert_eq!(sanitize_topic("a b c d e f"), "a-b-c-d");
    }

    #[test]
    fn sanitize_falls_back_on_empty_input() {
        assert_eq!(sanitize_topic(""), UNTITLED_TOPIC);
        assert_eq!(sanitize_topic("-"), UNTITLED_TOPIC);
        assert_eq!(sanitize_topic("!!!"), UNTITLED_TOPIC);
        assert_eq!(sanitize_topic("   "), UNTITLED_TOPIC);
    }

    #[test]
    fn sanitize_output_shape() {
        for input in ["Hello World", "a--b", "  spaced   out  ", "ALL CAPS TITLE NOW", "日本語"] {
            let slug = sanitize_topic(input);
            assert!(
                slug == UNTITLED_TOPIC
                    || slug
                        .split('-')
                        .all(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_alphanumeric())),
                "bad slug {slug:?} for {input:?}"
            );
            assert!(slug.split('-').count() <= 4);
        }
    }

    #[test]
    fn detect_matches_music_keywords() {
        let vocab = vocabulary();
        let domain = vocab.detect("I'm working on a new song with lyrics and a melody", "Music Production");
        assert_eq!(domain, "@loopwalker");
    }

    #[test]
    fn detect_is_total_and_deterministic() {
        let vocab = vocabulary();
        assert_eq!(vocab.detect("", ""), "@system");
        let first = vocab.detect("random talk about weather", "Random");
        let second = vocab.detect("random talk about weather", "Random");
        assert_eq!(first, second);
        assert_eq!(first, "@system");
    }

    #[test]
    fn detect_ties_break_to_insertion_order() {
        let vocab = DomainVocabulary::new(
            vec![
                ("alpha".to_string(), vec!["shared".to_string()]),
                ("beta".to_string(), vec!["shared".to_string()]),
            ],
            "fallback",
        );
        assert_eq!(vocab.detect("a shared keyword", ""), "@alpha");
    }

    #[test]
    fn detect_adds_sigil_to_default() {
        let vocab = DomainVocabulary::new(Vec::new(), "system");
        assert_eq!(vocab.detect("anything", "title"), "@system");
    }

    #[test]
    fn tags_are_bounded_sorted_and_unique() {
        let vocab = vocabulary();
        let context = Context {
            flagship: Some("Brand System with visual direction".to_string()),
            ..Context::default()
        };
        let content = "music song code brand positioning workflow 2e dyslexia system automation website";
        let tags = generate_tags(content, "Multi Topic", &vocab, &context);

        assert!(tags.len() <= 5);
        let mut sorted = tags.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(tags, sorted);
    }

    #[test]
    fn tags_include_stripped_domain() {
        let vocab = vocabulary();
        let tags = generate_tags("working on lyrics and melody", "Song Writing", &vocab, &Context::default());
        assert!(tags.contains(&"loopwalker".to_string()) || tags.contains(&"music".to_string()));
        assert!(tags.iter().all(|t| !t.starts_with('@')));
    }
}
