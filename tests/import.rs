use std::fs;

use chat_archive_import::archive::ArchiveWriter;
use chat_archive_import::classify::DomainVocabulary;
use chat_archive_import::config::{
    default_context_domains, default_vocabulary, AnthropicConfig, ContextConfig, ImportConfig,
    SourceFilter,
};
use chat_archive_import::context::Context;
use chat_archive_import::importer::{parse_claude_conversation, ClaudeConversation};
use chat_archive_import::process;
use chat_archive_import::summary::RuleBased;

const CLAUDE_EXPORT: &str = r#"[
    {
        "name": "Test Conversation",
        "created_at": "2026-01-16T10:00:00Z",
        "chat_messages": [
            {"sender": "Human", "text": "Hello"},
            {"sender": "Assistant", "text": "Hi there!"}
        ]
    }
]"#;

fn test_record() -> chat_archive_import::importer::ConversationRecord {
    let chats: Vec<ClaudeConversation> = serde_json::from_str(CLAUDE_EXPORT).unwrap();
    let vocabulary = DomainVocabulary::new(default_vocabulary(), "system");
    parse_claude_conversation(&chats[0], &vocabulary, &Context::default())
}

#[test]
fn archive_entry_layout_and_content() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ArchiveWriter::new(dir.path());

    let path = writer.write_entry(&test_record(), &RuleBased).unwrap();

    assert_eq!(path.parent().unwrap(), dir.path().join("2026").join("01-January"));
    assert_eq!(path.file_name().unwrap(), "2026-01-16-test-conversation.md");

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("---\n"));
    assert!(content.contains("date: 2026-01-16"));
    assert!(content.contains("ai: claude"));
    assert!(content.contains("# Test Conversation"));
    assert!(content.contains("**Source:** Claude"));
    assert!(content.contains("## Summary"));
    assert!(content.contains("## Key Outputs"));
    assert!(content.contains("## Transcript"));
    assert!(content.contains("Hello"));
    assert!(content.contains("Hi there!"));
}

#[test]
fn colliding_entries_get_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ArchiveWriter::new(dir.path());
    let record = test_record();

    let first = writer.write_entry(&record, &RuleBased).unwrap();
    let before = fs::read_to_string(&first).unwrap();

    let second = writer.write_entry(&record, &RuleBased).unwrap();

    assert_ne!(first, second);
    assert_eq!(second.file_name().unwrap(), "2026-01-16-test-conversation-1.md");
    // The first file survives untouched.
    assert_eq!(fs::read_to_string(&first).unwrap(), before);
    assert!(second.exists());
}

#[test]
fn end_to_end_claude_import() {
    let dir = tempfile::tempdir().unwrap();
    let export_path = dir.path().join("conversations.json");
    fs::write(&export_path, CLAUDE_EXPORT).unwrap();
    let archive_dir = dir.path().join("archive");

    let config = ImportConfig {
        archive_dir: archive_dir.clone(),
        claude_export: export_path,
        chatgpt_export: dir.path().join("missing-chatgpt.json"),
        source: SourceFilter::All,
        sample: None,
        vocabulary: DomainVocabulary::new(default_vocabulary(), "system"),
        context: ContextConfig {
            enabled: false,
            root: None,
            domains: default_context_domains(),
        },
        anthropic: AnthropicConfig::default(),
        api_key: None,
        verbose: false,
        quiet: true,
    };

    process::run(config).unwrap();

    let entry = archive_dir
        .join("2026")
        .join("01-January")
        .join("2026-01-16-test-conversation.md");
    assert!(entry.exists(), "expected {} to exist", entry.display());

    let content = fs::read_to_string(&entry).unwrap();
    assert!(content.contains("date: 2026-01-16"));
    assert!(content.contains("# Test Conversation"));
    assert!(content.contains("## Summary"));
    assert!(content.contains("## Transcript"));
    assert!(content.contains("Hello"));
    assert!(content.contains("Hi there!"));
}

#[test]
fn malformed_source_does_not_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let claude_path = dir.path().join("broken.json");
    fs::write(&claude_path, "{ not json").unwrap();

    let chatgpt_path = dir.path().join("chatgpt.json");
    fs::write(
        &chatgpt_path,
        r#"[{
            "title": "GPT Test",
            "create_time": 1642357200.0,
            "mapping": {
                "node1": {
                    "message": {
                        "author": {"role": "user"},
                        "content": {"content_type": "text", "parts": ["Hello from GPT"]}
                    }
                }
            }
        }]"#,
    )
    .unwrap();
    let archive_dir = dir.path().join("archive");

    let config = ImportConfig {
        archive_dir: archive_dir.clone(),
        claude_export: claude_path,
        chatgpt_export: chatgpt_path,
        source: SourceFilter::All,
        sample: None,
        vocabulary: DomainVocabulary::new(default_vocabulary(), "system"),
        context: ContextConfig {
            enabled: false,
            root: None,
            domains: default_context_domains(),
        },
        anthropic: AnthropicConfig::default(),
        api_key: None,
        verbose: false,
        quiet: true,
    };

    // The broken Claude file is reported and skipped; the ChatGPT source
    // still imports.
    process::run(config).unwrap();

    let entry = archive_dir
        .join("2022")
        .join("01-January")
        .join("2022-01-16-gpt-test.md");
    assert!(entry.exists(), "expected {} to exist", entry.display());
}

#[test]
fn sample_mode_caps_imports_per_source() {
    let dir = tempfile::tempdir().unwrap();
    let export_path = dir.path().join("conversations.json");
    let many: Vec<serde_json::Value> = (0..4)
        .map(|i| {
            serde_json::json!({
                "name": format!("Conversation {i}"),
                "created_at": "2026-01-16T10:00:00Z",
                "chat_messages": [{"sender": "Human", "text": "Hello"}]
            })
        })
        .collect();
    fs::write(&export_path, serde_json::to_string(&many).unwrap()).unwrap();
    let archive_dir = dir.path().join("archive");

    let config = ImportConfig {
        archive_dir: archive_dir.clone(),
        claude_export: export_path,
        chatgpt_export: dir.path().join("missing.json"),
        source: SourceFilter::Claude,
        sample: Some(2),
        vocabulary: DomainVocabulary::new(default_vocabulary(), "system"),
        context: ContextConfig {
            enabled: false,
            root: None,
            domains: default_context_domains(),
        },
        anthropic: AnthropicConfig::default(),
        api_key: None,
        verbose: false,
        quiet: true,
    };

    process::run(config).unwrap();

    let month_dir = archive_dir.join("2026").join("01-January");
    let written = fs::read_dir(&month_dir).unwrap().count();
    assert_eq!(written, 2);
}
