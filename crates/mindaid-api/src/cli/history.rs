//! Conversation history display: table, Markdown and JSON.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use mindaid_core::chat::repository::MessageStore;
use mindaid_types::chat::{MessageRole, StoredMessage};

use crate::state::AppState;

const PREVIEW_CHARS: usize = 80;

/// Print the stored messages of the current session.
///
/// # Examples
///
/// ```bash
/// mindaid history
/// mindaid history --markdown
/// mindaid history --json
/// ```
pub async fn show_history(state: &AppState, json: bool, markdown: bool) -> Result<()> {
    let Some(session_id) = state.sessions.load().await? else {
        if json {
            println!("[]");
        } else {
            print_empty();
        }
        return Ok(());
    };

    let messages = state.chat_service.store().list(&session_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        print_empty();
        return Ok(());
    }

    if markdown {
        print!("{}", render_markdown(&messages));
        return Ok(());
    }

    println!();
    println!("{}", history_table(&messages));
    println!();
    println!(
        "  {} message{}",
        style(messages.len()).bold(),
        if messages.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

fn print_empty() {
    println!();
    println!(
        "  {} No messages yet. Start a conversation with: {}",
        style("i").blue().bold(),
        style("mindaid chat").yellow()
    );
    println!();
}

/// Build the history table shown by `mindaid history` and `/history`.
pub fn history_table(messages: &[StoredMessage]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Time").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Message").fg(Color::White),
    ]);

    for msg in messages {
        let role_cell = match msg.role {
            MessageRole::User => Cell::new("you").fg(Color::Green),
            MessageRole::Assistant => Cell::new("mindaid").fg(Color::Cyan),
        };
        table.add_row(vec![
            Cell::new(msg.created_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
            role_cell,
            Cell::new(preview(&msg.content, PREVIEW_CHARS)),
        ]);
    }

    table
}

/// Render messages as a Markdown transcript.
pub fn render_markdown(messages: &[StoredMessage]) -> String {
    let mut out = String::from("# MindAid conversation\n\n");
    for msg in messages {
        let role_label = match msg.role {
            MessageRole::User => "**You**",
            MessageRole::Assistant => "**MindAid**",
        };
        let timestamp = msg.created_at.format("%Y-%m-%d %H:%M UTC");
        out.push_str(&format!("### {role_label} ({timestamp})\n\n{}\n\n", msg.content));
    }
    out
}

/// Single-line preview truncated to `max` characters.
pub fn preview(content: &str, max: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mindaid_types::chat::SessionId;
    use uuid::Uuid;

    fn message(role: MessageRole, content: &str) -> StoredMessage {
        StoredMessage {
            id: Uuid::now_v7(),
            session_id: SessionId::new("session_1_abcdefghi"),
            role,
            content: content.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(100);
        let p = preview(&long, 10);
        assert_eq!(p.chars().count(), 10);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_preview_flattens_newlines() {
        assert_eq!(preview("line one\nline two", 80), "line one line two");
    }

    #[test]
    fn test_table_contains_messages() {
        let rendered = history_table(&[
            message(MessageRole::User, "I can't sleep"),
            message(MessageRole::Assistant, "That sounds hard"),
        ])
        .to_string();
        assert!(rendered.contains("I can't sleep"));
        assert!(rendered.contains("mindaid"));
        assert!(rendered.contains("2026-03-01 09:30"));
    }

    #[test]
    fn test_markdown_transcript() {
        let md = render_markdown(&[
            message(MessageRole::User, "hello"),
            message(MessageRole::Assistant, "hi"),
        ]);
        assert!(md.starts_with("# MindAid conversation"));
        assert!(md.contains("### **You** (2026-03-01 09:30 UTC)\n\nhello"));
        assert!(md.contains("### **MindAid**"));
    }
}
