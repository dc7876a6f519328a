//! Session management CLI commands: show, reset.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;

use mindaid_core::chat::repository::MessageStore;

use crate::state::AppState;

/// Show the current session id, data location and message count.
///
/// # Examples
///
/// ```bash
/// mindaid session show
/// mindaid session show --json
/// ```
pub async fn show_session(state: &AppState, json: bool) -> Result<()> {
    let session_id = state.sessions.load_or_create().await?;
    let messages = state.chat_service.store().list(&session_id).await?;

    if json {
        let info = serde_json::json!({
            "session_id": session_id,
            "message_count": messages.len(),
            "data_dir": state.data_dir.display().to_string(),
            "endpoint_url": state.config.endpoint_url,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!();
    println!("  {}  {}", style("Session:").bold(), style(&session_id).cyan());
    println!("  {}  {}", style("Messages:").bold(), messages.len());
    if let Some(last) = messages.last() {
        println!(
            "  {}  {}",
            style("Last:").bold(),
            style(last.created_at.format("%Y-%m-%d %H:%M UTC")).dim()
        );
    }
    println!(
        "  {}  {}",
        style("Data:").bold(),
        style(state.data_dir.display()).dim()
    );
    println!(
        "  {}  {}",
        style("Endpoint:").bold(),
        style(&state.config.endpoint_url).dim()
    );
    println!();
    Ok(())
}

/// Delete the current session's history and forget its id, with confirmation.
///
/// # Examples
///
/// ```bash
/// mindaid session reset
/// mindaid session reset --force
/// ```
pub async fn reset_session(state: &AppState, force: bool, json: bool) -> Result<()> {
    let Some(session_id) = state.sessions.load().await? else {
        if json {
            println!("{}", serde_json::json!({"reset": false}));
        } else {
            println!("  No session to reset.");
        }
        return Ok(());
    };

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all messages of session '{}'?",
                style(&session_id).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.chat_service.clear_history(&session_id).await?;
    state.sessions.clear().await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"reset": true, "session_id": session_id})
        );
    } else {
        println!(
            "  {} Session '{}' reset. The next chat starts fresh.",
            style("x").red().bold(),
            session_id
        );
    }

    Ok(())
}
