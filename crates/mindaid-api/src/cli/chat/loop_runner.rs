//! Main chat loop orchestration.
//!
//! Resolves the session, shows the banner and the saved conversation, then
//! reads input: slash commands are handled locally, everything else is sent
//! through `ChatService` and the reply is printed as it streams.

use std::io::Write;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline_async::SharedWriter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mindaid_core::chat::repository::MessageStore;
use mindaid_types::chat::{ConversationLog, SessionId};
use mindaid_types::error::ChatError;
use mindaid_types::stream::StreamOutcome;

use crate::cli::history::history_table;
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{print_log, StreamRenderer};

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let session_id = state.sessions.load_or_create().await?;
    let mut log = history_or_welcome(
        state.chat_service.load_history(&session_id).await,
        &state.config.welcome_message,
    );
    info!(session_id = %session_id, messages = log.len(), "chat started");

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, mut out) =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    print_welcome_banner(&mut out, &state.config.endpoint_url, &session_id)?;
    print_log(&mut out, log.messages())?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                writeln!(out, "\n  {}", style("Take care.").dim())?;
                break;
            }
            InputEvent::Interrupted => {
                writeln!(out, "\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim())?;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(&mut out)?,
                        ChatCommand::History => {
                            let messages = state.chat_service.store().list(&session_id).await?;
                            if messages.is_empty() {
                                writeln!(out, "\n  {}\n", style("No saved messages yet.").dim())?;
                            } else {
                                writeln!(out, "\n{}\n", history_table(&messages))?;
                            }
                        }
                        ChatCommand::Clear => {
                            state.chat_service.clear_history(&session_id).await?;
                            log = history_or_welcome(
                                state.chat_service.load_history(&session_id).await,
                                &state.config.welcome_message,
                            );
                            chat_input.clear();
                            print_welcome_banner(&mut out, &state.config.endpoint_url, &session_id)?;
                            print_log(&mut out, log.messages())?;
                        }
                        ChatCommand::Exit => {
                            writeln!(out, "\n  {}", style("Take care.").dim())?;
                            break;
                        }
                        ChatCommand::Unknown(name) => {
                            writeln!(
                                out,
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            )?;
                        }
                    }
                    continue;
                }

                chat_input.add_history(text.clone());
                send_and_render(state, &session_id, &mut log, &text, &mut chat_input, &mut out)
                    .await?;
            }
        }
    }

    chat_input.flush();
    Ok(())
}

/// Fall back to the welcome message when history can't be loaded; chatting
/// still works without it.
fn history_or_welcome(
    loaded: Result<ConversationLog, ChatError>,
    welcome_message: &str,
) -> ConversationLog {
    loaded.unwrap_or_else(|e| {
        warn!(error = %e, "failed to load chat history");
        ConversationLog::welcome(welcome_message)
    })
}

/// Send one message and print the streamed reply.
///
/// Input keeps being read while the reply streams: Ctrl+C or Ctrl+D cancel
/// the stream, typed lines are dropped.
async fn send_and_render(
    state: &AppState,
    session_id: &SessionId,
    log: &mut ConversationLog,
    text: &str,
    chat_input: &mut ChatInput,
    out: &mut SharedWriter,
) -> anyhow::Result<()> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message("listening...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let renderer = StreamRenderer::new(out.clone(), log, Some(spinner));
    let cancel = CancellationToken::new();

    let result = {
        let send = state
            .chat_service
            .send_message(session_id, log, text, &renderer, cancel.clone());
        tokio::pin!(send);

        loop {
            tokio::select! {
                result = &mut send => break result,
                event = chat_input.read_line() => match event {
                    InputEvent::Interrupted | InputEvent::Eof => {
                        debug!("reply cancelled from keyboard");
                        cancel.cancel();
                    }
                    InputEvent::Message(_) => {}
                },
            }
        }
    };

    renderer.finish();

    match result {
        Ok(StreamOutcome::Completed(done)) if done.message.is_none() => {
            writeln!(out, "\n  {}\n", style("(no response)").dim())?;
        }
        Ok(StreamOutcome::Completed(_)) | Ok(StreamOutcome::Failed(_)) => {}
        Ok(StreamOutcome::Cancelled) => {
            writeln!(out, "\n  {}\n", style("Reply stopped.").dim())?;
        }
        Err(ChatError::EmptyInput | ChatError::StreamInProgress) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
