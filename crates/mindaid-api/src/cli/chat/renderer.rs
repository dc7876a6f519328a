//! Terminal rendering of streamed replies and failures.
//!
//! `StreamRenderer` is the chat loop's `ConversationSubscriber`: each update
//! carries the whole log, and the renderer prints only the text added to the
//! assistant message since the previous update. Repeated snapshots print
//! nothing.

use std::collections::HashSet;
use std::io::Write;
use std::sync::Mutex;

use console::style;
use indicatif::ProgressBar;

use mindaid_core::chat::notifier::ErrorNotifier;
use mindaid_core::stream::subscriber::ConversationSubscriber;
use mindaid_types::chat::{ConversationLog, ConversationMessage, MessageRole};

/// Prints assistant text incrementally as updates arrive.
pub struct StreamRenderer<W> {
    state: Mutex<RenderState<W>>,
}

struct RenderState<W> {
    out: W,
    /// Messages already on screen before this reply started.
    known: HashSet<String>,
    current: Option<String>,
    printed: usize,
    spinner: Option<ProgressBar>,
}

impl<W: Write + Send> StreamRenderer<W> {
    /// Create a renderer for one reply; messages already in `log` are skipped.
    pub fn new(out: W, log: &ConversationLog, spinner: Option<ProgressBar>) -> Self {
        Self {
            state: Mutex::new(RenderState {
                out,
                known: log.messages().iter().map(|m| m.id.clone()).collect(),
                current: None,
                printed: 0,
                spinner,
            }),
        }
    }

    /// Stop the spinner and end the reply line. Returns whether any text was shown.
    pub fn finish(&self) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        if let Some(spinner) = state.spinner.take() {
            spinner.finish_and_clear();
        }
        let printed = state.current.is_some();
        if printed {
            let _ = writeln!(state.out);
            let _ = writeln!(state.out);
            let _ = state.out.flush();
        }
        printed
    }

    /// Give back the writer, for inspection in tests.
    #[cfg(test)]
    fn into_inner(self) -> Option<W> {
        self.state.into_inner().ok().map(|s| s.out)
    }
}

impl<W: Write + Send> ConversationSubscriber for StreamRenderer<W> {
    fn on_update(&self, log: &ConversationLog) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let Some(last) = log.last() else {
            return;
        };
        if last.role != MessageRole::Assistant || state.known.contains(&last.id) {
            return;
        }

        if state.current.as_deref() != Some(last.id.as_str()) {
            if let Some(spinner) = state.spinner.take() {
                spinner.finish_and_clear();
            }
            state.current = Some(last.id.clone());
            state.printed = 0;
            let _ = write!(state.out, "\n  {} ", style("MindAid").cyan().bold());
        }

        let printed = state.printed;
        if let Some(tail) = last.content.get(printed..) {
            if !tail.is_empty() {
                let _ = write!(state.out, "{tail}");
                let _ = state.out.flush();
            }
        }
        state.printed = last.content.len();
    }
}

/// Write a full conversation, e.g. when resuming a session.
pub fn print_log(out: &mut impl Write, messages: &[ConversationMessage]) -> std::io::Result<()> {
    for msg in messages {
        let label = match msg.role {
            MessageRole::User => style("You >").green().bold(),
            MessageRole::Assistant => style("MindAid").cyan().bold(),
        };
        writeln!(out, "  {label} {}", msg.content)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Reports stream failures on stderr.
pub struct TerminalNotifier;

impl ErrorNotifier for TerminalNotifier {
    fn notify_error(&self, message: &str) {
        // Explicit \r\n: the terminal may be in raw mode while readline is active.
        eprint!("\r\n  {} {}\r\n", style("!").red().bold(), message);
        eprint!(
            "  {}\r\n\r\n",
            style("Type a message to retry, /exit to quit.").dim()
        );
    }
}
