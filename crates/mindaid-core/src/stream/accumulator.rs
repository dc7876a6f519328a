//! Folding of text fragments into the in-progress assistant message.

use uuid::Uuid;

use mindaid_types::chat::{ConversationLog, ConversationMessage, MessageRole};

/// Builds the single assistant message of one stream.
///
/// The message id is assigned at the first non-empty fragment and reused for
/// every later update, so the log entry is replaced in place rather than
/// duplicated.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    in_progress: Option<String>,
    content: String,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `fragment` to the in-progress message and mirror it into `log`.
    ///
    /// Returns `true` when the log changed. Empty fragments change nothing.
    pub fn apply(&mut self, fragment: &str, log: &mut ConversationLog) -> bool {
        if fragment.is_empty() {
            return false;
        }

        self.content.push_str(fragment);

        match &self.in_progress {
            Some(id) => {
                if !log.replace_content(id, &self.content) {
                    // The entry vanished from the log; put it back under the same id.
                    log.push(ConversationMessage::new(
                        id.clone(),
                        MessageRole::Assistant,
                        self.content.clone(),
                    ));
                }
            }
            None => {
                let id = Uuid::now_v7().to_string();
                log.push(ConversationMessage::new(
                    id.clone(),
                    MessageRole::Assistant,
                    self.content.clone(),
                ));
                self.in_progress = Some(id);
            }
        }
        true
    }

    /// Id of the message currently receiving fragments.
    pub fn in_progress_id(&self) -> Option<&str> {
        self.in_progress.as_deref()
    }

    /// Text accumulated so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// End the stream: clear in-progress status and hand back the final message.
    pub fn finish(&mut self) -> Option<ConversationMessage> {
        let id = self.in_progress.take()?;
        let content = std::mem::take(&mut self.content);
        Some(ConversationMessage::new(id, MessageRole::Assistant, content))
    }
}
