//! Observer interface between the stream consumer and the rendering layer.
//!
//! The consumer emits immutable snapshots of the conversation log; the
//! front-end registers as a listener. Updates can arrive once per network
//! chunk, and the same state may be delivered more than once, so
//! implementations must treat each call as "render this state".

use tokio::sync::watch;

use mindaid_types::chat::ConversationLog;

/// Receives conversation log snapshots as the stream progresses.
pub trait ConversationSubscriber: Send + Sync {
    fn on_update(&self, log: &ConversationLog);
}

impl<F> ConversationSubscriber for F
where
    F: Fn(&ConversationLog) + Send + Sync,
{
    fn on_update(&self, log: &ConversationLog) {
        self(log)
    }
}

/// Publishes snapshots on a watch channel; receivers always see the latest log.
///
/// Replacing with an identical snapshot leaves receivers unchanged.
impl ConversationSubscriber for watch::Sender<ConversationLog> {
    fn on_update(&self, log: &ConversationLog) {
        self.send_if_modified(|current| {
            if current == log {
                false
            } else {
                *current = log.clone();
                true
            }
        });
    }
}
