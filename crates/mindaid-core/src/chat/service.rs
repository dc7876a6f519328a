//! Chat service coordinating history, the user turn, and the response stream.
//!
//! ChatService sits between the front-end and the stream consumer: it loads
//! the visible conversation, records the user's message, and runs one
//! `StreamConsumer` per send. Only one response may stream at a time.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use mindaid_types::chat::{ConversationLog, ConversationMessage, MessageRole, SessionId};
use mindaid_types::config::ChatConfig;
use mindaid_types::error::ChatError;
use mindaid_types::stream::StreamOutcome;

use crate::chat::notifier::ErrorNotifier;
use crate::chat::repository::MessageStore;
use crate::stream::consumer::StreamConsumer;
use crate::stream::subscriber::ConversationSubscriber;
use crate::stream::transport::CompletionTransport;

/// Orchestrates a chat session over a store, a notifier and a transport.
///
/// Generic over the collaborator traits so mindaid-core never depends on
/// mindaid-infra.
pub struct ChatService<M: MessageStore, N: ErrorNotifier, T: CompletionTransport> {
    store: M,
    notifier: N,
    transport: T,
    welcome_message: String,
    failure_message: String,
    streaming: AtomicBool,
}

/// Clears the in-progress flag when the send finishes or is dropped.
struct StreamingGuard<'a>(&'a AtomicBool);

impl Drop for StreamingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<M: MessageStore, N: ErrorNotifier, T: CompletionTransport> ChatService<M, N, T> {
    pub fn new(store: M, notifier: N, transport: T, config: &ChatConfig) -> Self {
        Self {
            store,
            notifier,
            transport,
            welcome_message: config.welcome_message.clone(),
            failure_message: config.failure_message.clone(),
            streaming: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &M {
        &self.store
    }

    /// Whether a response is currently streaming.
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Acquire)
    }

    /// Load the visible conversation for a session.
    ///
    /// A session with no stored messages starts from the welcome message.
    #[tracing::instrument(name = "load_history", skip(self), fields(session_id = %session_id))]
    pub async fn load_history(&self, session_id: &SessionId) -> Result<ConversationLog, ChatError> {
        let stored = self.store.list(session_id).await?;
        if stored.is_empty() {
            return Ok(ConversationLog::welcome(self.welcome_message.clone()));
        }

        info!(count = stored.len(), "loaded chat history");
        Ok(ConversationLog::from_messages(
            stored
                .into_iter()
                .map(|m| m.into_conversation_message())
                .collect(),
        ))
    }

    /// Send the user's input and stream the assistant's reply into `log`.
    ///
    /// Rejects blank input and overlapping sends. A token cancelled before the
    /// call leaves `log` and the store untouched. Failing to store the user
    /// message is logged and does not stop the request.
    #[tracing::instrument(name = "send_message", skip_all, fields(session_id = %session_id))]
    pub async fn send_message<S: ConversationSubscriber>(
        &self,
        session_id: &SessionId,
        log: &mut ConversationLog,
        input: &str,
        subscriber: &S,
        cancel: CancellationToken,
    ) -> Result<StreamOutcome, ChatError> {
        let content = input.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyInput);
        }

        if self
            .streaming
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ChatError::StreamInProgress);
        }
        let _guard = StreamingGuard(&self.streaming);

        if cancel.is_cancelled() {
            info!("send cancelled before start");
            return Ok(StreamOutcome::Cancelled);
        }

        log.push(ConversationMessage::user(content));
        subscriber.on_update(log);

        if let Err(e) = self
            .store
            .append(session_id, MessageRole::User, content)
            .await
        {
            warn!(error = %e, "failed to persist user message");
        }

        let mut consumer = StreamConsumer::new(&self.store, &self.notifier, subscriber, cancel)
            .with_failure_message(self.failure_message.clone());
        Ok(consumer.run(&self.transport, session_id, log).await)
    }

    /// Delete every stored message of a session.
    #[tracing::instrument(name = "clear_history", skip(self), fields(session_id = %session_id))]
    pub async fn clear_history(&self, session_id: &SessionId) -> Result<(), ChatError> {
        self.store.clear(session_id).await?;
        info!("chat history cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, RecordingNotifier, RecordingSubscriber, ScriptedTransport};
    use mindaid_types::chat::WELCOME_MESSAGE_ID;

    const BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"I hear you.\"}}]}\n\ndata: [DONE]\n";

    fn service(
        transport: ScriptedTransport,
    ) -> ChatService<MemoryStore, RecordingNotifier, ScriptedTransport> {
        ChatService::new(
            MemoryStore::default(),
            RecordingNotifier::default(),
            transport,
            &ChatConfig::default(),
        )
    }

    fn session() -> SessionId {
        SessionId::new("session_1_abcdefghi")
    }

    #[tokio::test]
    async fn test_empty_history_starts_with_welcome() {
        let svc = service(ScriptedTransport::from_text(&[]));

        let log = svc.load_history(&session()).await.unwrap();

        assert_eq!(log.len(), 1);
        let welcome = log.last().unwrap();
        assert_eq!(welcome.id, WELCOME_MESSAGE_ID);
        assert_eq!(welcome.role, MessageRole::Assistant);
        assert_eq!(welcome.content, ChatConfig::default().welcome_message);
    }

    #[tokio::test]
    async fn test_send_round_trip_persists_both_turns() {
        let svc = service(ScriptedTransport::from_text(&[BODY]));
        let subscriber = RecordingSubscriber::default();
        let mut log = svc.load_history(&session()).await.unwrap();

        let outcome = svc
            .send_message(
                &session(),
                &mut log,
                "  I feel anxious  ",
                &subscriber,
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.message().unwrap().content, "I hear you.");
        assert_eq!(log.len(), 3);
        assert_eq!(log.messages()[1].content, "I feel anxious");
        assert_eq!(
            svc.store().contents(),
            vec![
                (MessageRole::User, "I feel anxious".to_string()),
                (MessageRole::Assistant, "I hear you.".to_string()),
            ]
        );
        // user turn + one delta
        assert_eq!(subscriber.count(), 2);
        assert!(!svc.is_streaming());

        let reloaded = svc.load_history(&session()).await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.messages()[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_blank_input_rejected() {
        let svc = service(ScriptedTransport::from_text(&[BODY]));
        let subscriber = RecordingSubscriber::default();
        let mut log = ConversationLog::new();

        let err = svc
            .send_message(&session(), &mut log, "   \n", &subscriber, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::EmptyInput));
        assert!(log.is_empty());
        assert_eq!(subscriber.count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_token_sends_nothing() {
        let transport = ScriptedTransport::from_text(&[BODY]);
        let svc = service(transport);
        let subscriber = RecordingSubscriber::default();
        let mut log = ConversationLog::welcome("Hello!");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = svc
            .send_message(&session(), &mut log, "hello", &subscriber, cancel)
            .await
            .unwrap();

        assert!(matches!(outcome, StreamOutcome::Cancelled));
        assert_eq!(log.len(), 1);
        assert_eq!(subscriber.count(), 0);
        assert!(svc.store().contents().is_empty());
        assert!(svc.transport.requests.lock().unwrap().is_empty());
        assert!(svc.notifier.errors.lock().unwrap().is_empty());
        assert!(!svc.is_streaming());
    }

    #[tokio::test]
    async fn test_concurrent_send_rejected() {
        let svc = service(ScriptedTransport::from_text(&[]).hanging());
        let subscriber = RecordingSubscriber::default();
        let cancel = CancellationToken::new();
        let mut first_log = ConversationLog::new();
        let mut second_log = ConversationLog::new();
        let sid = session();

        let first = svc.send_message(&sid, &mut first_log, "one", &subscriber, cancel.clone());
        let second = async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            let result = svc
                .send_message(&sid, &mut second_log, "two", &subscriber, CancellationToken::new())
                .await;
            cancel.cancel();
            result
        };
        let (first, second) = tokio::join!(first, second);

        assert!(matches!(first.unwrap(), StreamOutcome::Cancelled));
        assert!(matches!(second.unwrap_err(), ChatError::StreamInProgress));
        assert!(!svc.is_streaming());
    }

    #[tokio::test]
    async fn test_user_store_failure_is_not_fatal() {
        let svc = ChatService::new(
            MemoryStore::failing(),
            RecordingNotifier::default(),
            ScriptedTransport::from_text(&[BODY]),
            &ChatConfig::default(),
        );
        let subscriber = RecordingSubscriber::default();
        let mut log = ConversationLog::new();

        let outcome = svc
            .send_message(&session(), &mut log, "hello", &subscriber, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.message().unwrap().content, "I hear you.");
        assert_eq!(subscriber.last().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_uses_configured_message() {
        let config = ChatConfig {
            failure_message: "Something went wrong".to_string(),
            ..ChatConfig::default()
        };
        let svc = ChatService::new(
            MemoryStore::default(),
            RecordingNotifier::default(),
            ScriptedTransport::failing_status(502),
            &config,
        );
        let subscriber = RecordingSubscriber::default();
        let mut log = ConversationLog::new();

        let outcome = svc
            .send_message(&session(), &mut log, "hello", &subscriber, CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, StreamOutcome::Failed(_)));
        assert_eq!(
            *svc.notifier.errors.lock().unwrap(),
            vec!["Something went wrong".to_string()]
        );
        assert!(!svc.is_streaming());
    }

    #[tokio::test]
    async fn test_clear_history() {
        let svc = service(ScriptedTransport::from_text(&[BODY]));
        let subscriber = RecordingSubscriber::default();
        let mut log = ConversationLog::new();
        svc.send_message(&session(), &mut log, "hello", &subscriber, CancellationToken::new())
            .await
            .unwrap();

        svc.clear_history(&session()).await.unwrap();

        let log = svc.load_history(&session()).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().unwrap().id, WELCOME_MESSAGE_ID);
    }
}
