//! Streaming POST against the chat function.
//!
//! Sends the conversation as `{"messages": [...]}` and hands the raw response
//! body back as a byte stream. Framing and parsing happen in mindaid-core.

use std::time::Duration;

use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};

use mindaid_core::stream::transport::{ByteStream, CompletionTransport};
use mindaid_types::config::ChatConfig;
use mindaid_types::error::TransportError;
use mindaid_types::stream::CompletionRequest;

/// [`CompletionTransport`] over reqwest.
///
/// The API key is stored as a [`SecretString`] and only exposed when
/// building the `Authorization` header.
pub struct HttpCompletionTransport {
    client: reqwest::Client,
    endpoint_url: String,
    api_key: Option<SecretString>,
}

impl HttpCompletionTransport {
    pub fn new(config: &ChatConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TransportError::Connect(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.clone(),
            api_key: config
                .api_key
                .as_ref()
                .filter(|k| !k.is_empty())
                .map(|k| SecretString::from(k.clone())),
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

impl CompletionTransport for HttpCompletionTransport {
    #[tracing::instrument(name = "chat_request", skip_all, fields(url = %self.endpoint_url))]
    async fn open(&self, request: &CompletionRequest) -> Result<ByteStream, TransportError> {
        let mut builder = self
            .client
            .post(&self.endpoint_url)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Connect(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "chat endpoint error response");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if response.content_length() == Some(0) {
            return Err(TransportError::MissingBody);
        }

        tracing::debug!(status = %status, "chat stream opened");
        let mut byte_stream = response.bytes_stream();

        Ok(Box::pin(async_stream::try_stream! {
            while let Some(chunk) = byte_stream.next().await {
                let chunk = chunk
                    .map_err(|e| TransportError::Read(format!("response body read: {e}")))?;
                yield chunk.to_vec();
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use mindaid_types::chat::MessageRole;
    use mindaid_types::stream::WireMessage;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, api_key: Option<&str>) -> ChatConfig {
        ChatConfig {
            endpoint_url: format!("{}/functions/v1/chat", server.uri()),
            api_key: api_key.map(str::to_string),
            ..ChatConfig::default()
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            messages: vec![WireMessage {
                role: MessageRole::User,
                content: "hello".to_string(),
            }],
        }
    }

    async fn collect(stream: ByteStream) -> Vec<u8> {
        stream
            .try_collect::<Vec<_>>()
            .await
            .unwrap()
            .concat()
    }

    #[tokio::test]
    async fn test_streams_body_with_bearer_auth() {
        let server = MockServer::start().await;
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\ndata: [DONE]\n";
        Mock::given(method("POST"))
            .and(path("/functions/v1/chat"))
            .and(header("Authorization", "Bearer anon-key"))
            .and(body_json(serde_json::json!({
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/event-stream")
                    .set_body_string(body),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpCompletionTransport::new(&config(&server, Some("anon-key"))).unwrap();
        let stream = transport.open(&request()).await.unwrap();

        assert_eq!(collect(stream).await, body.as_bytes());
    }

    #[tokio::test]
    async fn test_error_status_captures_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let transport = HttpCompletionTransport::new(&config(&server, None)).unwrap();
        let err = transport.open(&request()).await.err().unwrap();

        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_body_is_missing_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let transport = HttpCompletionTransport::new(&config(&server, None)).unwrap();
        let err = transport.open(&request()).await.err().unwrap();

        assert!(matches!(err, TransportError::MissingBody));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connect_error() {
        let config = ChatConfig {
            endpoint_url: "http://127.0.0.1:9/chat".to_string(),
            ..ChatConfig::default()
        };
        let transport = HttpCompletionTransport::new(&config).unwrap();

        let err = transport.open(&request()).await.err().unwrap();

        assert!(matches!(err, TransportError::Connect(_)));
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config = ChatConfig {
            api_key: Some(String::new()),
            ..ChatConfig::default()
        };
        let transport = HttpCompletionTransport::new(&config).unwrap();
        assert!(transport.api_key.is_none());
        assert_eq!(transport.endpoint_url(), ChatConfig::default().endpoint_url);
    }
}
