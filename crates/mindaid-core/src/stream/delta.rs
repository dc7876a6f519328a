//! Text delta extraction from data-frame payloads.
//!
//! Payloads follow the chat-completion chunk shape
//! `{"choices":[{"delta":{"content":"..."}}]}`. Only
//! `choices[0].delta.content` is read; every other field is ignored so new
//! server-side fields never break the client.

use serde::Deserialize;

use mindaid_types::error::FrameDecodeError;

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the incremental text carried by one payload.
///
/// Returns an empty string when the payload is well-formed but carries no
/// text (role-only deltas, finish chunks, usage chunks).
pub fn extract(payload: &str) -> Result<String, FrameDecodeError> {
    let chunk: ChunkPayload = serde_json::from_str(payload)
        .map_err(|e| FrameDecodeError::InvalidJson(e.to_string()))?;

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .unwrap_or_default())
}
