//! Line classification for the completion stream.

use mindaid_types::stream::{DecodedEvent, COMMENT_MARKER, DATA_PREFIX, DONE_SENTINEL};

/// Classify one line of the response stream.
///
/// Comments, blank lines and anything without the `data: ` prefix are
/// skipped; malformed lines are never fatal.
pub fn classify(line: &str) -> DecodedEvent {
    if line.starts_with(COMMENT_MARKER) || line.trim().is_empty() {
        return DecodedEvent::Skip;
    }

    let Some(rest) = line.strip_prefix(DATA_PREFIX) else {
        return DecodedEvent::Skip;
    };

    let payload = rest.trim();
    if payload == DONE_SENTINEL {
        DecodedEvent::Terminator
    } else {
        DecodedEvent::Data(payload.to_string())
    }
}
