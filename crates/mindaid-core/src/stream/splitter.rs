//! Byte-to-line reassembly for the completion stream.
//!
//! Network chunks arrive with arbitrary boundaries: a line, a `data: ` marker,
//! or a multi-byte UTF-8 character may be split across two reads. The
//! splitter keeps undecoded trailing bytes and unterminated text between
//! calls and only hands out complete lines.

/// Stateful splitter turning a byte stream into lines.
///
/// One instance per stream. Lines are returned without their `\n` and with a
/// single trailing `\r` stripped.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    /// Bytes of an incomplete UTF-8 sequence at the end of the last chunk.
    pending: Vec<u8>,
    /// Decoded text not yet terminated by a line break.
    buffer: String,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completed, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        self.decode_pending();

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].find('\n') {
            let end = start + offset;
            let line = &self.buffer[start..end];
            lines.push(line.strip_suffix('\r').unwrap_or(line).to_string());
            start = end + 1;
        }
        // Consumed lines are removed in one shift.
        self.buffer.drain(..start);
        lines
    }

    /// Flush at end of input.
    ///
    /// An unterminated trailing line is dropped: a well-formed stream always
    /// ends with the done sentinel followed by a line break. The dropped text
    /// is returned when it holds anything besides whitespace, so the caller
    /// can log it. The splitter is empty afterwards.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            self.buffer
                .push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }

        let rest = std::mem::take(&mut self.buffer);
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    /// Number of bytes and chars held back, for diagnostics.
    pub fn buffered_len(&self) -> usize {
        self.pending.len() + self.buffer.len()
    }

    /// Move as much of `pending` as is decodable into `buffer`.
    ///
    /// Invalid sequences become U+FFFD; an incomplete sequence at the end
    /// stays in `pending` until more bytes arrive.
    fn decode_pending(&mut self) {
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                        Some(bad) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                    }
                }
            }
        }
    }
}
