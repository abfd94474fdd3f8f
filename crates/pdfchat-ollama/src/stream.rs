//! Incremental decoding of Ollama's newline-delimited JSON stream

use serde::Deserialize;
use tracing::debug;

/// One line of a streamed `/api/generate` response
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
}

/// Splits arbitrary byte chunks into complete JSON lines.
///
/// Network reads can end mid-line, so bytes after the last newline stay
/// buffered until the next push.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every chunk completed by them
    pub fn push(&mut self, bytes: &[u8]) -> Vec<GenerateChunk> {
        self.buffer.extend_from_slice(bytes);

        let mut chunks = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(chunk) = Self::decode_line(&line) {
                chunks.push(chunk);
            }
        }
        chunks
    }

    /// Decode whatever is left once the body has ended
    pub fn finish(&mut self) -> Option<GenerateChunk> {
        let rest = std::mem::take(&mut self.buffer);
        Self::decode_line(&rest)
    }

    fn decode_line(line: &[u8]) -> Option<GenerateChunk> {
        let text = String::from_utf8_lossy(line);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match serde_json::from_str::<GenerateChunk>(text) {
            Ok(chunk) => Some(chunk),
            Err(e) => {
                debug!("Skipping undecodable stream line: {}", e);
                None
            }
        }
    }
}
