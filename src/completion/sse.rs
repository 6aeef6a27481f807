// src/completion/sse.rs
use super::CompletionError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ChunkEvent {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// Incremental decoder for the chat-completions event stream.
///
/// Network chunks do not line up with event lines, so bytes are buffered
/// until a newline arrives. Only `data:` lines are meaningful; `[DONE]`
/// ends the stream.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feeds raw bytes and returns the text fragments completed by them.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, CompletionError> {
        let mut fragments = Vec::new();
        if self.done {
            return Ok(fragments);
        }
        self.buffer.extend_from_slice(chunk);

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(fragment) = self.decode_line(&line)? {
                fragments.push(fragment);
            }
            if self.done {
                self.buffer.clear();
                break;
            }
        }

        Ok(fragments)
    }

    /// Flushes a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> Result<Option<String>, CompletionError> {
        if self.done || self.buffer.is_empty() {
            return Ok(None);
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line)
    }

    fn decode_line(&mut self, raw: &[u8]) -> Result<Option<String>, CompletionError> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(data) = line.strip_prefix("data:") else {
            return Ok(None);
        };
        let data = data.trim_start();

        if data == "[DONE]" {
            self.done = true;
            return Ok(None);
        }
        if data.is_empty() {
            return Ok(None);
        }

        let event: ChunkEvent = serde_json::from_str(data)?;
        Ok(event
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty()))
    }
}
