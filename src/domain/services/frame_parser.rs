#[cfg(test)]
#[path = "frame_parser_test.rs"]
mod tests;

use crate::domain::models::StreamFrame;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";
const ERROR_SENTINEL: &str = "[ERROR]";
const MAX_LINE_BYTES: usize = 4 * 1024 * 1024;

/// Incremental decoder for the `data: <payload>` line protocol. Chunks may
/// split lines, and UTF-8 characters, at any byte. One parser serves exactly
/// one stream; once a terminal frame is produced it yields nothing more.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: Vec<u8>,
    // Bytes of `buffer` already known to hold no newline.
    scanned: usize,
    halted: bool,
}

impl FrameParser {
    pub fn new() -> FrameParser {
        return FrameParser::default();
    }

    pub fn is_halted(&self) -> bool {
        return self.halted;
    }

    /// Feeds the next chunk from the transport, returning every frame it
    /// completes in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamFrame> {
        let mut frames: Vec<StreamFrame> = vec![];
        if self.halted {
            return frames;
        }

        self.buffer.extend_from_slice(chunk);

        let mut line_start = 0;
        let mut search_from = self.scanned;
        loop {
            let offset = match self.buffer[search_from..]
                .iter()
                .position(|byte| return *byte == b'\n')
            {
                Some(offset) => offset,
                None => break,
            };

            let line_end = search_from + offset;
            let frame = parse_line(&self.buffer[line_start..line_end]);
            line_start = line_end + 1;
            search_from = line_start;

            let frame = match frame {
                Some(frame) => frame,
                None => continue,
            };

            let terminal = frame.is_terminal();
            frames.push(frame);
            if terminal {
                self.halt();
                return frames;
            }
        }

        self.buffer.drain(..line_start);
        self.scanned = self.buffer.len();

        if self.buffer.len() > MAX_LINE_BYTES {
            tracing::warn!(bytes = self.buffer.len(), "Stream line exceeded maximum size");
            self.halt();
            frames.push(StreamFrame::Failed(
                "stream line exceeded maximum size".to_string(),
            ));
        }

        return frames;
    }

    /// Signals end of stream. Produces a failure if no terminal frame was seen;
    /// any trailing partial line is dropped.
    pub fn finish(&mut self) -> Option<StreamFrame> {
        if self.halted {
            return None;
        }

        if !self.buffer.is_empty() {
            tracing::debug!(
                bytes = self.buffer.len(),
                "Discarding partial line at end of stream"
            );
        }

        self.halt();
        return Some(StreamFrame::Failed(
            "stream ended without completion".to_string(),
        ));
    }

    fn halt(&mut self) {
        self.halted = true;
        self.buffer.clear();
        self.scanned = 0;
    }
}

fn parse_line(raw: &[u8]) -> Option<StreamFrame> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = String::from_utf8_lossy(raw);

    let mut payload = line.strip_prefix(DATA_PREFIX)?;
    if let Some(stripped) = payload.strip_prefix(' ') {
        payload = stripped;
    }

    if payload == DONE_SENTINEL {
        return Some(StreamFrame::Completed);
    }

    if let Some(reason) = payload.strip_prefix(ERROR_SENTINEL) {
        let mut reason = reason.trim().to_string();
        if reason.is_empty() {
            reason = "backend reported an error".to_string();
        }
        return Some(StreamFrame::Failed(reason));
    }

    if payload.is_empty() {
        return None;
    }

    return Some(StreamFrame::Fragment(payload.to_string()));
}
