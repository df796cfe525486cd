use tracing::{debug, warn};

use super::utf8::Utf8Decoder;
use crate::config::DecoderConfig;
use crate::models::ChunkDelta;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_MARKER: &str = "[DONE]";

/// Output of the decoder: a piece of reply text or the end-of-stream marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Delta(String),
    Done,
}

/// How a single SSE line is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedLine<'a> {
    Blank,
    /// `:`-prefixed keep-alive or comment.
    Comment,
    /// Trimmed payload of a `data: ` line.
    Data(&'a str),
    /// Any other field (`event:`, `id:`, ...). Dropped without complaint.
    Other,
}

pub fn classify(line: &str) -> DecodedLine<'_> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        DecodedLine::Blank
    } else if line.starts_with(':') {
        DecodedLine::Comment
    } else if let Some(payload) = line.strip_prefix(DATA_PREFIX) {
        DecodedLine::Data(payload.trim())
    } else {
        DecodedLine::Other
    }
}

/// Parses a `data:` payload. `Ok(None)` is well-formed JSON with no text in
/// `choices[0].delta.content`; `Err` means the JSON itself did not parse.
pub fn parse_payload(payload: &str) -> Result<Option<String>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    Ok(ChunkDelta::content_of(&value))
}

enum LineAction {
    Skip,
    Emit(String),
    Done,
    Malformed(serde_json::Error),
}

fn interpret(line: &str) -> LineAction {
    match classify(line) {
        DecodedLine::Blank | DecodedLine::Comment | DecodedLine::Other => LineAction::Skip,
        DecodedLine::Data(payload) if payload == DONE_MARKER => LineAction::Done,
        DecodedLine::Data(payload) => match parse_payload(payload) {
            Ok(Some(text)) => LineAction::Emit(text),
            Ok(None) => LineAction::Skip,
            Err(err) => LineAction::Malformed(err),
        },
    }
}

/// Push-driven SSE framing for chat-completion streams.
///
/// Chunks go in through [`push`](Self::push) and complete lines come out as
/// fragments. Once `[DONE]` is seen the decoder is closed: whatever is still
/// buffered is discarded and later input is ignored.
#[derive(Debug)]
pub struct SseDecoder {
    utf8: Utf8Decoder,
    buffer: String,
    deferrals: usize,
    max_deferrals: usize,
    closed: bool,
}

impl SseDecoder {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            utf8: Utf8Decoder::new(),
            buffer: String::new(),
            deferrals: 0,
            max_deferrals: config.max_deferrals,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Text received but not yet framed into a processed line.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        if self.closed {
            return fragments;
        }
        self.utf8.decode_into(chunk, &mut self.buffer);
        self.drain_lines(&mut fragments);
        fragments
    }

    /// The transport closed. Processes what is left of the buffer as a final
    /// segment; unparsable leftovers are discarded since nothing can complete them.
    pub fn finish(&mut self) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        if self.closed {
            return fragments;
        }
        self.closed = true;
        self.utf8.finish_into(&mut self.buffer);
        let rest = std::mem::take(&mut self.buffer);

        for line in rest.split('\n') {
            match interpret(line) {
                LineAction::Skip => {}
                LineAction::Emit(text) => fragments.push(Fragment::Delta(text)),
                LineAction::Done => {
                    fragments.push(Fragment::Done);
                    break;
                }
                LineAction::Malformed(err) => {
                    debug!("Discarding unparsable trailing frame: {err}");
                }
            }
        }
        fragments
    }

    fn drain_lines(&mut self, fragments: &mut Vec<Fragment>) {
        while let Some(newline) = self.buffer.find('\n') {
            match interpret(&self.buffer[..newline]) {
                LineAction::Skip => {}
                LineAction::Emit(text) => fragments.push(Fragment::Delta(text)),
                LineAction::Done => {
                    self.close();
                    fragments.push(Fragment::Done);
                    return;
                }
                LineAction::Malformed(err) if self.deferrals < self.max_deferrals => {
                    // Leave the line at the front of the buffer until more bytes arrive.
                    self.deferrals += 1;
                    debug!(
                        deferrals = self.deferrals,
                        "Deferring data line that failed to parse: {err}"
                    );
                    return;
                }
                LineAction::Malformed(err) => {
                    warn!(
                        deferrals = self.deferrals,
                        "Dropping malformed data line: {err}"
                    );
                }
            }
            self.buffer.drain(..=newline);
            self.deferrals = 0;
        }
    }

    fn close(&mut self) {
        self.closed = true;
        self.buffer.clear();
        self.deferrals = 0;
        self.utf8 = Utf8Decoder::new();
    }
}
