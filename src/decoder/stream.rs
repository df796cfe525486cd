use std::collections::VecDeque;

use futures_util::{Stream, StreamExt};
use tracing::debug;

use super::sse::{Fragment, SseDecoder};
use crate::config::DecoderConfig;
use crate::errors::ChatError;

/// Pull-driven decoder over a response body.
///
/// Owns the body for its lifetime and drops it as soon as the stream is over:
/// `[DONE]` seen, transport closed, or a read failed. Dropping the body is what
/// releases the underlying connection or reader.
pub struct StreamDecoder<S> {
    body: Option<S>,
    frames: SseDecoder,
    ready: VecDeque<Fragment>,
    chunks: usize,
}

impl<S, B> StreamDecoder<S>
where
    S: Stream<Item = Result<B, ChatError>> + Unpin,
    B: AsRef<[u8]>,
{
    pub fn new(body: S, config: &DecoderConfig) -> Self {
        Self {
            body: Some(body),
            frames: SseDecoder::new(config),
            ready: VecDeque::new(),
            chunks: 0,
        }
    }

    /// Whether the body is still held open.
    pub fn is_open(&self) -> bool {
        self.body.is_some()
    }

    /// Next fragment in arrival order, reading more of the body only when
    /// nothing is queued. `Ok(None)` once the stream has ended.
    pub async fn next_fragment(&mut self) -> Result<Option<Fragment>, ChatError> {
        loop {
            if let Some(fragment) = self.ready.pop_front() {
                return Ok(Some(fragment));
            }
            let Some(body) = self.body.as_mut() else {
                return Ok(None);
            };

            match body.next().await {
                Some(Ok(chunk)) => {
                    self.chunks += 1;
                    self.ready.extend(self.frames.push(chunk.as_ref()));
                    if self.frames.is_closed() {
                        debug!(chunks = self.chunks, "Terminal marker received; releasing body");
                        self.body = None;
                    }
                }
                Some(Err(err)) => {
                    self.body = None;
                    return Err(err);
                }
                None => {
                    debug!(chunks = self.chunks, "Transport closed; flushing buffer");
                    self.body = None;
                    self.ready.extend(self.frames.finish());
                }
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Fragment, ChatError>> {
        futures_util::stream::unfold(Some(self), |decoder| async move {
            let Some(mut decoder) = decoder else {
                return None;
            };
            match decoder.next_fragment().await {
                Ok(Some(fragment)) => Some((Ok(fragment), Some(decoder))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }
}
