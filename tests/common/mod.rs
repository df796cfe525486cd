//! Shared test doubles: a scripted in-memory transport and SSE line builders.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use futures_util::stream::{self, StreamExt};

use chat_stream::{BodyStream, ChatError, ChatTransport, Message};

/// A canned reply for one `open_stream` call.
pub enum Reply {
    /// Body chunks delivered one per poll, each after a scheduler yield.
    Chunks(Vec<Result<Vec<u8>, ChatError>>),
    /// The request itself fails (status error, no body, ...).
    Fail(ChatError),
}

/// Replays scripted replies in order and records every request it receives.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Reply>>,
    requests: RefCell<Vec<Vec<Message>>>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into_iter().collect()),
            requests: RefCell::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.borrow().clone()
    }
}

impl ChatTransport for ScriptedTransport {
    async fn open_stream(&self, messages: &[Message]) -> Result<BodyStream, ChatError> {
        self.requests.borrow_mut().push(messages.to_vec());
        let reply = self.replies.borrow_mut().pop_front();
        tokio::task::yield_now().await;

        match reply {
            Some(Reply::Chunks(chunks)) => Ok(stream::iter(chunks)
                .then(|chunk| async move {
                    tokio::task::yield_now().await;
                    chunk
                })
                .boxed_local()),
            Some(Reply::Fail(err)) => Err(err),
            None => Err(ChatError::Network("no scripted reply left".into())),
        }
    }
}

/// `data:` line carrying one content delta.
pub fn delta(content: &str) -> Vec<u8> {
    let payload = serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion.chunk",
        "choices": [{"index": 0, "delta": {"content": content}, "finish_reason": null}]
    });
    format!("data: {payload}\n\n").into_bytes()
}

pub fn done() -> Vec<u8> {
    b"data: [DONE]\n\n".to_vec()
}

/// Concatenation of `parts`, re-split into chunks of `size` bytes.
pub fn rechunk(parts: &[Vec<u8>], size: usize) -> Vec<Vec<u8>> {
    parts.concat().chunks(size).map(<[u8]>::to_vec).collect()
}
