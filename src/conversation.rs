use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::ChatError;
use crate::models::Message;

/// What the UI renders: the message list plus whether input is locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub messages: Arc<Vec<Message>>,
    pub in_flight: bool,
}

/// The turn currently awaiting or receiving its reply.
#[derive(Debug)]
struct Turn {
    /// Conversation length before the user message was appended.
    rollback_len: usize,
    reply: String,
    reply_open: bool,
}

/// In-memory conversation that folds streamed fragments into a trailing
/// assistant message.
///
/// Messages live behind an `Arc` and are changed copy-on-write, so a snapshot
/// handed out earlier never changes under its holder.
#[derive(Debug, Default)]
pub struct ConversationAccumulator {
    messages: Arc<Vec<Message>>,
    turn: Option<Turn>,
}

impl ConversationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Arc<Vec<Message>> {
        Arc::clone(&self.messages)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn in_flight(&self) -> bool {
        self.turn.is_some()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            messages: self.messages(),
            in_flight: self.in_flight(),
        }
    }

    /// Starts a turn. Returns the conversation to send, new user message included.
    pub fn submit_user(&mut self, text: &str) -> Result<Arc<Vec<Message>>, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.turn.is_some() {
            return Err(ChatError::TurnInFlight);
        }

        let messages = Arc::make_mut(&mut self.messages);
        let rollback_len = messages.len();
        messages.push(Message::user(text));
        self.turn = Some(Turn {
            rollback_len,
            reply: String::new(),
            reply_open: false,
        });
        debug!(messages = rollback_len + 1, "Turn submitted");

        Ok(self.messages())
    }

    pub fn on_fragment(&mut self, text: &str) -> Snapshot {
        let Some(turn) = self.turn.as_mut() else {
            warn!("Fragment arrived with no turn in flight; ignoring");
            return self.snapshot();
        };

        turn.reply.push_str(text);
        let reply = Message::assistant(turn.reply.as_str());
        let messages = Arc::make_mut(&mut self.messages);
        if turn.reply_open {
            if let Some(last) = messages.last_mut() {
                *last = reply;
            }
        } else {
            messages.push(reply);
            turn.reply_open = true;
        }

        self.snapshot()
    }

    /// Freezes the reply. A turn that produced no text leaves no assistant
    /// message, which is still a successful turn.
    pub fn on_stream_end(&mut self) -> Snapshot {
        if let Some(turn) = self.turn.take() {
            debug!(reply_len = turn.reply.len(), "Turn completed");
        }
        self.snapshot()
    }

    /// Rolls the conversation back to how it was before the failed submission,
    /// dropping the user message and any partial reply.
    pub fn on_stream_error(&mut self, err: &ChatError) -> Snapshot {
        if let Some(turn) = self.turn.take() {
            warn!("Turn failed, rolling back: {err}");
            Arc::make_mut(&mut self.messages).truncate(turn.rollback_len);
        }
        self.snapshot()
    }
}
