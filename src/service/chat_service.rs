use std::cell::RefCell;

use tracing::{debug, error};

use crate::config::DecoderConfig;
use crate::conversation::{ConversationAccumulator, Snapshot};
use crate::decoder::{Fragment, StreamDecoder};
use crate::errors::ChatError;
use crate::models::Message;
use crate::transport::ChatTransport;

/// How a call to [`ChatService::send_message`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    /// Refused before anything was sent (blank input, or a reply still streaming).
    Rejected(ChatError),
    /// The turn was sent and failed; the conversation has been rolled back.
    Failed(ChatError),
}

impl TurnOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TurnOutcome::Completed)
    }

    /// Message to show the user, if the outcome warrants one.
    pub fn notice(&self) -> Option<String> {
        match self {
            TurnOutcome::Failed(err) => Some(err.to_string()),
            TurnOutcome::Completed | TurnOutcome::Rejected(_) => None,
        }
    }
}

impl From<ChatError> for TurnOutcome {
    fn from(err: ChatError) -> Self {
        if err.is_rejection() {
            TurnOutcome::Rejected(err)
        } else {
            TurnOutcome::Failed(err)
        }
    }
}

/// Runs chat turns against a transport and keeps the conversation.
///
/// Methods take `&self`; the conversation sits in a `RefCell` whose borrows
/// never span an `.await`, so a second `send_message` issued while a reply is
/// streaming sees the in-flight turn and is rejected.
pub struct ChatService<T> {
    transport: T,
    conversation: RefCell<ConversationAccumulator>,
    decoder: DecoderConfig,
}

impl<T: ChatTransport> ChatService<T> {
    pub fn new(transport: T, decoder: DecoderConfig) -> Self {
        Self {
            transport,
            conversation: RefCell::new(ConversationAccumulator::new()),
            decoder,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn snapshot(&self) -> Snapshot {
        self.conversation.borrow().snapshot()
    }

    /// Sends `text` as the next user turn and streams the reply into the
    /// conversation. `render` gets a fresh snapshot after the user message is
    /// added, after every fragment, and once more when the turn ends.
    pub async fn send_message(&self, text: &str, mut render: impl FnMut(&Snapshot)) -> TurnOutcome {
        let submitted = self.conversation.borrow_mut().submit_user(text);
        let request = match submitted {
            Ok(request) => request,
            Err(err) => {
                debug!("Submission rejected: {err}");
                return err.into();
            }
        };
        render(&self.snapshot());

        let result = drive_turn(&self.transport, &request, &self.decoder, |delta| {
            let snapshot = self.conversation.borrow_mut().on_fragment(delta);
            render(&snapshot);
        })
        .await;

        match result {
            Ok(()) => {
                let snapshot = self.conversation.borrow_mut().on_stream_end();
                render(&snapshot);
                TurnOutcome::Completed
            }
            Err(err) => {
                error!("Chat turn failed: {err}");
                let snapshot = self.conversation.borrow_mut().on_stream_error(&err);
                render(&snapshot);
                err.into()
            }
        }
    }
}

/// Opens a stream for `messages` and hands each reply delta to `on_delta` in
/// arrival order. Returns once `[DONE]` arrives or the transport closes.
pub async fn drive_turn<T: ChatTransport>(
    transport: &T,
    messages: &[Message],
    config: &DecoderConfig,
    mut on_delta: impl FnMut(&str),
) -> Result<(), ChatError> {
    let body = transport.open_stream(messages).await?;
    let mut decoder = StreamDecoder::new(body, config);

    let mut deltas = 0usize;
    while let Some(fragment) = decoder.next_fragment().await? {
        match fragment {
            Fragment::Delta(text) => {
                deltas += 1;
                on_delta(&text);
            }
            Fragment::Done => break,
        }
    }
    debug!(deltas, "Reply stream finished");
    Ok(())
}
