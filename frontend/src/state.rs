use std::sync::Arc;

use chat_stream::{drive_turn, ConversationAccumulator, DecoderConfig, Message, Snapshot, TurnOutcome};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::FetchTransport;

/// Shared application state, provided via Leptos context.
#[derive(Clone, Copy)]
pub struct AppState {
    // --- Read signals (for components to subscribe to) ---
    pub messages: ReadSignal<Arc<Vec<Message>>>,
    pub is_loading: ReadSignal<bool>,
    pub error: ReadSignal<Option<String>>,

    // --- Write signals (for mutating state) ---
    set_messages: WriteSignal<Arc<Vec<Message>>>,
    set_is_loading: WriteSignal<bool>,
    pub set_error: WriteSignal<Option<String>>,

    conversation: StoredValue<ConversationAccumulator>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let (messages, set_messages) = signal(Arc::new(Vec::<Message>::new()));
        let (is_loading, set_is_loading) = signal(false);
        let (error, set_error) = signal(None::<String>);

        let state = Self {
            messages,
            is_loading,
            error,
            set_messages,
            set_is_loading,
            set_error,
            conversation: StoredValue::new(ConversationAccumulator::new()),
        };

        provide_context(state);
        state
    }

    fn publish(&self, snapshot: Snapshot) {
        self.set_messages.set(snapshot.messages);
        self.set_is_loading.set(snapshot.in_flight);
    }

    /// Send a message and stream the reply into the conversation.
    pub fn send_message(&self, text: String) {
        let mut submitted = None;
        self.conversation.update_value(|c| {
            submitted = Some(c.submit_user(&text).map(|request| (request, c.snapshot())));
        });
        let (request, snapshot) = match submitted {
            Some(Ok(submitted)) => submitted,
            Some(Err(e)) => {
                log::debug!("Submission rejected: {e}");
                return;
            }
            None => return,
        };
        self.publish(snapshot);
        self.set_error.set(None);

        let state = *self;
        spawn_local(async move {
            let on_delta = move |delta: &str| {
                let mut snapshot = None;
                state.conversation.update_value(|c| snapshot = Some(c.on_fragment(delta)));
                if let Some(snapshot) = snapshot {
                    state.publish(snapshot);
                }
            };

            let result = drive_turn(&FetchTransport, &request, &DecoderConfig::default(), on_delta).await;

            let mut snapshot = None;
            match result {
                Ok(()) => {
                    state.conversation.update_value(|c| snapshot = Some(c.on_stream_end()));
                }
                Err(err) => {
                    log::error!("Chat turn failed: {err}");
                    state.conversation.update_value(|c| snapshot = Some(c.on_stream_error(&err)));
                    state.set_error.set(TurnOutcome::from(err).notice());
                }
            }
            if let Some(snapshot) = snapshot {
                state.publish(snapshot);
            }
        });
    }
}
