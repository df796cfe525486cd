//! Streaming chat client core.
//!
//! Decodes chat-completion SSE bodies into reply fragments and folds them into
//! an in-memory conversation. Shared by the terminal binary and the browser
//! front end in `frontend/`.

pub mod config;
pub mod conversation;
pub mod decoder;
pub mod errors;
pub mod models;
pub mod service;
pub mod transport;

pub use config::{ClientConfig, DecoderConfig};
pub use conversation::{ConversationAccumulator, Snapshot};
pub use decoder::{Fragment, StreamDecoder};
pub use errors::ChatError;
pub use models::{Message, Role};
pub use service::{drive_turn, ChatService, TurnOutcome};
pub use transport::{BodyStream, ChatTransport};
