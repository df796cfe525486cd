pub mod chat_service;

pub use chat_service::{drive_turn, ChatService, TurnOutcome};
