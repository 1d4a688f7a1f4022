mod client;
mod turn;

pub use client::{
    Completer, CompletionClient, DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
};
pub use turn::{ConversationHistory, Role, Turn};
