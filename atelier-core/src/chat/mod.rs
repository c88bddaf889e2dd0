//! Conversation model for Atelier
//!
//! The conversation log is the single source of truth for orchestration
//! decisions: an append-only, ordered sequence of messages exchanged
//! between the user and the agents.

mod log;
mod message;

pub use log::ConversationLog;
pub use message::{Message, MessageStatus, Role};
