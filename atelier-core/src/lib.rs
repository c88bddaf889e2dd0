//! Atelier Core - Core library for Atelier multi-agent collaboration
//!
//! This crate provides the orchestration core for Atelier: role-specialized
//! agents that collaborate on an HTML/JS web page, a turn scheduler that
//! drives them, and an approval gate that holds the result until a human
//! confirms it for publishing.

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod extract;
pub mod orchestrate;
pub mod publish;
pub mod secrets;
pub mod session;

pub use chat::{ConversationLog, Message, MessageStatus, Role};
pub use config::Config;
pub use error::{Error, Result};
pub use orchestrate::{OrchestrationResult, TerminationDetector, TurnScheduler, READY_SENTINEL};
pub use publish::Publisher;
pub use secrets::Secrets;
pub use session::{
    ApprovalState, DecisionOutcome, Session, SessionId, SessionStore, APPROVAL_TOKEN,
};
