//! Termination detection for collaboration runs
//!
//! Collaboration pauses for human review when the Product Owner announces
//! readiness. The primary signal is the tagged status set by the agent
//! layer; substring matching on the sentinel phrase remains as a
//! compatibility shim for messages that were never post-processed.

use crate::chat::{Message, MessageStatus, Role};

/// The phrase the Product Owner uses to hand control back to the human
pub const READY_SENTINEL: &str = "READY FOR USER APPROVAL";

/// Check whether a message contains the readiness sentinel, in any case
pub fn contains_sentinel(content: &str) -> bool {
    content.to_uppercase().contains(READY_SENTINEL)
}

/// Decides when automated turn-taking should pause for human review
///
/// Only the latest appended message is ever inspected: termination is
/// defined by a single role's single utterance, so scanning the full log
/// adds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminationDetector;

impl TerminationDetector {
    /// Create a new detector
    pub fn new() -> Self {
        Self
    }

    /// Whether this message signals that collaboration should pause
    ///
    /// True iff the author is the Product Owner and either the message is
    /// tagged `ReadyForApproval` or its content contains the sentinel
    /// phrase case-insensitively, anywhere in the surrounding prose.
    pub fn is_ready(&self, message: &Message) -> bool {
        if message.role != Role::ProductOwner {
            return false;
        }

        message.status == MessageStatus::ReadyForApproval || contains_sentinel(&message.content)
    }
}
