//! Message and role definitions
//!
//! Every contribution to a collaboration is a `Message` authored by one of
//! four roles:
//! - User: the customer making the request
//! - BusinessAnalyst: turns the request into a project plan
//! - SoftwareEngineer: writes the HTML/JS implementation
//! - ProductOwner: reviews the result and signals readiness for approval

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The human customer making the request
    User,
    /// Turns user requirements into a project plan
    BusinessAnalyst,
    /// Implements the web app in HTML and JavaScript
    SoftwareEngineer,
    /// Reviews the implementation and gates readiness
    ProductOwner,
}

impl Role {
    /// The agent roles in turn order
    pub fn agents() -> &'static [Role] {
        &[
            Role::BusinessAnalyst,
            Role::SoftwareEngineer,
            Role::ProductOwner,
        ]
    }

    /// Get the short name for this role
    pub fn name(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::BusinessAnalyst => "business-analyst",
            Role::SoftwareEngineer => "software-engineer",
            Role::ProductOwner => "product-owner",
        }
    }

    /// Get the display name used in transcripts
    pub fn agent_name(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::BusinessAnalyst => "BusinessAnalystAgent",
            Role::SoftwareEngineer => "SoftwareEngineerAgent",
            Role::ProductOwner => "ProductOwnerAgent",
        }
    }

    /// Get a description of what this role does
    pub fn description(&self) -> &'static str {
        match self {
            Role::User => "The customer making the request",
            Role::BusinessAnalyst => "Creates the project plan from user requirements",
            Role::SoftwareEngineer => "Implements the web app in HTML and JavaScript",
            Role::ProductOwner => "Reviews the implementation and signals readiness",
        }
    }

    /// Whether this role is an automated agent (not the human user)
    pub fn is_agent(&self) -> bool {
        !matches!(self, Role::User)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" | "u" => Ok(Role::User),
            "business-analyst" | "analyst" | "ba" => Ok(Role::BusinessAnalyst),
            "software-engineer" | "engineer" | "se" => Ok(Role::SoftwareEngineer),
            "product-owner" | "owner" | "po" => Ok(Role::ProductOwner),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Collaboration status carried by a message
///
/// Set by the agent layer when backend output is post-processed, so the
/// termination decision does not depend solely on substring matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Collaboration continues
    #[default]
    Continue,
    /// The author considers the work ready for human review
    ReadyForApproval,
}

/// A single message in a conversation
///
/// Immutable once appended to a `ConversationLog`. The sequence index is
/// assigned by the log on append and defines both conversation order and
/// turn order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored this message
    pub role: Role,
    /// The message text
    pub content: String,
    /// Position in the conversation (assigned on append)
    pub seq: u64,
    /// Collaboration status signaled by this message
    pub status: MessageStatus,
    /// When the message was produced
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message with the given role and content
    ///
    /// The sequence index is assigned when the message is appended to a log.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            seq: 0,
            status: MessageStatus::default(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Set the collaboration status (builder pattern)
    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        assert_eq!(Role::User.name(), "user");
        assert_eq!(Role::BusinessAnalyst.name(), "business-analyst");
        assert_eq!(Role::SoftwareEngineer.name(), "software-engineer");
        assert_eq!(Role::ProductOwner.name(), "product-owner");
    }

    #[test]
    fn test_role_agent_names() {
        assert_eq!(Role::BusinessAnalyst.agent_name(), "BusinessAnalystAgent");
        assert_eq!(Role::SoftwareEngineer.agent_name(), "SoftwareEngineerAgent");
        assert_eq!(Role::ProductOwner.agent_name(), "ProductOwnerAgent");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("ba".parse::<Role>().unwrap(), Role::BusinessAnalyst);
        assert_eq!("engineer".parse::<Role>().unwrap(), Role::SoftwareEngineer);
        assert_eq!(
            "Product-Owner".parse::<Role>().unwrap(),
            Role::ProductOwner
        );
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_agents_turn_order() {
        let agents = Role::agents();
        assert_eq!(agents.len(), 3);
        assert_eq!(agents[0], Role::BusinessAnalyst);
        assert_eq!(agents[1], Role::SoftwareEngineer);
        assert_eq!(agents[2], Role::ProductOwner);
    }

    #[test]
    fn test_is_agent() {
        assert!(!Role::User.is_agent());
        assert!(Role::BusinessAnalyst.is_agent());
        assert!(Role::ProductOwner.is_agent());
    }

    #[test]
    fn test_message_new_defaults() {
        let message = Message::new(Role::SoftwareEngineer, "here is the code");
        assert_eq!(message.role, Role::SoftwareEngineer);
        assert_eq!(message.seq, 0);
        assert_eq!(message.status, MessageStatus::Continue);
    }

    #[test]
    fn test_message_with_status() {
        let message = Message::new(Role::ProductOwner, "READY FOR USER APPROVAL")
            .with_status(MessageStatus::ReadyForApproval);
        assert_eq!(message.status, MessageStatus::ReadyForApproval);
    }

    #[test]
    fn test_role_serde_roundtrip() {
        let json = serde_json::to_string(&Role::ProductOwner).unwrap();
        assert_eq!(json, "\"product_owner\"");
        let parsed: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Role::ProductOwner);
    }
}
