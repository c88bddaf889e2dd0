//! Agent module: personas, chat backends, and response generation

mod backend;
mod persona;

pub use backend::{AzureBackend, BackendRegistry, ChatBackend, OpenAiBackend};
pub use persona::Persona;

#[cfg(test)]
pub(crate) use backend::testing;

use std::sync::Arc;

use crate::chat::{ConversationLog, Message, MessageStatus, Role};
use crate::orchestrate::contains_sentinel;
use crate::Result;

/// A role-bound agent: a persona plus the backend that speaks for it
#[derive(Clone)]
pub struct Agent {
    persona: Persona,
    backend: Arc<dyn ChatBackend>,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("role", &self.persona.role())
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl Agent {
    /// Create a new agent
    pub fn new(persona: Persona, backend: Arc<dyn ChatBackend>) -> Self {
        Self { persona, backend }
    }

    /// The role this agent plays
    pub fn role(&self) -> Role {
        self.persona.role()
    }

    /// Produce this agent's next message from the conversation so far
    ///
    /// The snapshot is never mutated; the caller appends the returned
    /// message to the log. Backend output is post-processed here: when the
    /// Product Owner's reply contains the readiness sentinel, the message
    /// is tagged `ReadyForApproval` so downstream checks do not have to
    /// re-scan the text.
    pub async fn respond(&self, log: &ConversationLog) -> Result<Message> {
        let content = self
            .backend
            .complete(self.persona.instructions(), log.messages())
            .await?;

        let status = if self.role() == Role::ProductOwner && contains_sentinel(&content) {
            MessageStatus::ReadyForApproval
        } else {
            MessageStatus::Continue
        };

        Ok(Message::new(self.role(), content).with_status(status))
    }
}

/// Build the default three-agent crew sharing one backend, in turn order
pub fn default_crew(backend: Arc<dyn ChatBackend>) -> Vec<Agent> {
    Persona::all()
        .into_iter()
        .map(|persona| Agent::new(persona, backend.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::ScriptedBackend;

    #[tokio::test]
    async fn test_respond_tags_product_owner_sentinel() {
        let backend = Arc::new(ScriptedBackend::new([
            "Looks good. READY FOR USER APPROVAL.",
        ]));
        let agent = Agent::new(Persona::builtin(Role::ProductOwner).unwrap(), backend);

        let log = ConversationLog::new();
        let message = agent.respond(&log).await.unwrap();
        assert_eq!(message.role, Role::ProductOwner);
        assert_eq!(message.status, MessageStatus::ReadyForApproval);
    }

    #[tokio::test]
    async fn test_respond_does_not_tag_other_roles() {
        let backend = Arc::new(ScriptedBackend::new([
            "The plan is READY FOR USER APPROVAL already, I think.",
        ]));
        let agent = Agent::new(Persona::builtin(Role::BusinessAnalyst).unwrap(), backend);

        let message = agent.respond(&ConversationLog::new()).await.unwrap();
        assert_eq!(message.status, MessageStatus::Continue);
    }

    #[tokio::test]
    async fn test_respond_surfaces_backend_failure() {
        let backend = Arc::new(ScriptedBackend::new(Vec::<String>::new()));
        let agent = Agent::new(Persona::builtin(Role::SoftwareEngineer).unwrap(), backend);

        assert!(agent.respond(&ConversationLog::new()).await.is_err());
    }

    #[test]
    fn test_default_crew_order() {
        let backend = Arc::new(ScriptedBackend::new(Vec::<String>::new()));
        let crew = default_crew(backend);
        assert_eq!(crew.len(), 3);
        assert_eq!(crew[0].role(), Role::BusinessAnalyst);
        assert_eq!(crew[1].role(), Role::SoftwareEngineer);
        assert_eq!(crew[2].role(), Role::ProductOwner);
    }
}
