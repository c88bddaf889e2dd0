//! Sessions and the approval gate
//!
//! A `Session` aggregates one conversation log with one approval state, so
//! nothing session-shaped lives in ambient globals. The `SessionStore` is
//! the inbound interface for callers: start a collaboration, then submit
//! the human's decision. The gate guarantees the publisher runs at most
//! once per approval and never without an exact confirmation.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::chat::ConversationLog;
use crate::extract::extract_artifact;
use crate::orchestrate::{OrchestrationResult, TurnScheduler};
use crate::publish::Publisher;
use crate::{Error, Result};

/// The literal confirmation a human must type to open the gate
pub const APPROVAL_TOKEN: &str = "APPROVED";

/// Identifier for one collaboration session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The approval gate for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    /// Waiting for a human confirmation
    #[default]
    Pending,
    /// A confirmation was accepted and the publish step completed
    Consumed,
}

/// The outcome of submitting a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// The confirmation matched; the artifact was published (or there was
    /// nothing to publish)
    Approved,
    /// The text did not match; the session stays pending and the caller
    /// may resubmit
    Rejected,
}

/// One collaboration session: a conversation log plus its approval gate
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    log: ConversationLog,
    state: ApprovalState,
}

impl Session {
    /// Create a new pending session over a finished conversation
    pub fn new(id: SessionId, log: ConversationLog) -> Self {
        Self {
            id,
            log,
            state: ApprovalState::Pending,
        }
    }

    /// The session identifier
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The session's conversation log
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// The current gate state
    pub fn state(&self) -> ApprovalState {
        self.state
    }

    /// Irreversibly consume the approval gate
    fn mark_consumed(&mut self) {
        self.state = ApprovalState::Consumed;
    }
}

/// Check whether raw decision text matches the approval token
///
/// The text is trimmed and compared case-insensitively; nothing short of
/// the full token opens the gate.
fn matches_approval(raw_text: &str) -> bool {
    raw_text.trim().to_uppercase() == APPROVAL_TOKEN
}

/// Inbound interface: owns sessions, drives collaborations, gates publishing
pub struct SessionStore {
    scheduler: TurnScheduler,
    publisher: Arc<dyn Publisher>,
    sessions: Mutex<HashMap<SessionId, Arc<Mutex<Session>>>>,
    next_id: AtomicU64,
}

impl SessionStore {
    /// Create a store from a configured scheduler and publisher
    pub fn new(scheduler: TurnScheduler, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            scheduler,
            publisher,
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Run a collaboration for a user request and register its session
    ///
    /// Returns the session handle along with the orchestration result; the
    /// caller decides whether to solicit approval.
    pub async fn start_session(
        &self,
        user_request: &str,
    ) -> Result<(SessionId, OrchestrationResult)> {
        let result = self.scheduler.run(user_request).await?;

        let id = SessionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let session = Session::new(id, ConversationLog::from_messages(result.messages.clone()));

        self.sessions
            .lock()
            .await
            .insert(id, Arc::new(Mutex::new(session)));

        tracing::info!(
            session = %id,
            ready = result.ready_for_approval,
            messages = result.messages.len(),
            "Session started"
        );

        Ok((id, result))
    }

    /// Submit a human decision for a session
    ///
    /// An exact (trimmed, case-normalized) `APPROVED` opens the gate:
    /// the artifact is extracted and, if non-empty, published exactly once,
    /// after which the gate is consumed. A duplicate confirmation returns
    /// `Approved` without re-publishing. If the publisher fails, the gate
    /// stays pending so the publish step can be retried without re-running
    /// the collaboration. Any other text is a normal `Rejected` outcome.
    pub async fn submit_decision(
        &self,
        id: SessionId,
        raw_text: &str,
    ) -> Result<DecisionOutcome> {
        if !matches_approval(raw_text) {
            tracing::debug!(session = %id, "Decision text did not match, session stays pending");
            return Ok(DecisionOutcome::Rejected);
        }

        let session = self
            .session(id)
            .await
            .ok_or(Error::SessionNotFound(id.0))?;

        // Single-writer discipline for the gate bit: the publish decision
        // and the state transition happen under one lock.
        let mut session = session.lock().await;

        if session.state() == ApprovalState::Consumed {
            tracing::info!(session = %id, "Duplicate confirmation, publish already consumed");
            return Ok(DecisionOutcome::Approved);
        }

        let artifact = extract_artifact(session.log());
        if artifact.is_empty() {
            tracing::info!(session = %id, "Approval accepted with nothing to publish");
            session.mark_consumed();
            return Ok(DecisionOutcome::Approved);
        }

        tracing::info!(
            session = %id,
            publisher = self.publisher.name(),
            bytes = artifact.len(),
            "Publishing approved artifact"
        );
        self.publisher.publish(&artifact).await?;
        session.mark_consumed();

        Ok(DecisionOutcome::Approved)
    }

    /// Retire a consumed session, dropping its log and gate
    ///
    /// Consumed sessions are kept around so a duplicate confirmation is a
    /// no-op rather than an unknown-session error; retiring is the
    /// caller's signal that the approval dialogue is over. A session whose
    /// gate is still pending cannot be retired.
    pub async fn retire_session(&self, id: SessionId) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get(&id).ok_or(Error::SessionNotFound(id.0))?;

        if session.lock().await.state() != ApprovalState::Consumed {
            return Err(Error::Other(format!(
                "session {id} is still pending approval"
            )));
        }

        sessions.remove(&id);
        tracing::debug!(session = %id, "Session retired");
        Ok(())
    }

    /// Look up a session by id
    pub async fn session(&self, id: SessionId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.lock().await.get(&id).cloned()
    }
}
