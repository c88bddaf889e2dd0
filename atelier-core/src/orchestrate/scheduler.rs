//! Turn scheduler driving the agent collaboration loop
//!
//! The scheduler owns the conversation log for one run, drives the agents
//! in round-robin order, and stops as soon as the termination detector
//! fires or the turn ceiling is reached. Agent calls are the only
//! suspension points; everything else is in-memory bookkeeping.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::chat::{ConversationLog, Message};
use crate::config::OrchestrationConfig;
use crate::{Error, Result};

use super::TerminationDetector;

/// The outcome of one orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// The full ordered message history, user request included
    pub messages: Vec<Message>,
    /// Whether the run paused because the work is ready for human review
    pub ready_for_approval: bool,
}

/// Drives a fixed round-robin sequence of agents until termination
#[derive(Debug)]
pub struct TurnScheduler {
    agents: Vec<Agent>,
    max_turns: u32,
    turn_timeout: Option<Duration>,
}

impl TurnScheduler {
    /// Create a scheduler for the given agents in turn order
    pub fn new(agents: Vec<Agent>) -> Self {
        Self {
            agents,
            max_turns: OrchestrationConfig::default().max_turns,
            turn_timeout: None,
        }
    }

    /// Create a scheduler with settings from configuration
    pub fn with_config(agents: Vec<Agent>, config: &OrchestrationConfig) -> Self {
        Self {
            agents,
            max_turns: config.max_turns,
            turn_timeout: config.turn_timeout,
        }
    }

    /// Set the maximum number of agent turns
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set a per-turn timeout
    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = Some(timeout);
        self
    }

    /// The configured turn ceiling
    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Run the collaboration loop for one user request
    ///
    /// Seeds a fresh log with the user message, then cycles through the
    /// agents appending one message per turn. Stops immediately, even
    /// mid-cycle, when the termination detector fires on the newest
    /// message. If the turn ceiling is reached first, the run ends with
    /// `ready_for_approval = false` and the caller decides whether to
    /// resume with more budget.
    ///
    /// A turn either appends a whole message or nothing: timeouts and
    /// backend failures abort the run before the append.
    pub async fn run(&self, user_request: impl Into<String>) -> Result<OrchestrationResult> {
        if self.agents.is_empty() {
            return Err(Error::Config(
                "no agents configured for the collaboration".to_string(),
            ));
        }

        let mut log = ConversationLog::new();
        log.append(Message::user(user_request));

        let detector = TerminationDetector::new();
        let mut turns = 0u32;
        let mut ready = false;

        'collaboration: while turns < self.max_turns {
            for agent in &self.agents {
                if turns >= self.max_turns {
                    break 'collaboration;
                }

                let reply = match self.turn_timeout {
                    Some(limit) => tokio::time::timeout(limit, agent.respond(&log))
                        .await
                        .map_err(|_| {
                            Error::Generation(format!(
                                "{} turn timed out after {:?}",
                                agent.role(),
                                limit
                            ))
                        })??,
                    None => agent.respond(&log).await?,
                };

                let message = log.append(reply);
                turns += 1;

                tracing::info!(
                    role = %message.role,
                    turn = turns,
                    seq = message.seq,
                    "Agent turn complete"
                );

                if detector.is_ready(message) {
                    tracing::info!(turns, "Collaboration ready for human approval");
                    ready = true;
                    break 'collaboration;
                }
            }
        }

        if !ready {
            tracing::warn!(
                max_turns = self.max_turns,
                "Turn ceiling reached without readiness signal"
            );
        }

        Ok(OrchestrationResult {
            messages: log.messages().to_vec(),
            ready_for_approval: ready,
        })
    }
}
