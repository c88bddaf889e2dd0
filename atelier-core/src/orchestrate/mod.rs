//! Orchestration: turn scheduling and termination detection

mod scheduler;
mod termination;

pub use scheduler::{OrchestrationResult, TurnScheduler};
pub use termination::{contains_sentinel, TerminationDetector, READY_SENTINEL};
