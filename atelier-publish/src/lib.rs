//! Atelier Publish - Artifact publishers for Atelier
//!
//! This crate implements the core's `Publisher` contract two ways: a git
//! publisher that commits the artifact and pushes a branch, and a script
//! publisher that delegates to an external push script.

mod error;
mod git;
mod script;

pub use error::{Error, Result};
pub use git::GitPublisher;
pub use script::ScriptPublisher;
