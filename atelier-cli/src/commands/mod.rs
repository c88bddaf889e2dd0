//! Command implementations for the Atelier CLI

mod build;

pub use build::BuildArgs;
