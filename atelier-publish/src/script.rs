//! Script publisher: write the artifact, then hand off to a push script
//!
//! For deployments that already have a `push_to_github.sh` (or similar),
//! this publisher writes the artifact into the working directory and runs
//! the script, treating a non-zero exit as a publish failure.

use std::path::PathBuf;

use tokio::process::Command;
use tracing::info;

use crate::{Error, Result};

/// Publishes by delegating to an external push script
#[derive(Debug, Clone)]
pub struct ScriptPublisher {
    script: PathBuf,
    workdir: PathBuf,
    artifact_file: String,
}

impl ScriptPublisher {
    /// Create a publisher that runs the given script in the given directory
    pub fn new(script: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            workdir: workdir.into(),
            artifact_file: "index.html".to_string(),
        }
    }

    /// Set the file the artifact is written to, relative to the workdir
    pub fn with_artifact_file(mut self, file: impl Into<String>) -> Self {
        self.artifact_file = file.into();
        self
    }

    async fn run_script(&self) -> Result<()> {
        let status = Command::new("bash")
            .arg(&self.script)
            .current_dir(&self.workdir)
            .status()
            .await?;

        if !status.success() {
            return Err(Error::ScriptFailed(format!(
                "{} exited with {}",
                self.script.display(),
                status
            )));
        }

        info!(script = %self.script.display(), "Push script completed");
        Ok(())
    }
}

#[async_trait::async_trait]
impl atelier_core::Publisher for ScriptPublisher {
    fn name(&self) -> &'static str {
        "script"
    }

    async fn publish(&self, artifact: &str) -> atelier_core::Result<()> {
        let target = self.workdir.join(&self.artifact_file);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| atelier_core::Error::Publish(e.to_string()))?;
        }
        tokio::fs::write(&target, artifact)
            .await
            .map_err(|e| atelier_core::Error::Publish(e.to_string()))?;

        self.run_script().await.map_err(atelier_core::Error::from)
    }
}
