//! Git publisher: write the artifact into a working tree, commit, push

use std::path::{Path, PathBuf};

use git2::{Commit, Cred, PushOptions, RemoteCallbacks, Repository};
use tracing::{debug, info};

use crate::{Error, Result};

/// Publishes the approved artifact by committing it to a git repository
/// and pushing the configured branch to the configured remote.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_path: PathBuf,
    artifact_file: String,
    remote: String,
    branch: String,
    token: Option<String>,
}

impl GitPublisher {
    /// Create a publisher for the repository at the given path
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            artifact_file: "index.html".to_string(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            token: None,
        }
    }

    /// Set the file the artifact is written to, relative to the repo root
    pub fn with_artifact_file(mut self, file: impl Into<String>) -> Self {
        self.artifact_file = file.into();
        self
    }

    /// Set the remote to push to
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Set the branch to push
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set a token for HTTPS push authentication
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Write the artifact and commit it on HEAD
    ///
    /// Works on an unborn HEAD too, in which case this creates the initial
    /// commit.
    pub(crate) fn commit_artifact(&self, artifact: &str) -> Result<git2::Oid> {
        let repo = Repository::open(&self.repo_path)?;
        let workdir = repo.workdir().ok_or(Error::BareRepository)?;

        let target = workdir.join(&self.artifact_file);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, artifact)?;
        debug!(path = %target.display(), bytes = artifact.len(), "Artifact written");

        let mut index = repo.index()?;
        index.add_path(Path::new(&self.artifact_file))?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let signature = repo.signature()?;

        let parent = match repo.head() {
            Ok(head) => head.target().map(|oid| repo.find_commit(oid)).transpose()?,
            // Unborn HEAD: the publish commit becomes the first commit
            Err(_) => None,
        };
        let parents: Vec<&Commit> = parent.iter().collect();

        let oid = repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &format!("Publish {}", self.artifact_file),
            &tree,
            &parents,
        )?;

        info!(commit = %oid, file = %self.artifact_file, "Artifact committed");
        Ok(oid)
    }

    /// Push the configured branch to the configured remote
    pub(crate) fn push_branch(&self) -> Result<()> {
        let repo = Repository::open(&self.repo_path)?;
        let mut remote = repo.find_remote(&self.remote)?;

        let mut callbacks = RemoteCallbacks::new();
        match &self.token {
            Some(token) => {
                let token = token.clone();
                callbacks.credentials(move |_url, username, _allowed| {
                    Cred::userpass_plaintext(username.unwrap_or("git"), &token)
                });
            }
            None => {
                callbacks.credentials(|_url, username, _allowed| {
                    Cred::ssh_key_from_agent(username.unwrap_or("git"))
                });
            }
        }

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{0}:refs/heads/{0}", self.branch);
        remote.push(&[refspec.as_str()], Some(&mut options))?;

        info!(remote = %self.remote, branch = %self.branch, "Artifact pushed");
        Ok(())
    }

    fn publish_blocking(&self, artifact: &str) -> Result<()> {
        self.commit_artifact(artifact)?;
        self.push_branch()
    }
}

#[async_trait::async_trait]
impl atelier_core::Publisher for GitPublisher {
    fn name(&self) -> &'static str {
        "git"
    }

    async fn publish(&self, artifact: &str) -> atelier_core::Result<()> {
        let publisher = self.clone();
        let artifact = artifact.to_string();

        // git2 is blocking; keep it off the async runtime threads
        tokio::task::spawn_blocking(move || publisher.publish_blocking(&artifact))
            .await
            .map_err(|e| atelier_core::Error::Publish(format!("Publish task failed: {}", e)))?
            .map_err(atelier_core::Error::from)
    }
}
