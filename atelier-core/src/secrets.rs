//! Secrets management for Atelier
//!
//! Secrets are stored separately from configuration to avoid accidental sharing.
//! The secrets file is located at `~/.config/atelier/secrets.toml` and must have
//! restrictive permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variables (OPENAI_API_KEY, AZURE_OPENAI_API_KEY, GITHUB_TOKEN)
//! 2. Secrets file (~/.config/atelier/secrets.toml)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BackendKind;
use crate::{Error, Result};

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// OpenAI credentials
    pub openai: ApiSecrets,
    /// Azure OpenAI credentials
    pub azure: ApiSecrets,
    /// Git push credentials
    pub git: GitSecrets,
}

/// API key for a chat backend
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSecrets {
    /// The API key for this backend
    pub api_key: Option<String>,
}

/// Git-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitSecrets {
    /// Personal access token used for HTTPS pushes
    pub token: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        let secrets_path = Self::default_secrets_path();

        if let Some(path) = secrets_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        // Check file permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            // Check if file is readable by group or others (mode & 0o077)
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        // Trim whitespace from stored keys
        for key in [
            &mut secrets.openai.api_key,
            &mut secrets.azure.api_key,
            &mut secrets.git.token,
        ] {
            if let Some(value) = key {
                *value = value.trim().to_string();
            }
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/atelier/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("atelier").join("secrets.toml"))
    }

    /// Get the API key for the given backend with environment variable override
    ///
    /// Priority: environment variable > secrets file. The variable is
    /// `OPENAI_API_KEY` for OpenAI and `AZURE_OPENAI_API_KEY` for Azure.
    pub fn api_key(&self, kind: BackendKind) -> Option<String> {
        let (env_var, stored) = match kind {
            BackendKind::OpenAi => ("OPENAI_API_KEY", &self.openai.api_key),
            BackendKind::Azure => ("AZURE_OPENAI_API_KEY", &self.azure.api_key),
        };

        if let Ok(key) = std::env::var(env_var) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                debug!(backend = %kind, "Using API key from {} environment variable", env_var);
                return Some(key);
            }
        }

        if let Some(key) = stored {
            if !key.is_empty() {
                debug!(backend = %kind, "Using API key from secrets file");
                return Some(key.clone());
            }
        }

        None
    }

    /// Get the git push token with environment variable override
    ///
    /// Priority: GITHUB_TOKEN env var > secrets file
    pub fn git_token(&self) -> Option<String> {
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            let token = token.trim().to_string();
            if !token.is_empty() {
                debug!("Using git token from GITHUB_TOKEN environment variable");
                return Some(token);
            }
        }

        if let Some(ref token) = self.git.token {
            if !token.is_empty() {
                debug!("Using git token from secrets file");
                return Some(token.clone());
            }
        }

        None
    }
}
