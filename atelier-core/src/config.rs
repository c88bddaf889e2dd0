//! Configuration management for Atelier
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (ATELIER_*)
//! 3. Config file (~/.config/atelier/config.toml)
//! 4. Default values

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which chat-completion backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OpenAI-compatible chat completions endpoint
    #[default]
    OpenAi,
    /// Azure OpenAI deployment endpoint
    Azure,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::OpenAi => write!(f, "openai"),
            BackendKind::Azure => write!(f, "azure"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(BackendKind::OpenAi),
            "azure" => Ok(BackendKind::Azure),
            _ => Err(format!("Unknown backend: {}", s)),
        }
    }
}

/// Chat backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Which backend implementation to use
    pub kind: BackendKind,

    /// Base URL of the backend endpoint
    pub endpoint: String,

    /// Model name (OpenAI) or deployment name (Azure)
    pub model: String,

    /// API version, used by the Azure endpoint
    pub api_version: String,

    /// Sampling temperature
    pub temperature: f64,

    /// Timeout for a single completion request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::OpenAi,
            endpoint: "https://api.openai.com".to_string(),
            model: "gpt-4o".to_string(),
            api_version: "2024-02-01".to_string(),
            temperature: 0.7,
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Turn-taking configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Maximum number of agent turns before the run stops without approval
    ///
    /// This is the safety valve that bounds cost and latency when the
    /// agents never reach a ready state.
    pub max_turns: u32,

    /// Optional per-turn timeout; a turn that exceeds it fails the run
    #[serde(default, with = "humantime_serde")]
    pub turn_timeout: Option<Duration>,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            max_turns: 12,
            turn_timeout: None,
        }
    }
}

/// Publishing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Path to the git repository the artifact is published into
    pub repo_path: PathBuf,

    /// File name the artifact is written to inside the repository
    pub artifact_file: String,

    /// Remote to push to
    pub remote: String,

    /// Branch to push
    pub branch: String,

    /// Optional push script; when set it is run instead of the git publisher
    pub push_script: Option<PathBuf>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::from("."),
            artifact_file: "index.html".to_string(),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            push_script: None,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Chat backend configuration
    pub backend: BackendConfig,
    /// Turn-taking configuration
    pub orchestration: OrchestrationConfig,
    /// Publishing configuration
    pub publish: PublishConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/atelier/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("atelier").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - ATELIER_BACKEND: Backend kind (openai, azure)
    /// - ATELIER_ENDPOINT: Backend endpoint base URL
    /// - ATELIER_MODEL: Model or deployment name
    /// - ATELIER_MAX_TURNS: Turn ceiling for a collaboration run
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(kind) = std::env::var("ATELIER_BACKEND") {
            if let Ok(kind) = kind.parse() {
                self.backend.kind = kind;
            }
        }

        if let Ok(endpoint) = std::env::var("ATELIER_ENDPOINT") {
            self.backend.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("ATELIER_MODEL") {
            self.backend.model = model;
        }

        if let Ok(max_turns) = std::env::var("ATELIER_MAX_TURNS") {
            if let Ok(max_turns) = max_turns.parse() {
                self.orchestration.max_turns = max_turns;
            }
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        endpoint: Option<String>,
        model: Option<String>,
        max_turns: Option<u32>,
    ) -> Self {
        if let Some(endpoint) = endpoint {
            self.backend.endpoint = endpoint;
        }

        if let Some(model) = model {
            self.backend.model = model;
        }

        if let Some(max_turns) = max_turns {
            self.orchestration.max_turns = max_turns;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        endpoint: Option<String>,
        model: Option<String>,
        max_turns: Option<u32>,
    ) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(endpoint, model, max_turns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.kind, BackendKind::OpenAi);
        assert_eq!(config.backend.model, "gpt-4o");
        assert_eq!(config.orchestration.max_turns, 12);
        assert!(config.orchestration.turn_timeout.is_none());
        assert_eq!(config.publish.artifact_file, "index.html");
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(
            Some("https://llm.internal".to_string()),
            Some("gpt-4o-mini".to_string()),
            Some(6),
        );

        assert_eq!(config.backend.endpoint, "https://llm.internal");
        assert_eq!(config.backend.model, "gpt-4o-mini");
        assert_eq!(config.orchestration.max_turns, 6);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[backend]
kind = "azure"
endpoint = "https://example.openai.azure.com"
model = "gpt-4o-deploy"
request_timeout = "90s"

[orchestration]
max_turns = 9
turn_timeout = "2m"

[publish]
artifact_file = "site/index.html"
branch = "gh-pages"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.backend.kind, BackendKind::Azure);
        assert_eq!(config.backend.request_timeout, Duration::from_secs(90));
        assert_eq!(config.orchestration.max_turns, 9);
        assert_eq!(
            config.orchestration.turn_timeout,
            Some(Duration::from_secs(120))
        );
        assert_eq!(config.publish.artifact_file, "site/index.html");
        assert_eq!(config.publish.branch, "gh-pages");
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[orchestration]
max_turns = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // backend section should use defaults
        assert_eq!(config.backend.kind, BackendKind::OpenAi);
        assert_eq!(config.orchestration.max_turns, 3);
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("openai".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
        assert_eq!("Azure".parse::<BackendKind>().unwrap(), BackendKind::Azure);
        assert!("bedrock".parse::<BackendKind>().is_err());
    }
}
