//! Chat backend abstraction for agent response generation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::chat::{Message, Role};
use crate::config::{BackendConfig, BackendKind};
use crate::secrets::Secrets;
use crate::{Error, Result};

/// Trait for chat-completion backends
///
/// A backend takes an agent's fixed instructions plus the full ordered
/// conversation so far and produces the agent's next reply. Retries and
/// backoff are the backend's own business; a failure here is fatal to the
/// current collaboration run.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &'static str;

    /// Produce the next reply for an agent with the given instructions
    async fn complete(&self, instructions: &str, transcript: &[Message]) -> Result<String>;
}

/// Request body for a chat completions call
#[derive(Debug, Serialize)]
struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<WireMessage>,
    temperature: f64,
}

/// A single message on the wire
#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Render the transcript into wire messages
///
/// Agent messages are sent as assistant turns prefixed with the authoring
/// agent's name, so each agent can tell who said what in the group chat.
fn wire_messages(instructions: &str, transcript: &[Message]) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);

    messages.push(WireMessage {
        role: "system",
        content: instructions.to_string(),
    });

    for message in transcript {
        messages.push(match message.role {
            Role::User => WireMessage {
                role: "user",
                content: message.content.clone(),
            },
            role => WireMessage {
                role: "assistant",
                content: format!("{}: {}", role.agent_name(), message.content),
            },
        });
    }

    messages
}

fn first_content(body: ChatResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| Error::Generation("Backend returned an empty completion".to_string()))
}

fn build_client(config: &BackendConfig) -> Result<Client> {
    Url::parse(&config.endpoint)
        .map_err(|e| Error::Config(format!("Invalid backend endpoint '{}': {}", config.endpoint, e)))?;

    Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))
}

/// OpenAI-compatible chat completions backend
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    endpoint: String,
    model: String,
    temperature: f64,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiBackend {
    /// Create a new OpenAI backend from configuration
    pub fn from_config(config: &BackendConfig, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
            client: build_client(config)?,
        })
    }

    fn request_url(&self) -> String {
        format!("{}/v1/chat/completions", self.endpoint)
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, instructions: &str, transcript: &[Message]) -> Result<String> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            Error::Generation(
                "OpenAI API key not configured. Set OPENAI_API_KEY \
                 or add it to ~/.config/atelier/secrets.toml"
                    .to_string(),
            )
        })?;

        let request = ChatRequest {
            model: Some(self.model.clone()),
            messages: wire_messages(instructions, transcript),
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.request_url())
            .bearer_auth(key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "Chat request returned {}: {}",
                status, body
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Malformed chat response: {}", e)))?;

        first_content(body)
    }
}

/// Azure OpenAI deployment backend
///
/// Talks to `{endpoint}/openai/deployments/{deployment}/chat/completions`
/// with the `api-key` header. The model is selected by the deployment, so
/// no model field is sent.
#[derive(Debug, Clone)]
pub struct AzureBackend {
    endpoint: String,
    deployment: String,
    api_version: String,
    temperature: f64,
    api_key: Option<String>,
    client: Client,
}

impl AzureBackend {
    /// Create a new Azure backend from configuration
    pub fn from_config(config: &BackendConfig, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            deployment: config.model.clone(),
            api_version: config.api_version.clone(),
            temperature: config.temperature,
            api_key,
            client: build_client(config)?,
        })
    }

    fn request_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

#[async_trait]
impl ChatBackend for AzureBackend {
    fn name(&self) -> &'static str {
        "azure"
    }

    async fn complete(&self, instructions: &str, transcript: &[Message]) -> Result<String> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            Error::Generation(
                "Azure OpenAI API key not configured. Set AZURE_OPENAI_API_KEY \
                 or add it to ~/.config/atelier/secrets.toml"
                    .to_string(),
            )
        })?;

        let request = ChatRequest {
            model: None,
            messages: wire_messages(instructions, transcript),
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.request_url())
            .header("api-key", key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "Chat request returned {}: {}",
                status, body
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Malformed chat response: {}", e)))?;

        first_content(body)
    }
}

/// Registry of available backends
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn ChatBackend>>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Create a registry with both backends built from configuration
    pub fn from_config(config: &BackendConfig, secrets: &Secrets) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(OpenAiBackend::from_config(
            config,
            secrets.api_key(BackendKind::OpenAi),
        )?));
        registry.register(Arc::new(AzureBackend::from_config(
            config,
            secrets.api_key(BackendKind::Azure),
        )?));
        Ok(registry)
    }

    /// Register a backend
    pub fn register(&mut self, backend: Arc<dyn ChatBackend>) {
        self.backends.insert(backend.name().to_string(), backend);
    }

    /// Get a backend by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ChatBackend>> {
        self.backends.get(name).cloned()
    }

    /// List all registered backends
    pub fn list_registered(&self) -> Vec<&str> {
        self.backends.keys().map(|s| s.as_str()).collect()
    }

    /// Get a backend by kind enum
    pub fn get_by_kind(&self, kind: BackendKind) -> Option<Arc<dyn ChatBackend>> {
        match kind {
            BackendKind::OpenAi => self.get("openai"),
            BackendKind::Azure => self.get("azure"),
        }
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BackendConfig {
        BackendConfig {
            endpoint: "https://api.openai.com/".to_string(),
            model: "gpt-4o".to_string(),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn test_openai_request_url() {
        let backend = OpenAiBackend::from_config(&test_config(), None).unwrap();
        assert_eq!(
            backend.request_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_azure_request_url() {
        let config = BackendConfig {
            endpoint: "https://example.openai.azure.com".to_string(),
            model: "gpt-4o-deploy".to_string(),
            api_version: "2024-02-01".to_string(),
            ..BackendConfig::default()
        };
        let backend = AzureBackend::from_config(&config, None).unwrap();
        assert_eq!(
            backend.request_url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o-deploy/chat/completions?api-version=2024-02-01"
        );
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = BackendConfig {
            endpoint: "not a url".to_string(),
            ..BackendConfig::default()
        };
        assert!(OpenAiBackend::from_config(&config, None).is_err());
    }

    #[test]
    fn test_wire_messages_system_first() {
        let transcript = vec![
            Message::user("build a counter app"),
            Message::new(Role::BusinessAnalyst, "here is the plan"),
        ];

        let wire = wire_messages("You are a Business Analyst.", &transcript);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[0].content, "You are a Business Analyst.");
        assert_eq!(wire[1].role, "user");
        assert_eq!(wire[1].content, "build a counter app");
        assert_eq!(wire[2].role, "assistant");
        assert_eq!(wire[2].content, "BusinessAnalystAgent: here is the plan");
    }

    #[test]
    fn test_first_content_empty_choices() {
        let body = ChatResponse { choices: vec![] };
        assert!(first_content(body).is_err());
    }

    #[test]
    fn test_first_content_blank_completion() {
        let body = ChatResponse {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: Some("   ".to_string()),
                },
            }],
        };
        assert!(first_content(body).is_err());
    }

    #[test]
    fn test_registry_get_by_kind() {
        let registry =
            BackendRegistry::from_config(&test_config(), &Secrets::default()).unwrap();
        assert!(registry.get_by_kind(BackendKind::OpenAi).is_some());
        assert!(registry.get_by_kind(BackendKind::Azure).is_some());
        assert_eq!(registry.get_by_kind(BackendKind::OpenAi).unwrap().name(), "openai");
    }

    #[test]
    fn test_registry_list_registered() {
        let registry =
            BackendRegistry::from_config(&test_config(), &Secrets::default()).unwrap();
        let mut names = registry.list_registered();
        names.sort_unstable();
        assert_eq!(names, vec!["azure", "openai"]);
    }

    #[test]
    fn test_registry_unknown_name() {
        let registry = BackendRegistry::new();
        assert!(registry.get("openai").is_none());
    }

    #[tokio::test]
    async fn test_scripted_backend_exhaustion() {
        let backend = testing::ScriptedBackend::new(["one"]);
        assert_eq!(backend.complete("sys", &[]).await.unwrap(), "one");
        assert!(backend.complete("sys", &[]).await.is_err());
    }
}
