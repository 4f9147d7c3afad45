//! Provider selection and dispatch.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cloud::anthropic::ANTHROPIC_API_KEY_VARS;
use crate::cloud::gemini::GEMINI_API_KEY_VARS;
use crate::cloud::openai::OPENAI_API_KEY_VARS;
use crate::cloud::{AnthropicClient, GeminiClient, OpenAiClient};
use crate::error::{CloudError, LlmError, OllamaError};
use crate::ollama::{DefaultBackend, generate_local};

/// Supported LLM providers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Ollama,
    OpenAi,
    #[serde(alias = "claude")]
    Anthropic,
    #[serde(alias = "google")]
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Ollama,
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Gemini,
    ];

    /// Name used in the config file and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Ollama => "Ollama",
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Gemini => "Gemini",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Ollama => "llama3.2",
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-haiku-latest",
            Provider::Gemini => "gemini-1.5-flash",
        }
    }

    /// Environment variables holding the API key, in lookup order.
    /// Empty for the local runner.
    pub fn api_key_vars(&self) -> &'static [&'static str] {
        match self {
            Provider::Ollama => &[],
            Provider::OpenAi => OPENAI_API_KEY_VARS,
            Provider::Anthropic => ANTHROPIC_API_KEY_VARS,
            Provider::Gemini => GEMINI_API_KEY_VARS,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Provider::Ollama)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama),
            "openai" => Ok(Provider::OpenAi),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "gemini" | "google" => Ok(Provider::Gemini),
            _ => Err(LlmError::UnknownProvider(s.to_string())),
        }
    }
}

/// Everything the router needs to reach a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub provider: Provider,
    pub model: String,
    pub ollama_url: String,
}

/// Successful generation with metadata.
#[derive(Debug)]
pub struct Completion {
    pub text: String,
    pub provider: Provider,
    /// Set when the Ollama HTTP call failed and the CLI produced the text.
    pub primary_error: Option<OllamaError>,
}

/// Turns a prompt into raw model text.
///
/// This abstraction allows the pipeline to run against a fake model in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Completion, LlmError>;
}

/// Default generator: one request to the configured provider.
pub struct LlmRouter {
    settings: ProviderSettings,
    client: Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl LlmRouter {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            client: Client::new(),
            base_url: None,
            api_key: None,
        }
    }

    /// Point cloud providers at a different host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Use this key instead of reading the provider's environment variable.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    async fn generate_cloud(&self, prompt: &str) -> Result<String, CloudError> {
        let model = self.settings.model.as_str();
        let client = self.client.clone();

        match self.settings.provider {
            Provider::OpenAi => {
                let mut api = match &self.api_key {
                    Some(key) => OpenAiClient::new(client, key, model),
                    None => OpenAiClient::from_env(client, model)?,
                };
                if let Some(url) = &self.base_url {
                    api = api.with_base_url(url);
                }
                api.generate(prompt).await
            }
            Provider::Anthropic => {
                let mut api = match &self.api_key {
                    Some(key) => AnthropicClient::new(client, key, model),
                    None => AnthropicClient::from_env(client, model)?,
                };
                if let Some(url) = &self.base_url {
                    api = api.with_base_url(url);
                }
                api.generate(prompt).await
            }
            Provider::Gemini => {
                let mut api = match &self.api_key {
                    Some(key) => GeminiClient::new(client, key, model),
                    None => GeminiClient::from_env(client, model)?,
                };
                if let Some(url) = &self.base_url {
                    api = api.with_base_url(url);
                }
                api.generate(prompt).await
            }
            Provider::Ollama => Err(CloudError::InvalidResponse(
                "ollama is not a cloud provider".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Generator for LlmRouter {
    async fn generate(&self, prompt: &str) -> Result<Completion, LlmError> {
        let provider = self.settings.provider;
        debug!(
            "Generating with {} model {} ({} chars)",
            provider.display_name(),
            self.settings.model,
            prompt.len()
        );

        if provider.is_local() {
            let backend = DefaultBackend::new(self.client.clone(), &self.settings.ollama_url);
            let local = generate_local(&backend, &self.settings.model, prompt).await?;
            return Ok(Completion {
                text: local.text,
                provider,
                primary_error: local.http_error,
            });
        }

        let text = self
            .generate_cloud(prompt)
            .await
            .map_err(|source| LlmError::Cloud {
                provider: provider.display_name(),
                source,
            })?;

        Ok(Completion {
            text,
            provider,
            primary_error: None,
        })
    }
}
