//! Anthropic Messages API client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::CloudError;

use super::request::{api_key_from_env, send_json};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const ANTHROPIC_API_KEY_VARS: &[&str] = &["ANTHROPIC_API_KEY"];
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Commit messages are short; this caps runaway responses.
const MAX_TOKENS: u32 = 1024;

/// Anthropic client
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: ANTHROPIC_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    /// Build a client with the key from `ANTHROPIC_API_KEY`.
    pub fn from_env(client: Client, model: impl Into<String>) -> Result<Self, CloudError> {
        let api_key = api_key_from_env(ANTHROPIC_API_KEY_VARS)?;
        Ok(Self::new(client, api_key, model))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, CloudError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response: MessagesResponse = send_json(
            self.client
                .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&request),
        )
        .await?;

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(CloudError::InvalidResponse(
                "no text block in content".to_string(),
            ));
        }
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}
