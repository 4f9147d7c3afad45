//! OpenAI chat completions client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::CloudError;

use super::request::{api_key_from_env, send_json};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const OPENAI_API_KEY_VARS: &[&str] = &["OPENAI_API_KEY"];

/// OpenAI client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    /// Build a client with the key from `OPENAI_API_KEY`.
    pub fn from_env(client: Client, model: impl Into<String>) -> Result<Self, CloudError> {
        let api_key = api_key_from_env(OPENAI_API_KEY_VARS)?;
        Ok(Self::new(client, api_key, model))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, CloudError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response: ChatResponse = send_json(
            self.client
                .post(format!(
                    "{}/v1/chat/completions",
                    self.base_url.trim_end_matches('/')
                ))
                .bearer_auth(&self.api_key)
                .json(&request),
        )
        .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| CloudError::InvalidResponse("no message content in choices".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
