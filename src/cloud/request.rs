//! Shared request plumbing for cloud providers.

use std::env;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::CloudError;
use crate::llm::timeout::http_timeout;

/// Read the first non-empty API key from `vars`, in order.
///
/// The error names the first variable, which is the one users are
/// expected to set.
pub fn api_key_from_env(vars: &[&'static str]) -> Result<String, CloudError> {
    for var in vars {
        if let Ok(value) = env::var(var) {
            let value = value.trim();
            if !value.is_empty() {
                return Ok(value.to_string());
            }
        }
    }

    Err(CloudError::MissingApiKey(vars.first().copied().unwrap_or("API key")))
}

/// Send a JSON request once and decode a JSON response.
pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, CloudError> {
    let response = request
        .timeout(http_timeout())
        .send()
        .await
        .map_err(CloudError::Request)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CloudError::Status {
            status: status.as_u16(),
            body: truncate_body(body.trim()),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| CloudError::InvalidResponse(e.to_string()))
}

/// Keep error bodies short enough to print on one screen.
fn truncate_body(body: &str) -> String {
    const MAX_BODY_CHARS: usize = 500;
    body.chars().take(MAX_BODY_CHARS).collect()
}
