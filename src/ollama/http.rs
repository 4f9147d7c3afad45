//! Ollama HTTP client for `POST /api/generate`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OllamaError;
use crate::llm::timeout::http_timeout;

/// Default base URL of a local Ollama server.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}

/// Send a single non-streaming generate request and return the response text.
///
/// An empty `response` field is treated as a failure so the caller can fall
/// back to the CLI.
pub async fn generate_http(
    client: &Client,
    base_url: &str,
    model: &str,
    prompt: &str,
) -> Result<String, OllamaError> {
    let url = format!("{}/api/generate", base_url.trim_end_matches('/'));
    debug!("POST {} (model={}, prompt={} chars)", url, model, prompt.len());

    let response = client
        .post(&url)
        .timeout(http_timeout())
        .json(&GenerateRequest {
            model,
            prompt,
            stream: false,
        })
        .send()
        .await
        .map_err(OllamaError::Request)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(OllamaError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        });
    }

    let body: GenerateResponse = response
        .json()
        .await
        .map_err(|e| OllamaError::InvalidResponse(e.to_string()))?;

    if let Some(error) = body.error {
        return Err(OllamaError::InvalidResponse(error));
    }

    if body.response.trim().is_empty() {
        return Err(OllamaError::InvalidResponse("empty response".to_string()));
    }

    Ok(body.response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::llm::timeout::HTTP_TIMEOUT_ENV_VAR;

    #[tokio::test]
    async fn test_generate_http_sends_model_prompt_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_json(json!({
                "model": "llama3.2",
                "prompt": "describe this diff",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.2",
                "response": "feat: add parser",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = generate_http(&Client::new(), &server.uri(), "llama3.2", "describe this diff")
            .await
            .unwrap();
        assert_eq!(text, "feat: add parser");
    }

    #[tokio::test]
    async fn test_generate_http_trailing_slash_in_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"response": "fix: typo"})),
            )
            .mount(&server)
            .await;

        let base = format!("{}/", server.uri());
        let text = generate_http(&Client::new(), &base, "m", "p").await.unwrap();
        assert_eq!(text, "fix: typo");
    }

    #[tokio::test]
    async fn test_generate_http_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let result = generate_http(&Client::new(), &server.uri(), "missing", "p").await;
        match result {
            Err(OllamaError::Status { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "model not found");
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_http_error_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "out of memory"})),
            )
            .mount(&server)
            .await;

        let result = generate_http(&Client::new(), &server.uri(), "m", "p").await;
        assert!(matches!(result, Err(OllamaError::InvalidResponse(msg)) if msg == "out of memory"));
    }

    #[tokio::test]
    async fn test_generate_http_empty_response_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "  "})))
            .mount(&server)
            .await;

        let result = generate_http(&Client::new(), &server.uri(), "m", "p").await;
        assert!(matches!(result, Err(OllamaError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_generate_http_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = generate_http(&Client::new(), &server.uri(), "m", "p").await;
        assert!(matches!(result, Err(OllamaError::InvalidResponse(_))));
    }

    #[test]
    fn test_generate_http_times_out_on_slow_server() {
        temp_env::with_var(HTTP_TIMEOUT_ENV_VAR, Some("1"), || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            rt.block_on(async {
                let server = MockServer::start().await;
                Mock::given(method("POST"))
                    .and(path("/api/generate"))
                    .respond_with(
                        ResponseTemplate::new(200)
                            .set_body_json(json!({"response": "feat: too late"}))
                            .set_delay(Duration::from_secs(3)),
                    )
                    .mount(&server)
                    .await;

                let result = generate_http(&Client::new(), &server.uri(), "m", "p").await;
                match result {
                    Err(OllamaError::Request(e)) => assert!(e.is_timeout(), "got {:?}", e),
                    other => panic!("Expected timeout, got {:?}", other),
                }
            });
        });
    }

    #[tokio::test]
    async fn test_generate_http_connection_refused() {
        // Port 9 (discard) is almost never listening locally
        let result = generate_http(&Client::new(), "http://127.0.0.1:9", "m", "p").await;
        assert!(matches!(result, Err(OllamaError::Request(_))));
    }
}
