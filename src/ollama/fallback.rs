//! One HTTP attempt, then one CLI attempt.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{LlmError, OllamaError};

use super::http::generate_http;
use super::subprocess::run_ollama;

/// The two ways of reaching a local Ollama model.
///
/// This abstraction allows mocking the HTTP and CLI paths in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalBackend: Send + Sync {
    /// Generate via the HTTP endpoint.
    async fn http(&self, model: &str, prompt: &str) -> Result<String, OllamaError>;

    /// Generate via `ollama run`.
    async fn cli(&self, model: &str, prompt: &str) -> Result<String, OllamaError>;
}

/// Backend that talks to a real Ollama server and binary.
pub struct DefaultBackend {
    client: Client,
    base_url: String,
}

impl DefaultBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl LocalBackend for DefaultBackend {
    async fn http(&self, model: &str, prompt: &str) -> Result<String, OllamaError> {
        generate_http(&self.client, &self.base_url, model, prompt).await
    }

    async fn cli(&self, model: &str, prompt: &str) -> Result<String, OllamaError> {
        run_ollama(model, prompt).await
    }
}

/// Text produced by the local runner, with the HTTP error if the CLI was used.
#[derive(Debug)]
pub struct LocalCompletion {
    pub text: String,
    pub http_error: Option<OllamaError>,
}

/// Generate with the local runner: HTTP first, `ollama run` once on failure.
pub async fn generate_local<B: LocalBackend + ?Sized>(
    backend: &B,
    model: &str,
    prompt: &str,
) -> Result<LocalCompletion, LlmError> {
    let http_error = match backend.http(model, prompt).await {
        Ok(text) => {
            return Ok(LocalCompletion {
                text,
                http_error: None,
            });
        }
        Err(e) => e,
    };

    warn!("Ollama HTTP request failed: {}. Falling back to `ollama run`.", http_error);

    match backend.cli(model, prompt).await {
        Ok(text) => {
            debug!("Ollama CLI fallback succeeded ({} chars)", text.len());
            Ok(LocalCompletion {
                text,
                http_error: Some(http_error),
            })
        }
        Err(cli_error) => Err(LlmError::LocalFailed {
            http: http_error,
            cli: cli_error,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refused() -> OllamaError {
        OllamaError::Status {
            status: 500,
            body: "internal".to_string(),
        }
    }

    #[tokio::test]
    async fn test_http_success_skips_cli() {
        let mut mock = MockLocalBackend::new();
        mock.expect_http()
            .times(1)
            .returning(|_, _| Ok("feat: add login".to_string()));
        mock.expect_cli().times(0);

        let completion = generate_local(&mock, "llama3.2", "prompt").await.unwrap();
        assert_eq!(completion.text, "feat: add login");
        assert!(completion.http_error.is_none());
    }

    #[tokio::test]
    async fn test_http_failure_falls_back_to_cli_once() {
        let mut mock = MockLocalBackend::new();
        mock.expect_http().times(1).returning(|_, _| Err(refused()));
        mock.expect_cli()
            .times(1)
            .withf(|model, prompt| model.to_string() == "llama3.2" && prompt.to_string() == "prompt")
            .returning(|_, _| Ok("fix: handle empty input".to_string()));

        let completion = generate_local(&mock, "llama3.2", "prompt").await.unwrap();
        assert_eq!(completion.text, "fix: handle empty input");
        assert!(matches!(
            completion.http_error,
            Some(OllamaError::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_both_paths_fail_reports_both_errors() {
        let mut mock = MockLocalBackend::new();
        mock.expect_http().times(1).returning(|_, _| Err(refused()));
        mock.expect_cli()
            .times(1)
            .returning(|_, _| Err(OllamaError::NotInstalled));

        let result = generate_local(&mock, "llama3.2", "prompt").await;
        match result {
            Err(LlmError::LocalFailed { http, cli }) => {
                assert!(matches!(http, OllamaError::Status { .. }));
                assert!(matches!(cli, OllamaError::NotInstalled));
            }
            other => panic!("Expected LocalFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cli_is_not_retried() {
        let mut mock = MockLocalBackend::new();
        mock.expect_http().times(1).returning(|_, _| Err(refused()));
        mock.expect_cli()
            .times(1)
            .returning(|_, _| Err(OllamaError::Timeout(300)));

        let result = generate_local(&mock, "m", "p").await;
        assert!(result.is_err());
    }

    /// Real HTTP path against `base_url`; the CLI path is counted, not run.
    struct SlowServerBackend {
        http: DefaultBackend,
        cli_calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl LocalBackend for SlowServerBackend {
        async fn http(&self, model: &str, prompt: &str) -> Result<String, OllamaError> {
            self.http.http(model, prompt).await
        }

        async fn cli(&self, _model: &str, _prompt: &str) -> Result<String, OllamaError> {
            self.cli_calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok("perf: cache parsed config".to_string())
        }
    }

    #[test]
    fn test_http_timeout_falls_back_to_cli() {
        use std::time::Duration;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        temp_env::with_var(crate::llm::timeout::HTTP_TIMEOUT_ENV_VAR, Some("1"), || {
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
                            .set_body_string(r#"{"response":"feat: too late"}"#)
                            .set_delay(Duration::from_secs(3)),
                    )
                    .expect(1)
                    .mount(&server)
                    .await;

                let backend = SlowServerBackend {
                    http: DefaultBackend::new(Client::new(), server.uri()),
                    cli_calls: Default::default(),
                };

                let completion = generate_local(&backend, "m", "p").await.unwrap();
                assert_eq!(completion.text, "perf: cache parsed config");
                assert_eq!(
                    backend.cli_calls.load(std::sync::atomic::Ordering::SeqCst),
                    1
                );
                match completion.http_error {
                    Some(OllamaError::Request(e)) => assert!(e.is_timeout()),
                    other => panic!("Expected HTTP timeout, got {:?}", other),
                }
            });
        });
    }
}
