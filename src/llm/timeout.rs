//! Timeout configuration read from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

/// Environment variable overriding the HTTP request timeout (seconds).
pub const HTTP_TIMEOUT_ENV_VAR: &str = "QUILL_HTTP_TIMEOUT";

/// Default timeout for a single HTTP request to a provider.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Environment variable overriding the `ollama run` timeout (seconds).
pub const OLLAMA_TIMEOUT_ENV_VAR: &str = "QUILL_OLLAMA_TIMEOUT";

/// Default timeout for the Ollama CLI fallback (5 minutes).
pub const DEFAULT_OLLAMA_TIMEOUT_SECS: u64 = 300;

/// Timeout for HTTP calls to Ollama and cloud providers.
pub fn http_timeout() -> Duration {
    timeout_from_env(HTTP_TIMEOUT_ENV_VAR, DEFAULT_HTTP_TIMEOUT_SECS)
}

/// Timeout for the `ollama run` subprocess.
pub fn ollama_cli_timeout() -> Duration {
    timeout_from_env(OLLAMA_TIMEOUT_ENV_VAR, DEFAULT_OLLAMA_TIMEOUT_SECS)
}

/// Read a timeout in seconds from `var`, falling back to `default_secs`.
///
/// Logs a warning if the variable is set but is not a non-negative integer.
fn timeout_from_env(var: &str, default_secs: u64) -> Duration {
    match env::var(var) {
        Ok(v) if !v.is_empty() => match v.trim().parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!("Invalid {} value '{}', using default {}s", var, v, default_secs);
                Duration::from_secs(default_secs)
            }
        },
        _ => Duration::from_secs(default_secs),
    }
}
