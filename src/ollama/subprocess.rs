//! Ollama CLI spawning, used as the fallback when the HTTP endpoint fails.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::OllamaError;
use crate::llm::timeout::ollama_cli_timeout;

/// Check if the Ollama CLI is installed and on PATH.
///
/// Uses the `which` crate for cross-platform executable detection.
pub fn check_ollama_installed() -> Result<(), OllamaError> {
    which::which("ollama")
        .map(|_| ())
        .map_err(|_| OllamaError::NotInstalled)
}

/// Run `ollama run <model>` with the prompt on stdin and return stdout.
///
/// # Timeout
///
/// The subprocess has a default timeout of 5 minutes (300 seconds).
/// This can be configured via the `QUILL_OLLAMA_TIMEOUT` environment
/// variable (value in seconds).
pub async fn run_ollama(model: &str, prompt: &str) -> Result<String, OllamaError> {
    check_ollama_installed()?;
    run_with_stdin("ollama", &["run", model], prompt, ollama_cli_timeout()).await
}

/// Spawn `program args...`, feed `input` on stdin, and collect stdout.
///
/// The child is killed if the timeout elapses.
async fn run_with_stdin(
    program: &str,
    args: &[&str],
    input: &str,
    timeout_duration: Duration,
) -> Result<String, OllamaError> {
    debug!("Spawning {} {:?} ({} chars on stdin)", program, args, input.len());

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(OllamaError::SpawnFailed)?;

    let stdin = child.stdin.take();
    let input = input.as_bytes().to_vec();

    // Write stdin and drain stdout concurrently.
    let write_input = async move {
        if let Some(mut pipe) = stdin {
            pipe.write_all(&input).await?;
            pipe.shutdown().await?;
        }
        Ok::<(), std::io::Error>(())
    };

    let (written, output) = timeout(timeout_duration, async {
        tokio::join!(write_input, child.wait_with_output())
    })
    .await
    .map_err(|_| OllamaError::Timeout(timeout_duration.as_secs()))?;

    if let Err(e) = written {
        // Early exit closes the pipe; the exit status is checked below.
        debug!("Failed to write prompt to {}: {}", program, e);
    }
    let output = output.map_err(OllamaError::SpawnFailed)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let code = output.status.code().unwrap_or(-1);
        return Err(OllamaError::NonZeroExit { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
