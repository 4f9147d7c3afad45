//! Error types for quill modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git subprocess and repository inspection.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository. Run quill from within a git work tree.")]
    NotARepository,

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },

    #[error("Failed to inspect repository status: {0}")]
    StatusFailed(#[source] git2::Error),
}

/// Errors from loading or saving the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine home directory for the config file")]
    NoHomeDir,

    #[error("Failed to read config {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("Setup cancelled")]
    Cancelled,
}

/// Errors from the local Ollama runner (HTTP endpoint or CLI).
#[derive(Error, Debug)]
pub enum OllamaError {
    #[error("Ollama request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Ollama returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Ollama returned an unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Ollama CLI not found. Install from https://ollama.com or start the Ollama server")]
    NotInstalled,

    #[error("Failed to spawn ollama process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Ollama process timed out after {0} seconds")]
    Timeout(u64),

    #[error("Ollama CLI exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },
}

/// Errors from cloud provider APIs.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{0} is not set. Export your API key to use this provider.")]
    MissingApiKey(&'static str),

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API returned an unexpected response: {0}")]
    InvalidResponse(String),
}

/// Errors from provider selection and dispatch.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Unknown provider '{0}'. Expected one of: ollama, openai, anthropic, gemini")]
    UnknownProvider(String),

    #[error("Ollama HTTP request failed ({http}) and CLI fallback failed ({cli})")]
    LocalFailed { http: OllamaError, cli: OllamaError },

    #[error("{provider} request failed: {source}")]
    Cloud {
        provider: &'static str,
        #[source]
        source: CloudError,
    },
}

/// Errors from commit message handling.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("The model returned an empty commit message")]
    EmptyMessage,

    #[error("Interactive prompt failed: {0}")]
    PromptFailed(String),
}
