//! quill - A CLI tool that drafts conventional commit messages from staged changes.
//!
//! # Overview
//!
//! quill reads the staged diff, asks a local Ollama model or a cloud API
//! (OpenAI, Anthropic, Gemini) for a Conventional Commits message, lets the
//! user accept, edit, or abort it, and then runs `git commit`.

pub mod cloud;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod ollama;
pub mod pipeline;

// Re-export commonly used types
pub use commit::{CommitMessage, Decision, Reviewer, TerminalReviewer};
pub use config::{Config, Overrides};
pub use error::{CloudError, CommitError, ConfigError, GitError, LlmError, OllamaError};
pub use git::{ChangedFile, FileStatus, Git, StagedDiff};
pub use llm::{Completion, Generator, LlmRouter, Provider, ProviderSettings};
pub use pipeline::{Outcome, RunOptions};
