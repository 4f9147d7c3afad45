//! LLM provider routing and timeouts.

pub mod router;
pub mod timeout;

pub use router::{Completion, Generator, LlmRouter, Provider, ProviderSettings};
pub use timeout::{http_timeout, ollama_cli_timeout};
