//! Local Ollama runner integration.

pub mod fallback;
pub mod http;
pub mod subprocess;

pub use fallback::{DefaultBackend, LocalBackend, LocalCompletion, generate_local};
pub use http::{DEFAULT_OLLAMA_URL, generate_http};
pub use subprocess::{check_ollama_installed, run_ollama};
