//! Cloud provider HTTP clients (single request, no fallback).

pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod request;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use request::api_key_from_env;
