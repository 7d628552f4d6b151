//! simulado-providers: LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for Gemini and OpenAI-compatible
//! endpoints, plus an offline mock, so simulado can generate questions from
//! any of them.

pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, ProviderConfig, SimuladoConfig};
pub use error::ProviderError;
