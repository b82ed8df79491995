//! alvorada-providers: LLM provider integrations.
//!
//! Implements the `LlmProvider` trait for OpenAI, Anthropic and Ollama, plus
//! a scripted mock, and the TOML configuration that wires them up.

pub mod anthropic;
pub mod config;
mod http;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use alvorada_core::error::ProviderError;
pub use config::{create_provider, load_config, load_config_from, AlvoradaConfig, ProviderConfig};
pub use mock::MockProvider;
