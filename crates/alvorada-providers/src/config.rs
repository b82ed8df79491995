//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use alvorada_core::template::DEFAULT_TEMPLATE;
use alvorada_core::traits::LlmProvider;

use crate::anthropic::AnthropicProvider;
use crate::ollama::{self, OllamaProvider};
use crate::openai::OpenAiProvider;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "alvorada.toml";

/// Configuration for a single LLM provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

fn default_ollama_url() -> String {
    ollama::DEFAULT_BASE_URL.to_string()
}

/// Top-level alvorada configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlvoradaConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used for a bare model name.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used when none is given on the command line.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Prompt template used when none is given on the command line.
    #[serde(default = "default_prompt")]
    pub default_prompt: String,
    /// Max model calls in flight; 1 is strictly sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Output directory for run summaries.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Extra directory of `<name>.md` prompt templates.
    #[serde(default)]
    pub prompts_dir: Option<PathBuf>,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-5".to_string()
}
fn default_prompt() -> String {
    DEFAULT_TEMPLATE.to_string()
}
fn default_concurrency() -> usize {
    1
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

impl Default for AlvoradaConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_prompt: default_prompt(),
            concurrency: default_concurrency(),
            max_tokens: None,
            temperature: None,
            output_dir: default_output_dir(),
            prompts_dir: None,
        }
    }
}

impl AlvoradaConfig {
    /// Build the provider registered under `name`.
    ///
    /// A local Ollama needs no configuration, so `ollama` falls back to the
    /// default URL when it has no entry.
    pub fn provider(&self, name: &str) -> Result<Box<dyn LlmProvider>> {
        match self.providers.get(name) {
            Some(config) => create_provider(name, config),
            None if name == "ollama" => create_provider(
                name,
                &ProviderConfig::Ollama {
                    base_url: default_ollama_url(),
                },
            ),
            None => {
                let mut known: Vec<&str> = self.providers.keys().map(String::as_str).collect();
                known.sort_unstable();
                anyhow::bail!(
                    "provider '{name}' is not configured (configured: {}). Add [providers.{name}] to {LOCAL_CONFIG_FILE} or set its API key in the environment",
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                )
            }
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Overlay `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` onto the provider table,
/// creating the entries when missing.
fn apply_env_overrides(config: &mut AlvoradaConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
        match config.providers.get_mut("openai") {
            Some(ProviderConfig::OpenAI { api_key, .. }) => *api_key = key,
            Some(_) => {}
            None => {
                config.providers.insert(
                    "openai".into(),
                    ProviderConfig::OpenAI {
                        api_key: key,
                        base_url: None,
                        org_id: None,
                    },
                );
            }
        }
    }

    if let Some(key) = lookup("ANTHROPIC_API_KEY").filter(|k| !k.is_empty()) {
        match config.providers.get_mut("anthropic") {
            Some(ProviderConfig::Anthropic { api_key, .. }) => *api_key = key,
            Some(_) => {}
            None => {
                config.providers.insert(
                    "anthropic".into(),
                    ProviderConfig::Anthropic {
                        api_key: key,
                        base_url: None,
                    },
                );
            }
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `alvorada.toml` in the current directory
/// 2. `~/.config/alvorada/config.toml`
///
/// Environment variable overrides: `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`.
pub fn load_config() -> Result<AlvoradaConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AlvoradaConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AlvoradaConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AlvoradaConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("alvorada"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(name: &str, config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    let provider: Box<dyn LlmProvider> = match config {
        ProviderConfig::Anthropic { api_key, base_url } => {
            Box::new(AnthropicProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Box::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        )?),
        ProviderConfig::Ollama { base_url } => Box::new(OllamaProvider::new(base_url)?),
    };
    tracing::debug!(name, provider = provider.name(), "provider created");
    Ok(provider)
}
