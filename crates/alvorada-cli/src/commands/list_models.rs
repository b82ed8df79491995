//! The `alvorada list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use alvorada_core::traits::ModelInfo;
use alvorada_providers::ollama::OllamaProvider;
use alvorada_providers::{create_provider, load_config_from, ProviderConfig};

pub async fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    let mut found_any = false;

    for name in names {
        if provider_filter.as_ref().is_some_and(|filter| filter != name) {
            continue;
        }

        let provider_config = &config.providers[name];
        let models = match provider_config {
            ProviderConfig::Ollama { base_url } => {
                match OllamaProvider::new(base_url)?.list_models_async().await {
                    Ok(models) => models,
                    Err(e) => {
                        eprintln!("Provider: {name}: {e:#}");
                        continue;
                    }
                }
            }
            _ => create_provider(name, provider_config)?.available_models(),
        };

        if !models.is_empty() {
            found_any = true;
            println!("Provider: {name}");
            for model in &models {
                println!("  {}", describe(model));
            }
            println!();
        }
    }

    if !found_any {
        println!("No providers configured. Run `alvorada init` to create a config file.");
    }

    Ok(())
}

fn describe(model: &ModelInfo) -> String {
    let context = if model.max_context > 0 {
        format!("{}K context", model.max_context / 1000)
    } else {
        "context unknown".to_string()
    };
    let json = if model.json_mode {
        "JSON mode"
    } else {
        "JSON by instruction"
    };
    format!("{}: {} ({context}, {json})", model.id, model.name)
}
