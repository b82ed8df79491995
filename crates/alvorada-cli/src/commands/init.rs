//! The `alvorada init` command.

use std::path::Path;

use anyhow::{Context, Result};

const CONFIG_PATH: &str = "alvorada.toml";
const PROMPT_PATH: &str = "prompts/custom.md";

pub fn execute() -> Result<()> {
    write_if_absent(Path::new(CONFIG_PATH), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("prompts").context("failed to create prompts directory")?;
    write_if_absent(Path::new(PROMPT_PATH), CUSTOM_PROMPT)?;

    println!("\nNext steps:");
    println!("  1. Set OPENAI_API_KEY / ANTHROPIC_API_KEY (or a .env file), or edit {CONFIG_PATH}");
    println!("  2. Run: alvorada validate --data questions.jsonl");
    println!("  3. Run: alvorada run --data questions.jsonl --prompt custom --limit 20");

    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# alvorada configuration

default_provider = "openai"
default_model = "gpt-5"
default_prompt = "zero_shot"
# Max model calls in flight; 1 keeps the run strictly sequential.
concurrency = 1
output_dir = "results"
prompts_dir = "prompts"
# max_tokens = 1024
# temperature = 0.0

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"
"#;

const CUSTOM_PROMPT: &str = r#"Você é um estudante se preparando para o vestibular. Leia a questão e escolha a alternativa correta.

Questão:
{question}

Alternativas:
{options}

Responda apenas com um objeto JSON no formato {{"chosen_answer": "<letra>"}}, usando a letra minúscula da alternativa escolhida.
"#;
