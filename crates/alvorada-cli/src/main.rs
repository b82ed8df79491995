//! alvorada CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "alvorada",
    version,
    about = "Multiple-choice exam benchmark for LLMs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a model on a question set
    Run(RunArgs),

    /// Show statistics for a question set
    Stats {
        /// Question file (.json or .jsonl)
        #[arg(long)]
        data: PathBuf,
    },

    /// Check a question set for malformed records
    Validate {
        /// Question file (.json or .jsonl)
        #[arg(long)]
        data: PathBuf,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and a custom prompt template
    Init,
}

#[derive(Args)]
pub struct RunArgs {
    /// Question file (.json or .jsonl)
    #[arg(long)]
    pub data: PathBuf,

    /// Model to evaluate, as "provider/model" or a bare model name
    #[arg(long)]
    pub model: Option<String>,

    /// Prompt template name
    #[arg(long)]
    pub prompt: Option<String>,

    /// Directory of extra `<name>.md` prompt templates
    #[arg(long)]
    pub prompts_dir: Option<PathBuf>,

    /// Keep only these subjects (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub subjects: Vec<String>,

    /// Keep only these exams (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exams: Vec<String>,

    /// Keep only these years (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub years: Vec<i32>,

    /// Keep only these exam types (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exam_types: Vec<String>,

    /// Earliest exam year, inclusive
    #[arg(long)]
    pub min_year: Option<i32>,

    /// Latest exam year, inclusive
    #[arg(long)]
    pub max_year: Option<i32>,

    /// Keep questions whose statement contains this text (case-insensitive)
    #[arg(long)]
    pub contains: Option<String>,

    /// Evaluate a random sample of at most N questions
    #[arg(long)]
    pub limit: Option<usize>,

    /// Seed for --limit sampling
    #[arg(long, default_value_t = alvorada_core::dataset::DEFAULT_SEED)]
    pub random_seed: u64,

    /// Max model calls in flight (1 = sequential)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Output file for the run summary
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output directory, used when --output is not given
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // A missing .env is not an error.
    let _ = dotenvy::dotenv();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("alvorada=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Stats { data } => commands::stats::execute(data),
        Commands::Validate { data } => commands::validate::execute(data),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
