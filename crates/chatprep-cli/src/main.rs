//! chatprep CLI - inspect model configurations and dry-run dataset rendering.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;

use chatprep_data::{ModelRegistry, RolePrefix, Tokenizer, TrainingDataset};

#[derive(Parser)]
#[command(name = "chatprep")]
#[command(author, version, about = "Conversation dataset preparation for chat model fine-tuning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered model configurations
    List,
    /// Show a single model configuration in detail
    Show {
        /// Configuration name (e.g. "openchat_v2")
        name: String,
    },
    /// Tokenize a JSONL conversation dataset and report statistics
    Render {
        /// Configuration name from the registry
        #[arg(short, long)]
        model: String,

        /// Path to a tokenizer.json file
        #[arg(short, long)]
        tokenizer: String,

        /// Path to a JSONL conversation dataset
        #[arg(short, long)]
        dataset: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let registry = ModelRegistry::with_builtin();

    match cli.command {
        Commands::List => list_models(&registry),
        Commands::Show { name } => show_model(&registry, &name),
        Commands::Render {
            model,
            tokenizer,
            dataset,
        } => render_dataset(&registry, &model, &tokenizer, &dataset),
    }
}

fn list_models(registry: &ModelRegistry) -> Result<()> {
    println!("{:<16} {:<16} {:>8}", "NAME", "MODEL", "CONTEXT");
    for name in registry.names() {
        let config = registry.get(name)?;
        let context = config
            .model_max_context
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        println!("{:<16} {:<16} {:>8}", name, config.name, context);
    }
    Ok(())
}

fn show_model(registry: &ModelRegistry, name: &str) -> Result<()> {
    let config = registry.get(name)?;

    println!("name:          {}", config.name);
    println!(
        "system prompt: {}",
        config.system.as_deref().unwrap_or("(none)")
    );
    match &config.role_prefix {
        RolePrefix::Table(table) => {
            println!("role prefixes:");
            let mut roles: Vec<_> = table.iter().collect();
            roles.sort();
            for (role, prefix) in roles {
                println!("  {role:<8} {prefix:?}");
            }
        }
        RolePrefix::Conditional(_) => {
            println!("role prefixes: computed from answer provenance");
        }
    }
    println!("ai role:       {}", config.ai_role);
    println!("eot token:     {}", config.eot_token);
    println!(
        "bos token:     {}",
        config.bos_token.as_deref().unwrap_or("(none)")
    );
    println!(
        "group labels:  {}",
        if config.group_fn.is_some() {
            "provenance-based"
        } else {
            "single group (0)"
        }
    );
    if let Some(context) = config.model_max_context {
        println!("max context:   {context}");
    }
    if let Some(model) = &config.model {
        print!("model loader:  {:?}, dtype {:?}", model.loader, model.dtype);
        if let Some(extend) = model.extend_context_to {
            print!(", context extended to {extend}");
        }
        println!();
    }
    if let Some(tokenizer) = &config.tokenizer {
        println!(
            "tokenizer:     fast={}, auth_token={}",
            tokenizer.use_fast, tokenizer.use_auth_token
        );
    }
    Ok(())
}

fn render_dataset(
    registry: &ModelRegistry,
    model: &str,
    tokenizer_path: &str,
    dataset_path: &str,
) -> Result<()> {
    let config = registry.get(model)?;
    let tokenizer = Tokenizer::from_file(tokenizer_path)
        .with_context(|| format!("Failed to load tokenizer from {tokenizer_path}"))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("tokenizing dataset");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let dataset = TrainingDataset::from_jsonl(dataset_path, config, &tokenizer)
        .with_context(|| format!("Failed to render dataset {dataset_path}"))?;

    spinner.finish_and_clear();

    let mut total_tokens = 0usize;
    let mut trainable_tokens = 0usize;
    let mut longest = 0usize;
    let mut groups: BTreeMap<u32, usize> = BTreeMap::new();

    for sample in &dataset {
        total_tokens += sample.len();
        trainable_tokens += sample.trainable_tokens();
        longest = longest.max(sample.len());
        *groups.entry(sample.group).or_default() += 1;
    }

    println!("samples:          {}", dataset.len());
    println!("total tokens:     {total_tokens}");
    println!("trainable tokens: {trainable_tokens}");
    println!("longest sequence: {longest}");
    println!("groups:");
    for (group, count) in &groups {
        println!("  {group}: {count}");
    }
    Ok(())
}
