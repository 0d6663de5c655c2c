#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Password};
use std::path::Path;

use super::{Config, EmbeddingConfig, StoreConfig};

#[inline]
pub fn run_interactive_config(config_dir: &Path) -> Result<()> {
    eprintln!("{}", style("🔧 Notebook RAG Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config(config_dir)?;

    eprintln!("{}", style("Embedding Provider").bold().yellow());
    eprintln!("Configure the hosted embedding API used for chunks and queries.");
    eprintln!();

    configure_embedding(&mut config.embedding)?;

    eprintln!();
    eprintln!("{}", style("Vector Store").bold().yellow());
    eprintln!("Configure the REST gateway of the pgvector database.");
    eprintln!();

    configure_store(&mut config.store)?;

    if !config.store.url.is_empty() {
        eprintln!();
        eprintln!("{}", style("Testing configuration...").yellow());

        if test_store_connection(&config.store) {
            eprintln!("{}", style("✓ Store connection successful!").green());
        } else {
            eprintln!("{}", style("⚠ Warning: Could not reach the store").yellow());
            eprintln!("You can continue, but make sure the URL is correct before ingesting.");
        }
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config(config: &Config) {
    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Embedding Settings:").bold().yellow());
    eprintln!("  Base URL: {}", style(&config.embedding.base_url).cyan());
    eprintln!("  Model: {}", style(&config.embedding.model).cyan());
    eprintln!("  Dimension: {}", style(config.embedding.dimension).cyan());
    eprintln!(
        "  Max Input: {} characters",
        style(config.embedding.max_input_chars).cyan()
    );
    eprintln!(
        "  API Key: {}",
        style(mask_secret(&config.embedding.api_key)).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Store Settings:").bold().yellow());
    match config.store.base_url() {
        Ok(url) => eprintln!("  URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  URL: {} ({})", style("Not set").red(), e),
    }
    eprintln!(
        "  Service Key: {}",
        style(mask_secret(&config.store.service_key)).cyan()
    );
    eprintln!("  Chunk Table: {}", style(&config.store.chunk_table).cyan());
    eprintln!(
        "  Search Function: {}",
        style(&config.store.match_function).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Chunking & Retrieval:").bold().yellow());
    eprintln!(
        "  Chunk Size: {} (overlap {})",
        style(config.chunking.chunk_size).cyan(),
        style(config.chunking.chunk_overlap).cyan()
    );
    eprintln!(
        "  Matches: {} (context {})",
        style(config.retrieval.match_count).cyan(),
        style(config.retrieval.context_match_count).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
}

/// Show only the first four characters of a secret
#[inline]
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }

    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}

fn load_existing_config(config_dir: &Path) -> Result<Config> {
    Config::load_file(config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config {
                base_dir: config_dir.to_path_buf(),
                ..Config::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_embedding(embedding: &mut EmbeddingConfig) -> Result<()> {
    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(embedding.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let dimension: u32 = Input::new()
        .with_prompt("Embedding dimension")
        .default(embedding.dimension)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if (64..=4096).contains(input) {
                Ok(())
            } else {
                Err("Dimension must be between 64 and 4096")
            }
        })
        .interact_text()?;

    let api_key = Password::new()
        .with_prompt("API key (leave empty to keep current)")
        .allow_empty_password(true)
        .interact()?;

    embedding.set_model(model)?;
    embedding.set_dimension(dimension)?;
    if !api_key.trim().is_empty() {
        embedding.api_key = api_key;
    }

    Ok(())
}

fn configure_store(store: &mut StoreConfig) -> Result<()> {
    let url: String = Input::new()
        .with_prompt("Store URL")
        .default(store.url.clone())
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.is_empty() || url::Url::parse(input).is_ok() {
                Ok(())
            } else {
                Err("Invalid URL")
            }
        })
        .interact_text()?;

    let service_key = Password::new()
        .with_prompt("Service-role key (leave empty to keep current)")
        .allow_empty_password(true)
        .interact()?;

    if !url.is_empty() {
        store.set_url(url)?;
    }
    if !service_key.trim().is_empty() {
        store.service_key = service_key;
    }

    Ok(())
}

fn test_store_connection(store: &StoreConfig) -> bool {
    let Ok(base) = store.base_url() else {
        return false;
    };
    let Ok(url) = base.join("rest/v1/") else {
        return false;
    };

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    match agent
        .get(url.as_str())
        .header("apikey", &store.service_key)
        .call()
    {
        Ok(_) => true,
        Err(ureq::Error::StatusCode(code)) if (400..500).contains(&code) => true,
        Err(_) => false,
    }
}
