//! Interactive `--init` wizard.

use std::path::Path;

use dialoguer::{Input, Select};

use crate::cloud::api_key_from_env;
use crate::error::ConfigError;
use crate::llm::Provider;

use super::file::Config;

/// Ask for provider, model, and (for Ollama) the server URL, then save.
pub fn run_setup(path: &Path) -> Result<Config, ConfigError> {
    let current = Config::load(path)?;
    let current_provider = current.provider();

    let labels: Vec<&str> = Provider::ALL.iter().map(|p| p.display_name()).collect();
    let default_index = Provider::ALL
        .iter()
        .position(|p| *p == current_provider)
        .unwrap_or(0);

    let index = Select::new()
        .with_prompt("Provider")
        .items(&labels)
        .default(default_index)
        .interact_opt()
        .map_err(|_| ConfigError::Cancelled)?
        .ok_or(ConfigError::Cancelled)?;
    let provider = Provider::ALL[index];

    let model: String = Input::new()
        .with_prompt("Model")
        .default(current.model_for(provider))
        .interact_text()
        .map_err(|_| ConfigError::Cancelled)?;

    let ollama_url = if provider.is_local() {
        let url: String = Input::new()
            .with_prompt("Ollama URL")
            .default(current.ollama_url().to_string())
            .interact_text()
            .map_err(|_| ConfigError::Cancelled)?;
        Some(url)
    } else {
        None
    };

    let config = apply_answers(current, provider, &model, ollama_url);
    config.save(path)?;

    println!("Saved config to {}", path.display());
    if let Some(warning) = missing_key_warning(provider) {
        eprintln!("Warning: {}", warning);
    }

    Ok(config)
}

/// Merge wizard answers into an existing config, keeping other providers' models.
pub fn apply_answers(
    mut config: Config,
    provider: Provider,
    model: &str,
    ollama_url: Option<String>,
) -> Config {
    config.provider = Some(provider);

    let model = model.trim();
    if !model.is_empty() {
        config.models.insert(provider, model.to_string());
    }

    if let Some(url) = ollama_url.map(|u| u.trim().to_string()) {
        config.ollama_url = (!url.is_empty()).then_some(url);
    }

    config
}

/// Message to show when a cloud provider's API key is not exported.
pub fn missing_key_warning(provider: Provider) -> Option<String> {
    let vars = provider.api_key_vars();
    if vars.is_empty() {
        return None;
    }

    api_key_from_env(vars).err().map(|_| {
        format!(
            "{} is not set. Export it before running quill with {}.",
            vars.join(" or "),
            provider.display_name()
        )
    })
}
