use anyhow::{Context, Result};
use colored::*;
use dishanveshi_core::ClientConfig;
use std::path::Path;

use crate::cli::ConfigCommand;

/// Runs a `config` subcommand against the file at `path`.
///
/// `effective` is the merged configuration and is only used by `show`.
pub fn run(action: &ConfigCommand, path: &Path, effective: &ClientConfig) -> Result<()> {
    match action {
        ConfigCommand::Path => println!("{}", path.display()),
        ConfigCommand::Show => {
            println!("{}", render(effective)?);
        }
        ConfigCommand::SetBaseUrl { url } => {
            let candidate = ClientConfig {
                api_base: Some(url.trim().to_string()),
                ..ClientConfig::default()
            };
            candidate.validate()?;
            update(path, |config| config.api_base = candidate.api_base.clone())?;
            println!("{} api_base = {}", "Saved".green().bold(), url.trim());
        }
        ConfigCommand::SetMapsKey { key } => {
            let key = key.trim().to_string();
            update(path, |config| {
                config.maps_api_key = (!key.is_empty()).then(|| key.clone())
            })?;
            println!("{} maps_api_key", "Saved".green().bold());
        }
    }
    Ok(())
}

fn update(path: &Path, change: impl FnOnce(&mut ClientConfig)) -> Result<()> {
    let mut config = ClientConfig::load_from_file(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    change(&mut config);
    config
        .save_to_file(path)
        .with_context(|| format!("Failed to save {}", path.display()))
}

/// Serializes the config for display with the map key masked
fn render(config: &ClientConfig) -> Result<String> {
    let mut shown = config.clone();
    if let Some(key) = &shown.maps_api_key {
        shown.maps_api_key = Some(mask(key));
    }
    let text = toml::to_string_pretty(&shown).context("Failed to serialize config")?;
    if text.trim().is_empty() {
        return Ok("(empty)".to_string());
    }
    Ok(text)
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("****{}", tail)
}
