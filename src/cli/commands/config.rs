//! Config command handler.

use anyhow::{Result, bail};

use crate::config::{BotConfig, CompletionConfig, ConfigFile, ConfigManager, ResolvedConfig};
use crate::ui::Style;

/// Prints the effective settings. The API key is only reported as set or not.
pub fn print_config(manager: &ConfigManager, config: &ResolvedConfig) {
    println!("{}", Style::header("Configuration"));
    println!(
        "  {}  {}",
        Style::label("file"),
        Style::secondary(manager.config_path().display())
    );
    println!();

    let owner = config
        .owner_id
        .map_or_else(|| "(console user)".to_string(), |id| id.to_string());
    let api_key = if config.api_key.is_some() {
        Style::success("(set)")
    } else {
        Style::warning("(not set)")
    };

    let rows = [
        ("prefix", Style::value(&config.prefix)),
        ("owner_id", Style::value(owner)),
        ("prompt_path", Style::value(config.prompt_path.display())),
        ("max_input_length", Style::value(config.max_input_length)),
        ("endpoint", Style::value(&config.endpoint)),
        ("model", Style::value(&config.model)),
        ("max_tokens", Style::value(config.max_tokens)),
        ("api_key_env", Style::value(&config.api_key_env)),
        ("api_key", api_key),
    ];
    for (key, value) in rows {
        println!("  {:<18} {value}", Style::label(key));
    }
}

/// Writes the effective settings, minus any API key, to the config file.
///
/// # Errors
///
/// Returns an error if the file already exists or cannot be written.
pub fn init_config(manager: &ConfigManager, config: &ResolvedConfig) -> Result<()> {
    if manager.config_path().exists() {
        bail!(
            "Config file already exists: {}",
            manager.config_path().display()
        );
    }

    manager.save(&to_file(config))?;
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display())
    );
    Ok(())
}

fn to_file(config: &ResolvedConfig) -> ConfigFile {
    ConfigFile {
        bot: BotConfig {
            prefix: Some(config.prefix.clone()),
            owner_id: config.owner_id,
            prompt_path: Some(config.prompt_path.clone()),
            max_input_length: Some(config.max_input_length),
        },
        completion: CompletionConfig {
            endpoint: Some(config.endpoint.clone()),
            model: Some(config.model.clone()),
            max_tokens: Some(config.max_tokens),
            api_key: None,
            api_key_env: Some(config.api_key_env.clone()),
        },
    }
}
