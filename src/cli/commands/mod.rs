//! Subcommand implementations.

/// Config display and initialisation.
pub mod config;

/// Prompt file check.
pub mod prompts;

/// Console bot host.
pub mod run;

use anyhow::Result;

use crate::config::{ConfigFile, ConfigManager, ResolveOptions, ResolvedConfig, resolve_config};

use super::Args;

/// Loads the config file selected by `args` and applies the CLI overrides.
///
/// With `missing_ok`, an absent file resolves to defaults even when it was
/// named with `--config`.
pub fn load_config(args: &Args, missing_ok: bool) -> Result<(ConfigManager, ResolvedConfig)> {
    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let file = if missing_ok && !manager.config_path().exists() {
        ConfigFile::default()
    } else {
        manager.load_optional()?
    };

    let options = ResolveOptions {
        prompts: args.prompts.clone(),
        model: args.model.clone(),
        endpoint: args.endpoint.clone(),
    };
    let resolved = resolve_config(&options, &file)?;

    Ok((manager, resolved))
}
