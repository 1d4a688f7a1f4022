//! Configuration file loading and resolution.
//!
//! Values come from three layers, highest priority first: CLI flags, the
//! TOML file, built-in defaults.

mod manager;

pub use manager::{
    BotConfig, CompletionConfig, ConfigFile, ConfigManager, DEFAULT_API_KEY_ENV, DEFAULT_PREFIX,
    DEFAULT_PROMPT_PATH, ResolveOptions, ResolvedConfig, resolve_config,
};
