use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::completion::{DEFAULT_ENDPOINT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::paths;
use crate::review::DEFAULT_MAX_INPUT_LENGTH;

pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_PROMPT_PATH: &str = "prompts/code_review.json";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Settings in the `[bot]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Command prefix, e.g. `!` for `!review`.
    pub prefix: Option<String>,
    /// User allowed to run `shutdown`.
    pub owner_id: Option<u64>,
    /// JSON file holding the review prompts.
    pub prompt_path: Option<PathBuf>,
    /// Character cap applied to each intake field.
    pub max_input_length: Option<usize>,
}

/// Settings in the `[completion]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of the OpenAI-compatible API.
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    /// API key stored directly in config (not recommended).
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,
}

impl CompletionConfig {
    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }

    /// Gets the API key, preferring the environment variable over the file.
    pub fn get_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(self.api_key_env())
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone().filter(|key| !key.is_empty())
    }
}

/// The complete configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
}

/// Resolved configuration after merging CLI arguments and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub prefix: String,
    pub owner_id: Option<u64>,
    pub prompt_path: PathBuf,
    pub max_input_length: usize,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_key: Option<String>,
    /// Where the API key was expected, for error messages.
    pub api_key_env: String,
}

impl ResolvedConfig {
    /// Returns the API key or explains how to provide one.
    pub fn require_api_key(&self) -> Result<&str> {
        let Some(key) = self.api_key.as_deref() else {
            let env_var = &self.api_key_env;
            bail!(
                "An API key is required\n\n\
                 Set the {env_var} environment variable:\n  \
                 export {env_var}=\"your-api-key\"\n\n\
                 Or set api_key in the [completion] section of config.toml"
            );
        };
        Ok(key)
    }
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub prompts: Option<PathBuf>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

/// Resolves configuration by merging CLI options with config file settings.
///
/// # Errors
///
/// Returns an error if a configured value is unusable: an empty prefix,
/// model or endpoint, or a zero size limit.
pub fn resolve_config(options: &ResolveOptions, config_file: &ConfigFile) -> Result<ResolvedConfig> {
    let bot = &config_file.bot;
    let completion = &config_file.completion;

    let prefix = bot.prefix.as_deref().unwrap_or(DEFAULT_PREFIX).to_string();
    if prefix.trim().is_empty() {
        bail!("Invalid configuration: 'prefix' must not be empty");
    }

    let model = options
        .model
        .as_ref()
        .or(completion.model.as_ref())
        .cloned()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    if model.trim().is_empty() {
        bail!("Invalid configuration: 'model' must not be empty");
    }

    let endpoint = options
        .endpoint
        .as_ref()
        .or(completion.endpoint.as_ref())
        .cloned()
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    if endpoint.trim().is_empty() {
        bail!("Invalid configuration: 'endpoint' must not be empty");
    }

    let max_tokens = completion.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
    if max_tokens == 0 {
        bail!("Invalid configuration: 'max_tokens' must be greater than 0");
    }

    let max_input_length = bot.max_input_length.unwrap_or(DEFAULT_MAX_INPUT_LENGTH);
    if max_input_length == 0 {
        bail!("Invalid configuration: 'max_input_length' must be greater than 0");
    }

    let prompt_path = options
        .prompts
        .as_ref()
        .or(bot.prompt_path.as_ref())
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPT_PATH));

    Ok(ResolvedConfig {
        prefix,
        owner_id: bot.owner_id,
        prompt_path,
        max_input_length,
        endpoint,
        model,
        max_tokens,
        api_key: completion.get_api_key(),
        api_key_env: completion.api_key_env().to_string(),
    })
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Uses `$XDG_CONFIG_HOME/review-bot/config.toml` or
    /// `~/.config/review-bot/config.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_file()?,
            explicit: false,
        })
    }

    /// Uses a file given on the command line. It must exist.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            explicit: true,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        toml::from_str(&contents).with_context(|| {
            format!("Failed to parse config file: {}", self.config_path.display())
        })
    }

    /// Like [`load`](Self::load), but a missing default file yields defaults.
    ///
    /// An explicitly requested file must exist.
    pub fn load_optional(&self) -> Result<ConfigFile> {
        if !self.explicit && !self.config_path.exists() {
            return Ok(ConfigFile::default());
        }
        self.load()
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, contents).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })
    }
}
