//! Hosts the bot on the terminal console.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use crate::completion::CompletionClient;
use crate::config::ResolvedConfig;
use crate::console::{CONSOLE_USER, ConsolePlatform, print_header};
use crate::dispatch::Dispatcher;
use crate::platform::UserId;
use crate::review::ReviewPrompts;
use crate::session::{SessionFactory, SessionSettings};

/// Runs the bot until the owner shuts it down or stdin closes.
///
/// A prompt file that cannot be loaded is logged; reviews then answer with
/// an error message while intake and follow-ups keep working.
pub async fn run_bot(config: ResolvedConfig) -> Result<()> {
    let api_key = config.require_api_key()?.to_string();

    let client = CompletionClient::new(
        config.endpoint.clone(),
        Some(api_key),
        config.model.clone(),
        config.max_tokens,
    );
    info!(url = %client.url(), model = %client.model(), "completion client ready");

    let prompts = match ReviewPrompts::load(&config.prompt_path) {
        Ok(prompts) => {
            info!(path = %config.prompt_path.display(), "loaded review prompts");
            Some(Arc::new(prompts))
        }
        Err(e) => {
            error!("{e:#}");
            None
        }
    };

    let settings = SessionSettings {
        max_input_length: config.max_input_length,
        ..SessionSettings::default()
    };
    let factory = SessionFactory::new(Arc::new(client), prompts, settings);

    let platform = Arc::new(ConsolePlatform::from_env());
    let owner = config.owner_id.map_or(CONSOLE_USER, UserId);

    print_header(&config.prefix);
    let events = platform.listen();
    Dispatcher::new(platform, factory, config.prefix, Some(owner))
        .run(events)
        .await;

    Ok(())
}
