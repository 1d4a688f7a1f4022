use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use review_bot::cli::commands::{config, load_config, prompts, run};
use review_bot::cli::{Args, Command};

const DEFAULT_LOG_FILTER: &str = "review_bot=info";

#[tokio::main]
async fn main() {
    init_logging();

    let args = Args::parse();
    if let Err(e) = dispatch(args).await {
        error!("{e:#}");
    }
}

async fn dispatch(args: Args) -> Result<()> {
    match args.command {
        Some(Command::Config { init }) => {
            let (manager, resolved) = load_config(&args, init)?;
            if init {
                config::init_config(&manager, &resolved)?;
            } else {
                config::print_config(&manager, &resolved);
            }
        }
        Some(Command::Prompts) => {
            let (_, resolved) = load_config(&args, false)?;
            prompts::check_prompts(&resolved.prompt_path)?;
        }
        Some(Command::Run) | None => {
            let (_, resolved) = load_config(&args, false)?;
            run::run_bot(resolved).await?;
        }
    }

    Ok(())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
