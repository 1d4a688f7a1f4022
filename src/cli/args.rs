use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "review-bot")]
#[command(about = "Chat bot that runs guided AI code reviews")]
#[command(version)]
pub struct Args {
    /// Config file (defaults to ~/.config/review-bot/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Prompt file with the review instructions
    #[arg(long, global = true)]
    pub prompts: Option<PathBuf>,

    /// Model name
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// API endpoint URL
    #[arg(short = 'e', long, global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start the bot on the terminal console (default)
    Run,
    /// Check the review prompt file
    Prompts,
    /// Show the effective configuration
    Config {
        /// Write a config file with the current settings
        #[arg(long)]
        init: bool,
    },
}
