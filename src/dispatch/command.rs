// Available bot commands: (name, description)
const BOT_COMMANDS: &[(&str, &str)] = &[
    ("review", "Start a code review process"),
    ("help", "Show available commands"),
    ("shutdown", "Shut the bot down (owner only)"),
];

/// Bot command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Review,
    Help,
    Shutdown,
    Unknown(String),
}

/// Parses `content` as a command if it starts with `prefix`.
///
/// Returns `None` for ordinary chatter and for a bare prefix.
pub fn parse_command(prefix: &str, content: &str) -> Option<BotCommand> {
    let rest = content.trim().strip_prefix(prefix)?;
    let name = rest.split_whitespace().next()?;

    Some(match name {
        "review" => BotCommand::Review,
        "help" => BotCommand::Help,
        "shutdown" => BotCommand::Shutdown,
        other => BotCommand::Unknown(other.to_string()),
    })
}

pub fn help_text(prefix: &str) -> String {
    let mut text = String::from("Available commands:");
    for (name, description) in BOT_COMMANDS {
        text.push_str(&format!("\n  {prefix}{name:<10} {description}"));
    }
    text
}
