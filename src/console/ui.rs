//! Console output for the local chat surface.

use crate::ui::Style;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_header(prefix: &str) {
    println!(
        "{} {} - Local Review Console",
        Style::header("review-bot"),
        Style::version(format!("v{VERSION}"))
    );
    println!(
        "  {}  {}",
        Style::command(format!("{prefix}review")),
        Style::secondary("Start a code review")
    );
    println!(
        "  {}  {}",
        Style::command("/attach <path>"),
        Style::secondary("Send a file as an attachment")
    );
    println!(
        "  {}  {}",
        Style::command("\"\"\""),
        Style::secondary("Start or end a multi-line message")
    );
    println!(
        "  {}  {}",
        Style::command(format!("{prefix}shutdown")),
        Style::secondary("Quit")
    );
    println!();
}

pub fn print_thread_opened(name: &str) {
    println!("{} {}", Style::success("#"), Style::header(name));
}

pub fn print_bot(channel_name: &str, text: &str) {
    println!("{} {text}", Style::label(format!("[{channel_name}]")));
}

pub fn print_error(message: &str) {
    eprintln!("{} {message}", Style::error("Error:"));
}

pub fn print_goodbye() {
    println!("{}", Style::success("Goodbye!"));
}
