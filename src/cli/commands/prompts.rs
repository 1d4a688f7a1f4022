//! Prompt file check command handler.

use anyhow::Result;
use std::path::Path;

use crate::review::{ReviewPrompts, SubmissionRecord};
use crate::ui::Style;

const PREVIEW_CHARS: usize = 72;

/// Loads the prompt file and renders its template against an empty record.
///
/// # Errors
///
/// Returns an error if the file is missing, is not valid prompt JSON, or
/// its template does not render.
pub fn check_prompts(path: &Path) -> Result<()> {
    let prompts = ReviewPrompts::load(path)?;
    prompts.review_history(&SubmissionRecord::default())?;

    println!(
        "{} Prompts loaded from {}",
        Style::success("✓"),
        Style::secondary(path.display())
    );
    println!(
        "  {}  {}",
        Style::label("system"),
        Style::value(preview(prompts.system()))
    );
    println!(
        "  {}    {}",
        Style::label("user"),
        Style::value(preview(prompts.user_template()))
    );

    Ok(())
}

fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > PREVIEW_CHARS || text.lines().nth(1).is_some() {
        let cut: String = first_line.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        first_line.to_string()
    }
}
