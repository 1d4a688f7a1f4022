use unicode_general_category::{GeneralCategory, get_general_category};

/// Default cap on stored user input, in characters.
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 8000;

/// Keeps printable characters and newlines, then truncates to `max_len` characters.
pub fn sanitize(text: &str, max_len: usize) -> String {
    text.chars().filter(|&c| is_printable(c)).take(max_len).collect()
}

fn is_printable(c: char) -> bool {
    if c == '\n' || c == ' ' {
        return true;
    }
    !matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
            | GeneralCategory::Surrogate
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
            | GeneralCategory::SpaceSeparator
    )
}
