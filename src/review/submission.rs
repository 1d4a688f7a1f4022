/// File extensions accepted as code attachments.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[".py", ".js", ".java", ".cpp", ".cs"];

/// The three fields collected during intake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub problem_description: String,
    pub programming_language: String,
    pub submitted_code: String,
}

/// Returns `true` if `filename` ends in one of [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_source(filename: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|extension| filename.ends_with(extension))
}
