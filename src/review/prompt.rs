use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::submission::SubmissionRecord;
use crate::completion::{ConversationHistory, Turn};

/// Returned in place of a review when no prompt file could be loaded.
pub const PROMPTS_UNAVAILABLE: &str = "Error: Code review prompts are not available.";

pub const QA_PERSONA: &str = "You are a helpful assistant answering questions about a code review. \
     You do not answer any irrelevant questions.";

pub const QA_ACKNOWLEDGEMENT: &str =
    "I understand the context. I'm ready to answer any questions about the code review.";

#[derive(Debug, Deserialize)]
struct PromptFile {
    prompts: Vec<PromptEntry>,
}

#[derive(Debug, Deserialize)]
struct PromptEntry {
    content: String,
}

/// The system instruction and user template used to request a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPrompts {
    system: String,
    user_template: String,
}

impl ReviewPrompts {
    pub const fn new(system: String, user_template: String) -> Self {
        Self {
            system,
            user_template,
        }
    }

    /// Loads prompts from a JSON file of the form `{"prompts": [{"content": ...}, ...]}`.
    ///
    /// The first entry is the system instruction, the second the user template.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Prompt file not found: {}", path.display()))?;

        Self::from_json(&contents)
            .with_context(|| format!("Invalid prompt file: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: PromptFile = serde_json::from_str(json).context("Invalid JSON in prompt file")?;

        let mut entries = file.prompts.into_iter();
        let (Some(system), Some(user)) = (entries.next(), entries.next()) else {
            bail!("Prompt file must contain at least two prompts");
        };

        Ok(Self::new(system.content, user.content))
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn user_template(&self) -> &str {
        &self.user_template
    }

    /// Builds the two-turn history that asks for a review of `record`.
    pub fn review_history(&self, record: &SubmissionRecord) -> Result<ConversationHistory> {
        let user = render_template(&self.user_template, record)?;
        Ok(ConversationHistory::from(vec![
            Turn::system(self.system.clone()),
            Turn::user(user),
        ]))
    }
}

/// Renders a brace-format template with the record's fields.
///
/// `{{` and `}}` produce literal braces. Field values are inserted verbatim
/// and never re-scanned. Unknown placeholders and unbalanced braces are errors.
pub fn render_template(template: &str, record: &SubmissionRecord) -> Result<String> {
    let mut rendered = String::with_capacity(
        template.len()
            + record.problem_description.len()
            + record.programming_language.len()
            + record.submitted_code.len(),
    );
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        rendered.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            rendered.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            rendered.push('}');
            rest = after;
        } else if tail.starts_with('}') {
            bail!("Single '}}' encountered in review template");
        } else {
            let Some(close) = tail.find('}') else {
                bail!("Unmatched '{{' in review template");
            };
            rendered.push_str(field_value(&tail[1..close], record)?);
            rest = &tail[close + 1..];
        }
    }

    rendered.push_str(rest);
    Ok(rendered)
}

fn field_value<'a>(name: &str, record: &'a SubmissionRecord) -> Result<&'a str> {
    match name {
        "problem_description" => Ok(&record.problem_description),
        "programming_language" => Ok(&record.programming_language),
        "submitted_code" => Ok(&record.submitted_code),
        _ => bail!("Unknown placeholder '{{{name}}}' in review template"),
    }
}

/// Seeds the follow-up conversation with the persona, the review context and
/// an acknowledgement.
pub fn qa_history(record: &SubmissionRecord, review: &str) -> ConversationHistory {
    let context = format!(
        "Here's the context:\n\
         Problem description: {}\n\
         Programming language: {}\n\
         Submitted code: {}\n\
         Code review: {review}",
        record.problem_description, record.programming_language, record.submitted_code
    );

    ConversationHistory::from(vec![
        Turn::system(QA_PERSONA),
        Turn::user(context),
        Turn::assistant(QA_ACKNOWLEDGEMENT),
    ])
}
