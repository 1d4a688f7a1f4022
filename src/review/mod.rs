//! Review inputs and outputs: the submission record, input sanitisation,
//! prompt templates and message chunking.

mod chunk;
mod prompt;
mod sanitize;
mod submission;

pub use chunk::{MESSAGE_CHUNK_SIZE, split_chunks};
pub use prompt::{
    PROMPTS_UNAVAILABLE, QA_ACKNOWLEDGEMENT, QA_PERSONA, ReviewPrompts, qa_history,
    render_template,
};
pub use sanitize::{DEFAULT_MAX_INPUT_LENGTH, sanitize};
pub use submission::{SUPPORTED_EXTENSIONS, SubmissionRecord, is_supported_source};
