//! Fixed texts the session sends to the user.

pub const GREETING: &str = "I will be asking you for the necessary information one by one. \
     Please provide the code problem description:";

pub const ASK_LANGUAGE: &str = "Great, now please provide the programming language.";

pub const ASK_CODE: &str = "Now, please paste your code.";

pub const CODE_RECEIVED: &str =
    "Thank you for providing all the information. Type 'done' to start the code review.";

pub const NO_VALID_FILE: &str = "No valid code file found in the attachments. \
     Please upload a file with a supported extension or paste your code directly.";

pub const INTAKE_TIMEOUT: &str =
    "No response received within 5 minutes. The code review request has been cancelled.";

pub const ANALYZING: &str = "Analyzing your code... This may take a moment.";

pub const QA_INTRO: &str = "Code review complete. You can now ask additional questions about the review. \
     Type 'finish' when you're done or wait for 5 minutes of inactivity.";

pub const QA_IDLE: &str = "No activity for 5 minutes. Ending the conversation.";

pub const QA_WINDOW_ELAPSED: &str =
    "5 minutes have passed without any questions. Ending the conversation.";

pub const FAREWELL: &str = "Thank you for using the code review service. Conversation ended.";
