use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::inbox::{Inbox, Wait};
use super::messages;
use super::phase::Phase;
use crate::completion::{Completer, ConversationHistory, Turn};
use crate::platform::{Attachment, ChatThread, InboundMessage};
use crate::review::{
    DEFAULT_MAX_INPUT_LENGTH, MESSAGE_CHUNK_SIZE, PROMPTS_UNAVAILABLE, ReviewPrompts,
    SubmissionRecord, is_supported_source, qa_history, sanitize, split_chunks,
};

/// How long any single wait for user input may last.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Rolling follow-up window, restarted after each answered question.
pub const QA_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Timing and size limits for a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub idle_timeout: Duration,
    pub qa_window: Duration,
    pub chunk_size: usize,
    pub max_input_length: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: IDLE_TIMEOUT,
            qa_window: QA_WINDOW,
            chunk_size: MESSAGE_CHUNK_SIZE,
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
        }
    }
}

/// What a session leaves behind once it reaches a terminal phase.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub phase: Phase,
    pub submission: SubmissionRecord,
    pub history: ConversationHistory,
}

/// Builds sessions that share one completer and one read-only prompt set.
#[derive(Clone)]
pub struct SessionFactory {
    completer: Arc<dyn Completer>,
    prompts: Option<Arc<ReviewPrompts>>,
    settings: SessionSettings,
}

impl SessionFactory {
    /// `prompts` is `None` when the prompt file could not be loaded; reviews
    /// then report that prompts are unavailable.
    pub fn new(
        completer: Arc<dyn Completer>,
        prompts: Option<Arc<ReviewPrompts>>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            completer,
            prompts,
            settings,
        }
    }

    pub const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn open<T: ChatThread>(&self, thread: T, inbox: Inbox) -> Session<T> {
        Session {
            thread,
            inbox,
            completer: Arc::clone(&self.completer),
            prompts: self.prompts.clone(),
            settings: self.settings.clone(),
            record: SubmissionRecord::default(),
            history: ConversationHistory::new(),
            phase: Phase::AwaitProblem,
        }
    }
}

/// One guided review conversation in one thread.
pub struct Session<T> {
    thread: T,
    inbox: Inbox,
    completer: Arc<dyn Completer>,
    prompts: Option<Arc<ReviewPrompts>>,
    settings: SessionSettings,
    record: SubmissionRecord,
    history: ConversationHistory,
    phase: Phase,
}

impl<T: ChatThread> Session<T> {
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Drives the conversation until it reaches a terminal phase.
    pub async fn run(mut self) -> SessionSummary {
        info!(thread = %self.thread.id(), "review session opened");

        let end = self.drive().await;
        debug_assert!(end.is_terminal());
        self.enter(end);

        info!(thread = %self.thread.id(), phase = %end, "review session ended");
        SessionSummary {
            phase: end,
            submission: self.record,
            history: self.history,
        }
    }

    async fn drive(&mut self) -> Phase {
        self.say(messages::GREETING).await;

        if let Err(end) = self.intake().await {
            return end;
        }

        match self.review().await {
            Ok(review) => self.follow_up(&review).await,
            Err(end) => end,
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug!(thread = %self.thread.id(), from = %self.phase, to = %phase, "phase change");
        self.phase = phase;
    }

    /// Collects the three submission fields until the user types `done`.
    async fn intake(&mut self) -> Result<(), Phase> {
        loop {
            let msg = match self.inbox.next(self.settings.idle_timeout).await {
                Wait::Message(msg) => msg,
                Wait::TimedOut => {
                    self.say(messages::INTAKE_TIMEOUT).await;
                    return Err(Phase::Cancelled);
                }
                Wait::Closed => return Err(Phase::Cancelled),
            };

            // Unfilled fields stay empty and are reviewed as they are.
            if msg.is_keyword("done") {
                return Ok(());
            }

            match self.phase {
                Phase::AwaitProblem => {
                    self.record.problem_description =
                        sanitize(&msg.content, self.settings.max_input_length);
                    self.enter(Phase::AwaitLanguage);
                    self.say(messages::ASK_LANGUAGE).await;
                }
                Phase::AwaitLanguage => {
                    self.record.programming_language =
                        sanitize(&msg.content, self.settings.max_input_length);
                    self.enter(Phase::AwaitCode);
                    self.say(messages::ASK_CODE).await;
                }
                _ => self.accept_code(&msg).await,
            }
        }
    }

    async fn accept_code(&mut self, msg: &InboundMessage) {
        let code = if msg.attachments.is_empty() {
            Some(sanitize(&msg.content, self.settings.max_input_length))
        } else {
            self.code_from_attachments(&msg.attachments).await
        };

        if let Some(code) = code {
            self.record.submitted_code = code;
            self.say(messages::CODE_RECEIVED).await;
        } else {
            self.say(messages::NO_VALID_FILE).await;
        }
    }

    /// Returns the text of the first supported attachment that can be read.
    async fn code_from_attachments(&self, attachments: &[Attachment]) -> Option<String> {
        for attachment in attachments
            .iter()
            .filter(|a| is_supported_source(&a.filename))
        {
            let text = match self.thread.read_attachment(attachment).await {
                Ok(bytes) => String::from_utf8(bytes).context("file is not valid UTF-8"),
                Err(e) => Err(e),
            };

            match text {
                Ok(text) => return Some(sanitize(&text, self.settings.max_input_length)),
                Err(e) => {
                    warn!(filename = %attachment.filename, error = %e, "failed to read attachment");
                    self.say(&format!("Failed to read attachment: {e:#}"))
                        .await;
                }
            }
        }
        None
    }

    async fn review(&mut self) -> Result<String, Phase> {
        self.enter(Phase::Reviewing);
        self.say(messages::ANALYZING).await;

        let review = match self.request_review().await {
            Ok(review) => review,
            Err(e) => {
                let message = format!("An error occurred during code review: {e:#}");
                error!(thread = %self.thread.id(), "{message}");
                self.say(&message).await;
                return Err(Phase::Failed);
            }
        };

        self.deliver(&review, "review").await;
        Ok(review)
    }

    async fn request_review(&self) -> Result<String> {
        let Some(prompts) = &self.prompts else {
            return Ok(PROMPTS_UNAVAILABLE.to_string());
        };
        let history = prompts.review_history(&self.record)?;
        Ok(self.completer.complete(history.turns()).await)
    }

    /// Answers follow-up questions over the accumulated history.
    ///
    /// The window deadline is checked before each wait and restarted after
    /// each delivered answer; each wait is separately bounded by the idle
    /// timeout.
    async fn follow_up(&mut self, review: &str) -> Phase {
        self.say(messages::QA_INTRO).await;
        self.history = qa_history(&self.record, review);
        self.enter(Phase::Qa);

        let mut deadline = Instant::now() + self.settings.qa_window;

        while Instant::now() < deadline {
            let msg = match self.inbox.next(self.settings.idle_timeout).await {
                Wait::Message(msg) => msg,
                Wait::TimedOut => {
                    self.say(messages::QA_IDLE).await;
                    return Phase::Expired;
                }
                Wait::Closed => return Phase::Expired,
            };

            if msg.is_keyword("finish") {
                self.say(messages::FAREWELL).await;
                return Phase::Finished;
            }

            self.history.push(Turn::user(msg.content));
            let response = self.completer.complete(self.history.turns()).await;
            self.history.push(Turn::assistant(response.clone()));
            self.deliver(&response, "response").await;

            deadline = Instant::now() + self.settings.qa_window;
        }

        self.say(messages::QA_WINDOW_ELAPSED).await;
        Phase::Expired
    }

    async fn deliver(&self, text: &str, what: &str) {
        for chunk in split_chunks(text, self.settings.chunk_size) {
            if let Err(e) = self.thread.send(chunk).await {
                warn!(thread = %self.thread.id(), error = %e, "failed to send {what} chunk");
                self.say(&format!("Failed to send {what}: {e}")).await;
            }
        }
    }

    async fn say(&self, text: &str) {
        if let Err(e) = self.thread.send(text).await {
            warn!(thread = %self.thread.id(), error = %e, "failed to send message");
        }
    }
}
