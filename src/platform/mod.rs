//! The slice of a chat platform the bot relies on.
//!
//! A platform delivers [`InboundMessage`]s, creates threads from a
//! triggering message and sends text. Everything else about the platform
//! (connections, gateways, REST) stays behind these traits.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    /// Platform-specific locator (URL, path) used to fetch the bytes.
    pub location: String,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            location: location.into(),
        }
    }
}

/// A message received from the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub author: UserId,
    pub author_name: String,
    pub channel: ChannelId,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

impl InboundMessage {
    pub fn text(
        author: UserId,
        author_name: impl Into<String>,
        channel: ChannelId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            author,
            author_name: author_name.into(),
            channel,
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Returns `true` if the trimmed content equals `keyword`, ignoring case.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.content.trim().eq_ignore_ascii_case(keyword)
    }
}

/// A thread a session talks in.
#[async_trait]
pub trait ChatThread: Send + Sync {
    fn id(&self) -> ChannelId;

    async fn send(&self, text: &str) -> Result<()>;

    async fn read_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>>;
}

/// The platform operations the dispatcher needs.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    type Thread: ChatThread + 'static;

    /// Opens a thread anchored on `origin`.
    async fn create_thread(&self, origin: &InboundMessage, name: &str) -> Result<Self::Thread>;

    /// Sends text to an arbitrary channel.
    async fn reply(&self, channel: ChannelId, text: &str) -> Result<()>;

    /// Disconnects from the platform.
    async fn close(&self) -> Result<()>;
}
