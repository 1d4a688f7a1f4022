//! A terminal-backed chat platform.
//!
//! One local user types into stdin; the bot answers on stdout. `!review`
//! opens a numbered thread and every following line is posted there until
//! another thread is opened.

/// Line assembly for terminal input.
pub mod input;
mod ui;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;

use crate::platform::{Attachment, ChannelId, ChatPlatform, ChatThread, InboundMessage, UserId};
use input::{ConsoleInput, LineAssembler};

pub use ui::print_header;

/// The only user of the console.
pub const CONSOLE_USER: UserId = UserId(1);

/// Channel that receives input while no thread is open.
pub const LOBBY: ChannelId = ChannelId(0);

const EVENT_BUFFER: usize = 64;

pub struct ConsoleThread {
    id: ChannelId,
    name: String,
}

#[async_trait]
impl ChatThread for ConsoleThread {
    fn id(&self) -> ChannelId {
        self.id
    }

    async fn send(&self, text: &str) -> Result<()> {
        ui::print_bot(&self.name, text);
        Ok(())
    }

    async fn read_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>> {
        tokio::fs::read(&attachment.location)
            .await
            .with_context(|| format!("Failed to read file: {}", attachment.location))
    }
}

pub struct ConsolePlatform {
    user_name: String,
    active: Arc<Mutex<ChannelId>>,
    next_thread: AtomicU64,
    names: Mutex<HashMap<ChannelId, String>>,
}

impl ConsolePlatform {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            active: Arc::new(Mutex::new(LOBBY)),
            next_thread: AtomicU64::new(1),
            names: Mutex::new(HashMap::new()),
        }
    }

    /// Uses `$USER` as the display name.
    pub fn from_env() -> Self {
        Self::new(std::env::var("USER").unwrap_or_else(|_| "you".to_string()))
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Starts reading stdin and returns the resulting event stream.
    ///
    /// Reading happens on a dedicated OS thread so a pending read never
    /// holds up runtime shutdown. The stream ends at EOF.
    pub fn listen(&self) -> mpsc::Receiver<InboundMessage> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let active = Arc::clone(&self.active);
        let user_name = self.user_name.clone();

        std::thread::spawn(move || {
            let mut assembler = LineAssembler::default();
            let stdin = io::stdin();

            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let Some(input) = assembler.push(&line) else {
                    continue;
                };
                let channel = *active.lock().unwrap_or_else(PoisonError::into_inner);
                let Some(msg) = to_message(input, &user_name, channel) else {
                    continue;
                };
                if tx.blocking_send(msg).is_err() {
                    return;
                }
            }

            if let Some(input) = assembler.finish() {
                let channel = *active.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(msg) = to_message(input, &user_name, channel) {
                    let _ = tx.blocking_send(msg);
                }
            }
            debug!("console input closed");
        });

        rx
    }

    fn channel_name(&self, channel: ChannelId) -> String {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&channel)
            .cloned()
            .unwrap_or_else(|| "lobby".to_string())
    }
}

fn to_message(input: ConsoleInput, user_name: &str, channel: ChannelId) -> Option<InboundMessage> {
    match input {
        ConsoleInput::Text(text) if text.trim().is_empty() => None,
        ConsoleInput::Text(text) => Some(InboundMessage::text(
            CONSOLE_USER,
            user_name,
            channel,
            text,
        )),
        ConsoleInput::Attach { filename, path } => Some(
            InboundMessage::text(CONSOLE_USER, user_name, channel, "")
                .with_attachment(Attachment::new(filename, path)),
        ),
        ConsoleInput::Invalid(message) => {
            ui::print_error(&message);
            None
        }
    }
}

#[async_trait]
impl ChatPlatform for ConsolePlatform {
    type Thread = ConsoleThread;

    async fn create_thread(&self, _origin: &InboundMessage, name: &str) -> Result<Self::Thread> {
        let id = ChannelId(self.next_thread.fetch_add(1, Ordering::SeqCst));
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, name.to_string());
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = id;

        ui::print_thread_opened(name);
        Ok(ConsoleThread {
            id,
            name: name.to_string(),
        })
    }

    async fn reply(&self, channel: ChannelId, text: &str) -> Result<()> {
        ui::print_bot(&self.channel_name(channel), text);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        ui::print_goodbye();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_new_starts_in_lobby() {
        let platform = ConsolePlatform::new("ada");
        assert_eq!(platform.user_name(), "ada");
        assert_eq!(*platform.active.lock().unwrap(), LOBBY);
    }

    #[tokio::test]
    async fn test_create_thread_becomes_active() {
        let platform = ConsolePlatform::new("ada");
        let origin = InboundMessage::text(CONSOLE_USER, "ada", LOBBY, "!review");

        let first = platform.create_thread(&origin, "Code Review for ada").await.unwrap();
        let second = platform.create_thread(&origin, "Code Review for ada").await.unwrap();

        assert_eq!(first.id(), ChannelId(1));
        assert_eq!(second.id(), ChannelId(2));
        assert_eq!(*platform.active.lock().unwrap(), ChannelId(2));
        assert_eq!(platform.channel_name(ChannelId(1)), "Code Review for ada");
        assert_eq!(platform.channel_name(LOBBY), "lobby");
    }

    #[tokio::test]
    async fn test_read_attachment_from_disk() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "print('hi')").unwrap();
        let thread = ConsoleThread {
            id: ChannelId(1),
            name: "t".to_string(),
        };
        let attachment = Attachment::new("x.py", file.path().to_string_lossy());

        let bytes = thread.read_attachment(&attachment).await.unwrap();
        assert_eq!(bytes, b"print('hi')");
    }

    #[tokio::test]
    async fn test_read_missing_attachment_fails() {
        let thread = ConsoleThread {
            id: ChannelId(1),
            name: "t".to_string(),
        };
        let attachment = Attachment::new("x.py", "/nonexistent/x.py");

        let err = thread.read_attachment(&attachment).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }

    #[test]
    fn test_attach_input_becomes_attachment_message() {
        let msg = to_message(
            ConsoleInput::Attach {
                filename: "a.py".to_string(),
                path: "/tmp/a.py".to_string(),
            },
            "ada",
            ChannelId(3),
        )
        .unwrap();

        assert_eq!(msg.channel, ChannelId(3));
        assert!(msg.content.is_empty());
        assert_eq!(msg.attachments, vec![Attachment::new("a.py", "/tmp/a.py")]);
    }

    #[test]
    fn test_blank_line_is_not_sent() {
        assert!(to_message(ConsoleInput::Text("   ".to_string()), "ada", LOBBY).is_none());
    }

    #[test]
    fn test_invalid_input_is_not_sent() {
        assert!(to_message(ConsoleInput::Invalid("bad".to_string()), "ada", LOBBY).is_none());
    }
}
