use std::time::Duration;
use tokio::sync::mpsc;

use crate::platform::InboundMessage;

/// Outcome of waiting for the next message.
#[derive(Debug)]
pub enum Wait {
    Message(InboundMessage),
    TimedOut,
    /// The sending side is gone; no more messages will arrive.
    Closed,
}

/// A session's private stream of messages, already filtered to its author
/// and thread.
pub struct Inbox {
    rx: mpsc::Receiver<InboundMessage>,
}

impl Inbox {
    pub const fn new(rx: mpsc::Receiver<InboundMessage>) -> Self {
        Self { rx }
    }

    /// Creates a bounded inbox and the sender that feeds it.
    pub fn channel(capacity: usize) -> (mpsc::Sender<InboundMessage>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }

    pub async fn next(&mut self, timeout: Duration) -> Wait {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(msg)) => Wait::Message(msg),
            Ok(None) => Wait::Closed,
            Err(_) => Wait::TimedOut,
        }
    }
}
