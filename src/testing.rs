//! Test doubles for the platform and completion seams.

#![allow(clippy::unwrap_used)]

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::completion::{Completer, Turn};
use crate::platform::{Attachment, ChannelId, ChatPlatform, ChatThread, InboundMessage};

/// A thread that records everything sent to it.
#[derive(Clone, Default)]
pub struct RecordingThread {
    pub id: u64,
    pub sent: Arc<Mutex<Vec<String>>>,
    pub files: Arc<Mutex<HashMap<String, Result<Vec<u8>, String>>>>,
    /// Number of upcoming sends that fail.
    pub failing_sends: Arc<AtomicUsize>,
    /// Texts whose sends always fail.
    pub failing_texts: Arc<Mutex<Vec<String>>>,
}

impl RecordingThread {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_file(self, location: &str, contents: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(location.to_string(), Ok(contents.to_vec()));
        self
    }

    pub fn with_unreadable_file(self, location: &str, error: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(location.to_string(), Err(error.to_string()));
        self
    }

    pub fn fail_on(&self, text: &str) {
        self.failing_texts.lock().unwrap().push(text.to_string());
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatThread for RecordingThread {
    fn id(&self) -> ChannelId {
        ChannelId(self.id)
    }

    async fn send(&self, text: &str) -> Result<()> {
        let remaining = self.failing_sends.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_sends.store(remaining - 1, Ordering::SeqCst);
            bail!("503 Service Unavailable");
        }
        if self.failing_texts.lock().unwrap().iter().any(|t| t == text) {
            bail!("503 Service Unavailable");
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn read_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>> {
        match self.files.lock().unwrap().get(&attachment.location) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(e)) => Err(anyhow!("{e}")),
            None => bail!("404 Not Found"),
        }
    }
}

/// A completer that replays canned responses and records what it was asked.
#[derive(Clone, Default)]
pub struct ScriptedCompleter {
    responses: Arc<Mutex<VecDeque<String>>>,
    pub calls: Arc<Mutex<Vec<Vec<Turn>>>>,
}

impl ScriptedCompleter {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().map(Into::into).collect())),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Vec<Turn>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for ScriptedCompleter {
    async fn complete(&self, history: &[Turn]) -> String {
        self.calls.lock().unwrap().push(history.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "no scripted response".to_string())
    }
}

/// A platform that records replies and hands out [`RecordingThread`]s.
#[derive(Clone, Default)]
pub struct FakePlatform {
    pub replies: Arc<Mutex<Vec<(ChannelId, String)>>>,
    pub threads: Arc<Mutex<Vec<(String, RecordingThread)>>>,
    pub closed: Arc<AtomicUsize>,
    pub fail_thread_creation: bool,
    next_thread: Arc<AtomicU64>,
}

impl FakePlatform {
    pub fn failing_threads() -> Self {
        Self {
            fail_thread_creation: true,
            ..Self::default()
        }
    }

    pub fn replies(&self) -> Vec<(ChannelId, String)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn thread(&self, index: usize) -> RecordingThread {
        self.threads.lock().unwrap()[index].1.clone()
    }

    pub fn thread_names(&self) -> Vec<String> {
        self.threads
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    type Thread = RecordingThread;

    async fn create_thread(&self, _origin: &InboundMessage, name: &str) -> Result<Self::Thread> {
        if self.fail_thread_creation {
            bail!("Missing Permissions");
        }
        let id = 100 + self.next_thread.fetch_add(1, Ordering::SeqCst);
        let thread = RecordingThread::new(id);
        self.threads
            .lock()
            .unwrap()
            .push((name.to_string(), thread.clone()));
        Ok(thread)
    }

    async fn reply(&self, channel: ChannelId, text: &str) -> Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((channel, text.to_string()));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
