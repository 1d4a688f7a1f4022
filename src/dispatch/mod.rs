//! Routes platform events to bot commands and running sessions.
//!
//! Each session owns a private [`Inbox`]. The dispatcher is the only writer:
//! it forwards a message to a session only when it was posted in the
//! session's thread by the session's author, and drops everything else.

/// Bot command parsing.
pub mod command;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::platform::{ChannelId, ChatPlatform, ChatThread, InboundMessage, UserId};
use crate::session::{Inbox, SessionFactory, SessionSummary};
use command::{BotCommand, help_text, parse_command};

/// Messages a session may have queued before the dispatcher starts dropping.
pub const INBOX_CAPACITY: usize = 32;

pub const SHUTDOWN_NOTICE: &str = "Shutting down...";

struct Route {
    author: UserId,
    tx: mpsc::Sender<InboundMessage>,
}

enum Flow {
    Continue,
    Shutdown,
    /// The event stream closed.
    Ended,
}

pub struct Dispatcher<P: ChatPlatform> {
    platform: Arc<P>,
    factory: SessionFactory,
    prefix: String,
    owner: Option<UserId>,
    routes: HashMap<ChannelId, Route>,
    sessions: JoinSet<(ChannelId, SessionSummary)>,
}

impl<P: ChatPlatform + 'static> Dispatcher<P> {
    pub fn new(
        platform: Arc<P>,
        factory: SessionFactory,
        prefix: impl Into<String>,
        owner: Option<UserId>,
    ) -> Self {
        Self {
            platform,
            factory,
            prefix: prefix.into(),
            owner,
            routes: HashMap::new(),
            sessions: JoinSet::new(),
        }
    }

    /// Number of sessions still accepting messages.
    pub fn active_sessions(&self) -> usize {
        self.routes.len()
    }

    /// Processes events until shutdown is requested or the stream ends.
    ///
    /// On shutdown, sessions still running are aborted. When the stream
    /// ends, each session first works through the messages already in its
    /// inbox and then ends on the closed inbox.
    pub async fn run(mut self, mut events: mpsc::Receiver<InboundMessage>) {
        let flow = loop {
            tokio::select! {
                Some(finished) = self.sessions.join_next(), if !self.sessions.is_empty() => {
                    self.reap(finished);
                }
                event = events.recv() => {
                    let Some(msg) = event else {
                        info!("event stream ended");
                        break Flow::Ended;
                    };
                    if matches!(self.handle(msg).await, Flow::Shutdown) {
                        break Flow::Shutdown;
                    }
                }
            }
        };

        match flow {
            Flow::Shutdown => {
                if !self.sessions.is_empty() {
                    info!(sessions = self.sessions.len(), "aborting running sessions");
                }
                self.sessions.shutdown().await;
            }
            Flow::Continue | Flow::Ended => self.drain().await,
        }
    }

    /// Closes every inbox and waits for the sessions to end.
    async fn drain(&mut self) {
        self.routes.clear();
        if !self.sessions.is_empty() {
            info!(sessions = self.sessions.len(), "waiting for sessions to finish");
        }
        while let Some(finished) = self.sessions.join_next().await {
            self.reap(finished);
        }
    }

    async fn handle(&mut self, msg: InboundMessage) -> Flow {
        let Some(msg) = self.route(msg) else {
            return Flow::Continue;
        };

        let Some(command) = parse_command(&self.prefix, &msg.content) else {
            return Flow::Continue;
        };

        match command {
            BotCommand::Review => self.start_review(msg).await,
            BotCommand::Help => {
                let text = help_text(&self.prefix);
                self.reply(msg.channel, &text).await;
            }
            BotCommand::Shutdown => {
                if self.owner == Some(msg.author) {
                    info!(author = %msg.author, "shutdown requested");
                    self.reply(msg.channel, SHUTDOWN_NOTICE).await;
                    if let Err(e) = self.platform.close().await {
                        error!(error = %e, "failed to close platform connection");
                    }
                    return Flow::Shutdown;
                }
                warn!(author = %msg.author, "shutdown refused: not the owner");
            }
            BotCommand::Unknown(name) => {
                debug!(command = %name, "ignoring unknown command");
            }
        }

        Flow::Continue
    }

    /// Hands `msg` to the session owning its thread.
    ///
    /// Returns the message back when no live session claims the thread.
    fn route(&mut self, msg: InboundMessage) -> Option<InboundMessage> {
        let Some(route) = self.routes.get(&msg.channel) else {
            return Some(msg);
        };

        if route.author != msg.author {
            debug!(channel = %msg.channel, author = %msg.author, "ignoring message from another author");
            return None;
        }

        match route.tx.try_send(msg) {
            Ok(()) => None,
            Err(TrySendError::Full(msg)) => {
                warn!(channel = %msg.channel, "session inbox full, dropping message");
                None
            }
            Err(TrySendError::Closed(msg)) => {
                debug!(channel = %msg.channel, "session already ended");
                self.routes.remove(&msg.channel);
                Some(msg)
            }
        }
    }

    async fn start_review(&mut self, msg: InboundMessage) {
        let name = format!("Code Review for {}", msg.author_name);

        let thread = match self.platform.create_thread(&msg, &name).await {
            Ok(thread) => thread,
            Err(e) => {
                warn!(channel = %msg.channel, error = %e, "failed to create review thread");
                self.reply(msg.channel, &format!("Failed to create thread: {e}"))
                    .await;
                return;
            }
        };

        let channel = thread.id();
        let (tx, inbox) = Inbox::channel(INBOX_CAPACITY);
        self.routes.insert(
            channel,
            Route {
                author: msg.author,
                tx,
            },
        );

        let session = self.factory.open(thread, inbox);
        self.sessions
            .spawn(async move { (channel, session.run().await) });
        info!(channel = %channel, author = %msg.author, "review started");
    }

    fn reap(&mut self, finished: Result<(ChannelId, SessionSummary), JoinError>) {
        match finished {
            Ok((channel, summary)) => {
                info!(
                    channel = %channel,
                    phase = %summary.phase,
                    turns = summary.history.len(),
                    "session finished"
                );
                self.routes.remove(&channel);
            }
            Err(e) => {
                error!(error = %e, "session task failed");
                self.routes.retain(|_, route| !route.tx.is_closed());
            }
        }
    }

    async fn reply(&self, channel: ChannelId, text: &str) {
        if let Err(e) = self.platform.reply(channel, text).await {
            warn!(channel = %channel, error = %e, "failed to send reply");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::review::ReviewPrompts;
    use crate::session::{SessionSettings, messages};
    use crate::testing::{FakePlatform, ScriptedCompleter};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const OWNER: UserId = UserId(1);
    const ADA: UserId = UserId(7);
    const BOB: UserId = UserId(8);
    const LOBBY: ChannelId = ChannelId(0);

    fn factory(responses: &[&str]) -> SessionFactory {
        let prompts = ReviewPrompts::new(
            "review".to_string(),
            "{problem_description}|{programming_language}|{submitted_code}".to_string(),
        );
        SessionFactory::new(
            Arc::new(ScriptedCompleter::new(responses.iter().copied())),
            Some(Arc::new(prompts)),
            SessionSettings::default(),
        )
    }

    fn from(author: UserId, channel: ChannelId, content: &str) -> InboundMessage {
        let name = if author == ADA { "ada" } else { "bob" };
        InboundMessage::text(author, name, channel, content)
    }

    async fn run_with(platform: &FakePlatform, events: Vec<InboundMessage>) {
        let dispatcher = Dispatcher::new(
            Arc::new(platform.clone()),
            factory(&["The review"]),
            "!",
            Some(OWNER),
        );
        let (tx, rx) = mpsc::channel(64);
        let handle = tokio::spawn(dispatcher.run(rx));
        for event in events {
            tx.send(event).await.unwrap();
            // let the dispatcher and sessions catch up between events
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_review_opens_named_thread_and_routes_author() {
        let platform = FakePlatform::default();
        let thread = ChannelId(100);

        run_with(
            &platform,
            vec![
                from(ADA, LOBBY, "!review"),
                from(ADA, thread, "sum two numbers"),
                from(BOB, thread, "I'm not ada"),
                from(ADA, thread, "python"),
            ],
        )
        .await;

        assert_eq!(platform.thread_names(), vec!["Code Review for ada"]);
        let sent = platform.thread(0).sent();
        assert_eq!(
            sent,
            vec![
                messages::GREETING,
                messages::ASK_LANGUAGE,
                messages::ASK_CODE,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_session_through_dispatcher() {
        let platform = FakePlatform::default();
        let thread = ChannelId(100);

        run_with(
            &platform,
            vec![
                from(ADA, LOBBY, "!review"),
                from(ADA, thread, "done"),
                from(ADA, thread, "finish"),
            ],
        )
        .await;

        let sent = platform.thread(0).sent();
        assert!(sent.contains(&"The review".to_string()));
        assert_eq!(sent.last().unwrap(), messages::FAREWELL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_thread_creation_failure_is_reported() {
        let platform = FakePlatform::failing_threads();

        run_with(&platform, vec![from(ADA, LOBBY, "!review")]).await;

        assert_eq!(
            platform.replies(),
            vec![(LOBBY, "Failed to create thread: Missing Permissions".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_requires_owner() {
        let platform = FakePlatform::default();

        run_with(
            &platform,
            vec![
                from(BOB, LOBBY, "!shutdown"),
                from(ADA, LOBBY, "!review"),
            ],
        )
        .await;

        assert_eq!(platform.closed.load(Ordering::SeqCst), 0);
        assert_eq!(platform.thread_names().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_owner_shutdown_stops_dispatching() {
        let platform = FakePlatform::default();
        let dispatcher = Dispatcher::new(
            Arc::new(platform.clone()),
            factory(&[]),
            "!",
            Some(OWNER),
        );
        let (tx, rx) = mpsc::channel(8);
        tx.send(from(OWNER, LOBBY, "!shutdown")).await.unwrap();
        tx.send(from(ADA, LOBBY, "!review")).await.unwrap();

        // returns without the sender being dropped
        dispatcher.run(rx).await;

        assert_eq!(platform.closed.load(Ordering::SeqCst), 1);
        assert_eq!(
            platform.replies(),
            vec![(LOBBY, SHUTDOWN_NOTICE.to_string())]
        );
        assert!(platform.thread_names().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_stream_lets_sessions_finish_queued_messages() {
        let platform = FakePlatform::default();
        let thread = ChannelId(100);
        let dispatcher = Dispatcher::new(
            Arc::new(platform.clone()),
            factory(&["The review"]),
            "!",
            Some(OWNER),
        );
        let (tx, rx) = mpsc::channel(8);
        tx.send(from(ADA, LOBBY, "!review")).await.unwrap();
        tx.send(from(ADA, thread, "done")).await.unwrap();
        tx.send(from(ADA, thread, "finish")).await.unwrap();
        drop(tx);

        dispatcher.run(rx).await;

        let sent = platform.thread(0).sent();
        assert_eq!(sent.first().unwrap(), messages::GREETING);
        assert!(sent.contains(&"The review".to_string()));
        assert_eq!(sent.last().unwrap(), messages::FAREWELL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_stream_closes_idle_sessions() {
        let platform = FakePlatform::default();
        let dispatcher = Dispatcher::new(
            Arc::new(platform.clone()),
            factory(&[]),
            "!",
            Some(OWNER),
        );
        let (tx, rx) = mpsc::channel(8);
        tx.send(from(ADA, LOBBY, "!review")).await.unwrap();
        drop(tx);

        // returns without waiting out the idle timeout
        let started = tokio::time::Instant::now();
        dispatcher.run(rx).await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(platform.thread(0).sent(), vec![messages::GREETING]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_review_registers_session_route() {
        let platform = FakePlatform::default();
        let mut dispatcher = Dispatcher::new(
            Arc::new(platform.clone()),
            factory(&[]),
            "!",
            Some(OWNER),
        );
        assert_eq!(dispatcher.active_sessions(), 0);

        dispatcher.handle(from(ADA, LOBBY, "!review")).await;
        dispatcher.handle(from(BOB, LOBBY, "!review")).await;
        assert_eq!(dispatcher.active_sessions(), 2);

        dispatcher.drain().await;
        assert_eq!(dispatcher.active_sessions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_help_and_chatter() {
        let platform = FakePlatform::default();

        run_with(
            &platform,
            vec![
                from(ADA, LOBBY, "hello everyone"),
                from(ADA, LOBBY, "!help"),
                from(ADA, LOBBY, "!dance"),
            ],
        )
        .await;

        let replies = platform.replies();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].1.contains("!review"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_session_route_is_dropped() {
        let platform = FakePlatform::default();
        let thread = ChannelId(100);

        run_with(
            &platform,
            vec![
                from(ADA, LOBBY, "!review"),
                from(ADA, thread, "done"),
                from(ADA, thread, "finish"),
                // after the session ended this is treated as a lobby command
                from(ADA, thread, "!review"),
            ],
        )
        .await;

        assert_eq!(platform.thread_names().len(), 2);
    }
}
