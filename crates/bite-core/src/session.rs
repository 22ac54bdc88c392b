//! The push session.
//!
//! [`SyncSession`] owns the single inbound subscription. A pump task reads
//! one message at a time and runs it through the engine to completion
//! before reading the next. Opening while open replaces the subscription.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use bite_config::SessionConfig;
use bite_protocols::{CommandSource, CommandStream, Companion, Notifier, Push};

use crate::engine::{Flow, SyncEngine};
use crate::error::SessionError;

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

const NOTIFY_TITLE: &str = "bite";

/// Why a subscription ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionExit {
    /// Closed locally.
    Cancelled,
    /// The companion sent a close command.
    Closed,
    /// The stream ran out.
    StreamEnded,
    /// The push channel failed.
    Transport(String),
}

impl fmt::Display for SessionExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionExit::Cancelled => write!(f, "closed locally"),
            SessionExit::Closed => write!(f, "closed by companion"),
            SessionExit::StreamEnded => write!(f, "stream ended"),
            SessionExit::Transport(e) => write!(f, "transport failure: {}", e),
        }
    }
}

struct Subscription {
    cancel: CancellationToken,
    done: CancellationToken,
    task: JoinHandle<SessionExit>,
}

/// Session-end side effects: tell the companion, tell the user.
#[derive(Clone)]
struct Announcer {
    companion: Arc<dyn Companion>,
    notifier: Option<Arc<dyn Notifier>>,
    notify_companion: bool,
}

impl Announcer {
    async fn opened(&self) {
        self.notify("Push session opened").await;
    }

    async fn closed(&self, exit: &SessionExit) {
        if self.notify_companion {
            if let Err(e) = self.companion.push(Push::CloseSession).await {
                warn!("Cannot announce session end: {}", e);
            }
        }
        self.notify(&format!("Push session {}", exit)).await;
    }

    async fn notify(&self, message: &str) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify(NOTIFY_TITLE, message).await {
                debug!("Notification failed: {}", e);
            }
        }
    }
}

/// Controller for the one push subscription.
pub struct SyncSession {
    engine: Arc<SyncEngine>,
    source: Arc<dyn CommandSource>,
    announcer: Announcer,
    transitions: tokio::sync::Mutex<()>,
    current: Mutex<Option<Subscription>>,
    last_exit: Arc<Mutex<Option<SessionExit>>>,
}

impl SyncSession {
    pub fn new(
        engine: Arc<SyncEngine>,
        source: Arc<dyn CommandSource>,
        companion: Arc<dyn Companion>,
    ) -> Self {
        Self {
            engine,
            source,
            announcer: Announcer {
                companion,
                notifier: None,
                notify_companion: true,
            },
            transitions: tokio::sync::Mutex::new(()),
            current: Mutex::new(None),
            last_exit: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.announcer.notifier = Some(notifier);
        self
    }

    pub fn with_config(mut self, config: &SessionConfig) -> Self {
        self.announcer.notify_companion = config.notify_companion_on_close;
        self
    }

    /// Subscribe and start the pump. An open subscription is torn down first.
    pub async fn open(&self) -> Result<(), SessionError> {
        let _transition = self.transitions.lock().await;

        let previous = self.current.lock().take();
        if let Some(previous) = previous {
            info!("Replacing open push subscription");
            previous.cancel.cancel();
            let _ = previous.task.await;
        }

        let stream = self.source.subscribe().await?;
        let cancel = CancellationToken::new();
        let done = CancellationToken::new();
        let task = tokio::spawn(run_subscription(
            self.engine.clone(),
            stream,
            cancel.clone(),
            done.clone(),
            self.announcer.clone(),
            self.last_exit.clone(),
        ));
        *self.current.lock() = Some(Subscription { cancel, done, task });

        info!("Push session opened");
        self.announcer.opened().await;
        Ok(())
    }

    /// Tear down the subscription. Returns false when none was live.
    pub async fn close(&self) -> bool {
        let _transition = self.transitions.lock().await;

        let current = self.current.lock().take();
        let Some(subscription) = current else {
            return false;
        };
        subscription.cancel.cancel();
        let exit = match subscription.task.await {
            Ok(exit) => exit,
            Err(e) => {
                error!("Push session task failed: {}", e);
                SessionExit::Cancelled
            }
        };

        if exit != SessionExit::Cancelled {
            // Already ended on its own and announced.
            return false;
        }
        self.announcer.closed(&exit).await;
        true
    }

    /// Open when closed, close when open. Returns whether the session is
    /// open afterwards.
    pub async fn toggle(&self) -> Result<bool, SessionError> {
        if self.is_open() {
            self.close().await;
            Ok(false)
        } else {
            self.open().await?;
            Ok(true)
        }
    }

    pub fn is_open(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|s| !s.done.is_cancelled())
    }

    /// Resolve once the current subscription has ended, returning why.
    /// Returns the last exit immediately when nothing is open.
    pub async fn wait(&self) -> Option<SessionExit> {
        let done = self.current.lock().as_ref().map(|s| s.done.clone());
        if let Some(done) = done {
            done.cancelled().await;
        }
        self.last_exit.lock().clone()
    }
}

async fn run_subscription(
    engine: Arc<SyncEngine>,
    stream: CommandStream,
    cancel: CancellationToken,
    done: CancellationToken,
    announcer: Announcer,
    last_exit: Arc<Mutex<Option<SessionExit>>>,
) -> SessionExit {
    let _done = done.drop_guard();
    let exit = pump(&engine, stream, &cancel).await;
    info!("Push session ended: {}", exit);
    if exit != SessionExit::Cancelled {
        announcer.closed(&exit).await;
    }
    *last_exit.lock() = Some(exit.clone());
    exit
}

async fn pump(engine: &SyncEngine, mut stream: CommandStream, cancel: &CancellationToken) -> SessionExit {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return SessionExit::Cancelled,
            next = stream.next() => next,
        };

        match next {
            None => return SessionExit::StreamEnded,
            Some(Err(e)) if e.is_fatal() => {
                error!("Push channel failed: {}", e);
                return SessionExit::Transport(e.to_string());
            }
            Some(Err(e)) => warn!("Skipping push message: {}", e),
            Some(Ok(inbound)) => {
                let action = inbound.command.action().to_string();
                match AssertUnwindSafe(engine.handle_command(inbound))
                    .catch_unwind()
                    .await
                {
                    Ok(Flow::Stop) => return SessionExit::Closed,
                    Ok(Flow::Continue) => {}
                    Err(_) => error!("Handler for '{}' panicked, continuing", action),
                }
            }
        }
    }
}
