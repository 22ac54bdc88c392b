//! In-memory companion endpoint.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

use bite_protocols::{
    CommandSource, CommandStream, Companion, Inbound, LogLevel, Push, PushReceipt, TransportError,
};

#[cfg(test)]
#[path = "companion_tests.rs"]
mod tests;

/// Companion that keeps every push it receives.
#[derive(Debug, Default)]
pub struct MemoryCompanion {
    pushes: Mutex<Vec<Push>>,
    failures: AtomicU32,
    attempts: AtomicU32,
}

impl MemoryCompanion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `count` pushes with a 503.
    pub fn fail_next(&self, count: u32) {
        self.failures.store(count, Ordering::SeqCst);
    }

    /// Accepted pushes, in arrival order.
    pub fn pushes(&self) -> Vec<Push> {
        self.pushes.lock().clone()
    }

    /// Every delivery attempt, accepted or not.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn logs(&self) -> Vec<(LogLevel, String)> {
        self.pushes
            .lock()
            .iter()
            .filter_map(|p| match p {
                Push::Log { msg, level } => Some((*level, msg.clone())),
                _ => None,
            })
            .collect()
    }

    /// Pushes other than log lines.
    pub fn snapshots(&self) -> Vec<Push> {
        self.pushes
            .lock()
            .iter()
            .filter(|p| !matches!(p, Push::Log { .. }))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Companion for MemoryCompanion {
    async fn push(&self, push: Push) -> Result<PushReceipt, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TransportError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }

        debug!("Memory companion received {}", push.path());
        self.pushes.lock().push(push);
        Ok(PushReceipt {
            status: 200,
            body: r#"{"status":"ok"}"#.to_string(),
        })
    }
}

/// Command source driven from code. Each `subscribe` opens a fresh channel;
/// [`ScriptedSource::send`] feeds the latest one.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    current: Mutex<Option<mpsc::UnboundedSender<Result<Inbound, TransportError>>>>,
    subscriptions: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a message on the open subscription. False when none is open.
    pub fn send(&self, inbound: Inbound) -> bool {
        self.emit(Ok(inbound))
    }

    /// Deliver a transport error on the open subscription.
    pub fn fail(&self, error: TransportError) -> bool {
        self.emit(Err(error))
    }

    /// End the open subscription's stream.
    pub fn end(&self) {
        self.current.lock().take();
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    fn emit(&self, item: Result<Inbound, TransportError>) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|tx| tx.send(item).is_ok())
    }
}

#[async_trait]
impl CommandSource for ScriptedSource {
    async fn subscribe(&self) -> Result<CommandStream, TransportError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.current.lock() = Some(tx);
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}
