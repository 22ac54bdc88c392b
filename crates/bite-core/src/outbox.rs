//! Bounded outbound push queue.
//!
//! [`Outbox`] is itself a [`Companion`]: pushing only enqueues, and a single
//! worker delivers to the wrapped companion in order. With one worker at
//! most one push is in flight. Receipts are only logged.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use bite_config::OutboxConfig;
use bite_protocols::{Companion, Push, PushReceipt, TransportError};

#[cfg(test)]
#[path = "outbox_tests.rs"]
mod tests;

/// How often a failed push is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// One attempt, no retry.
    pub fn at_most_once() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &OutboxConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_delay(),
            max_delay: config.max_retry_delay(),
        }
    }

    /// Delay before retry number `attempt` (1-based), doubling each time.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Whether a push that failed on `attempt` gets another try.
    pub fn should_retry(&self, attempt: u32, error: &TransportError) -> bool {
        attempt < self.max_attempts && is_transient(error)
    }
}

fn is_transient(error: &TransportError) -> bool {
    match error {
        TransportError::Http(_) | TransportError::Closed => true,
        TransportError::Status { status, .. } => *status >= 500,
        _ => false,
    }
}

/// Delivery counters.
#[derive(Debug, Default)]
pub struct OutboxStats {
    delivered: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
    dropped: AtomicU64,
}

impl OutboxStats {
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn retried(&self) -> u64 {
        self.retried.load(Ordering::SeqCst)
    }

    /// Pushes rejected because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::SeqCst)
    }
}

/// Fire-and-forget front for a companion.
pub struct Outbox {
    tx: Mutex<Option<mpsc::Sender<Push>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    stats: Arc<OutboxStats>,
}

impl Outbox {
    /// Spawn the delivery worker. Must be called inside a tokio runtime.
    pub fn spawn(inner: Arc<dyn Companion>, config: &OutboxConfig) -> Self {
        Self::with_policy(inner, config.capacity, RetryPolicy::from_config(config))
    }

    pub fn with_policy(inner: Arc<dyn Companion>, capacity: usize, policy: RetryPolicy) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let stats = Arc::new(OutboxStats::default());
        let worker = tokio::spawn(run_worker(inner, rx, policy, stats.clone()));
        info!("Outbox started (capacity {})", capacity);
        Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            stats,
        }
    }

    pub fn stats(&self) -> Arc<OutboxStats> {
        self.stats.clone()
    }

    /// Stop accepting pushes and wait until everything queued is delivered.
    pub async fn close(&self) {
        self.tx.lock().take();
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!("Outbox worker ended abnormally: {}", e);
            }
        }
    }
}

#[async_trait]
impl Companion for Outbox {
    async fn push(&self, push: Push) -> Result<PushReceipt, TransportError> {
        let tx = self.tx.lock().clone().ok_or(TransportError::Closed)?;
        match tx.try_send(push) {
            Ok(()) => Ok(PushReceipt {
                status: 202,
                body: "queued".to_string(),
            }),
            Err(mpsc::error::TrySendError::Full(push)) => {
                self.stats.dropped.fetch_add(1, Ordering::SeqCst);
                warn!("Outbox full, dropping push to {}", push.path());
                Err(TransportError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(TransportError::Closed),
        }
    }
}

async fn run_worker(
    inner: Arc<dyn Companion>,
    mut rx: mpsc::Receiver<Push>,
    policy: RetryPolicy,
    stats: Arc<OutboxStats>,
) {
    while let Some(push) = rx.recv().await {
        deliver(inner.as_ref(), push, &policy, &stats).await;
    }
    debug!("Outbox worker stopped");
}

async fn deliver(inner: &dyn Companion, push: Push, policy: &RetryPolicy, stats: &OutboxStats) {
    let path = push.path();
    let mut attempt = 1;
    loop {
        match inner.push(push.clone()).await {
            Ok(receipt) => {
                stats.delivered.fetch_add(1, Ordering::SeqCst);
                debug!("{} -> {} {}", path, receipt.status, receipt.body);
                return;
            }
            Err(e) if policy.should_retry(attempt, &e) => {
                let delay = policy.delay_for(attempt);
                stats.retried.fetch_add(1, Ordering::SeqCst);
                warn!(
                    "Push to {} failed (attempt {}), retrying in {:?}: {}",
                    path, attempt, delay, e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                stats.failed.fetch_add(1, Ordering::SeqCst);
                warn!("Push to {} failed after {} attempt(s): {}", path, attempt, e);
                return;
            }
        }
    }
}
