//! FIFO of push messages waiting for a subscriber.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

/// Unbounded message queue shared by every stream the server opens.
///
/// Messages outlive subscriptions: whatever a closed stream did not take is
/// delivered to the next one.
#[derive(Debug, Default)]
pub struct CommandQueue {
    items: Mutex<VecDeque<Value>>,
    ready: Notify,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message; returns the queue length afterwards.
    pub fn push(&self, message: Value) -> usize {
        let len = {
            let mut items = self.items.lock();
            items.push_back(message);
            items.len()
        };
        self.ready.notify_one();
        len
    }

    /// Wait for the next message. Cancel-safe: a message is only removed
    /// once this future completes.
    pub async fn pop(&self) -> Value {
        loop {
            if let Some(message) = self.items.lock().pop_front() {
                return message;
            }
            self.ready.notified().await;
        }
    }

    pub fn try_pop(&self) -> Option<Value> {
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
