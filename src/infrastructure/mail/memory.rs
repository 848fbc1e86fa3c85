use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{NotificationDispatcher, NotificationError, OutboundEmail};

/// Records sent mail; can be switched into a failing mode.
#[derive(Default)]
pub struct InMemoryMailbox {
    sent: Mutex<Vec<OutboundEmail>>,
    failing: AtomicBool,
}

impl InMemoryMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Most recent message addressed to `to`
    pub fn last_to(&self, to: &str) -> Option<OutboundEmail> {
        self.sent().into_iter().rev().find(|m| m.to_address == to)
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryMailbox {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::Delivery("mailbox unavailable".into()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}
