use async_trait::async_trait;
use tracing::info;

use crate::application::ports::{NotificationDispatcher, NotificationError, OutboundEmail};

/// Logs outgoing mail instead of delivering it. Development only; the body
/// is never written since it carries codes and temporary passwords.
pub struct LogDispatcher {
    from: String,
}

impl LogDispatcher {
    pub fn new(from: &str) -> Self {
        Self {
            from: from.to_string(),
        }
    }
}

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn send(&self, email: OutboundEmail) -> Result<(), NotificationError> {
        info!(
            from = %self.from,
            to = %email.to_address,
            subject = %email.subject,
            "📧 Mail (log transport, not delivered)"
        );
        Ok(())
    }
}
