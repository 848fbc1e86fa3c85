//! Notification dispatch adapters
//!
//! `smtp` delivers real mail, `log` writes messages to the log for local
//! setups, `memory` records them for tests.

mod log;
mod memory;
mod smtp;

use std::sync::Arc;

pub use self::log::LogDispatcher;
pub use memory::InMemoryMailbox;
pub use smtp::SmtpDispatcher;

use crate::application::ports::NotificationDispatcher;
use crate::config::{MailConfig, MailTransport};

/// Build the dispatcher selected by `mail.transport`.
pub fn create_dispatcher(config: &MailConfig) -> Arc<dyn NotificationDispatcher> {
    match config.transport {
        MailTransport::Smtp => Arc::new(SmtpDispatcher::new(config)),
        MailTransport::Log => Arc::new(LogDispatcher::new(&config.from_email)),
    }
}
