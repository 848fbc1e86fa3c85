//! Application ports (hexagonal architecture boundaries)
//!
//! Repository contracts live with their aggregates in `domain`.
//! Outbound ports that the services call out through live here.

pub mod outbound;

pub use outbound::{
    Clock, NotificationDispatcher, NotificationError, OutboundEmail, PasswordHasher, SystemClock,
};
