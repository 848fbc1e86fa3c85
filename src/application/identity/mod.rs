//! Identity module: account lifecycle & administration
//!
//! Contains the `AccountService` which orchestrates registration, email
//! verification, login gating and user administration.

pub mod codes;
pub mod commands;
pub mod messages;
pub mod service;

pub use commands::{
    AdminCreateUserCommand, RegisterCommand, ResendOutcome, VerificationOutcome,
};
pub use service::{AccountService, DEFAULT_CODE_TTL_MINUTES};
