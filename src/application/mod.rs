//! Application layer: use-cases and the ports they depend on

pub mod identity;
pub mod ports;

pub use identity::AccountService;
