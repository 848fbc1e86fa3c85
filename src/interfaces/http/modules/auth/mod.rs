//! Authentication module: registration, verification, login, session

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
