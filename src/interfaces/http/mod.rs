//! HTTP REST API interfaces
//!
//! - `common`: response envelopes and the validating JSON extractor
//! - `error`: domain error to HTTP status mapping
//! - `middleware`: session cookie authentication and admin gate
//! - `modules`: handlers grouped by resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod error;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::create_api_router;
