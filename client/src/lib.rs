//! Client for the artwork recommendation API

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Command-line commands
pub mod commands;

/// Gallery page controller
pub mod gallery;

/// HTTP gateway, endpoint table and error normalization
pub mod gateway;

/// Persisted authentication session
pub mod session;

/// Configuration and error types
pub mod types;
