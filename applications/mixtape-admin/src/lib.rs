//! Mixtape Admin Library
//!
//! Operator tooling for a mixtape database: schema migrations in both
//! directions, schema inspection and playlist resolution.
//!
//! This library exposes the commands for testing purposes.

pub mod commands;
pub mod config;
pub mod error;

pub use config::AdminConfig;
pub use error::{AdminError, Result};
