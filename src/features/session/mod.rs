//! # Feature: Session
//!
//! One-time bootstrap of the bot identity, home team and debug channel, and
//! the resulting `Session` the pipeline carries for its lifetime.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Explicit `Session` value replaces process-wide bot/team/channel state
//! - 1.1.0: Debug channel created on first run
//! - 1.0.0: Initial bot user and team lookup

pub mod bootstrap;
pub mod state;

pub use bootstrap::{bootstrap, BootstrapError};
pub use state::Session;
