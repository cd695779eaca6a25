//! # Feature: Event Pipeline
//!
//! Routes each incoming event: DMs to the bot get a liveness check, every
//! other post is scanned for flagged terms.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Single consumer task owns the session; DM cache is no longer shared
//! - 1.1.0: Channel-type hint skips the DM lookup for channel traffic
//! - 1.0.0: Initial filter, liveness replies and term suggestions

pub mod filter;
pub mod liveness;
pub mod processor;

pub use filter::{route_event, DiscardReason, Route};
pub use liveness::LivenessMatcher;
pub use processor::{Outcome, Pipeline};
