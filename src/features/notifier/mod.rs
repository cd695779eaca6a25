//! # Feature: Notifications
//!
//! Private suggestion messages, liveness replies and debug-channel status posts.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.3.0: Online notice includes version, start time and stream status
//! - 1.2.0: Liveness replies go to the author's DM channel
//! - 1.1.0: Suggestions include a permalink to the offending post
//! - 1.0.0: Initial debug-channel and private messages

pub mod outbound;

pub use outbound::{
    format_suggestion, permalink, Notifier, LIVENESS_REPLY, ONLINE_MESSAGE, STOPPED_MESSAGE,
};
