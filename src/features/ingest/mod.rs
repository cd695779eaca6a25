//! # Feature: Event Ingest
//!
//! Subscribes to the server's websocket event stream and forwards each
//! event, in arrival order, to the pipeline over a bounded channel.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Reconnect with capped backoff after an established stream drops
//! - 1.0.0: Initial subscription with a degraded mode when unreachable

pub mod stream;

pub use stream::{authentication_challenge, EventIngest, EVENT_CHANNEL_CAPACITY};
