//! # Chat Platform API
//!
//! REST client and event-stream envelope for the chat server. The pipeline
//! talks to the server only through the [`ChatApi`] trait so it can run
//! against a fake in tests.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Typed `ChatEvent` envelope replaces the loose data map
//! - 1.0.0: Initial REST v4 client

pub mod client;
pub mod event;
pub mod model;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;

use crate::core::ApiError;

pub use client::MattermostClient;
pub use event::{ChatEvent, EventKind};
pub use model::{Channel, NewChannel, NewPost, Post, Team, User};

/// Operations the bot needs from the chat server
///
/// Every request is authenticated as the bot.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn get_user_by_username(&self, username: &str) -> Result<User, ApiError>;

    async fn get_team_by_name(&self, name: &str) -> Result<Team, ApiError>;

    async fn get_channel_by_name(&self, team_id: &str, name: &str) -> Result<Channel, ApiError>;

    async fn create_channel(&self, channel: &NewChannel) -> Result<Channel, ApiError>;

    /// Resolve or create the direct channel between two users.
    ///
    /// The server returns the same channel for repeated calls with the same pair.
    async fn create_direct_channel(&self, user_id: &str, other_user_id: &str)
        -> Result<Channel, ApiError>;

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError>;

    /// Fetch a post by id; `Ok(None)` if it does not exist.
    ///
    /// Part of the server contract; the event pipeline reads posts from the
    /// stream and does not call this.
    async fn get_post(&self, post_id: &str) -> Result<Option<Post>, ApiError>;
}
