//! Bot session state produced by bootstrap.

use log::debug;
use std::collections::HashMap;

use crate::api::ChatApi;
use crate::core::ApiError;

/// Identity and channels the pipeline works with.
///
/// Owned by the event-processing task. The DM channel cache only grows; it
/// is an optimization over the server's idempotent direct-channel endpoint,
/// not a source of truth.
#[derive(Debug, Clone)]
pub struct Session {
    pub bot_user_id: String,
    pub bot_username: String,
    pub team_id: String,
    pub team_name: String,
    /// `None` when the debug channel could neither be found nor created
    pub debug_channel_id: Option<String>,
    dm_channels: HashMap<String, String>,
}

impl Session {
    pub fn new(
        bot_user_id: impl Into<String>,
        bot_username: impl Into<String>,
        team_id: impl Into<String>,
        team_name: impl Into<String>,
        debug_channel_id: Option<String>,
    ) -> Self {
        Self {
            bot_user_id: bot_user_id.into(),
            bot_username: bot_username.into(),
            team_id: team_id.into(),
            team_name: team_name.into(),
            debug_channel_id,
            dm_channels: HashMap::new(),
        }
    }

    pub fn is_bot(&self, user_id: &str) -> bool {
        self.bot_user_id == user_id
    }

    pub fn cached_dm_channel(&self, author_id: &str) -> Option<&str> {
        self.dm_channels.get(author_id).map(String::as_str)
    }

    pub fn cached_dm_channels(&self) -> usize {
        self.dm_channels.len()
    }

    /// Resolve the direct channel between the bot and `author_id`, creating it
    /// on the server if needed. Cached ids are returned without a request.
    pub async fn resolve_dm_channel(
        &mut self,
        api: &dyn ChatApi,
        author_id: &str,
    ) -> Result<String, ApiError> {
        if let Some(channel_id) = self.dm_channels.get(author_id) {
            return Ok(channel_id.clone());
        }

        let channel = api
            .create_direct_channel(&self.bot_user_id, author_id)
            .await?;
        debug!("Resolved DM channel {} for user {}", channel.id, author_id);

        self.dm_channels
            .insert(author_id.to_string(), channel.id.clone());
        Ok(channel.id)
    }
}
