//! In-memory `ChatApi` that records every call, for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::model::{Channel, NewChannel, NewPost, Post, Team, User, CHANNEL_DIRECT};
use super::ChatApi;
use crate::core::ApiError;

#[derive(Default)]
pub struct MockChatApi {
    users: HashMap<String, User>,
    teams: HashMap<String, Team>,
    channels: Mutex<HashMap<(String, String), Channel>>,
    direct_channels: Mutex<HashMap<(String, String), Channel>>,
    posts: Mutex<Vec<NewPost>>,
    calls: Mutex<Vec<String>>,
    direct_creations: AtomicUsize,
    fail_posts: AtomicBool,
    fail_channel_create: bool,
    fail_direct: bool,
    lookup_failures: HashMap<String, u16>,
}

impl MockChatApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: &str, username: &str) -> Self {
        self.users.insert(
            username.to_string(),
            User {
                id: id.to_string(),
                username: username.to_string(),
            },
        );
        self
    }

    pub fn with_team(mut self, id: &str, name: &str) -> Self {
        self.teams.insert(
            name.to_string(),
            Team {
                id: id.to_string(),
                name: name.to_string(),
                display_name: name.to_string(),
            },
        );
        self
    }

    pub fn with_channel(self, team_id: &str, name: &str, id: &str) -> Self {
        if let Ok(mut channels) = self.channels.lock() {
            channels.insert(
                (team_id.to_string(), name.to_string()),
                Channel {
                    id: id.to_string(),
                    team_id: team_id.to_string(),
                    name: name.to_string(),
                    display_name: name.to_string(),
                    channel_type: "O".to_string(),
                },
            );
        }
        self
    }

    pub fn failing_channel_creation(mut self) -> Self {
        self.fail_channel_create = true;
        self
    }

    pub fn failing_direct_channels(mut self) -> Self {
        self.fail_direct = true;
        self
    }

    /// Make `method` (a lookup: user, team or channel by name) fail with `status`
    pub fn failing_lookup(mut self, method: &str, status: u16) -> Self {
        self.lookup_failures.insert(method.to_string(), status);
        self
    }

    pub fn set_fail_posts(&self, fail: bool) {
        self.fail_posts.store(fail, Ordering::SeqCst);
    }

    /// Posts successfully created, in order
    pub fn posts(&self) -> Vec<NewPost> {
        self.posts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Every call made, as `"method:arg"` strings, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(':').next() == Some(method))
            .count()
    }

    /// Direct channels that did not exist before the call
    pub fn direct_channels_created(&self) -> usize {
        self.direct_creations.load(Ordering::SeqCst)
    }

    pub fn has_channel(&self, team_id: &str, name: &str) -> bool {
        self.channels
            .lock()
            .map(|c| c.contains_key(&(team_id.to_string(), name.to_string())))
            .unwrap_or(false)
    }

    fn lookup_failure(&self, method: &str) -> Option<ApiError> {
        self.lookup_failures.get(method).map(|status| {
            ApiError::server(*status, "mock.lookup.failure", "Injected lookup failure.")
        })
    }

    fn record(&self, method: &str, arg: &str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{method}:{arg}"));
        }
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn get_user_by_username(&self, username: &str) -> Result<User, ApiError> {
        self.record("get_user_by_username", username);
        if let Some(err) = self.lookup_failure("get_user_by_username") {
            return Err(err);
        }
        self.users.get(username).cloned().ok_or_else(|| {
            ApiError::server(404, "app.user.missing_account.const", "Unable to find the user.")
        })
    }

    async fn get_team_by_name(&self, name: &str) -> Result<Team, ApiError> {
        self.record("get_team_by_name", name);
        if let Some(err) = self.lookup_failure("get_team_by_name") {
            return Err(err);
        }
        self.teams.get(name).cloned().ok_or_else(|| {
            ApiError::server(
                404,
                "app.team.get_by_name.missing.app_error",
                "Unable to find the existing team.",
            )
        })
    }

    async fn get_channel_by_name(&self, team_id: &str, name: &str) -> Result<Channel, ApiError> {
        self.record("get_channel_by_name", name);
        if let Some(err) = self.lookup_failure("get_channel_by_name") {
            return Err(err);
        }
        let channels = self
            .channels
            .lock()
            .map_err(|_| ApiError::Decode("poisoned".to_string()))?;
        channels
            .get(&(team_id.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| {
                ApiError::server(
                    404,
                    "app.channel.get_by_name.missing.app_error",
                    "Channel does not exist.",
                )
            })
    }

    async fn create_channel(&self, channel: &NewChannel) -> Result<Channel, ApiError> {
        self.record("create_channel", &channel.name);
        if self.fail_channel_create {
            return Err(ApiError::server(
                403,
                "api.context.permissions.app_error",
                "You do not have the appropriate permissions.",
            ));
        }
        let created = Channel {
            id: format!("chan-{}", channel.name),
            team_id: channel.team_id.clone(),
            name: channel.name.clone(),
            display_name: channel.display_name.clone(),
            channel_type: channel.channel_type.clone(),
        };
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| ApiError::Decode("poisoned".to_string()))?;
        channels.insert(
            (channel.team_id.clone(), channel.name.clone()),
            created.clone(),
        );
        Ok(created)
    }

    async fn create_direct_channel(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> Result<Channel, ApiError> {
        self.record("create_direct_channel", other_user_id);
        if self.fail_direct {
            return Err(ApiError::server(
                500,
                "api.channel.create_direct_channel.internal_error",
                "Unable to create the direct channel.",
            ));
        }

        let mut pair = [user_id.to_string(), other_user_id.to_string()];
        pair.sort();
        let [a, b] = pair;

        let mut direct = self
            .direct_channels
            .lock()
            .map_err(|_| ApiError::Decode("poisoned".to_string()))?;
        let channel = direct
            .entry((a.clone(), b.clone()))
            .or_insert_with(|| {
                self.direct_creations.fetch_add(1, Ordering::SeqCst);
                Channel {
                    id: format!("dm-{a}-{b}"),
                    team_id: String::new(),
                    name: format!("{a}__{b}"),
                    display_name: String::new(),
                    channel_type: CHANNEL_DIRECT.to_string(),
                }
            })
            .clone();
        Ok(channel)
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        self.record("create_post", &post.channel_id);
        if self.fail_posts.load(Ordering::SeqCst) {
            return Err(ApiError::server(
                500,
                "app.post.save.app_error",
                "Unable to save the post.",
            ));
        }
        let mut posts = self
            .posts
            .lock()
            .map_err(|_| ApiError::Decode("poisoned".to_string()))?;
        posts.push(post.clone());
        Ok(Post {
            id: format!("created-{}", posts.len()),
            user_id: String::new(),
            channel_id: post.channel_id.clone(),
            message: post.message.clone(),
            root_id: post.root_id.clone().unwrap_or_default(),
        })
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<Post>, ApiError> {
        self.record("get_post", post_id);
        Ok(None)
    }
}
