//! Platform resources as exchanged with the REST API.

use serde::{Deserialize, Serialize};

/// Channel type code for public (open) channels
pub const CHANNEL_OPEN: &str = "O";
/// Channel type code for direct-message channels
pub const CHANNEL_DIRECT: &str = "D";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub channel_type: String,
}

/// Request body for channel creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewChannel {
    pub team_id: String,
    pub name: String,
    pub display_name: String,
    pub purpose: String,
    #[serde(rename = "type")]
    pub channel_type: String,
}

/// A chat message. Only the fields the bot reads are modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub root_id: String,
}

/// Request body for post creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    pub channel_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
}

impl NewPost {
    pub fn new(channel_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message: message.into(),
            root_id: None,
        }
    }

    /// Thread the post under `root_id`; empty ids are ignored
    pub fn in_reply_to(mut self, root_id: Option<&str>) -> Self {
        self.root_id = root_id.filter(|id| !id.is_empty()).map(str::to_string);
        self
    }
}
