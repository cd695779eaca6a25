//! Typed envelope for event-stream frames.
//!
//! Frames are parsed fallibly: anything that is not a well-formed event
//! yields `None` and is dropped by the caller, never a panic.

use super::model::Post;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Event name the server uses for newly created posts
pub const EVENT_POSTED: &str = "posted";

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Posted,
    Other(String),
}

impl EventKind {
    fn from_name(name: &str) -> Self {
        if name == EVENT_POSTED {
            EventKind::Posted
        } else {
            EventKind::Other(name.to_string())
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawBroadcast {
    #[serde(default)]
    channel_id: String,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    event: String,
    #[serde(default)]
    data: Map<String, Value>,
    #[serde(default)]
    broadcast: RawBroadcast,
}

/// A single event delivered by the event stream
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEvent {
    pub kind: EventKind,
    /// Broadcast target channel, empty for non-channel events
    pub channel_id: String,
    data: Map<String, Value>,
}

impl ChatEvent {
    pub fn new(kind: EventKind, channel_id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            kind,
            channel_id: channel_id.into(),
            data,
        }
    }

    /// Build a `posted` event carrying `post`, as the server would send it
    pub fn posted(post: &Post, channel_type: Option<&str>) -> Self {
        let mut data = Map::new();
        if let Ok(serialized) = serde_json::to_string(post) {
            data.insert("post".to_string(), Value::String(serialized));
        }
        if let Some(kind) = channel_type {
            data.insert("channel_type".to_string(), Value::String(kind.to_string()));
        }
        Self::new(EventKind::Posted, post.channel_id.clone(), data)
    }

    /// Parse a text frame. Reply frames (`seq_reply`) have no `event` field
    /// and are rejected here along with anything that is not JSON.
    pub fn parse(frame: &str) -> Option<Self> {
        let raw: RawEvent = serde_json::from_str(frame).ok()?;
        Some(Self {
            kind: EventKind::from_name(&raw.event),
            channel_id: raw.broadcast.channel_id,
            data: raw.data,
        })
    }

    pub fn is_posted(&self) -> bool {
        self.kind == EventKind::Posted
    }

    /// Decode the embedded post. The server sends it as a JSON string under
    /// `data.post`; an inline object is accepted too.
    pub fn post(&self) -> Option<Post> {
        match self.data.get("post")? {
            Value::String(serialized) => serde_json::from_str(serialized).ok(),
            value @ Value::Object(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }

    /// Channel type hint (`"D"`, `"O"`, `"P"`, `"G"`) if the server sent one
    pub fn channel_type(&self) -> Option<&str> {
        self.data.get("channel_type").and_then(Value::as_str)
    }
}
