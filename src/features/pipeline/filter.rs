//! Event filter: decides what, if anything, happens with each event.

use log::warn;

use crate::api::model::CHANNEL_DIRECT;
use crate::api::{ChatApi, ChatEvent, Post};
use crate::features::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    NotAPost,
    Malformed,
    OwnPost,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Discard(DiscardReason),
    /// Direct message to the bot
    Liveness(Post),
    /// Any other post, checked against the term dictionary
    Moderate(Post),
}

/// Route a single event.
///
/// DM and channel traffic are exclusive: a direct message to the bot is
/// never term-checked.
pub async fn route_event(event: &ChatEvent, session: &mut Session, api: &dyn ChatApi) -> Route {
    if !event.is_posted() {
        return Route::Discard(DiscardReason::NotAPost);
    }

    let Some(post) = event.post() else {
        return Route::Discard(DiscardReason::Malformed);
    };

    if session.is_bot(&post.user_id) {
        return Route::Discard(DiscardReason::OwnPost);
    }

    // The server tags posted events with the channel type; only "D" can be
    // a DM with the bot, so skip the channel lookup for everything else.
    if matches!(event.channel_type(), Some(kind) if kind != CHANNEL_DIRECT) {
        return Route::Moderate(post);
    }

    let channel_id = if post.channel_id.is_empty() {
        event.channel_id.as_str()
    } else {
        post.channel_id.as_str()
    };

    match session.resolve_dm_channel(api, &post.user_id).await {
        Ok(dm_channel) if dm_channel == channel_id => Route::Liveness(post),
        Ok(_) => Route::Moderate(post),
        Err(e) => {
            warn!(
                "Could not resolve DM channel for user {}, treating post {} as channel traffic: {}",
                post.user_id, post.id, e
            );
            Route::Moderate(post)
        }
    }
}
