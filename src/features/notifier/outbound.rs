//! # Notifier
//!
//! Outbound posts: private suggestions to authors, liveness replies, and
//! status messages in the debug channel.
//!
//! Every send is fire-and-log: failures are logged with the full platform
//! diagnostic and never propagate, so one failed notification does not stop
//! the pipeline.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;

use crate::api::{ChatApi, NewPost, Post};
use crate::core::ApiError;
use crate::features::session::Session;
use crate::features::terms::TermMatch;

pub const LIVENESS_REPLY: &str = "Yes, I'm running";
pub const ONLINE_MESSAGE: &str = "I'm online.";
pub const STOPPED_MESSAGE: &str = "I **stopped** running.";

const SUGGESTION_HEADER: &str =
    "You're using outdated terms. Consider using one of the suggestions below.";

/// Permalink to a post: `{site_url}/{team_name}/pl/{post_id}`
pub fn permalink(site_url: &str, team_name: &str, post_id: &str) -> String {
    format!(
        "{}/{}/pl/{}",
        site_url.trim_end_matches('/'),
        team_name,
        post_id
    )
}

/// Body of the private suggestion message
pub fn format_suggestion(term_match: &TermMatch, post_link: &str) -> String {
    format!(
        "{}\n**Term**: {}\n**Suggestions**: {}\n**Post**: {}",
        SUGGESTION_HEADER,
        term_match.term,
        term_match.suggestions.join(", "),
        post_link
    )
}

/// Startup notice for the debug channel
pub fn format_online(stream_connected: bool, started_at: DateTime<Utc>) -> String {
    let mut msg = format!(
        "{} (v{}, started {})",
        ONLINE_MESSAGE,
        env!("CARGO_PKG_VERSION"),
        started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if !stream_connected {
        msg.push_str("\n_The event stream is unavailable, so I can't see new messages._");
    }
    msg
}

/// Sends through the chat API. Team and channel identities come from the
/// `Session` passed to each call.
#[derive(Clone)]
pub struct Notifier {
    api: Arc<dyn ChatApi>,
    site_url: String,
}

impl Notifier {
    pub fn new(api: Arc<dyn ChatApi>, site_url: &str) -> Self {
        Self {
            api,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    /// Privately tell `author_id` which term they used and what to use instead
    pub async fn send_suggestion(
        &self,
        session: &mut Session,
        author_id: &str,
        term_match: &TermMatch,
        post_id: &str,
    ) {
        let link = permalink(&self.site_url, &session.team_name, post_id);
        let message = format_suggestion(term_match, &link);
        match self.send_private_message(session, author_id, &message).await {
            Ok(_) => info!(
                "Sent suggestion for term '{}' to user {}",
                term_match.term, author_id
            ),
            Err(e) => e.log_details(&format!(
                "We failed to send a suggestion to user {author_id}"
            )),
        }
    }

    pub async fn send_liveness_reply(&self, session: &mut Session, author_id: &str) {
        if let Err(e) = self
            .send_private_message(session, author_id, LIVENESS_REPLY)
            .await
        {
            e.log_details(&format!(
                "We failed to send a liveness reply to user {author_id}"
            ));
        }
    }

    /// Post into the debug channel, optionally threaded under `reply_to_id`
    pub async fn send_to_debug_channel(
        &self,
        session: &Session,
        message: &str,
        reply_to_id: Option<&str>,
    ) {
        let Some(channel_id) = &session.debug_channel_id else {
            warn!("No debug channel available, dropping message: {message}");
            return;
        };

        let post = NewPost::new(channel_id.as_str(), message).in_reply_to(reply_to_id);
        match self.api.create_post(&post).await {
            Ok(created) => debug!("Posted {} to the debug channel", created.id),
            Err(e) => e.log_details("We failed to send a message to the logging channel"),
        }
    }

    pub async fn announce_online(
        &self,
        session: &Session,
        stream_connected: bool,
        started_at: DateTime<Utc>,
    ) {
        let message = format_online(stream_connected, started_at);
        self.send_to_debug_channel(session, &message, None).await;
    }

    pub async fn announce_stopped(&self, session: &Session) {
        self.send_to_debug_channel(session, STOPPED_MESSAGE, None).await;
    }

    async fn send_private_message(
        &self,
        session: &mut Session,
        author_id: &str,
        message: &str,
    ) -> Result<Post, ApiError> {
        let channel_id = session
            .resolve_dm_channel(self.api.as_ref(), author_id)
            .await?;
        self.api
            .create_post(&NewPost::new(channel_id, message))
            .await
    }
}
