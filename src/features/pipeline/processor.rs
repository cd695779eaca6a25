//! Sequential consumer of chat events.

use anyhow::Result;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::filter::{route_event, DiscardReason, Route};
use super::liveness::LivenessMatcher;
use crate::api::{ChatApi, ChatEvent, Post};
use crate::features::notifier::Notifier;
use crate::features::session::Session;
use crate::features::terms::{check_message, TermDictionary};

/// What happened to a single event
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Discarded(DiscardReason),
    LivenessReplied,
    /// A DM to the bot that was not a liveness query
    Ignored,
    Suggested(String),
    Clean,
}

/// Owns the session and processes events one at a time, in arrival order.
///
/// Processing of one event finishes before the next is taken off the queue,
/// so the DM cache in the session needs no locking.
pub struct Pipeline {
    session: Session,
    dictionary: TermDictionary,
    notifier: Notifier,
    api: Arc<dyn ChatApi>,
    liveness: LivenessMatcher,
}

impl Pipeline {
    pub fn new(
        session: Session,
        dictionary: TermDictionary,
        notifier: Notifier,
        api: Arc<dyn ChatApi>,
    ) -> Result<Self> {
        Ok(Self {
            session,
            dictionary,
            notifier,
            api,
            liveness: LivenessMatcher::new()?,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn handle_event(&mut self, event: ChatEvent) -> Outcome {
        match route_event(&event, &mut self.session, self.api.as_ref()).await {
            Route::Discard(reason) => {
                if reason == DiscardReason::Malformed {
                    debug!("Dropping posted event with an undecodable post");
                }
                Outcome::Discarded(reason)
            }
            Route::Liveness(post) => self.handle_direct_message(&post).await,
            Route::Moderate(post) => self.moderate(&post).await,
        }
    }

    async fn handle_direct_message(&mut self, post: &Post) -> Outcome {
        if !self.liveness.is_liveness_query(&post.message) {
            return Outcome::Ignored;
        }

        self.notifier
            .send_liveness_reply(&mut self.session, &post.user_id)
            .await;
        Outcome::LivenessReplied
    }

    async fn moderate(&mut self, post: &Post) -> Outcome {
        let Some(term_match) = check_message(&self.dictionary, &post.message) else {
            return Outcome::Clean;
        };

        debug!("Post {} matched term '{}'", post.id, term_match.term);
        self.notifier
            .send_suggestion(&mut self.session, &post.user_id, &term_match, &post.id)
            .await;
        Outcome::Suggested(term_match.term)
    }

    /// Drain `events` until the sender side closes or `cancel` fires, then
    /// hand the session back. An event still in flight at cancel is dropped.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ChatEvent>,
        cancel: CancellationToken,
    ) -> Session {
        info!("📥 Event processing started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => {
                        // Shutdown does not wait for a slow chat-server call
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => {
                                debug!("Abandoning in-flight event on shutdown");
                                break;
                            }
                            outcome = self.handle_event(event) => {
                                debug!("Event processed: {outcome:?}");
                            }
                        }
                    }
                    None => break,
                },
            }
        }
        info!(
            "Event processing stopped ({} DM channels cached)",
            self.session.cached_dm_channels()
        );
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockChatApi;
    use crate::api::{Channel, EventKind, NewChannel, NewPost, Team, User};
    use crate::core::ApiError;
    use crate::features::notifier::LIVENESS_REPLY;
    use async_trait::async_trait;
    use std::future::pending;
    use std::time::Duration;

    /// Chat server whose every call stays pending
    struct StalledChatApi;

    #[async_trait]
    impl ChatApi for StalledChatApi {
        async fn get_user_by_username(&self, _: &str) -> Result<User, ApiError> {
            pending().await
        }

        async fn get_team_by_name(&self, _: &str) -> Result<Team, ApiError> {
            pending().await
        }

        async fn get_channel_by_name(&self, _: &str, _: &str) -> Result<Channel, ApiError> {
            pending().await
        }

        async fn create_channel(&self, _: &NewChannel) -> Result<Channel, ApiError> {
            pending().await
        }

        async fn create_direct_channel(&self, _: &str, _: &str) -> Result<Channel, ApiError> {
            pending().await
        }

        async fn create_post(&self, _: &NewPost) -> Result<Post, ApiError> {
            pending().await
        }

        async fn get_post(&self, _: &str) -> Result<Option<Post>, ApiError> {
            pending().await
        }
    }

    const WORDS: &str = r#"{"slave": ["secondary", "replica"], "master": ["primary", "main"]}"#;

    fn session() -> Session {
        Session::new(
            "bot1",
            "inclusive-bot",
            "team1",
            "test-team",
            Some("debug1".to_string()),
        )
    }

    fn pipeline() -> (Pipeline, Arc<MockChatApi>) {
        let mock = Arc::new(MockChatApi::new());
        let api: Arc<dyn ChatApi> = mock.clone();
        let session = session();
        let notifier = Notifier::new(api.clone(), "https://chat.example.com");
        let dictionary = TermDictionary::from_json(WORDS).unwrap();
        let pipeline = Pipeline::new(session, dictionary, notifier, api).unwrap();
        (pipeline, mock)
    }

    fn posted(id: &str, user_id: &str, channel_id: &str, message: &str, kind: &str) -> ChatEvent {
        let post = Post {
            id: id.to_string(),
            user_id: user_id.to_string(),
            channel_id: channel_id.to_string(),
            message: message.to_string(),
            root_id: String::new(),
        };
        ChatEvent::posted(&post, Some(kind))
    }

    #[tokio::test]
    async fn test_flagged_term_sends_one_private_suggestion() {
        let (mut pipeline, api) = pipeline();

        let outcome = pipeline
            .handle_event(posted("p1", "user1", "town-square", "the master branch", "O"))
            .await;

        assert_eq!(outcome, Outcome::Suggested("master".to_string()));
        let posts = api.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].channel_id, "dm-bot1-user1");
        assert!(posts[0].message.contains("**Term**: master"));
        assert!(posts[0].message.contains("**Suggestions**: primary, main"));
        assert!(posts[0]
            .message
            .contains("https://chat.example.com/test-team/pl/p1"));
    }

    #[tokio::test]
    async fn test_first_dictionary_entry_wins() {
        let (mut pipeline, api) = pipeline();

        let outcome = pipeline
            .handle_event(posted("p1", "user1", "town-square", "master and slave", "O"))
            .await;

        assert_eq!(outcome, Outcome::Suggested("slave".to_string()));
        assert_eq!(api.posts().len(), 1);
    }

    #[tokio::test]
    async fn test_clean_post_sends_nothing() {
        let (mut pipeline, api) = pipeline();

        let outcome = pipeline
            .handle_event(posted("p1", "user1", "town-square", "all good here", "O"))
            .await;

        assert_eq!(outcome, Outcome::Clean);
        assert!(api.posts().is_empty());
    }

    #[tokio::test]
    async fn test_bot_never_answers_itself() {
        let (mut pipeline, api) = pipeline();

        let outcome = pipeline
            .handle_event(posted("p1", "bot1", "town-square", "master", "O"))
            .await;

        assert_eq!(outcome, Outcome::Discarded(DiscardReason::OwnPost));
        assert!(api.posts().is_empty());
    }

    #[tokio::test]
    async fn test_dm_liveness_query_gets_one_reply() {
        let (mut pipeline, api) = pipeline();

        let outcome = pipeline
            .handle_event(posted("p1", "user1", "dm-bot1-user1", "hello", "D"))
            .await;

        assert_eq!(outcome, Outcome::LivenessReplied);
        let posts = api.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].message, LIVENESS_REPLY);
        assert_eq!(posts[0].channel_id, "dm-bot1-user1");
    }

    #[tokio::test]
    async fn test_dm_is_never_term_checked() {
        let (mut pipeline, api) = pipeline();

        let outcome = pipeline
            .handle_event(posted("p1", "user1", "dm-bot1-user1", "hello master", "D"))
            .await;

        assert_eq!(outcome, Outcome::LivenessReplied);
        let posts = api.posts();
        assert_eq!(posts.len(), 1);
        assert!(!posts[0].message.contains("**Term**"));
    }

    #[tokio::test]
    async fn test_other_dm_text_is_ignored() {
        let (mut pipeline, api) = pipeline();

        let outcome = pipeline
            .handle_event(posted("p1", "user1", "dm-bot1-user1", "the slave db", "D"))
            .await;

        assert_eq!(outcome, Outcome::Ignored);
        assert!(api.posts().is_empty());
    }

    #[tokio::test]
    async fn test_non_post_events_are_ignored() {
        let (mut pipeline, api) = pipeline();
        let event = ChatEvent::new(
            EventKind::Other("channel_viewed".to_string()),
            "town-square",
            Default::default(),
        );

        let outcome = pipeline.handle_event(event).await;

        assert_eq!(outcome, Outcome::Discarded(DiscardReason::NotAPost));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dm_channel_created_once_per_author() {
        let (mut pipeline, api) = pipeline();

        pipeline
            .handle_event(posted("p1", "user1", "town-square", "master", "O"))
            .await;
        pipeline
            .handle_event(posted("p2", "user1", "off-topic", "slave", "O"))
            .await;

        assert_eq!(api.posts().len(), 2);
        assert_eq!(api.calls_to("create_direct_channel"), 1);
        assert_eq!(pipeline.session().cached_dm_channels(), 1);
    }

    #[tokio::test]
    async fn test_failed_send_does_not_stop_processing() {
        let (mut pipeline, api) = pipeline();
        api.set_fail_posts(true);

        let outcome = pipeline
            .handle_event(posted("p1", "user1", "town-square", "master", "O"))
            .await;
        assert_eq!(outcome, Outcome::Suggested("master".to_string()));

        api.set_fail_posts(false);
        pipeline
            .handle_event(posted("p2", "user2", "town-square", "slave", "O"))
            .await;

        let posts = api.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].channel_id, "dm-bot1-user2");
    }

    #[tokio::test]
    async fn test_run_processes_in_order_until_closed() {
        let (pipeline, api) = pipeline();
        let (tx, rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();

        tx.send(posted("p1", "user1", "town-square", "master", "O"))
            .await
            .unwrap();
        tx.send(posted("p2", "user2", "town-square", "slave", "O"))
            .await
            .unwrap();
        drop(tx);

        pipeline.run(rx, cancel).await;

        let posts = api.posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].channel_id, "dm-bot1-user1");
        assert_eq!(posts[1].channel_id, "dm-bot1-user2");
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let (pipeline, api) = pipeline();
        let (_tx, rx) = mpsc::channel::<ChatEvent>(8);
        let cancel = CancellationToken::new();
        cancel.cancel();

        pipeline.run(rx, cancel).await;
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_abandons_stalled_call() {
        let api: Arc<dyn ChatApi> = Arc::new(StalledChatApi);
        let notifier = Notifier::new(api.clone(), "https://chat.example.com");
        let dictionary = TermDictionary::from_json(WORDS).unwrap();
        let pipeline = Pipeline::new(session(), dictionary, notifier, api).unwrap();

        let (tx, rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        tx.send(posted("p1", "user1", "town-square", "master", "O"))
            .await
            .unwrap();

        let processor = tokio::spawn(pipeline.run(rx, cancel.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let session = tokio::time::timeout(Duration::from_secs(2), processor)
            .await
            .expect("processing did not stop after cancel")
            .unwrap();
        assert_eq!(session.bot_user_id, "bot1");
        assert_eq!(session.cached_dm_channels(), 0);
    }
}
