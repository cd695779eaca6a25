//! REST v4 client for the chat server.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use async_trait::async_trait;
use log::debug;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::model::{Channel, NewChannel, NewPost, Post, Team, User};
use super::ChatApi;
use crate::core::ApiError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bot-authenticated HTTP client
#[derive(Clone)]
pub struct MattermostClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl MattermostClient {
    /// `api_url` is the REST base including `/api/v4`
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn get(&self, path: &str) -> RequestBuilder {
        debug!("GET {path}");
        self.http
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        debug!("POST {path}");
        self.http
            .post(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.token)
    }
}

/// Turn a response into `T`, or into `ApiError::Server` on a non-2xx status
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::from_response(status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl ChatApi for MattermostClient {
    async fn get_user_by_username(&self, username: &str) -> Result<User, ApiError> {
        let response = self.get(&format!("/users/username/{username}")).send().await?;
        decode(response).await
    }

    async fn get_team_by_name(&self, name: &str) -> Result<Team, ApiError> {
        let response = self.get(&format!("/teams/name/{name}")).send().await?;
        decode(response).await
    }

    async fn get_channel_by_name(&self, team_id: &str, name: &str) -> Result<Channel, ApiError> {
        let response = self
            .get(&format!("/teams/{team_id}/channels/name/{name}"))
            .send()
            .await?;
        decode(response).await
    }

    async fn create_channel(&self, channel: &NewChannel) -> Result<Channel, ApiError> {
        let response = self.post("/channels").json(channel).send().await?;
        decode(response).await
    }

    async fn create_direct_channel(
        &self,
        user_id: &str,
        other_user_id: &str,
    ) -> Result<Channel, ApiError> {
        let response = self
            .post("/channels/direct")
            .json(&[user_id, other_user_id])
            .send()
            .await?;
        decode(response).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        let response = self.post("/posts").json(post).send().await?;
        decode(response).await
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<Post>, ApiError> {
        let response = self.get(&format!("/posts/{post_id}")).send().await?;
        match decode(response).await {
            Ok(post) => Ok(Some(post)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
