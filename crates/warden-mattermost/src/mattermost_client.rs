//! Mattermost Web API client used for identity lookups and posting replies.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::types::{MattermostChannel, MattermostError, MattermostUser};

const API_PREFIX: &str = "/api/v4";

#[derive(Clone)]
pub struct MattermostClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl MattermostClient {
    pub fn new(api_base: &str, token: &str) -> Result<Self, MattermostError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("warden-bridge"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            api_base: format!("{}{}", api_base.trim_end_matches('/'), API_PREFIX),
            token: token.trim().to_string(),
        })
    }

    /// Resolves the account the configured credential belongs to.
    pub async fn get_me(&self) -> Result<MattermostUser, MattermostError> {
        self.get_json("/users/me").await
    }

    pub async fn get_channel(
        &self,
        channel_id: &str,
    ) -> Result<MattermostChannel, MattermostError> {
        self.get_json(&format!("/channels/{channel_id}")).await
    }

    pub async fn create_post(
        &self,
        channel_id: &str,
        message: &str,
    ) -> Result<(), MattermostError> {
        let payload = json!({
            "channel_id": channel_id,
            "message": message,
        });
        let response = self
            .http
            .post(format!("{}/posts", self.api_base))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, MattermostError> {
        let response = self
            .http
            .get(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = Self::expect_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn expect_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, MattermostError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(MattermostError::HttpStatus {
            status: status.as_u16(),
            body: truncate_for_error(&body, 800),
        })
    }
}

fn truncate_for_error(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated = String::new();
    for ch in value.chars().take(max_chars) {
        truncated.push(ch);
    }
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::{truncate_for_error, MattermostClient};
    use crate::types::MattermostError;

    #[tokio::test]
    async fn functional_get_me_resolves_the_bot_identity() {
        let server = MockServer::start();
        let me = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v4/users/me")
                .header("authorization", "Bearer token-1");
            then.status(200)
                .json_body(json!({ "id": "UBOT", "username": "minecraft-ops" }));
        });

        let client = MattermostClient::new(&server.base_url(), "token-1").expect("client");
        let user = client.get_me().await.expect("get_me");
        assert_eq!(user.id, "UBOT");
        assert_eq!(user.username, "minecraft-ops");
        assert_eq!(me.calls(), 1);
    }

    #[tokio::test]
    async fn functional_create_post_sends_channel_and_message() {
        let server = MockServer::start();
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v4/posts")
                .header("authorization", "Bearer token-1")
                .json_body(json!({ "channel_id": "C1", "message": "done" }));
            then.status(201).json_body(json!({ "id": "p1" }));
        });

        let client = MattermostClient::new(&server.base_url(), "token-1").expect("client");
        client.create_post("C1", "done").await.expect("post");
        assert_eq!(post.calls(), 1);
    }

    #[tokio::test]
    async fn regression_non_success_status_carries_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v4/channels/C1");
            then.status(403).body("channel access denied");
        });

        let client = MattermostClient::new(&server.base_url(), "token-1").expect("client");
        let error = client.get_channel("C1").await.expect_err("status error");
        match error {
            MattermostError::HttpStatus { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("channel access denied"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unit_truncate_for_error_bounds_long_bodies() {
        let body = "x".repeat(1_000);
        let truncated = truncate_for_error(&body, 10);
        assert_eq!(truncated, format!("{}...", "x".repeat(10)));
        assert_eq!(truncate_for_error("short", 10), "short");
    }
}
