//! Shared chat-completions transport.
//!
//! Both inference endpoints speak the same request/response envelope, so
//! posting, status checking, and answer extraction live here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A role-tagged chat message.
#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: MessageContent<'a>,
}

/// Message content: plain text, or a list of typed parts.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

/// One part of a multi-part message.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

/// Image reference; for inline images this is a `data:` URI.
#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for one chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct CompletionsApi {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl CompletionsApi {
    /// Build a client for `url`. `timeout` of `None` keeps the transport default.
    pub fn new(
        url: String,
        api_key: String,
        timeout: Option<Duration>,
    ) -> Result<Self, InferenceError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, url, api_key))
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, url: String, api_key: String) -> Self {
        Self {
            client,
            url,
            api_key,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `body` and return the text of the first choice.
    pub async fn complete<B: Serialize + ?Sized>(&self, body: &B) -> Result<String, InferenceError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        extract_answer(&text)
    }

    /// Return the response unchanged on 2xx, or an [`InferenceError::ApiError`]
    /// carrying the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, InferenceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(InferenceError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Pull `choices[0].message.content` out of a completion body.
pub fn extract_answer(body: &str) -> Result<String, InferenceError> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| InferenceError::MalformedResponse("response has no choices".into()))?;

    choice.message.content.ok_or(InferenceError::EmptyResponse)
}
