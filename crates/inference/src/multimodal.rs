//! Vision-language model client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::api::{ChatMessage, CompletionsApi, ContentPart, ImageUrl, MessageContent};
use crate::config::{InferenceConfig, MultimodalSettings};
use crate::error::InferenceError;

/// A model that answers a prompt about one base64-encoded PNG image.
#[async_trait]
pub trait MultimodalModel: Send + Sync {
    /// Submit the image and prompt; return the model's answer.
    async fn submit(&self, image_base64: &str, prompt: &str) -> Result<String, InferenceError>;
}

#[derive(Debug, Serialize)]
struct MultimodalRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// [`MultimodalModel`] backed by a hosted chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct MultimodalClient {
    api: CompletionsApi,
    settings: MultimodalSettings,
}

impl MultimodalClient {
    pub fn new(api: CompletionsApi, settings: MultimodalSettings) -> Self {
        Self { api, settings }
    }

    /// Build from the process-wide inference configuration.
    pub fn from_config(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let api = CompletionsApi::new(
            config.multimodal.url.clone(),
            config.api_key.clone(),
            config.timeout_secs.map(Duration::from_secs),
        )?;
        Ok(Self::new(api, config.multimodal.clone()))
    }

    pub fn settings(&self) -> &MultimodalSettings {
        &self.settings
    }
}

/// Wrap a base64 PNG payload as a `data:` URI.
pub fn png_data_uri(image_base64: &str) -> String {
    format!("data:image/png;base64,{image_base64}")
}

#[async_trait]
impl MultimodalModel for MultimodalClient {
    async fn submit(&self, image_base64: &str, prompt: &str) -> Result<String, InferenceError> {
        let request = MultimodalRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: png_data_uri(image_base64),
                        },
                    },
                ]),
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            stream: false,
        };

        tracing::debug!(
            model = %self.settings.model,
            payload_len = image_base64.len(),
            "Submitting multimodal query"
        );

        let answer = self.api.complete(&request).await?;

        tracing::debug!(answer_len = answer.len(), "Multimodal query answered");
        Ok(answer)
    }
}
