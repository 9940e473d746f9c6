//! Text-only assistant client.
//!
//! Every call is independent: one fixed system message plus the user's
//! message. No conversation history is kept.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::api::{ChatMessage, CompletionsApi, MessageContent};
use crate::config::{ChatSettings, InferenceConfig};
use crate::error::InferenceError;

/// Persona for the materials-science assistant.
pub const MATERIALS_EXPERT_PROMPT: &str = "You are an expert assistant specializing in all aspects of material science. \
Your role is to provide clear and accurate explanations about material properties, structures, processing techniques, \
failure mechanisms, and their applications in real-world scenarios. You are capable of analyzing complex material science problems, \
explaining fundamental concepts, and offering insights on advanced topics such as crystallography, thermodynamics, and material characterization methods.";

/// A stateless text completion model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_message: &str)
        -> Result<String, InferenceError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    top_p: f32,
}

/// [`ChatModel`] backed by a hosted chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    api: CompletionsApi,
    settings: ChatSettings,
}

impl ChatClient {
    pub fn new(api: CompletionsApi, settings: ChatSettings) -> Self {
        Self { api, settings }
    }

    pub fn from_config(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let api = CompletionsApi::new(
            config.chat.url.clone(),
            config.api_key.clone(),
            config.timeout_secs.map(Duration::from_secs),
        )?;
        Ok(Self::new(api, config.chat.clone()))
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }
}

#[async_trait]
impl ChatModel for ChatClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, InferenceError> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(system_prompt),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Text(user_message),
                },
            ],
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
        };

        tracing::debug!(model = %self.settings.model, "Submitting chat completion");
        self.api.complete(&request).await
    }
}
