//! HTTP clients for the hosted inference endpoints.
//!
//! Two chat-completions style endpoints are wrapped:
//!
//! - [`multimodal::MultimodalClient`]: image + prompt to the vision-language model.
//! - [`chat::ChatClient`]: system + user message to the text-only model.
//!
//! Both are exposed behind object-safe traits ([`multimodal::MultimodalModel`],
//! [`chat::ChatModel`]) so callers can substitute test doubles.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod multimodal;
