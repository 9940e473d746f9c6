//! Inference configuration, fixed at process start.

use std::fmt;
use std::str::FromStr;

/// Default chat-completions endpoint for both models.
pub const DEFAULT_COMPLETIONS_URL: &str = "https://api.sambanova.ai/v1/chat/completions";

/// Default vision-language model.
pub const DEFAULT_MULTIMODAL_MODEL: &str = "Llama-3.2-11B-Vision-Instruct";

/// Default text-only model.
pub const DEFAULT_CHAT_MODEL: &str = "Meta-Llama-3.1-8B-Instruct";

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "SAMBANOVA_API_KEY";

/// Errors raised while loading configuration. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for the multimodal endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct MultimodalSettings {
    pub url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Settings for the text-only chat endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub url: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
}

/// Everything the inference clients need.
#[derive(Clone)]
pub struct InferenceConfig {
    pub api_key: String,
    pub multimodal: MultimodalSettings,
    pub chat: ChatSettings,
    /// Per-request timeout for outbound calls. `None` leaves the transport default.
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_key", &"<redacted>")
            .field("multimodal", &self.multimodal)
            .field("chat", &self.chat)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl InferenceConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Default                                         |
    /// |--------------------------|-------------------------------------------------|
    /// | `SAMBANOVA_API_KEY`      | required                                        |
    /// | `MULTIMODAL_URL`         | `https://api.sambanova.ai/v1/chat/completions`  |
    /// | `MULTIMODAL_MODEL`       | `Llama-3.2-11B-Vision-Instruct`                 |
    /// | `MULTIMODAL_TEMPERATURE` | `0.01`                                          |
    /// | `MULTIMODAL_MAX_TOKENS`  | `1024`                                          |
    /// | `CHAT_URL`               | `https://api.sambanova.ai/v1/chat/completions`  |
    /// | `CHAT_MODEL`             | `Meta-Llama-3.1-8B-Instruct`                    |
    /// | `CHAT_TEMPERATURE`       | `0.1`                                           |
    /// | `CHAT_TOP_P`             | `0.1`                                           |
    /// | `INFERENCE_TIMEOUT_SECS` | unset (no application timeout)                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::Missing(API_KEY_VAR))?;

        let string_or = |var: &str, default: &str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let multimodal = MultimodalSettings {
            url: string_or("MULTIMODAL_URL", DEFAULT_COMPLETIONS_URL),
            model: string_or("MULTIMODAL_MODEL", DEFAULT_MULTIMODAL_MODEL),
            temperature: parse_or(&lookup, "MULTIMODAL_TEMPERATURE", 0.01)?,
            max_tokens: parse_or(&lookup, "MULTIMODAL_MAX_TOKENS", 1024)?,
        };

        let chat = ChatSettings {
            url: string_or("CHAT_URL", DEFAULT_COMPLETIONS_URL),
            model: string_or("CHAT_MODEL", DEFAULT_CHAT_MODEL),
            temperature: parse_or(&lookup, "CHAT_TEMPERATURE", 0.1)?,
            top_p: parse_or(&lookup, "CHAT_TOP_P", 0.1)?,
        };

        let timeout_secs = match lookup("INFERENCE_TIMEOUT_SECS") {
            Some(raw) if !raw.trim().is_empty() => {
                Some(parse_value("INFERENCE_TIMEOUT_SECS", &raw)?)
            }
            _ => None,
        };

        Ok(Self {
            api_key,
            multimodal,
            chat,
            timeout_secs,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(var) {
        Some(raw) if !raw.trim().is_empty() => parse_value(var, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_fatal() {
        assert_matches!(
            InferenceConfig::from_lookup(lookup_from(&[])),
            Err(ConfigError::Missing(API_KEY_VAR))
        );
        assert_matches!(
            InferenceConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "  ")])),
            Err(ConfigError::Missing(_))
        );
    }

    #[test]
    fn defaults_match_hosted_models() {
        let config = InferenceConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "k")])).unwrap();
        assert_eq!(config.multimodal.model, DEFAULT_MULTIMODAL_MODEL);
        assert_eq!(config.multimodal.max_tokens, 1024);
        assert!((config.multimodal.temperature - 0.01).abs() < f32::EPSILON);
        assert_eq!(config.chat.model, DEFAULT_CHAT_MODEL);
        assert!((config.chat.top_p - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.multimodal.url, DEFAULT_COMPLETIONS_URL);
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn overrides_are_applied() {
        let config = InferenceConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "k"),
            ("MULTIMODAL_MODEL", "vision-x"),
            ("MULTIMODAL_MAX_TOKENS", "256"),
            ("CHAT_URL", "http://localhost:9000/v1/chat/completions"),
            ("INFERENCE_TIMEOUT_SECS", "45"),
        ]))
        .unwrap();
        assert_eq!(config.multimodal.model, "vision-x");
        assert_eq!(config.multimodal.max_tokens, 256);
        assert_eq!(config.chat.url, "http://localhost:9000/v1/chat/completions");
        assert_eq!(config.timeout_secs, Some(45));
    }

    #[test]
    fn invalid_number_is_reported() {
        let result = InferenceConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "k"),
            ("CHAT_TEMPERATURE", "warm"),
        ]));
        assert_matches!(
            result,
            Err(ConfigError::Invalid { var: "CHAT_TEMPERATURE", .. })
        );
    }

    #[test]
    fn debug_redacts_key() {
        let config =
            InferenceConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "super-secret")])).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
    }
}
