//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use arrrg_derive::CommandLine;

use crate::error::{Error, Result};
use crate::types::KnownModel;

/// Command-line arguments for the groqchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: llama-3.3-70b-versatile)", "MODEL")]
    pub model: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response, a multiple of 512", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Alternate API root.
    #[arrrg(optional, "API base URL (default: https://api.groq.com/openai/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: KnownModel,

    /// Maximum tokens per response, always accepted by `model`.
    pub max_tokens: u32,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// API base URL; `None` uses the public endpoint.
    pub base_url: Option<String>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: llama-3.3-70b-versatile
    /// - Max tokens: 32768
    /// - Color: enabled
    pub fn new() -> Self {
        let model = KnownModel::default();
        Self {
            model,
            max_tokens: model.descriptor().default_bound(),
            use_color: true,
            base_url: None,
        }
    }

    /// Sets the model to use and re-clamps the response bound to it.
    pub fn with_model(mut self, model: KnownModel) -> Self {
        self.model = model;
        self.max_tokens = model.descriptor().clamp_bound(self.max_tokens);
        self
    }

    /// Sets the maximum tokens per response, clamped to the model's range.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = self.model.descriptor().clamp_bound(max_tokens);
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self> {
        let mut config = ChatConfig::new();
        if let Some(model) = args.model {
            config = config.with_model(model.parse()?);
        }
        if let Some(max_tokens) = args.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        if let Some(base_url) = args.base_url {
            url::Url::parse(&base_url)?;
            config = config.with_base_url(base_url);
        }
        if args.no_color {
            config = config.without_color();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.model, KnownModel::Llama33_70bVersatile);
        assert_eq!(config.max_tokens, 32768);
        assert!(config.use_color);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::try_from(ChatArgs::default()).unwrap();
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            model: Some("mixtral-8x7b-32768".to_string()),
            max_tokens: Some(5000),
            base_url: Some("http://localhost:8080/openai/v1".to_string()),
            no_color: true,
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(config.model, KnownModel::Mixtral8x7b32768);
        assert_eq!(config.max_tokens, 4608);
        assert_eq!(
            config.base_url.as_deref(),
            Some("http://localhost:8080/openai/v1")
        );
        assert!(!config.use_color);
    }

    #[test]
    fn config_rejects_unknown_model() {
        let args = ChatArgs {
            model: Some("gpt-4o".to_string()),
            ..ChatArgs::default()
        };
        let err = ChatConfig::try_from(args).unwrap_err();
        assert!(err.is_unknown_model());
    }

    #[test]
    fn config_rejects_bad_base_url() {
        let args = ChatArgs {
            base_url: Some("not a url".to_string()),
            ..ChatArgs::default()
        };
        let err = ChatConfig::try_from(args).unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn switching_model_reclamps_bound() {
        let config = ChatConfig::new().with_model(KnownModel::Gemma2_9bIt);
        assert_eq!(config.max_tokens, 8192);
        let config = config.with_max_tokens(100);
        assert_eq!(config.max_tokens, 512);
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_model(KnownModel::Llama31_8bInstant)
            .with_max_tokens(2048)
            .without_color()
            .with_base_url("http://localhost:9000/");

        assert_eq!(config.model, KnownModel::Llama31_8bInstant);
        assert_eq!(config.max_tokens, 2048);
        assert!(!config.use_color);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:9000/"));
    }
}
