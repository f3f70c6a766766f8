//! Model invocation: send one content unit plus the extraction prompt.
//!
//! [`ContentModel`] is the seam between the pipeline and the provider. The
//! production implementation, [`LlmContentModel`], wraps an
//! `edgequake_llm::LLMProvider`; tests substitute scripted models.
//!
//! Failed calls are not retried. They come back as an [`InvocationError`]
//! and the aggregator moves on to the next unit.

use crate::config::{provider_key_var, ServiceConfig};
use crate::error::{InvocationError, MenuError};
use crate::pipeline::units::ContentUnit;
use crate::prompts::{text_unit_message, EXTRACTION_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{
    AnthropicProvider, ChatMessage, CompletionOptions, GeminiProvider, LLMProvider,
    OpenAIProvider, ProviderFactory,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A generative model that answers the extraction prompt for one unit.
#[async_trait]
pub trait ContentModel: Send + Sync {
    /// Return the model's raw textual reply for `unit`.
    ///
    /// `unit_num` is 1-based and only used for error reporting.
    async fn generate(&self, unit_num: usize, unit: &ContentUnit) -> Result<String, InvocationError>;
}

/// [`ContentModel`] backed by an edgequake-llm provider.
pub struct LlmContentModel {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl LlmContentModel {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ServiceConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
        }
    }

    /// Resolve the provider from the configuration and wrap it.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, MenuError> {
        let provider = resolve_provider(config)?;
        Ok(Self::new(provider, config))
    }
}

#[async_trait]
impl ContentModel for LlmContentModel {
    async fn generate(&self, unit_num: usize, unit: &ContentUnit) -> Result<String, InvocationError> {
        let start = Instant::now();
        let messages = build_messages(unit);

        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| InvocationError::ModelFailed {
                unit: unit_num,
                detail: e.to_string(),
            })?;

        debug!(
            "Unit {}: {} input tokens, {} output tokens, {:?}",
            unit_num,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        if response.content.trim().is_empty() {
            return Err(InvocationError::EmptyReply { unit: unit_num });
        }
        Ok(response.content)
    }
}

/// Build the single user turn for a unit: the image with the prompt as its
/// text, or the document text followed by the prompt.
fn build_messages(unit: &ContentUnit) -> Vec<ChatMessage> {
    match unit {
        ContentUnit::Image(image) => vec![ChatMessage::user_with_images(
            EXTRACTION_PROMPT,
            vec![image.clone()],
        )],
        ContentUnit::Text(text) => vec![ChatMessage::user(text_unit_message(text))],
    }
}

/// Build `CompletionOptions` from the service config.
fn build_options(config: &ServiceConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        top_p: Some(config.top_p),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Resolve the provider, from most-specific to least-specific:
///
/// 1. An injected `config.provider`, used as-is.
/// 2. An explicit `config.api_key`, passed straight to the named provider's
///    constructor (gemini, openai, anthropic).
/// 3. `ProviderFactory::create_llm_provider`, which reads the provider's own
///    key variable from the environment.
fn resolve_provider(config: &ServiceConfig) -> Result<Arc<dyn LLMProvider>, MenuError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let name = config.provider_name.trim().to_ascii_lowercase();
    info!(
        "Creating LLM provider '{}' with model '{}'",
        name, config.model
    );

    if let Some(ref key) = config.api_key {
        match name.as_str() {
            "gemini" => {
                return Ok(Arc::new(GeminiProvider::new(key.as_str()).with_model(&config.model)))
            }
            "openai" => {
                return Ok(Arc::new(OpenAIProvider::new(key.as_str()).with_model(&config.model)))
            }
            "anthropic" => {
                return Ok(Arc::new(
                    AnthropicProvider::new(key.as_str()).with_model(&config.model),
                ))
            }
            _ => warn!(
                "API key ignored: provider '{}' is resolved from its own environment",
                name
            ),
        }
    } else if let Some(var) = provider_key_var(&name) {
        return Err(MenuError::ProviderNotConfigured {
            provider: name,
            hint: format!("No API key configured. Set {var} or pass an API key."),
        });
    }

    ProviderFactory::create_llm_provider(&name, &config.model).map_err(|e| {
        MenuError::ProviderNotConfigured {
            provider: name.clone(),
            hint: format!("{e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MODEL;
    use edgequake_llm::ImageData;

    #[test]
    fn build_options_defaults() {
        let opts = build_options(&ServiceConfig::default());
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.top_p, Some(0.8));
        assert_eq!(opts.max_tokens, Some(4096));
    }

    #[test]
    fn one_user_turn_per_unit() {
        let text = build_messages(&ContentUnit::Text("Tacos 2.50".into()));
        assert_eq!(text.len(), 1);
        assert!(text[0].content.starts_with("Tacos 2.50"));
        assert!(text[0].content.ends_with(EXTRACTION_PROMPT));

        let image = build_messages(&ContentUnit::Image(ImageData::new("AAAA".to_string(), "image/png")));
        assert_eq!(image.len(), 1);
        assert_eq!(image[0].content, EXTRACTION_PROMPT);
    }

    #[test]
    fn missing_api_key_is_reported() {
        let err = resolve_provider(&ServiceConfig::default()).err().unwrap();
        assert!(matches!(err, MenuError::ProviderNotConfigured { .. }));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn explicit_key_builds_gemini_provider() {
        let config = ServiceConfig::builder().api_key("dummy-key").build().unwrap();
        let provider = resolve_provider(&config).expect("explicit key must be enough");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), DEFAULT_MODEL);
    }

    #[test]
    fn explicit_key_builds_other_named_providers() {
        for (name, model) in [("openai", "gpt-4.1-nano"), ("Anthropic", "claude-sonnet-4-20250514")] {
            let config = ServiceConfig::builder()
                .provider_name(name)
                .model(model)
                .api_key("dummy-key")
                .build()
                .unwrap();
            let provider = resolve_provider(&config).expect("explicit key must be enough");
            assert_eq!(provider.model(), model);
        }
    }

    #[test]
    fn missing_key_names_the_selected_provider_variable() {
        let config = ServiceConfig::builder().provider_name("openai").build().unwrap();
        let err = resolve_provider(&config).err().unwrap();
        let msg = err.to_string();
        assert!(msg.contains("OPENAI_API_KEY"), "got: {msg}");
        assert!(!msg.contains("GEMINI_API_KEY"), "got: {msg}");
    }
}
