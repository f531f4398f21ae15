//! LLM provider abstraction and implementations.
//!
//! Supports Google Gemini, `OpenAI` and Anthropic via a common trait.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use crate::AiError;

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Sends a single-turn prompt and returns the generated text.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails, the provider answers with
    /// a non-success status, or the response holds no text.
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// Creates an LLM provider based on environment variables.
///
/// See [`create_provider`] for the variables consulted.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no credentials are found or the
/// explicitly requested provider is not configured.
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, AiError> {
    create_provider(|key| std::env::var(key).ok())
}

/// Creates an LLM provider from a variable lookup.
///
/// If `AI_PROVIDER` is set, uses that provider. Otherwise auto-detects
/// from available credentials:
///
/// 1. `GEMINI_API_KEY` set -> Google Gemini
/// 2. `OPENAI_API_KEY` set -> `OpenAI`
/// 3. `ANTHROPIC_API_KEY` set -> Anthropic Claude
///
/// `AI_MODEL` overrides the provider's default model and `AI_BASE_URL`
/// its API base URL.
///
/// # Errors
///
/// Returns [`AiError::Config`] if the selected provider's key is missing or
/// the provider name is unknown.
pub fn create_provider(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Box<dyn LlmProvider>, AiError> {
    let provider = lookup("AI_PROVIDER").unwrap_or_else(|| detect_provider(&lookup).to_string());
    let model = lookup("AI_MODEL");
    let base_url = lookup("AI_BASE_URL");

    let require = |var: &str| {
        lookup(var).ok_or_else(|| AiError::Config {
            message: format!("{var} environment variable not set"),
        })
    };

    match provider.to_lowercase().as_str() {
        "gemini" | "google" => {
            let api_key = require("GEMINI_API_KEY")?;
            let mut provider = gemini::GeminiProvider::new(
                api_key,
                model.unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
            );
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Ok(Box::new(provider))
        }
        "openai" | "gpt" => {
            let api_key = require("OPENAI_API_KEY")?;
            let mut provider = openai::OpenAiProvider::new(
                api_key,
                model.unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
            );
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Ok(Box::new(provider))
        }
        "anthropic" | "claude" => {
            let api_key = require("ANTHROPIC_API_KEY")?;
            let mut provider = anthropic::AnthropicProvider::new(
                api_key,
                model.unwrap_or_else(|| anthropic::DEFAULT_MODEL.to_string()),
            );
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Ok(Box::new(provider))
        }
        other => Err(AiError::Config {
            message: format!("Unknown AI provider: {other}. Use 'gemini', 'openai', or 'anthropic'."),
        }),
    }
}

/// Auto-detects which provider to use based on available credentials.
fn detect_provider(lookup: &impl Fn(&str) -> Option<String>) -> &'static str {
    if lookup("GEMINI_API_KEY").is_some() {
        log::info!("Auto-detected AI provider: Gemini (GEMINI_API_KEY found)");
        return "gemini";
    }

    if lookup("OPENAI_API_KEY").is_some() {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return "openai";
    }

    if lookup("ANTHROPIC_API_KEY").is_some() {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return "anthropic";
    }

    log::warn!(
        "No AI credentials detected. Set one of: GEMINI_API_KEY, OPENAI_API_KEY, \
         or ANTHROPIC_API_KEY. You can also set AI_PROVIDER explicitly."
    );

    // Fall back to gemini so the missing key is reported clearly
    "gemini"
}

/// Turns a non-success response into [`AiError::Upstream`].
async fn check_status(
    provider: &'static str,
    resp: reqwest::Response,
) -> Result<String, AiError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        log::error!("{provider} API error: {status} - {body}");
        return Err(AiError::Upstream {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn detects_gemini_first() {
        let provider = create_provider(lookup(&[
            ("OPENAI_API_KEY", "sk-openai"),
            ("GEMINI_API_KEY", "gem-key"),
        ]))
        .unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn detects_openai_then_anthropic() {
        let provider = create_provider(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("OPENAI_API_KEY", "sk-openai"),
        ]))
        .unwrap();
        assert_eq!(provider.name(), "openai");

        let provider = create_provider(lookup(&[("ANTHROPIC_API_KEY", "sk-ant")])).unwrap();
        assert_eq!(provider.name(), "anthropic");
    }

    #[test]
    fn explicit_provider_wins() {
        let provider = create_provider(lookup(&[
            ("AI_PROVIDER", "Claude"),
            ("GEMINI_API_KEY", "gem-key"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
        ]))
        .unwrap();
        assert_eq!(provider.name(), "anthropic");
    }

    #[test]
    fn missing_key_is_config_error() {
        let Err(err) = create_provider(lookup(&[("AI_PROVIDER", "openai")])) else {
            panic!("expected config error");
        };
        assert!(matches!(err, AiError::Config { .. }));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn no_credentials_falls_back_to_gemini_error() {
        let Err(err) = create_provider(lookup(&[])) else {
            panic!("expected config error");
        };
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let Err(err) = create_provider(lookup(&[("AI_PROVIDER", "bard")])) else {
            panic!("expected config error");
        };
        assert!(err.to_string().contains("Unknown AI provider: bard"));
    }
}
