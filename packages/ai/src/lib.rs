#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! AI narration of map viewports.
//!
//! Builds a textual prompt from the `GeoJSON` features visible in a
//! viewport and sends it to a hosted LLM. Google Gemini is the default
//! provider; `OpenAI` (and any `OpenAI`-compatible server via
//! `AI_BASE_URL`) and Anthropic Claude are also supported behind the
//! common [`providers::LlmProvider`] trait.

pub mod narrate;
pub mod prompt;
pub mod providers;

use thiserror::Error;

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider answered with a non-success status.
    #[error("{provider} returned HTTP {status}: {body}")]
    Upstream {
        /// Provider name.
        provider: &'static str,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The provider answered successfully but without any readable text.
    #[error("{provider} response contained no readable text")]
    EmptyResponse {
        /// Provider name.
        provider: &'static str,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
