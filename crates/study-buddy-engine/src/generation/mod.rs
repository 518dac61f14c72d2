//! # Text Generation
//!
//! Prompt construction per study feature, and the capability that turns a
//! prompt into free-form text. Failures never reach the user as errors: each
//! [`Feature`] carries a static fallback message shown instead.

pub mod feature;
pub mod http;

pub use feature::{Feature, UnknownFeature};
pub use http::HttpGenerator;

use std::future::Future;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("No API key configured for text generation")]
    MissingApiKey,
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Response contained no usable text")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Transport(e.to_string())
    }
}

/// Turns a natural-language prompt into generated text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, GenerationError>> + Send;
}
