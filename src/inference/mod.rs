//! Inference Backend Module
//!
//! Remote model access behind three narrow traits, one per task:
//!
//! - **ImageClassifier**: image bytes → scored labels
//! - **Transcriber**: audio bytes → transcript
//! - **TextGenerator**: prompt → generated text
//!
//! `HttpInferenceClient` implements all three against a Hugging-Face-style
//! inference API. Tests inject fakes per tier through the same traits.
//!
//! Every backend reports failures with `InferenceError`, which separates a
//! cold-starting model (worth moving on and retrying later) from a hard
//! failure. `FallbackCascade` walks an ordered tier list on top of that.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::ClassificationResult;

pub mod cascade;
pub mod http_client;

pub use cascade::{CascadeError, CascadeSuccess, FallbackCascade};
pub use http_client::{GenerationParams, HttpInferenceClient};

/// Failure of a single remote call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// The endpoint reported the model is still loading (HTTP 503)
    #[error("model {model} is loading (estimated wait: {estimated_time:?}s)")]
    TransientUnavailable {
        model: String,
        estimated_time: Option<f64>,
    },

    /// Request rejected, transport error, or malformed/empty output
    #[error("model {model} failed: {reason}")]
    HardFailure { model: String, reason: String },
}

impl InferenceError {
    pub fn hard(model: &str, reason: impl Into<String>) -> Self {
        Self::HardFailure {
            model: model.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientUnavailable { .. })
    }
}

/// Remote image classification.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Classify an image with the given model. Order of results is not significant.
    async fn classify(
        &self,
        image: Vec<u8>,
        model: &str,
    ) -> Result<Vec<ClassificationResult>, InferenceError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Remote speech-to-text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
        model: &str,
    ) -> Result<String, InferenceError>;

    fn backend_name(&self) -> &'static str;
}

/// Remote text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, InferenceError>;

    fn backend_name(&self) -> &'static str;
}
