//! HTTP inference client for a Hugging-Face-style inference API
//!
//! All three tasks share one endpoint shape, `POST {base_url}/models/{model}`,
//! authenticated with a bearer token when one is configured:
//!
//! - classification: raw image bytes → `[{"label", "score"}]`
//! - transcription: raw audio bytes (with content type) → `{"text"}`
//! - generation: `{"inputs", "parameters"}` → `[{"generated_text"}]`
//!
//! A 503 response means the model is cold-starting; the body usually carries
//! `{"error": "...is currently loading", "estimated_time": 20.0}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ImageClassifier, InferenceError, TextGenerator, Transcriber};
use crate::config::{defaults, AdvisorConfig};
use crate::types::ClassificationResult;

/// Longest slice of an error body echoed into a failure reason.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: defaults::GENERATION_MAX_NEW_TOKENS,
            temperature: defaults::GENERATION_TEMPERATURE,
        }
    }
}

/// reqwest-backed client implementing every inference trait.
#[derive(Clone)]
pub struct HttpInferenceClient {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    generation: GenerationParams,
}

impl HttpInferenceClient {
    /// Create a client for the given API root.
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
        generation: GenerationParams,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            generation,
        })
    }

    /// Create a client from the `[inference]` and `[generation]` config sections.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.inference.base_url,
            config.inference.api_token(),
            Duration::from_secs(config.inference.request_timeout_secs),
            config.generation.params(),
        )
    }

    /// Get the API root for logging
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    fn request(&self, model: &str) -> reqwest::RequestBuilder {
        let req = self.http.post(self.endpoint(model));
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(
        &self,
        model: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, InferenceError> {
        // Transport errors and timeouts are not a loading signal
        let resp = req
            .send()
            .await
            .map_err(|e| InferenceError::hard(model, format!("request error: {e}")))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| InferenceError::hard(model, format!("failed to read body: {e}")))?;

        debug!(model = %model, status = %status, bytes = body.len(), "Inference response");
        check_status(model, status, &body)?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ImageClassifier for HttpInferenceClient {
    async fn classify(
        &self,
        image: Vec<u8>,
        model: &str,
    ) -> Result<Vec<ClassificationResult>, InferenceError> {
        let req = self
            .request(model)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image);
        let body = self.send(model, req).await?;
        parse_classification(model, &body)
    }

    fn backend_name(&self) -> &'static str {
        "http-inference"
    }
}

#[async_trait]
impl Transcriber for HttpInferenceClient {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        mime_type: &str,
        model: &str,
    ) -> Result<String, InferenceError> {
        let req = self
            .request(model)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(audio);
        let body = self.send(model, req).await?;
        parse_transcription(model, &body)
    }

    fn backend_name(&self) -> &'static str {
        "http-inference"
    }
}

#[async_trait]
impl TextGenerator for HttpInferenceClient {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String, InferenceError> {
        let payload = serde_json::json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": self.generation.max_new_tokens,
                "temperature": self.generation.temperature,
                "return_full_text": false,
            },
        });
        let req = self.request(model).json(&payload);
        let body = self.send(model, req).await?;
        parse_generation(model, &body)
    }

    fn backend_name(&self) -> &'static str {
        "http-inference"
    }
}

// ============================================================================
// Response decoding
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    estimated_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationBody {
    Flat(Vec<ClassificationResult>),
    Batched(Vec<Vec<ClassificationResult>>),
}

#[derive(Debug, Deserialize)]
struct TranscriptionBody {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationBody {
    List(Vec<GeneratedText>),
    Single(GeneratedText),
}

/// Map a non-success status to the inference error taxonomy.
pub(crate) fn check_status(model: &str, status: StatusCode, body: &[u8]) -> Result<(), InferenceError> {
    if status.is_success() {
        return Ok(());
    }

    let api_error = serde_json::from_slice::<ApiErrorBody>(body).ok();

    if status == StatusCode::SERVICE_UNAVAILABLE {
        return Err(InferenceError::TransientUnavailable {
            model: model.to_string(),
            estimated_time: api_error.and_then(|e| e.estimated_time),
        });
    }

    let detail = api_error
        .and_then(|e| e.error)
        .unwrap_or_else(|| String::from_utf8_lossy(body).chars().take(MAX_ERROR_BODY_CHARS).collect());
    Err(InferenceError::hard(model, format!("HTTP {status}: {detail}")))
}

pub(crate) fn parse_classification(
    model: &str,
    body: &[u8],
) -> Result<Vec<ClassificationResult>, InferenceError> {
    let parsed: ClassificationBody = serde_json::from_slice(body)
        .map_err(|e| InferenceError::hard(model, format!("malformed classification output: {e}")))?;

    let results = match parsed {
        ClassificationBody::Flat(results) => results,
        ClassificationBody::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
    };

    if results.is_empty() {
        return Err(InferenceError::hard(model, "empty classification output"));
    }
    Ok(results)
}

pub(crate) fn parse_transcription(model: &str, body: &[u8]) -> Result<String, InferenceError> {
    let parsed: TranscriptionBody = serde_json::from_slice(body)
        .map_err(|e| InferenceError::hard(model, format!("malformed transcription output: {e}")))?;

    let text = parsed.text.trim();
    if text.is_empty() {
        return Err(InferenceError::hard(model, "empty transcript"));
    }
    Ok(text.to_string())
}

pub(crate) fn parse_generation(model: &str, body: &[u8]) -> Result<String, InferenceError> {
    let parsed: GenerationBody = serde_json::from_slice(body)
        .map_err(|e| InferenceError::hard(model, format!("malformed generation output: {e}")))?;

    let text = match parsed {
        GenerationBody::List(items) => items.into_iter().next().map(|g| g.generated_text),
        GenerationBody::Single(item) => Some(item.generated_text),
    }
    .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(InferenceError::hard(model, "empty generation output"));
    }
    Ok(text)
}
