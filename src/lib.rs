//! CropSight: crop-disease diagnosis orchestration
//!
//! Turns farmer-submitted photos, voice notes and questions into a
//! plain-language advisory by coordinating remote inference models.
//!
//! ## Architecture
//!
//! - **Diagnosis**: label parsing, severity grading and the treatment rule table
//! - **Inference**: backend traits, the HTTP client and the fallback cascade
//! - **Narrative**: report composition, chat prompts and the offline responder
//! - **Pipeline**: the `Orchestrator` exposing diagnose / chat / transcribe

pub mod config;
pub mod diagnosis;
pub mod inference;
pub mod narrative;
pub mod pipeline;
pub mod types;

// Re-export configuration
pub use config::{AdvisorConfig, ConfigError};

// Re-export commonly used types
pub use types::{
    AssetSummary, ChatResponse, ClassificationResult, DiagnoseResponse, DiagnosisResult,
    ParsedLabel, ReplySource, Severity, TranscriptionResponse,
};

// Re-export the request pipeline
pub use pipeline::{Asset, InferenceBackends, Orchestrator, OrchestratorError, OrchestratorStats};

// Re-export inference components
pub use inference::{
    CascadeError, FallbackCascade, HttpInferenceClient, ImageClassifier, InferenceError,
    TextGenerator, Transcriber,
};
