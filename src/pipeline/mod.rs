//! Request Pipeline Module
//!
//! ```text
//! diagnose(assets)  ──► classification cascade × N ──► diagnosis ──► narrative
//! chat(message)     ──► generation cascade ──► local responder on exhaustion
//! transcribe(audio) ──► transcription cascade (narrow tier, then general)
//! ```

pub mod assets;
mod orchestrator;

pub use assets::Asset;
pub use orchestrator::{InferenceBackends, Orchestrator, OrchestratorError, OrchestratorStats};
