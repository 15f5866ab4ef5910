//! Shared data structures for crop diagnosis and advisory synthesis
//!
//! - Classification: ClassificationResult, ParsedLabel (raw model output)
//! - Diagnosis: Severity, DiagnosisResult (one per submitted image)
//! - Cascade: TierOutcome, CascadeAttempt (transient, per fallback run)
//! - Responses: AssetSummary, DiagnoseResponse, ChatResponse, TranscriptionResponse

mod cascade;
mod diagnosis;
mod response;

pub use cascade::*;
pub use diagnosis::*;
pub use response::*;
