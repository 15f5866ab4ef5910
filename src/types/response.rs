//! Results handed back to collaborators (HTTP layer, CLI, persistence)

use serde::{Deserialize, Serialize};

use super::{DiagnosisResult, Severity};

/// Per-image summary returned alongside the narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    /// Display name of the submitted asset (file name)
    pub asset: String,
    pub subject: Option<String>,
    pub condition: Option<String>,
    pub confidence: f64,
    pub severity: Severity,
    pub is_healthy: bool,
    /// Tier that produced the classification, `None` for sentinels
    pub model: Option<String>,
    pub fragment: String,
}

impl AssetSummary {
    pub fn from_diagnosis(asset: &str, model: Option<String>, diagnosis: &DiagnosisResult) -> Self {
        Self {
            asset: asset.to_string(),
            subject: diagnosis.subject_name.clone(),
            condition: diagnosis.condition_name.clone(),
            confidence: diagnosis.confidence,
            severity: diagnosis.severity,
            is_healthy: diagnosis.is_healthy,
            model,
            fragment: diagnosis.narrative_fragment.clone(),
        }
    }
}

/// Result of `diagnose`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnoseResponse {
    pub narrative: String,
    pub summaries: Vec<AssetSummary>,
}

/// Where a chat reply came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplySource {
    /// A remote generation tier answered
    Remote { model: String },
    /// Every remote tier was exhausted; the canned responder answered
    LocalResponder,
    /// Images were attached, so the reply is a diagnosis narrative
    Diagnosis,
}

/// Result of `chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub narrative: String,
    pub source: ReplySource,
}

/// Result of `transcribe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
    pub model: String,
}
