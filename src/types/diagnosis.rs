//! Diagnosis types: ClassificationResult, ParsedLabel, Severity, DiagnosisResult

use serde::{Deserialize, Serialize};

// ============================================================================
// Raw Classifier Output
// ============================================================================

/// A single (label, score) pair as returned by a remote image classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Raw model label, e.g. `Tomato___Bacterial_spot`
    pub label: String,
    /// Model confidence in `[0, 1]`
    pub score: f64,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Classifier label split into the plant it refers to and the condition observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLabel {
    pub subject: String,
    pub condition: String,
}

// ============================================================================
// Severity
// ============================================================================

/// Severity tier for a single diagnosis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Healthy,
    Mild,
    Moderate,
    Severe,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Healthy => write!(f, "Healthy"),
            Severity::Mild => write!(f, "Mild"),
            Severity::Moderate => write!(f, "Moderate"),
            Severity::Severe => write!(f, "Severe"),
        }
    }
}

// ============================================================================
// Diagnosis
// ============================================================================

/// Diagnosis for one submitted image.
///
/// Built once from a classifier response (or as a sentinel when the asset
/// could not be analysed) and never mutated afterwards.
///
/// `raw_results` is always score-descending, and `top_prediction` /
/// `confidence` mirror `raw_results[0]` whenever it is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub raw_results: Vec<ClassificationResult>,
    pub top_prediction: String,
    pub confidence: f64,
    pub is_healthy: bool,
    pub condition_name: Option<String>,
    pub subject_name: Option<String>,
    pub severity: Severity,
    pub narrative_fragment: String,
}

impl DiagnosisResult {
    /// Placeholder for an asset whose classification failed.
    pub fn sentinel(asset_name: &str) -> Self {
        Self {
            raw_results: Vec::new(),
            top_prediction: String::new(),
            confidence: 0.0,
            is_healthy: false,
            condition_name: None,
            subject_name: None,
            severity: Severity::Mild,
            narrative_fragment: format!("could not analyse image: {asset_name}"),
        }
    }

    /// True for placeholders produced by [`DiagnosisResult::sentinel`].
    pub fn is_sentinel(&self) -> bool {
        self.raw_results.is_empty()
    }

    /// Diseased diagnoses are the ones that warrant treatment advice.
    pub fn is_diseased(&self) -> bool {
        !self.is_healthy && self.condition_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_shape() {
        let d = DiagnosisResult::sentinel("leaf.jpg");
        assert!(d.is_sentinel());
        assert!(!d.is_healthy);
        assert!(!d.is_diseased());
        assert_eq!(d.severity, Severity::Mild);
        assert_eq!(d.narrative_fragment, "could not analyse image: leaf.jpg");
    }

    #[test]
    fn test_classification_result_deserializes_from_api_shape() {
        let json = r#"[{"label":"Tomato___healthy","score":0.95}]"#;
        let parsed: Vec<ClassificationResult> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, vec![ClassificationResult::new("Tomato___healthy", 0.95)]);
    }

    #[test]
    fn test_severity_display_is_capitalized() {
        assert_eq!(Severity::Severe.to_string(), "Severe");
        assert_eq!(Severity::Healthy.to_string(), "Healthy");
    }
}
