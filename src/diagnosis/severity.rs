//! Severity classification from condition text and classifier confidence

use crate::types::Severity;

/// Substring marking a healthy condition (matched case-insensitively).
pub const HEALTHY_MARKER: &str = "healthy";

/// Confidence below this is `Mild`.
pub const MILD_UPPER_BOUND: f64 = 0.4;

/// Confidence below this (and at least `MILD_UPPER_BOUND`) is `Moderate`.
pub const MODERATE_UPPER_BOUND: f64 = 0.7;

/// Whether a condition string describes a healthy plant.
pub fn is_healthy_condition(condition: &str) -> bool {
    condition.to_lowercase().contains(HEALTHY_MARKER)
}

/// Map a condition and confidence to a severity tier.
///
/// Healthy conditions are always `Healthy`, whatever the confidence.
pub fn classify_severity(condition: &str, confidence: f64) -> Severity {
    if is_healthy_condition(condition) {
        Severity::Healthy
    } else if confidence < MILD_UPPER_BOUND {
        Severity::Mild
    } else if confidence < MODERATE_UPPER_BOUND {
        Severity::Moderate
    } else {
        Severity::Severe
    }
}
