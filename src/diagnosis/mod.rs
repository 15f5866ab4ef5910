//! Diagnosis: turning classifier scores into a farmer-facing assessment
//!
//! - `labels`: raw label → (subject, condition)
//! - `severity`: condition + confidence → severity tier
//! - `treatment`: condition → ordered treatment actions (rule table)

pub mod labels;
pub mod severity;
pub mod treatment;

pub use labels::{display_name, parse_label, LABEL_SEPARATOR, UNKNOWN_CONDITION};
pub use severity::{classify_severity, is_healthy_condition, HEALTHY_MARKER};
pub use treatment::{recommend_treatment, TreatmentAdvisor, TreatmentRule};

use crate::types::{ClassificationResult, DiagnosisResult};

/// Build a diagnosis from a classifier response.
///
/// Results are sorted by descending score before anything else; the top
/// result drives the parsed names, health flag and severity. Returns `None`
/// when the classifier produced nothing usable.
pub fn diagnose_classifications(mut results: Vec<ClassificationResult>) -> Option<DiagnosisResult> {
    results.retain(|r| r.score.is_finite());
    if results.is_empty() {
        return None;
    }
    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    let top = &results[0];
    let parsed = parse_label(&top.label);
    let is_healthy = is_healthy_condition(&parsed.condition);
    let severity = classify_severity(&parsed.condition, top.score);
    let fragment = if is_healthy {
        format!("{}: healthy ({:.1}%)", parsed.subject, top.score * 100.0)
    } else {
        format!(
            "{}: {} ({:.1}%, {})",
            parsed.subject,
            parsed.condition,
            top.score * 100.0,
            severity
        )
    };

    Some(DiagnosisResult {
        top_prediction: top.label.clone(),
        confidence: top.score,
        is_healthy,
        condition_name: Some(parsed.condition),
        subject_name: Some(parsed.subject),
        severity,
        narrative_fragment: fragment,
        raw_results: results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    #[test]
    fn test_bacterial_spot_end_to_end() {
        let d = diagnose_classifications(vec![ClassificationResult::new(
            "Tomato___Bacterial_spot",
            0.82,
        )])
        .unwrap();
        assert_eq!(d.subject_name.as_deref(), Some("Tomato"));
        assert_eq!(d.condition_name.as_deref(), Some("Bacterial spot"));
        assert_eq!(d.severity, Severity::Severe);
        assert!(!d.is_healthy);
        assert!(d.is_diseased());
        assert_eq!(d.narrative_fragment, "Tomato: Bacterial spot (82.0%, Severe)");
    }

    #[test]
    fn test_healthy_end_to_end() {
        let d = diagnose_classifications(vec![ClassificationResult::new("Tomato___healthy", 0.95)])
            .unwrap();
        assert!(d.is_healthy);
        assert_eq!(d.severity, Severity::Healthy);
        assert!(!d.is_diseased());
    }

    #[test]
    fn test_results_sorted_and_top_mirrors_first() {
        let d = diagnose_classifications(vec![
            ClassificationResult::new("Tomato___Early_blight", 0.10),
            ClassificationResult::new("Tomato___Late_blight", 0.65),
            ClassificationResult::new("Tomato___healthy", 0.25),
        ])
        .unwrap();
        let scores: Vec<f64> = d.raw_results.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![0.65, 0.25, 0.10]);
        assert_eq!(d.top_prediction, d.raw_results[0].label);
        assert!((d.confidence - d.raw_results[0].score).abs() < f64::EPSILON);
        assert_eq!(d.severity, Severity::Moderate);
    }

    #[test]
    fn test_empty_or_nan_results_are_unusable() {
        assert!(diagnose_classifications(Vec::new()).is_none());
        assert!(diagnose_classifications(vec![ClassificationResult::new("x", f64::NAN)]).is_none());
    }
}
