//! Classifier label parsing
//!
//! Plant-disease classifiers emit labels such as `Tomato___Bacterial_spot` or
//! `Corn_(maize)___Northern_Leaf_Blight`: the triple underscore separates the
//! plant from the condition, single underscores stand in for spaces.

use crate::types::ParsedLabel;

/// Separator between subject and condition in a raw label.
pub const LABEL_SEPARATOR: &str = "___";

/// Condition reported when a label carries no separator or an empty condition.
pub const UNKNOWN_CONDITION: &str = "unknown condition";

/// Split a raw classifier label into subject and condition.
///
/// The separator split happens before underscore normalization; doing it the
/// other way round would destroy the separator.
pub fn parse_label(raw: &str) -> ParsedLabel {
    let segments: Vec<&str> = raw.split(LABEL_SEPARATOR).collect();

    if segments.len() >= 2 {
        let subject = normalize_segment(segments[0]);
        let condition = segments[1..]
            .iter()
            .map(|s| normalize_segment(s))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let condition = if condition.is_empty() {
            UNKNOWN_CONDITION.to_string()
        } else {
            condition
        };
        ParsedLabel { subject, condition }
    } else {
        ParsedLabel {
            subject: normalize_segment(raw),
            condition: UNKNOWN_CONDITION.to_string(),
        }
    }
}

/// Human-readable name for a label, used when listing alternates.
pub fn display_name(raw: &str) -> String {
    let parsed = parse_label(raw);
    if parsed.condition == UNKNOWN_CONDITION {
        parsed.subject
    } else if parsed.subject.is_empty() {
        parsed.condition
    } else {
        format!("{} - {}", parsed.subject, parsed.condition)
    }
}

fn normalize_segment(segment: &str) -> String {
    segment.replace('_', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_plantvillage_label() {
        let parsed = parse_label("Tomato___Bacterial_spot");
        assert_eq!(parsed.subject, "Tomato");
        assert_eq!(parsed.condition, "Bacterial spot");
    }

    #[test]
    fn test_subject_with_underscores_and_parens() {
        let parsed = parse_label("Corn_(maize)___Northern_Leaf_Blight");
        assert_eq!(parsed.subject, "Corn (maize)");
        assert_eq!(parsed.condition, "Northern Leaf Blight");
    }

    #[test]
    fn test_missing_separator_uses_sentinel_condition() {
        let parsed = parse_label("  some_unknown_label ");
        assert_eq!(parsed.subject, "some unknown label");
        assert_eq!(parsed.condition, UNKNOWN_CONDITION);
    }

    #[test]
    fn test_empty_label() {
        let parsed = parse_label("");
        assert_eq!(parsed.subject, "");
        assert_eq!(parsed.condition, UNKNOWN_CONDITION);
    }

    #[test]
    fn test_empty_condition_segment_is_unknown() {
        for raw in ["Tomato___", "Tomato___ _ ", "Tomato______"] {
            let parsed = parse_label(raw);
            assert_eq!(parsed.subject, "Tomato", "{raw:?}");
            assert_eq!(parsed.condition, UNKNOWN_CONDITION, "{raw:?}");
        }
        assert_eq!(display_name("Tomato___"), "Tomato");
    }

    #[test]
    fn test_multiple_separators_join_remainder() {
        let parsed = parse_label("Grape___Leaf_blight___Isariopsis_Leaf_Spot");
        assert_eq!(parsed.subject, "Grape");
        assert_eq!(parsed.condition, "Leaf blight Isariopsis Leaf Spot");
        assert!(!parsed.condition.contains(LABEL_SEPARATOR));
    }

    #[test]
    fn test_condition_never_contains_separator() {
        for raw in [
            "A___B",
            "A____B",
            "A_____B",
            "___",
            "A______B___C",
            "Apple___Cedar_apple_rust",
        ] {
            let parsed = parse_label(raw);
            assert!(
                !parsed.condition.contains(LABEL_SEPARATOR),
                "{raw:?} produced condition {:?}",
                parsed.condition
            );
        }
    }

    #[test]
    fn test_display_name_variants() {
        assert_eq!(display_name("Tomato___Early_blight"), "Tomato - Early blight");
        assert_eq!(display_name("Background_without_leaves"), "Background without leaves");
    }
}
