//! Diagnosis narrative generation
//!
//! Produces, in order: one section per diagnosis (input order), one
//! consolidated treatment section when anything is diseased (one entry per
//! condition, naming every affected plant), the AI
//! disclaimer, and a closing line echoing the farmer's own note.
//!
//! Output depends only on the inputs, so identical inputs give byte-identical
//! narratives.

use crate::diagnosis::{display_name, TreatmentAdvisor};
use crate::types::DiagnosisResult;

/// Returned when there is nothing to report.
pub const NO_DIAGNOSIS_MESSAGE: &str = "Sorry, I couldn't analyse any of the images you sent. \
     Please try again with a clear, well-lit photo of the affected leaves.";

/// Appended after treatment advice.
pub const AI_DISCLAIMER: &str = "Note: these recommendations are AI-generated and may be wrong. \
     Please consult a local agricultural extension officer or plant health professional \
     before applying any treatment.";

/// Heading of the consolidated treatment section.
pub const ADVISORY_HEADING: &str = "## Recommended Actions";

/// Alternates listed per diagnosis, excluding the top prediction.
const MAX_ALTERNATES: usize = 3;

/// Composes diagnoses into a farmer-facing report.
#[derive(Debug, Clone, Default)]
pub struct NarrativeBuilder {
    advisor: TreatmentAdvisor,
}

impl NarrativeBuilder {
    pub fn new(advisor: TreatmentAdvisor) -> Self {
        Self { advisor }
    }

    pub fn advisor(&self) -> &TreatmentAdvisor {
        &self.advisor
    }

    /// Build the narrative for a request.
    pub fn build(&self, diagnoses: &[DiagnosisResult], user_context: &str) -> String {
        if diagnoses.is_empty() {
            return NO_DIAGNOSIS_MESSAGE.to_string();
        }

        let numbered = diagnoses.len() > 1;
        let mut sections: Vec<String> = diagnoses
            .iter()
            .enumerate()
            .map(|(i, d)| diagnosis_section(d, numbered.then_some(i + 1)))
            .collect();

        if let Some(advice) = self.advisory_section(diagnoses) {
            sections.push(advice);
            sections.push(AI_DISCLAIMER.to_string());
        }

        let context = user_context.trim();
        if !context.is_empty() {
            sections.push(format!(
                "You mentioned: \"{context}\". If the findings above don't cover it, \
                 reply with more detail about what you are seeing and I'll help further."
            ));
        }

        sections.join("\n\n")
    }

    /// One subsection per distinct diseased condition, in first-seen order,
    /// headed by every plant showing it.
    fn advisory_section(&self, diagnoses: &[DiagnosisResult]) -> Option<String> {
        let mut groups: Vec<ConditionGroup<'_>> = Vec::new();

        for d in diagnoses.iter().filter(|d| d.is_diseased()) {
            let Some(condition) = d.condition_name.as_deref() else {
                continue;
            };
            let subject = d.subject_name.as_deref().filter(|s| !s.is_empty());
            let key = condition.to_lowercase();

            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.add_subject(subject),
                None => {
                    let mut group = ConditionGroup {
                        key,
                        condition,
                        subjects: Vec::new(),
                    };
                    group.add_subject(subject);
                    groups.push(group);
                }
            }
        }

        if groups.is_empty() {
            return None;
        }

        let mut lines = vec![ADVISORY_HEADING.to_string()];
        for group in &groups {
            lines.push(String::new());
            if group.subjects.is_empty() {
                lines.push(format!("### {}", group.condition));
            } else {
                lines.push(format!("### {} ({})", group.condition, group.subjects.join(", ")));
            }
            for (n, action) in self.advisor.advise(group.condition).iter().enumerate() {
                lines.push(format!("{}. {}", n + 1, action));
            }
        }

        Some(lines.join("\n"))
    }
}

/// Diseased diagnoses sharing a condition (compared case-insensitively).
struct ConditionGroup<'a> {
    key: String,
    condition: &'a str,
    subjects: Vec<&'a str>,
}

impl<'a> ConditionGroup<'a> {
    fn add_subject(&mut self, subject: Option<&'a str>) {
        if let Some(s) = subject {
            if !self.subjects.iter().any(|known| known.eq_ignore_ascii_case(s)) {
                self.subjects.push(s);
            }
        }
    }
}

/// Build a narrative with the built-in treatment table.
pub fn build_narrative(diagnoses: &[DiagnosisResult], user_context: &str) -> String {
    NarrativeBuilder::default().build(diagnoses, user_context)
}

fn diagnosis_section(d: &DiagnosisResult, number: Option<usize>) -> String {
    let mut lines = vec![match number {
        Some(n) => format!("## Image {n} Analysis"),
        None => "## Image Analysis".to_string(),
    }];

    if d.is_sentinel() {
        lines.push(format!(
            "Sorry, {}. Try retaking the photo in good light, close to the affected leaves.",
            d.narrative_fragment
        ));
        return lines.join("\n");
    }

    let subject = d.subject_name.as_deref().filter(|s| !s.is_empty());

    if d.is_healthy {
        lines.push(format!(
            "Good news: your {} looks healthy ({:.1}% confidence). No disease was detected.",
            subject.map_or_else(|| "plant".to_string(), |s| format!("{s} plant")),
            d.confidence * 100.0
        ));
    } else {
        lines.push(format!("Plant: {}", subject.unwrap_or("Unknown")));
        lines.push(format!(
            "Condition: {}",
            d.condition_name.as_deref().unwrap_or("Unknown")
        ));
        lines.push(format!("Confidence: {:.1}%", d.confidence * 100.0));
        lines.push(format!("Severity: {}", d.severity));
    }

    let alternates: Vec<String> = d
        .raw_results
        .iter()
        .skip(1)
        .take(MAX_ALTERNATES)
        .map(|r| format!("- {} ({:.1}%)", display_name(&r.label), r.score * 100.0))
        .collect();
    if !alternates.is_empty() {
        lines.push(String::new());
        lines.push("Other possibilities:".to_string());
        lines.extend(alternates);
    }

    lines.join("\n")
}
