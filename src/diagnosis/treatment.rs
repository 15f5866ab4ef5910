//! Treatment advice rule table
//!
//! Rules are plain data: an ordered list of (substring patterns → actions)
//! evaluated top-to-bottom against the lower-cased condition text. The first
//! rule with any matching pattern wins. Order matters where families overlap
//! ("Leaf blight (Isariopsis Leaf Spot)" is treated as a blight, "Bacterial
//! spot" must be caught before the generic leaf-spot family).

use serde::{Deserialize, Serialize};

/// One entry in the treatment knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentRule {
    /// Short identifier for logs and tests
    pub name: String,
    /// Lower-case substrings; any match selects this rule
    pub patterns: Vec<String>,
    /// Ordered actions, most urgent first
    pub actions: Vec<String>,
}

impl TreatmentRule {
    fn from_static(rule: &StaticRule) -> Self {
        Self {
            name: rule.name.to_string(),
            patterns: rule.patterns.iter().map(|p| p.to_lowercase()).collect(),
            actions: rule.actions.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    /// Whether this rule applies to an already lower-cased condition.
    pub fn matches(&self, condition_lower: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| !p.is_empty() && condition_lower.contains(p.as_str()))
    }
}

struct StaticRule {
    name: &'static str,
    patterns: &'static [&'static str],
    actions: &'static [&'static str],
}

// ============================================================================
// Built-in knowledge base
// ============================================================================

const BUILTIN_RULES: &[StaticRule] = &[
    StaticRule {
        name: "blight",
        patterns: &["blight"],
        actions: &[
            "Apply a copper-based fungicide (e.g. copper oxychloride) every 7-10 days at the first sign of blight",
            "Remove and destroy infected leaves and stems; do not compost them",
            "Water at the base of the plant in the morning and avoid overhead irrigation",
            "Stake and prune plants to improve air circulation",
            "Rotate crops and avoid planting tomato, potato or pepper in the same bed for 2-3 seasons",
        ],
    },
    StaticRule {
        name: "rust",
        patterns: &["rust"],
        actions: &[
            "Apply a sulfur- or myclobutanil-based fungicide as soon as rust pustules appear",
            "Remove heavily infected leaves and nearby alternate hosts (e.g. juniper for cedar apple rust)",
            "Avoid wetting foliage when irrigating",
            "Space plants to keep the canopy dry",
            "Plant rust-resistant varieties next season",
        ],
    },
    StaticRule {
        name: "mildew",
        patterns: &["mildew"],
        actions: &[
            "Spray potassium bicarbonate, sulfur or neem oil at the first sign of mildew",
            "Prune crowded growth to increase airflow and sunlight",
            "Water the soil, not the leaves, preferably early in the day",
            "Remove and bin infected leaves",
            "Avoid excess nitrogen fertilizer, which encourages soft susceptible growth",
        ],
    },
    StaticRule {
        name: "bacterial_spot",
        patterns: &["bacterial spot", "bacterial_spot"],
        actions: &[
            "Spray a copper-based bactericide (copper hydroxide or copper octanoate) every 7-10 days during wet weather",
            "Remove infected leaves and fruit and keep them out of the compost",
            "Avoid working among plants while foliage is wet",
            "Use certified disease-free seed or transplants next season",
            "Rotate away from peppers and tomatoes for at least 2 years",
        ],
    },
    StaticRule {
        name: "leaf_spot",
        patterns: &[
            "leaf spot",
            "leaf_spot",
            "target spot",
            "septoria",
            "cercospora",
            "leaf mold",
            "leaf scorch",
        ],
        actions: &[
            "Apply a chlorothalonil or copper fungicide, repeating after heavy rain",
            "Strip lower infected leaves to slow upward spread",
            "Mulch around the base to stop soil splashing onto leaves",
            "Improve spacing and ventilation, especially in greenhouses",
            "Clear plant debris at the end of the season",
        ],
    },
    StaticRule {
        name: "viral",
        patterns: &["virus", "mosaic", "curl", "yellow leaf"],
        actions: &[
            "Remove and destroy infected plants; viral infections cannot be cured",
            "Control insect vectors such as whiteflies and aphids with yellow sticky traps or insecticidal soap",
            "Disinfect tools and wash hands after handling infected plants",
            "Use reflective mulch or insect netting to protect healthy plants",
            "Plant virus-resistant varieties next season",
        ],
    },
    StaticRule {
        name: "scab",
        patterns: &["scab"],
        actions: &[
            "Apply a captan or sulfur fungicide from bud break through petal fall",
            "Rake and destroy fallen leaves to reduce overwintering spores",
            "Prune to open the canopy and speed leaf drying",
            "Choose scab-resistant varieties when replanting",
        ],
    },
    StaticRule {
        name: "rot",
        patterns: &["rot"],
        actions: &[
            "Remove rotting fruit, mummies and cankered wood from the plant and the ground",
            "Apply a protective fungicide such as captan or mancozeb during the growing season",
            "Improve drainage and avoid waterlogged soil",
            "Prune for airflow and avoid wounding fruit",
        ],
    },
    StaticRule {
        name: "anthracnose",
        patterns: &["anthracnose"],
        actions: &[
            "Apply a copper or chlorothalonil fungicide at 7-14 day intervals",
            "Harvest ripe fruit promptly and remove infected fruit",
            "Avoid overhead irrigation and working among wet plants",
            "Rotate crops and remove crop residue after harvest",
        ],
    },
];

const GENERIC_ACTIONS: &[&str] = &[
    "Isolate the affected plant to prevent possible spread",
    "Consult your local agricultural extension office for a confirmed diagnosis",
    "Consider a broad-spectrum organic treatment such as neem oil if symptoms spread",
    "Monitor neighbouring plants daily for similar symptoms",
    "Document symptoms with dated photos to track progression",
];

/// The built-in rule table, in evaluation order.
pub fn builtin_rules() -> Vec<TreatmentRule> {
    BUILTIN_RULES.iter().map(TreatmentRule::from_static).collect()
}

/// Actions returned when no rule matches.
pub fn generic_actions() -> Vec<String> {
    GENERIC_ACTIONS.iter().map(|a| (*a).to_string()).collect()
}

// ============================================================================
// Advisor
// ============================================================================

/// Selects treatment actions for a condition from an ordered rule table.
#[derive(Debug, Clone)]
pub struct TreatmentAdvisor {
    rules: Vec<TreatmentRule>,
    fallback: Vec<String>,
}

impl TreatmentAdvisor {
    /// Advisor backed by the built-in knowledge base.
    pub fn new() -> Self {
        Self {
            rules: builtin_rules(),
            fallback: generic_actions(),
        }
    }

    /// Built-in rules with `extra` evaluated first.
    pub fn with_extra_rules(extra: &[TreatmentRule]) -> Self {
        let mut rules: Vec<TreatmentRule> = extra
            .iter()
            .map(|r| TreatmentRule {
                name: r.name.clone(),
                patterns: r.patterns.iter().map(|p| p.to_lowercase()).collect(),
                actions: r.actions.clone(),
            })
            .collect();
        rules.extend(builtin_rules());
        Self {
            rules,
            fallback: generic_actions(),
        }
    }

    /// First rule matching the condition, if any.
    pub fn matching_rule(&self, condition: &str) -> Option<&TreatmentRule> {
        let lower = condition.to_lowercase();
        self.rules.iter().find(|r| r.matches(&lower))
    }

    /// Ordered treatment plan for a condition.
    pub fn advise(&self, condition: &str) -> Vec<String> {
        match self.matching_rule(condition) {
            Some(rule) => rule.actions.clone(),
            None => self.fallback.clone(),
        }
    }

    pub fn rules(&self) -> &[TreatmentRule] {
        &self.rules
    }
}

impl Default for TreatmentAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

/// Treatment plan from the built-in knowledge base.
pub fn recommend_treatment(condition: &str) -> Vec<String> {
    TreatmentAdvisor::new().advise(condition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blight_first_action_is_copper_fungicide() {
        for condition in ["Early blight", "Late_blight", "Northern Leaf Blight", "BLIGHT"] {
            let plan = recommend_treatment(condition);
            assert!(
                plan[0].starts_with("Apply a copper-based fungicide"),
                "{condition}: {:?}",
                plan[0]
            );
            assert_ne!(plan, generic_actions());
        }
    }

    #[test]
    fn test_blight_wins_over_leaf_spot() {
        let advisor = TreatmentAdvisor::new();
        let rule = advisor
            .matching_rule("Leaf blight (Isariopsis Leaf Spot)")
            .unwrap();
        assert_eq!(rule.name, "blight");
    }

    #[test]
    fn test_bacterial_spot_gets_bactericide() {
        let plan = recommend_treatment("Bacterial spot");
        assert!(plan[0].contains("copper-based bactericide"));
    }

    #[test]
    fn test_family_routing() {
        let advisor = TreatmentAdvisor::new();
        let cases = [
            ("Common rust", "rust"),
            ("Powdery mildew", "mildew"),
            ("Septoria leaf spot", "leaf_spot"),
            ("Target Spot", "leaf_spot"),
            ("Tomato Yellow Leaf Curl Virus", "viral"),
            ("Tomato mosaic virus", "viral"),
            ("Apple scab", "scab"),
            ("Black rot", "rot"),
            ("Anthracnose", "anthracnose"),
        ];
        for (condition, expected) in cases {
            let rule = advisor.matching_rule(condition);
            assert_eq!(rule.map(|r| r.name.as_str()), Some(expected), "{condition}");
        }
    }

    #[test]
    fn test_unmatched_condition_gets_generic_plan() {
        let plan = recommend_treatment("Spider mites Two-spotted spider mite");
        assert_eq!(plan, generic_actions());
        assert!(plan[0].starts_with("Isolate"));
        assert_eq!(plan.len(), 5);
    }

    #[test]
    fn test_extra_rules_take_precedence() {
        let extra = TreatmentRule {
            name: "local_blight".to_string(),
            patterns: vec!["Early Blight".to_string()],
            actions: vec!["Call the cooperative agronomist".to_string()],
        };
        let advisor = TreatmentAdvisor::with_extra_rules(&[extra]);
        assert_eq!(advisor.advise("early blight"), vec!["Call the cooperative agronomist"]);
        // Built-ins still apply to everything else
        assert!(advisor.advise("Late blight")[0].starts_with("Apply a copper-based fungicide"));
        assert_eq!(advisor.rules().len(), BUILTIN_RULES.len() + 1);
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let extra = TreatmentRule {
            name: "broken".to_string(),
            patterns: vec![String::new()],
            actions: vec!["never".to_string()],
        };
        let advisor = TreatmentAdvisor::with_extra_rules(&[extra]);
        assert_eq!(advisor.advise("something odd"), generic_actions());
    }
}
