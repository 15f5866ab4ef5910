//! Rule-based chat responder, the last resort when no generation model answers
//!
//! Replies are keyed by coarse keyword matching: the message is lower-cased,
//! split into words, and the first rule with a keyword that prefixes any word
//! (or, for short abbreviations, equals a word) wins. It cannot fail.

/// Leads every canned reply so the farmer knows the answer is generic.
pub const OFFLINE_PREFIX: &str =
    "Our AI advisor is unavailable right now, so here is some general guidance.";

struct ResponderRule {
    name: &'static str,
    keywords: &'static [&'static str],
    /// Matched against whole words only
    exact: &'static [&'static str],
    reply: &'static str,
}

const RESPONDER_RULES: &[ResponderRule] = &[
    ResponderRule {
        name: "disease",
        keywords: &[
            "disease", "blight", "spot", "rust", "mildew", "fung", "rot", "wilt", "mold", "mould",
            "sick", "lesion",
        ],
        exact: &[],
        reply: "Plant diseases are easiest to identify from a photo: send a clear, close-up \
                picture of the affected leaves in daylight. Meanwhile, remove badly affected \
                leaves, avoid wetting foliage when watering, and keep tools clean between plants.",
    },
    ResponderRule {
        name: "pests",
        keywords: &[
            "pest", "insect", "aphid", "worm", "caterpillar", "beetle", "mite", "whitefl", "bug",
            "locust", "weevil",
        ],
        exact: &[],
        reply: "Inspect the undersides of leaves and growing tips for insects and eggs. \
                Hand-pick larger pests, spray soapy water or neem oil for soft-bodied insects, \
                and encourage natural enemies by keeping flowering plants nearby.",
    },
    ResponderRule {
        name: "watering",
        keywords: &["water", "irrigat", "drought", "dry", "rain"],
        exact: &[],
        reply: "Water deeply and less often, early in the morning, at the base of the plant. \
                Mulch with straw or dry grass to keep moisture in the soil, and check that \
                fields drain well after heavy rain.",
    },
    ResponderRule {
        name: "nutrition",
        keywords: &[
            "fertili", "nutrient", "manure", "compost", "nitrogen", "npk", "yellow", "urea",
        ],
        exact: &[],
        reply: "Yellowing older leaves often point to nitrogen shortage. Add well-rotted manure \
                or compost, and if you use mineral fertilizer, split the dose across the season. \
                A soil test from your extension office will show exactly what is missing.",
    },
    ResponderRule {
        name: "soil",
        keywords: &["soil", "erosion", "acid", "salin", "lime"],
        exact: &["ph"],
        reply: "Healthy soil starts with organic matter: add compost, rotate crops, and keep the \
                ground covered between seasons. Ask your local extension office about a soil \
                test to check pH and nutrient levels.",
    },
    ResponderRule {
        name: "planting",
        keywords: &["plant", "sow", "seed", "harvest", "season", "spacing"],
        exact: &[],
        reply: "Use certified seed of locally recommended varieties, plant at the start of the \
                reliable rains, and follow the spacing on the seed packet. Rotating crop families \
                each season reduces pest and disease build-up.",
    },
    ResponderRule {
        name: "greeting",
        keywords: &["hello", "hey", "greetings", "thanks", "thank"],
        exact: &[],
        reply: "Hello! Ask me about crop diseases, pests, watering, soil or fertilizer, \
                or send a photo of a plant you are worried about.",
    },
];

const DEFAULT_REPLY: &str = "I can help with crop diseases, pests, watering, soil and fertilizer. \
     For a specific problem, send a clear photo of the affected plant or describe the symptoms \
     in more detail. Your local agricultural extension office can also advise.";

/// Canned, always-available replies for free-text questions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalResponder;

impl LocalResponder {
    pub fn new() -> Self {
        Self
    }

    /// Name of the rule that would answer `message`, if any.
    pub fn matching_rule(&self, message: &str) -> Option<&'static str> {
        find_rule(message).map(|r| r.name)
    }

    /// Reply to a message. Never fails.
    pub fn respond(&self, message: &str) -> String {
        let reply = find_rule(message).map_or(DEFAULT_REPLY, |r| r.reply);
        format!("{OFFLINE_PREFIX}\n\n{reply}")
    }
}

fn find_rule(message: &str) -> Option<&'static ResponderRule> {
    let lower = message.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    RESPONDER_RULES.iter().find(|rule| {
        words.iter().any(|w| {
            rule.keywords.iter().any(|kw| w.starts_with(kw))
                || rule.exact.iter().any(|e| *e == *w)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_routing() {
        let responder = LocalResponder::new();
        let cases = [
            ("My tomato leaves have brown spots", Some("disease")),
            ("Aphids everywhere on my beans!", Some("pests")),
            ("How much should I irrigate maize?", Some("watering")),
            ("Which fertilizer for cassava", Some("nutrition")),
            ("My soil is very acidic", Some("soil")),
            ("When to sow sorghum", Some("planting")),
            ("hello there", Some("greeting")),
            ("what is the price of diesel", None),
        ];
        for (message, expected) in cases {
            assert_eq!(responder.matching_rule(message), expected, "{message}");
        }
    }

    #[test]
    fn test_abbreviations_match_whole_words_only() {
        let responder = LocalResponder::new();
        assert_eq!(responder.matching_rule("What pH suits beans?"), Some("soil"));
        assert_eq!(responder.matching_rule("can I send a photo?"), None);
        assert_eq!(responder.matching_rule("my phone number changed"), None);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "rot" (disease) and "water" (watering) both present
        let responder = LocalResponder::new();
        assert_eq!(
            responder.matching_rule("root rot after too much water"),
            Some("disease")
        );
    }

    #[test]
    fn test_keywords_match_word_starts_only() {
        // "carrot" must not trigger the "rot" keyword
        let responder = LocalResponder::new();
        assert_eq!(responder.matching_rule("carrot prices"), None);
    }

    #[test]
    fn test_reply_always_prefixed_and_non_empty() {
        let responder = LocalResponder::new();
        for message in ["", "???", "pests", "blight"] {
            let reply = responder.respond(message);
            assert!(reply.starts_with(OFFLINE_PREFIX));
            assert!(reply.len() > OFFLINE_PREFIX.len());
        }
    }
}
