//! Prompt construction and generated-text cleanup for free-text questions

use regex::Regex;
use std::sync::OnceLock;

/// System instructions for the farming assistant.
const FARM_ASSISTANT_PROMPT: &str = r#"You are an agricultural extension assistant helping smallholder farmers.
Answer the farmer's question in plain language.

### INSTRUCTIONS
1. Give practical, low-cost steps the farmer can take this week.
2. Prefer cultural and organic controls; name chemical products only when necessary and always add safety precautions.
3. If the question is about a sick plant, ask for a clear photo of the affected leaves.
4. Keep the answer under 200 words. No markdown tables.

### FARMER'S QUESTION
{question}"#;

/// Wrap a farmer's message in the instruction template.
pub fn build_chat_prompt(question: &str) -> String {
    let body = FARM_ASSISTANT_PROMPT.replace("{question}", question.trim());
    format!("<s>[INST] {body} [/INST]")
}

fn reasoning_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").expect("static regex"))
}

fn role_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*(assistant|answer|response)\s*:\s*").expect("static regex"))
}

/// Strip prompt echoes, reasoning blocks and role prefixes from model output.
///
/// Returns an empty string when nothing usable is left.
pub fn clean_generated_text(raw: &str, prompt: &str) -> String {
    let text = raw.strip_prefix(prompt).unwrap_or(raw);
    let text = reasoning_block_re().replace_all(text, "");
    let text = text.replace("[/INST]", "").replace("</s>", "");
    role_prefix_re().replace(text.trim(), "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_trimmed_question() {
        let prompt = build_chat_prompt("  When should I plant maize?  ");
        assert!(prompt.starts_with("<s>[INST]"));
        assert!(prompt.ends_with("[/INST]"));
        assert!(prompt.contains("### FARMER'S QUESTION\nWhen should I plant maize?"));
    }

    #[test]
    fn test_clean_strips_echo_and_prefix() {
        let prompt = build_chat_prompt("How often should I water beans?");
        let raw = format!("{prompt} Answer: Water twice a week at the base.</s>");
        assert_eq!(clean_generated_text(&raw, &prompt), "Water twice a week at the base.");
    }

    #[test]
    fn test_clean_strips_reasoning_blocks() {
        let raw = "<think>\nthe farmer wants...\n</think>\nMulch to keep moisture in.";
        assert_eq!(clean_generated_text(raw, "unrelated"), "Mulch to keep moisture in.");
    }

    #[test]
    fn test_clean_can_leave_nothing() {
        assert!(clean_generated_text("<think>hmm</think>   </s>", "p").is_empty());
    }
}
