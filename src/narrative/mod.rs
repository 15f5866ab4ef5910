//! Narrative synthesis
//!
//! - `builder`: diagnoses → multi-section farmer report
//! - `prompt`: chat prompt template and generated-text cleanup
//! - `responder`: keyword-keyed canned replies when no model answers

pub mod builder;
pub mod prompt;
pub mod responder;

pub use builder::{
    build_narrative, NarrativeBuilder, ADVISORY_HEADING, AI_DISCLAIMER, NO_DIAGNOSIS_MESSAGE,
};
pub use prompt::{build_chat_prompt, clean_generated_text};
pub use responder::{LocalResponder, OFFLINE_PREFIX};
