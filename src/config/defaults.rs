//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery. Every value here can be overridden
//! through `cropsight.toml` except where noted.

// ============================================================================
// Inference API
// ============================================================================

/// Root of the hosted inference API.
pub const INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Environment variable holding the API token.
pub const API_TOKEN_ENV: &str = "HF_API_TOKEN";

/// Per-request HTTP timeout (seconds). Cold-starting models can take a while
/// to answer even when they do not return 503.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Model tiers
// ============================================================================

/// Plant-disease image classifier (PlantVillage label set).
pub const CLASSIFICATION_MODEL: &str = "linkanjarad/mobilenet_v2_1.0_224-plant-disease-identification";

/// English-only speech model, tried first.
pub const TRANSCRIPTION_PRIMARY_MODEL: &str = "distil-whisper/distil-large-v3";

/// General-purpose multilingual speech model, tried second.
pub const TRANSCRIPTION_FALLBACK_MODEL: &str = "openai/whisper-large-v3";

/// Instruction-tuned text model for free-text questions.
pub const GENERATION_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";

// ============================================================================
// Request limits
// ============================================================================

/// Maximum assets accepted in one request.
pub const MAX_ASSETS: usize = 5;

/// Maximum assets classified concurrently within one request.
pub const MAX_CONCURRENT_ASSETS: usize = 5;

/// Largest accepted asset (bytes). 10 MiB.
pub const MAX_ASSET_BYTES: u64 = 10 * 1024 * 1024;

// ============================================================================
// Generation
// ============================================================================

pub const GENERATION_MAX_NEW_TOKENS: u32 = 400;

pub const GENERATION_TEMPERATURE: f32 = 0.7;
