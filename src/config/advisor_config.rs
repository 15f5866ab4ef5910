//! Advisor Configuration - model tiers, API access and request limits as TOML values
//!
//! Each struct implements `Default` with the values in `defaults.rs`, so the
//! advisor runs unchanged when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::diagnosis::TreatmentRule;
use crate::inference::GenerationParams;

/// Environment variable pointing at a config file.
pub const CONFIG_ENV: &str = "CROPSIGHT_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "cropsight.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the advisor.
///
/// Load with `AdvisorConfig::load()` which searches:
/// 1. `$CROPSIGHT_CONFIG` env var
/// 2. `./cropsight.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Remote inference API access
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Ordered model tiers per task
    #[serde(default)]
    pub models: ModelTiers,

    /// Per-request limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Text generation sampling
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Site-specific treatment rules, evaluated before the built-in table
    #[serde(default)]
    pub treatment_rules: Vec<TreatmentRule>,
}

impl AdvisorConfig {
    /// Load configuration using the standard search order:
    /// 1. `$CROPSIGHT_CONFIG` environment variable
    /// 2. `./cropsight.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded advisor config from {}", CONFIG_ENV);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded advisor config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Unknown keys only warn; serde ignores them below
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Reject values the advisor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = super::validation::validate_ranges(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Config Error
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Sections
// ============================================================================

/// Remote inference API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// API root; model endpoints live under `{base_url}/models/{model}`
    pub base_url: String,
    /// Name of the environment variable holding the bearer token
    pub api_token_env: String,
    /// Per-request HTTP timeout (seconds)
    pub request_timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::INFERENCE_BASE_URL.to_string(),
            api_token_env: defaults::API_TOKEN_ENV.to_string(),
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

impl InferenceConfig {
    /// Resolve the API token from the configured environment variable.
    pub fn api_token(&self) -> Option<String> {
        std::env::var(&self.api_token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Ordered model identifiers per task, most preferred first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelTiers {
    pub classification: Vec<String>,
    pub transcription: Vec<String>,
    /// May be empty: the local responder still answers chat
    pub generation: Vec<String>,
}

impl Default for ModelTiers {
    fn default() -> Self {
        Self {
            classification: vec![defaults::CLASSIFICATION_MODEL.to_string()],
            transcription: vec![
                defaults::TRANSCRIPTION_PRIMARY_MODEL.to_string(),
                defaults::TRANSCRIPTION_FALLBACK_MODEL.to_string(),
            ],
            generation: vec![defaults::GENERATION_MODEL.to_string()],
        }
    }
}

/// Per-request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_assets: usize,
    pub max_concurrent_assets: usize,
    pub max_asset_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_assets: defaults::MAX_ASSETS,
            max_concurrent_assets: defaults::MAX_CONCURRENT_ASSETS,
            max_asset_bytes: defaults::MAX_ASSET_BYTES,
        }
    }
}

/// Text generation sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: defaults::GENERATION_MAX_NEW_TOKENS,
            temperature: defaults::GENERATION_TEMPERATURE,
        }
    }
}

impl GenerationConfig {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.max_new_tokens,
            temperature: self.temperature,
        }
    }
}
