//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Unknown keys are found by walking the raw `toml::Value` tree before serde
//! deserialization. They only ever warn; range errors reject the config.

use std::collections::HashSet;

use super::AdvisorConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for AdvisorConfig.
///
/// Maintained by hand to match the structs in advisor_config.rs. Arrays of
/// tables (`[[treatment_rules]]`) are not walked, so only their name is listed.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [inference]
        "inference",
        "inference.base_url",
        "inference.api_token_env",
        "inference.request_timeout_secs",
        // [models]
        "models",
        "models.classification",
        "models.transcription",
        "models.generation",
        // [limits]
        "limits",
        "limits.max_assets",
        "limits.max_concurrent_assets",
        "limits.max_asset_bytes",
        // [generation]
        "generation",
        "generation.max_new_tokens",
        "generation.temperature",
        // [[treatment_rules]]
        "treatment_rules",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// A table `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    collect_keys(value, prefix, &mut keys);
    keys
}

fn collect_keys(value: &toml::Value, prefix: &str, out: &mut Vec<String>) {
    let Some(table) = value.as_table() else {
        return;
    };
    for (key, child) in table {
        let path = match prefix {
            "" => key.clone(),
            _ => format!("{prefix}.{key}"),
        };
        out.push(path.clone());
        collect_keys(child, &path, out);
    }
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.to_string())
}

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Parse errors are left for serde to report.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Values the advisor cannot run with. Empty means valid.
pub fn validate_ranges(config: &AdvisorConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.inference.base_url.trim().is_empty() {
        errors.push("inference.base_url must not be empty".to_string());
    }
    if config.inference.request_timeout_secs == 0 {
        errors.push("inference.request_timeout_secs must be > 0".to_string());
    }

    // Generation may be empty (local responder answers), the others may not
    if config.models.classification.is_empty() {
        errors.push("models.classification needs at least one model".to_string());
    }
    if config.models.transcription.is_empty() {
        errors.push("models.transcription needs at least one model".to_string());
    }
    for (task, tiers) in [
        ("classification", &config.models.classification),
        ("transcription", &config.models.transcription),
        ("generation", &config.models.generation),
    ] {
        if tiers.iter().any(|m| m.trim().is_empty()) {
            errors.push(format!("models.{task} contains an empty model identifier"));
        }
    }

    if config.limits.max_assets == 0 {
        errors.push("limits.max_assets must be > 0".to_string());
    }
    if config.limits.max_concurrent_assets == 0 {
        errors.push("limits.max_concurrent_assets must be > 0".to_string());
    }
    if config.limits.max_asset_bytes == 0 {
        errors.push("limits.max_asset_bytes must be > 0".to_string());
    }

    let t = config.generation.temperature;
    if !(0.0..=2.0).contains(&t) {
        errors.push(format!("generation.temperature = {t:.2} is outside 0.0-2.0"));
    }
    if config.generation.max_new_tokens == 0 {
        errors.push("generation.max_new_tokens must be > 0".to_string());
    }

    for rule in &config.treatment_rules {
        if rule.patterns.iter().all(|p| p.trim().is_empty()) {
            errors.push(format!("treatment_rules '{}' has no usable pattern", rule.name));
        }
        if rule.actions.is_empty() {
            errors.push(format!("treatment_rules '{}' has no actions", rule.name));
        }
    }

    errors
}
