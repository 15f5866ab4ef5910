//! Advisor Configuration Module
//!
//! Model tiers, API access and request limits loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `CROPSIGHT_CONFIG` environment variable (path to TOML file)
//! 2. `cropsight.toml` in the current working directory
//! 3. Built-in defaults (see `defaults.rs`)
//!
//! ## Usage
//!
//! The loaded config is passed explicitly to the orchestrator; nothing reads
//! it from global state:
//!
//! ```ignore
//! let config = AdvisorConfig::load();
//! let orchestrator = Orchestrator::from_config(config)?;
//! ```

mod advisor_config;
pub mod defaults;
pub mod validation;

pub use advisor_config::*;
