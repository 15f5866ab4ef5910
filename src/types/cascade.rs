//! Cascade bookkeeping: what happened at each tier of a fallback run

/// Outcome of calling a single tier.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    Success,
    /// Remote endpoint reported it is still loading the model
    TransientUnavailable {
        estimated_time: Option<f64>,
    },
    HardFailure(String),
}

impl TierOutcome {
    pub fn is_transient(&self) -> bool {
        matches!(self, TierOutcome::TransientUnavailable { .. })
    }
}

/// Record of one tier attempt. Lives only for the duration of a cascade run.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeAttempt {
    pub tier: String,
    pub outcome: TierOutcome,
}
