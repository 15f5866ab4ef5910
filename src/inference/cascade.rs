//! Model fallback cascade
//!
//! Calls an ordered list of model tiers until one produces a usable result.
//! Each tier is tried at most once and the walk only moves forward. When
//! every tier is exhausted the terminal error says whether the caller can
//! simply retry later (every tier was cold-starting) or whether something is
//! actually broken.

use std::future::Future;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::InferenceError;
use crate::types::{CascadeAttempt, TierOutcome};

/// Terminal cascade failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CascadeError {
    /// No tiers configured for this task
    #[error("no {task} models configured")]
    NoTiers { task: &'static str },

    /// Every tier reported it is still loading; retry after a delay
    #[error("all {tiers} {task} model(s) are still loading, retry shortly")]
    AllTiersLoading {
        task: &'static str,
        tiers: usize,
        retry_after_secs: Option<f64>,
    },

    /// At least one tier failed outright; retrying unchanged will not help
    #[error("all {tiers} {task} model(s) failed, check configuration: {last_reason}")]
    AllTiersFailed {
        task: &'static str,
        tiers: usize,
        last_reason: String,
    },
}

impl CascadeError {
    /// Whether the caller may retry the same request after a delay.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AllTiersLoading { .. })
    }
}

/// Successful cascade result and the tier that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeSuccess<T> {
    pub tier: String,
    pub value: T,
}

/// Ordered tier list for one inference task.
#[derive(Debug, Clone)]
pub struct FallbackCascade {
    task: &'static str,
    tiers: Vec<String>,
}

impl FallbackCascade {
    pub fn new(task: &'static str, tiers: Vec<String>) -> Self {
        Self { task, tiers }
    }

    pub fn task(&self) -> &'static str {
        self.task
    }

    pub fn tiers(&self) -> &[String] {
        &self.tiers
    }

    /// Walk the tiers, calling `call` with each model identifier in order.
    ///
    /// Returns the first success. Transient and hard failures both advance to
    /// the next tier; the same tier is never called twice.
    pub async fn run<T, F, Fut>(&self, mut call: F) -> Result<CascadeSuccess<T>, CascadeError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, InferenceError>>,
    {
        if self.tiers.is_empty() {
            return Err(CascadeError::NoTiers { task: self.task });
        }

        let mut attempts: Vec<CascadeAttempt> = Vec::with_capacity(self.tiers.len());

        for tier in &self.tiers {
            debug!(task = self.task, tier = %tier, "Attempting tier");

            let outcome = match call(tier.clone()).await {
                Ok(value) => {
                    if !attempts.is_empty() {
                        info!(
                            task = self.task,
                            tier = %tier,
                            skipped = attempts.len(),
                            "Fallback tier succeeded"
                        );
                    }
                    return Ok(CascadeSuccess {
                        tier: tier.clone(),
                        value,
                    });
                }
                Err(InferenceError::TransientUnavailable { estimated_time, .. }) => {
                    warn!(task = self.task, tier = %tier, ?estimated_time, "Tier is loading, advancing");
                    TierOutcome::TransientUnavailable { estimated_time }
                }
                Err(InferenceError::HardFailure { reason, .. }) => {
                    warn!(task = self.task, tier = %tier, reason = %reason, "Tier failed, advancing");
                    TierOutcome::HardFailure(reason)
                }
            };

            attempts.push(CascadeAttempt {
                tier: tier.clone(),
                outcome,
            });
        }

        Err(self.exhausted(&attempts))
    }

    fn exhausted(&self, attempts: &[CascadeAttempt]) -> CascadeError {
        if attempts.iter().all(|a| a.outcome.is_transient()) {
            let retry_after_secs = attempts
                .iter()
                .filter_map(|a| match a.outcome {
                    TierOutcome::TransientUnavailable { estimated_time } => estimated_time,
                    _ => None,
                })
                .reduce(f64::max);
            CascadeError::AllTiersLoading {
                task: self.task,
                tiers: attempts.len(),
                retry_after_secs,
            }
        } else {
            let last_reason = attempts
                .iter()
                .rev()
                .find_map(|a| match &a.outcome {
                    TierOutcome::HardFailure(reason) => Some(reason.clone()),
                    _ => None,
                })
                .unwrap_or_default();
            CascadeError::AllTiersFailed {
                task: self.task,
                tiers: attempts.len(),
                last_reason,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn tiers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn loading(model: &str, eta: Option<f64>) -> InferenceError {
        InferenceError::TransientUnavailable {
            model: model.to_string(),
            estimated_time: eta,
        }
    }

    #[test]
    fn test_transient_then_success_stops_early() {
        let cascade = FallbackCascade::new("classification", tiers(&["A", "B", "C"]));
        let calls = Mutex::new(Vec::new());

        let result = tokio_test::block_on(cascade.run(|tier| {
            calls.lock().unwrap().push(tier.clone());
            async move {
                match tier.as_str() {
                    "A" => Err(loading("A", Some(20.0))),
                    "B" => Ok("payload-from-B"),
                    _ => Ok("payload-from-C"),
                }
            }
        }))
        .unwrap();

        assert_eq!(result.value, "payload-from-B");
        assert_eq!(result.tier, "B");
        assert_eq!(*calls.lock().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_each_tier_called_once_in_order() {
        let cascade = FallbackCascade::new("transcription", tiers(&["narrow", "general"]));
        let calls = Mutex::new(Vec::new());

        let result: Result<CascadeSuccess<()>, _> = tokio_test::block_on(cascade.run(|tier| {
            calls.lock().unwrap().push(tier.clone());
            async move { Err(InferenceError::hard(&tier, "bad request")) }
        }));

        assert!(result.is_err());
        assert_eq!(*calls.lock().unwrap(), vec!["narrow", "general"]);
    }

    #[test]
    fn test_all_loading_is_retryable() {
        let cascade = FallbackCascade::new("transcription", tiers(&["a", "b"]));
        let err = tokio_test::block_on(cascade.run(|tier| async move {
            let eta = if tier == "a" { Some(12.0) } else { Some(30.5) };
            Err::<(), _>(loading(&tier, eta))
        }))
        .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(
            err,
            CascadeError::AllTiersLoading {
                task: "transcription",
                tiers: 2,
                retry_after_secs: Some(30.5),
            }
        );
    }

    #[test]
    fn test_mixed_failures_are_not_retryable() {
        let cascade = FallbackCascade::new("generation", tiers(&["a", "b"]));
        let err = tokio_test::block_on(cascade.run(|tier| async move {
            if tier == "a" {
                Err::<(), _>(InferenceError::hard(&tier, "401 unauthorized"))
            } else {
                Err(loading(&tier, None))
            }
        }))
        .unwrap_err();

        assert!(!err.is_retryable());
        match err {
            CascadeError::AllTiersFailed { tiers, last_reason, .. } => {
                assert_eq!(tiers, 2);
                assert_eq!(last_reason, "401 unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_tier_list() {
        let cascade = FallbackCascade::new("generation", Vec::new());
        let err = tokio_test::block_on(cascade.run(|_| async { Ok::<_, InferenceError>(()) }))
            .unwrap_err();
        assert_eq!(err, CascadeError::NoTiers { task: "generation" });
    }
}
