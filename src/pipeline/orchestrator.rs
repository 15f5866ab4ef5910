//! Orchestrator - request-level entry points for diagnosis, chat and transcription
//!
//! ## Diagnosis flow
//!
//! ```text
//! assets ──► [cascade → parse → severity] × N   (bounded, concurrent)
//!        ──► re-assembled in submission order
//!        ──► NarrativeBuilder ──► narrative + per-asset summaries
//! ```
//!
//! A failed asset never fails the request: it becomes a sentinel diagnosis
//! and the narrative still completes. Each asset pipeline is independent; the
//! only shared state is the request counters, updated after the fan-out joins.
//!
//! ## Chat flow
//!
//! Attached images turn a chat message into a diagnosis with the message as
//! context. Text-only messages go through the generation cascade, and the
//! local responder answers once every remote tier is exhausted.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::assets::Asset;
use crate::config::{AdvisorConfig, LimitsConfig};
use crate::diagnosis::{diagnose_classifications, TreatmentAdvisor};
use crate::inference::{
    CascadeError, FallbackCascade, HttpInferenceClient, ImageClassifier, InferenceError,
    TextGenerator, Transcriber,
};
use crate::narrative::{build_chat_prompt, clean_generated_text, LocalResponder, NarrativeBuilder};
use crate::types::{
    AssetSummary, ChatResponse, DiagnoseResponse, DiagnosisResult, ReplySource,
    TranscriptionResponse,
};

// ============================================================================
// Errors
// ============================================================================

/// Request-level failures surfaced to the collaborator.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("too many assets: {got} submitted, at most {max} allowed")]
    TooManyAssets { max: usize, got: usize },

    #[error("request contains neither a message nor any assets")]
    EmptyRequest,

    #[error("asset {name} is {size} bytes, the limit is {max}")]
    AssetTooLarge { name: String, size: u64, max: u64 },

    #[error("failed to read asset {name}: {source}")]
    AssetRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transcription failed: {0}")]
    Transcription(#[source] CascadeError),

    #[error("failed to build HTTP inference client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl OrchestratorError {
    /// Whether resubmitting the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transcription(e) if e.is_retryable())
    }
}

// ============================================================================
// Backends & Stats
// ============================================================================

/// Remote backends used by the orchestrator, one per task.
#[derive(Clone)]
pub struct InferenceBackends {
    pub classifier: Arc<dyn ImageClassifier>,
    pub transcriber: Arc<dyn Transcriber>,
    pub generator: Arc<dyn TextGenerator>,
}

impl InferenceBackends {
    /// Use one backend for every task.
    pub fn shared<B>(backend: B) -> Self
    where
        B: ImageClassifier + Transcriber + TextGenerator + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            classifier: backend.clone(),
            transcriber: backend.clone(),
            generator: backend,
        }
    }
}

/// Request counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrchestratorStats {
    pub diagnose_requests: u64,
    pub assets_analysed: u64,
    pub sentinel_substitutions: u64,
    pub chat_requests: u64,
    pub local_responder_replies: u64,
    pub transcriptions: u64,
    pub transcription_failures: u64,
}

impl std::fmt::Display for OrchestratorStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Orchestrator: {} diagnoses ({} assets, {} sentinels), {} chats ({} local), {} transcriptions ({} failed)",
            self.diagnose_requests,
            self.assets_analysed,
            self.sentinel_substitutions,
            self.chat_requests,
            self.local_responder_replies,
            self.transcriptions,
            self.transcription_failures
        )
    }
}

/// Diagnosis of one asset plus the tier that produced it.
struct AssetOutcome {
    diagnosis: DiagnosisResult,
    model: Option<String>,
}

impl AssetOutcome {
    fn sentinel(asset: &Asset) -> Self {
        Self {
            diagnosis: DiagnosisResult::sentinel(asset.name()),
            model: None,
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Entry point for the core's public operations.
pub struct Orchestrator {
    backends: InferenceBackends,
    classification: FallbackCascade,
    transcription: FallbackCascade,
    generation: FallbackCascade,
    limits: LimitsConfig,
    narrative: NarrativeBuilder,
    responder: LocalResponder,
    stats: Mutex<OrchestratorStats>,
}

impl Orchestrator {
    /// Create an orchestrator over explicit backends (fakes in tests).
    pub fn new(config: &AdvisorConfig, backends: InferenceBackends) -> Self {
        let orchestrator = Self {
            backends,
            classification: FallbackCascade::new(
                "classification",
                config.models.classification.clone(),
            ),
            transcription: FallbackCascade::new(
                "transcription",
                config.models.transcription.clone(),
            ),
            generation: FallbackCascade::new("generation", config.models.generation.clone()),
            limits: config.limits.clone(),
            narrative: NarrativeBuilder::new(TreatmentAdvisor::with_extra_rules(
                &config.treatment_rules,
            )),
            responder: LocalResponder::new(),
            stats: Mutex::new(OrchestratorStats::default()),
        };

        info!(
            classifier = orchestrator.backends.classifier.backend_name(),
            transcriber = orchestrator.backends.transcriber.backend_name(),
            generator = orchestrator.backends.generator.backend_name(),
            treatment_rules = orchestrator.narrative.advisor().rules().len(),
            "Orchestrator initialized"
        );
        for cascade in orchestrator.cascades() {
            info!(task = cascade.task(), tiers = ?cascade.tiers(), "Model tiers");
        }

        orchestrator
    }

    /// The classification, transcription and generation cascades, in that order.
    pub fn cascades(&self) -> [&FallbackCascade; 3] {
        [&self.classification, &self.transcription, &self.generation]
    }

    /// Create an orchestrator backed by the HTTP inference client.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self, OrchestratorError> {
        let client = HttpInferenceClient::from_config(config)?;
        info!(base_url = %client.base_url(), "Using HTTP inference backend");
        Ok(Self::new(config, InferenceBackends::shared(client)))
    }

    /// Snapshot of the request counters.
    pub async fn stats(&self) -> OrchestratorStats {
        *self.stats.lock().await
    }

    // ------------------------------------------------------------------------
    // Diagnosis
    // ------------------------------------------------------------------------

    /// Diagnose every asset and compose the narrative.
    pub async fn diagnose(
        &self,
        assets: &[Asset],
        user_context: &str,
    ) -> Result<DiagnoseResponse, OrchestratorError> {
        self.diagnose_cancellable(assets, user_context, CancellationToken::new())
            .await
    }

    /// Diagnose within a time budget.
    ///
    /// Assets still in flight when the budget runs out are abandoned and
    /// reported as sentinels; finished ones are kept.
    pub async fn diagnose_with_deadline(
        &self,
        assets: &[Asset],
        user_context: &str,
        budget: Duration,
    ) -> Result<DiagnoseResponse, OrchestratorError> {
        let cancel = CancellationToken::new();
        let timer_token = cancel.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(budget).await;
            timer_token.cancel();
        });

        let result = self.diagnose_cancellable(assets, user_context, cancel).await;
        timer.abort();
        result
    }

    /// Diagnose until `cancel` fires, then collect whatever finished.
    pub async fn diagnose_cancellable(
        &self,
        assets: &[Asset],
        user_context: &str,
        cancel: CancellationToken,
    ) -> Result<DiagnoseResponse, OrchestratorError> {
        self.check_asset_count(assets.len())?;
        info!(assets = assets.len(), "Diagnosing assets");

        // `buffered` yields in input order regardless of completion order
        let outcomes: Vec<AssetOutcome> = stream::iter(assets)
            .map(|asset| {
                let cancel = cancel.clone();
                async move {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => {
                            warn!(asset = %asset.name(), "Request cancelled, abandoning asset");
                            AssetOutcome::sentinel(asset)
                        }
                        outcome = self.analyse_asset(asset) => outcome,
                    }
                }
            })
            .buffered(self.limits.max_concurrent_assets.max(1))
            .collect()
            .await;

        let summaries: Vec<AssetSummary> = assets
            .iter()
            .zip(&outcomes)
            .map(|(asset, o)| AssetSummary::from_diagnosis(asset.name(), o.model.clone(), &o.diagnosis))
            .collect();
        let sentinels = outcomes.iter().filter(|o| o.diagnosis.is_sentinel()).count();
        let diagnoses: Vec<DiagnosisResult> = outcomes.into_iter().map(|o| o.diagnosis).collect();

        let narrative = self.narrative.build(&diagnoses, user_context);

        {
            let mut stats = self.stats.lock().await;
            stats.diagnose_requests += 1;
            stats.assets_analysed += assets.len() as u64;
            stats.sentinel_substitutions += sentinels as u64;
        }

        info!(
            assets = assets.len(),
            sentinels,
            narrative_chars = narrative.len(),
            "Diagnosis complete"
        );

        Ok(DiagnoseResponse {
            narrative,
            summaries,
        })
    }

    /// Run one asset through the classification cascade. Never fails.
    async fn analyse_asset(&self, asset: &Asset) -> AssetOutcome {
        match asset.size().await {
            Ok(size) if size > self.limits.max_asset_bytes => {
                warn!(
                    asset = %asset.name(),
                    size,
                    max = self.limits.max_asset_bytes,
                    "Asset too large, substituting sentinel"
                );
                return AssetOutcome::sentinel(asset);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(asset = %asset.name(), error = %e, "Asset unreadable, substituting sentinel");
                return AssetOutcome::sentinel(asset);
            }
        }

        let classifier = &self.backends.classifier;
        let result = self
            .classification
            .run(|model| async move {
                // Read per attempt; the bytes are dropped when the attempt ends
                let image = asset.read().await.map_err(|e| {
                    InferenceError::hard(&model, format!("failed to read {}: {e}", asset.name()))
                })?;
                let results = classifier.classify(image, &model).await?;
                diagnose_classifications(results)
                    .ok_or_else(|| InferenceError::hard(&model, "no usable classification scores"))
            })
            .await;

        match result {
            Ok(success) => AssetOutcome {
                diagnosis: success.value,
                model: Some(success.tier),
            },
            Err(e) => {
                warn!(
                    asset = %asset.name(),
                    backend = self.backends.classifier.backend_name(),
                    error = %e,
                    retryable = e.is_retryable(),
                    "Classification exhausted, substituting sentinel"
                );
                AssetOutcome::sentinel(asset)
            }
        }
    }

    fn check_asset_count(&self, got: usize) -> Result<(), OrchestratorError> {
        if got > self.limits.max_assets {
            return Err(OrchestratorError::TooManyAssets {
                max: self.limits.max_assets,
                got,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------------

    /// Answer a chat message, optionally with attached images.
    pub async fn chat(
        &self,
        message: &str,
        assets: &[Asset],
    ) -> Result<ChatResponse, OrchestratorError> {
        self.stats.lock().await.chat_requests += 1;

        if !assets.is_empty() {
            let diagnosis = self.diagnose(assets, message).await?;
            return Ok(ChatResponse {
                narrative: diagnosis.narrative,
                source: ReplySource::Diagnosis,
            });
        }

        let message = message.trim();
        if message.is_empty() {
            return Err(OrchestratorError::EmptyRequest);
        }

        let prompt = build_chat_prompt(message);
        let prompt = prompt.as_str();
        let generator = &self.backends.generator;

        let result = self
            .generation
            .run(|model| async move {
                let raw = generator.generate(prompt, &model).await?;
                let text = clean_generated_text(&raw, prompt);
                if text.is_empty() {
                    return Err(InferenceError::hard(&model, "generation produced no usable text"));
                }
                Ok(text)
            })
            .await;

        match result {
            Ok(success) => Ok(ChatResponse {
                narrative: success.value,
                source: ReplySource::Remote {
                    model: success.tier,
                },
            }),
            Err(e) => {
                warn!(
                    backend = self.backends.generator.backend_name(),
                    error = %e,
                    retryable = e.is_retryable(),
                    "Generation exhausted, answering with local responder"
                );
                self.stats.lock().await.local_responder_replies += 1;
                Ok(ChatResponse {
                    narrative: self.responder.respond(message),
                    source: ReplySource::LocalResponder,
                })
            }
        }
    }

    // ------------------------------------------------------------------------
    // Transcription
    // ------------------------------------------------------------------------

    /// Transcribe a voice recording.
    pub async fn transcribe(&self, audio: &Asset) -> Result<TranscriptionResponse, OrchestratorError> {
        self.stats.lock().await.transcriptions += 1;

        let size = audio.size().await.map_err(|source| OrchestratorError::AssetRead {
            name: audio.name().to_string(),
            source,
        })?;
        if size > self.limits.max_asset_bytes {
            return Err(OrchestratorError::AssetTooLarge {
                name: audio.name().to_string(),
                size,
                max: self.limits.max_asset_bytes,
            });
        }

        let mime_type = audio.audio_mime_type();
        let mime = mime_type.as_str();
        let transcriber = &self.backends.transcriber;

        let result = self
            .transcription
            .run(|model| async move {
                let bytes = audio.read().await.map_err(|e| {
                    InferenceError::hard(&model, format!("failed to read {}: {e}", audio.name()))
                })?;
                let text = transcriber.transcribe(bytes, mime, &model).await?;
                let text = text.trim();
                if text.is_empty() {
                    return Err(InferenceError::hard(&model, "empty transcript"));
                }
                Ok(text.to_string())
            })
            .await;

        match result {
            Ok(success) => {
                info!(model = %success.tier, chars = success.value.len(), "Transcription complete");
                Ok(TranscriptionResponse {
                    text: success.value,
                    model: success.tier,
                })
            }
            Err(e) => {
                self.stats.lock().await.transcription_failures += 1;
                warn!(
                    backend = self.backends.transcriber.backend_name(),
                    error = %e,
                    retryable = e.is_retryable(),
                    "Transcription exhausted"
                );
                Err(OrchestratorError::Transcription(e))
            }
        }
    }
}
