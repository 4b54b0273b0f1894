/*!
 * The translation core service.
 *
 * One `process` call takes a request through validation of the source
 * text, the cache, the primary backend, output validation and, when
 * anything recoverable goes wrong, the recovery engine. The scheduler
 * dispatches into this service through the `RequestProcessor` seam.
 */

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::app_config::Config;
use crate::backends::{
    BackendFailure, FallbackGenerator, PurityValidator, TerminologyValidator, TranslationBackend,
    TranslationOutput,
};
use crate::cache::{QualityCache, QualityMetrics, WriteOutcome};
use crate::detector::{Blacklist, PatternDetector};
use crate::errors::{CoreError, PurityViolationError, RequestError};
use crate::pipeline::{Stage, StageStatus, ValidationPipeline};
use crate::recovery::{ContaminatedOutput, RecoveryEngine, RecoveryStats};
use crate::request::{ProcessedTranslation, TranslationMethod, TranslationRequest};
use crate::scheduler::RequestProcessor;

/// Failure raised inside the translation path, carrying the rejected
/// output when one exists so recovery can try to clean it, and the
/// validated source text so a recovered result is cached under the same
/// key later lookups compute
struct ProcessFailure {
    error: CoreError,
    contaminated: Option<ContaminatedOutput>,
    source_text: Option<String>,
}

impl ProcessFailure {
    fn bare(error: CoreError) -> Self {
        Self {
            error,
            contaminated: None,
            source_text: None,
        }
    }

    fn with_source(mut self, source_text: &str) -> Self {
        self.source_text = Some(source_text.to_string());
        self
    }
}

/// The bilingual legal-translation purity core
pub struct TranslationCore {
    config: Config,
    detector: Arc<PatternDetector>,
    pipeline: ValidationPipeline,
    cache: Arc<QualityCache>,
    recovery: RecoveryEngine,
    primary: Arc<dyn TranslationBackend>,
    purity: Arc<dyn PurityValidator>,
}

impl TranslationCore {
    /// Assemble the core over its collaborators.
    ///
    /// The pattern detector is seeded with the built-in blacklist;
    /// `alternates` are the backends recovery may switch to when the
    /// primary fails.
    pub fn new(
        config: Config,
        primary: Arc<dyn TranslationBackend>,
        alternates: Vec<Arc<dyn TranslationBackend>>,
        fallback: Arc<dyn FallbackGenerator>,
        purity: Arc<dyn PurityValidator>,
        terminology: Arc<dyn TerminologyValidator>,
    ) -> anyhow::Result<Self> {
        let blacklist = Blacklist::with_defaults(&config.detector)?;
        let detector = Arc::new(PatternDetector::with_blacklist(
            config.detector.clone(),
            blacklist,
        ));
        let pipeline = ValidationPipeline::new(
            config.pipeline.clone(),
            detector.clone(),
            purity.clone(),
            terminology,
        );
        let cache = Arc::new(QualityCache::new(config.cache.clone()));
        let recovery = RecoveryEngine::new(
            Some(primary.clone()),
            alternates,
            fallback,
            purity.clone(),
            config.recovery.clone(),
        );

        Ok(Self {
            config,
            detector,
            pipeline,
            cache,
            recovery,
            primary,
            purity,
        })
    }

    /// Shared handle to the cache, for maintenance and the CLI
    pub fn cache(&self) -> Arc<QualityCache> {
        self.cache.clone()
    }

    /// Shared handle to the pattern detector
    pub fn detector(&self) -> Arc<PatternDetector> {
        self.detector.clone()
    }

    /// The validation pipeline handle, for checkpoint adjustments
    pub fn pipeline(&self) -> &ValidationPipeline {
        &self.pipeline
    }

    /// Recovery statistics snapshot
    pub fn recovery_stats(&self) -> RecoveryStats {
        self.recovery.stats()
    }

    fn validate_request(&self, request: &TranslationRequest) -> Result<(), CoreError> {
        if request.text.trim().is_empty() {
            return Err(CoreError::Request(RequestError::EmptyText));
        }
        let length = request.text.chars().count();
        if length > self.config.max_text_length {
            return Err(CoreError::Request(RequestError::TextTooLong {
                length,
                max: self.config.max_text_length,
            }));
        }
        Ok(())
    }

    async fn translate_validated(
        &self,
        request: &TranslationRequest,
    ) -> Result<ProcessedTranslation, ProcessFailure> {
        let source_lang = request.languages.source;
        let target_lang = request.languages.target;
        let mut warnings = Vec::new();

        // Source-side gates; cleaning may rewrite the text between stages
        let mut source_text = request.text.clone();
        for stage in [Stage::PreProcessing, Stage::PostCleaning, Stage::PreTranslation] {
            let outcome = self.pipeline.run_stage(stage, &source_text, source_lang).await;
            if !outcome.status.is_passing() {
                return Err(ProcessFailure::bare(CoreError::Purity(
                    PurityViolationError {
                        stage: stage.to_string(),
                        score: outcome.result.aggregate_score,
                        required: self.pipeline.checkpoint(stage).required_score,
                        issues: outcome.issue_messages(),
                    },
                )));
            }
            if outcome.status != StageStatus::Passed {
                warnings.extend(outcome.issue_messages());
            }
            source_text = outcome.text;
        }

        // Cache is keyed on the validated source text, so trivially
        // different raw inputs that clean identically share an entry
        let key = QualityCache::key(&source_text, request.languages, request.content_type);
        if let Some(hit) = self.cache.get(&key) {
            let mut result = ProcessedTranslation::clean(
                request.id,
                hit.text,
                hit.method,
                hit.quality.confidence,
                hit.quality.purity,
            )
            .mark_cached();
            result.warnings = warnings;
            return Ok(result);
        }

        let mut output = self
            .invoke_primary(request, &source_text)
            .await
            .map_err(|f| f.with_source(&source_text))?;

        // Output-side gates in the target language, with one upstream retry
        let mut retried = false;
        for stage in [Stage::PostTranslation, Stage::FinalValidation] {
            loop {
                let outcome = self.pipeline.run_stage(stage, &output.text, target_lang).await;
                if outcome.status.is_passing() {
                    if outcome.status != StageStatus::Passed {
                        warnings.extend(outcome.issue_messages());
                    }
                    output.text = outcome.text;
                    break;
                }

                if outcome.status == StageStatus::RetryRequested && !retried {
                    retried = true;
                    debug!("Stage {} requested upstream retry", stage);
                    output = self
                        .invoke_primary(request, &source_text)
                        .await
                        .map_err(|f| f.with_source(&source_text))?;
                    continue;
                }

                let required = if stage.is_final() && self.config.pipeline.zero_tolerance {
                    100.0
                } else {
                    self.pipeline.checkpoint(stage).required_score
                };
                return Err(ProcessFailure {
                    error: CoreError::Purity(PurityViolationError {
                        stage: stage.to_string(),
                        score: outcome.result.aggregate_score,
                        required,
                        issues: outcome.issue_messages(),
                    }),
                    contaminated: Some(ContaminatedOutput {
                        text: outcome.text,
                        method: TranslationMethod::PrimaryAi,
                        confidence: output.confidence,
                    }),
                    source_text: Some(source_text.clone()),
                });
            }
        }

        let report = self.purity.validate_purity(&output.text, target_lang).await;
        let write = self.cache.set(
            &key,
            &output.text,
            target_lang,
            TranslationMethod::PrimaryAi,
            QualityMetrics {
                overall: report.score.overall,
                purity: report.score.overall,
                confidence: output.confidence,
            },
            None,
        );
        if let WriteOutcome::Rejected { purity_score, .. } = write {
            debug!(
                "Result for request {} not cached (purity {:.1})",
                request.id, purity_score
            );
        }

        warnings.extend(output.warnings);
        let mut result = ProcessedTranslation::clean(
            request.id,
            output.text,
            TranslationMethod::PrimaryAi,
            output.confidence,
            report.score.overall,
        );
        result.warnings = warnings;
        Ok(result)
    }

    async fn invoke_primary(
        &self,
        request: &TranslationRequest,
        text: &str,
    ) -> Result<TranslationOutput, ProcessFailure> {
        self.primary
            .translate(text, request.languages, request.context.as_deref())
            .await
            .map_err(|failure| {
                ProcessFailure::bare(match failure {
                    BackendFailure::Translation(e) => CoreError::Translation(e),
                    BackendFailure::System(e) => CoreError::System(e),
                })
            })
    }
}

#[async_trait]
impl RequestProcessor for TranslationCore {
    async fn process(
        &self,
        request: TranslationRequest,
    ) -> Result<ProcessedTranslation, CoreError> {
        self.validate_request(&request)?;

        let failure = match self.translate_validated(&request).await {
            Ok(result) => return Ok(result),
            Err(failure) => failure,
        };

        if !failure.error.is_recoverable() {
            return Err(failure.error);
        }

        warn!(
            "Request {} entering recovery: {}",
            request.id, failure.error
        );
        let outcome = self
            .recovery
            .recover(&request, &failure.error, failure.contaminated.as_ref())
            .await;
        info!(
            "Request {} recovered via {} ({} attempt(s))",
            request.id, outcome.strategy, outcome.attempts
        );

        // Recovered-but-degraded results stay out of the cache; a clean
        // recovery is as cacheable as a first-pass success. The key must
        // match what lookups compute, so it uses the validated source text;
        // failures upstream of source validation carry none and skip the
        // write.
        if !outcome.quality_degraded {
            if let Some(source_text) = &failure.source_text {
                let key =
                    QualityCache::key(source_text, request.languages, request.content_type);
                self.cache.set(
                    &key,
                    &outcome.text,
                    request.languages.target,
                    outcome.method.clone(),
                    QualityMetrics {
                        overall: outcome.purity_score,
                        purity: outcome.purity_score,
                        confidence: outcome.confidence,
                    },
                    None,
                );
            }
        }

        Ok(ProcessedTranslation {
            request_id: request.id,
            text: outcome.text,
            method: outcome.method,
            confidence: outcome.confidence,
            purity_score: outcome.purity_score,
            quality_degraded: outcome.quality_degraded,
            recovery_action: Some(outcome.strategy.id().to_string()),
            from_cache: false,
            warnings: Vec::new(),
        })
    }
}
