/*!
 * The five-stage validation pipeline.
 *
 * Text is gated at PreProcessing, PostCleaning, PreTranslation,
 * PostTranslation and FinalValidation. Each stage runs its checkpoint's
 * layers sequentially by ascending priority, aggregates their scores and
 * applies the checkpoint's failure policy, including deterministic
 * clean-and-revalidate recovery. The terminal stage enforces zero
 * tolerance; its recovery-attempt cap comes from the pipeline config.
 */

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::RwLock;

use crate::app_config::PipelineConfig;
use crate::backends::{PurityValidator, TerminologyValidator};
use crate::detector::PatternDetector;
use crate::language_utils::Language;

use super::checkpoint::{
    CheckpointConfig, CheckpointResult, FailureAction, RecoveryKind, Stage,
};
use super::cleaning::TextCleaner;
use super::layers::{
    ContentQualityLayer, EncodingLayer, LayerKind, PatternLayer, PurityLayer, TerminologyLayer,
    ValidationIssue, ValidationLayer, ValidationLayerResult,
};

/// How a stage concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Passed on the first run with no issues
    Passed,
    /// Passed, but issues were recorded
    PassedWithWarnings,
    /// Passed after one or more cleaning recoveries
    Recovered,
    /// Failed; upstream translation should be re-invoked
    RetryRequested,
    /// Failed; flagged for manual review, text passes degraded
    Escalated,
    /// Failed and rejected
    Blocked,
    /// Failed; route to fallback-content generation
    FallbackRequested,
}

impl StageStatus {
    /// Whether the text may continue down the pipeline
    pub fn is_passing(&self) -> bool {
        matches!(
            self,
            StageStatus::Passed
                | StageStatus::PassedWithWarnings
                | StageStatus::Recovered
                | StageStatus::Escalated
        )
    }
}

/// Outcome of running one stage, carrying the (possibly cleaned) text
#[derive(Debug, Clone)]
pub struct StageOutcome {
    /// The stage that ran
    pub stage: Stage,
    /// How it concluded
    pub status: StageStatus,
    /// Text after any recovery cleaning
    pub text: String,
    /// Recovery attempts consumed
    pub attempts: u32,
    /// Result of the last checkpoint run
    pub result: CheckpointResult,
}

impl StageOutcome {
    /// Issue messages from the final run
    pub fn issue_messages(&self) -> Vec<String> {
        self.result.issue_messages()
    }
}

/// The validation pipeline service
pub struct ValidationPipeline {
    checkpoints: RwLock<HashMap<Stage, CheckpointConfig>>,
    layers: HashMap<LayerKind, Arc<dyn ValidationLayer>>,
    cleaner: TextCleaner,
    config: PipelineConfig,
}

impl ValidationPipeline {
    /// Create a pipeline with default checkpoints over the given services
    pub fn new(
        config: PipelineConfig,
        detector: Arc<PatternDetector>,
        purity: Arc<dyn PurityValidator>,
        terminology: Arc<dyn TerminologyValidator>,
    ) -> Self {
        let mut layers: HashMap<LayerKind, Arc<dyn ValidationLayer>> = HashMap::new();
        layers.insert(
            LayerKind::EncodingIntegrity,
            Arc::new(EncodingLayer::new()),
        );
        layers.insert(
            LayerKind::ContentQuality,
            Arc::new(ContentQualityLayer::new(
                config.min_content_length,
                config.max_repetition_ratio,
            )),
        );
        layers.insert(LayerKind::PatternDetection, Arc::new(PatternLayer::new(detector)));
        layers.insert(LayerKind::Purity, Arc::new(PurityLayer::new(purity)));
        layers.insert(
            LayerKind::Terminology,
            Arc::new(TerminologyLayer::new(terminology)),
        );

        let checkpoints = Stage::ALL
            .iter()
            .map(|stage| (*stage, CheckpointConfig::default_for(*stage)))
            .collect();

        Self {
            checkpoints: RwLock::new(checkpoints),
            layers,
            cleaner: TextCleaner::new(),
            config,
        }
    }

    /// Current configuration of a stage's checkpoint
    pub fn checkpoint(&self, stage: Stage) -> CheckpointConfig {
        self.checkpoints
            .read()
            .get(&stage)
            .cloned()
            .unwrap_or_else(|| CheckpointConfig::default_for(stage))
    }

    /// Replace a stage's checkpoint configuration at runtime
    pub fn update_checkpoint(&self, config: CheckpointConfig) {
        self.checkpoints.write().insert(config.stage, config);
    }

    /// Run one stage against text, applying recovery per the failure policy
    pub async fn run_stage(
        &self,
        stage: Stage,
        text: &str,
        language: Language,
    ) -> StageOutcome {
        let checkpoint = self.checkpoint(stage);

        let required_score = if stage.is_final() && self.config.zero_tolerance {
            100.0
        } else {
            checkpoint.required_score
        };
        let max_attempts = if stage.is_final() {
            self.config.final_stage_max_recovery_attempts
        } else {
            checkpoint.max_recovery_attempts
        };

        let mut current = text.to_string();
        let mut attempts = 0u32;

        loop {
            let result = self
                .run_checkpoint_once(&checkpoint, required_score, &current, language)
                .await;

            if result.passed {
                let has_issues = result.issues().next().is_some();
                let status = if attempts > 0 {
                    StageStatus::Recovered
                } else if has_issues {
                    StageStatus::PassedWithWarnings
                } else {
                    StageStatus::Passed
                };
                return StageOutcome {
                    stage,
                    status,
                    text: current,
                    attempts,
                    result,
                };
            }

            debug!(
                "Checkpoint {} failed: aggregate {:.1} < required {:.1} (attempt {})",
                stage, result.aggregate_score, required_score, attempts
            );

            let status = match checkpoint.failure_action {
                FailureAction::Block => StageStatus::Blocked,
                FailureAction::Warn => StageStatus::PassedWithWarnings,
                FailureAction::Fallback => StageStatus::FallbackRequested,
                FailureAction::Recover => match checkpoint.recovery_kind {
                    RecoveryKind::Retry => StageStatus::RetryRequested,
                    RecoveryKind::Escalate => {
                        warn!("Checkpoint {} escalated for manual review", stage);
                        StageStatus::Escalated
                    }
                    RecoveryKind::Clean => {
                        if attempts < max_attempts {
                            let cleaned = self.cleaner.clean(&current);
                            if cleaned.changed() {
                                attempts += 1;
                                debug!(
                                    "Checkpoint {}: cleaning applied ({} rules), re-validating",
                                    stage,
                                    cleaned.steps.len()
                                );
                                current = cleaned.text;
                                continue;
                            }
                        }
                        // Cleaning exhausted or a no-op; nothing more this stage can do
                        StageStatus::Blocked
                    }
                },
            };

            return StageOutcome {
                stage,
                status,
                text: current,
                attempts,
                result,
            };
        }
    }

    async fn run_checkpoint_once(
        &self,
        checkpoint: &CheckpointConfig,
        required_score: f64,
        text: &str,
        language: Language,
    ) -> CheckpointResult {
        // Sequential execution in ascending layer priority
        let mut kinds = checkpoint.layers.clone();
        kinds.sort_by_key(|k| k.priority());

        let mut layer_results = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let Some(layer) = self.layers.get(&kind) else {
                continue;
            };
            match layer.validate(text, language).await {
                Ok(result) => layer_results.push(result),
                Err(e) => {
                    // A throwing layer is a CRITICAL finding, siblings still run
                    warn!("Validation layer {} failed: {}", kind, e);
                    layer_results.push(ValidationLayerResult {
                        layer: kind,
                        score: 0.0,
                        issues: vec![ValidationIssue::critical(
                            "layer_failure",
                            format!("layer {} failed: {}", kind, e),
                        )],
                        confidence: 0.0,
                        elapsed: std::time::Duration::ZERO,
                    });
                }
            }
        }

        CheckpointResult::from_layers(checkpoint.stage, required_score, layer_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::DetectorConfig;
    use crate::backends::mock::{FixedTerminologyValidator, ScriptPurityValidator};

    fn pipeline() -> ValidationPipeline {
        let detector = Arc::new(PatternDetector::new(DetectorConfig::default()).unwrap());
        ValidationPipeline::new(
            PipelineConfig::default(),
            detector,
            Arc::new(ScriptPurityValidator::new()),
            Arc::new(FixedTerminologyValidator::perfect()),
        )
    }

    #[tokio::test]
    async fn test_runStage_cleanText_shouldPassAllStages() {
        let pipeline = pipeline();
        let text = "المادة الأولى من القانون المدني";

        for stage in Stage::ALL {
            let outcome = pipeline.run_stage(stage, text, Language::Arabic).await;
            assert_eq!(outcome.status, StageStatus::Passed, "stage {}", stage);
            assert_eq!(outcome.text, text);
        }
    }

    #[tokio::test]
    async fn test_runStage_contaminatedText_shouldRecoverByCleaning() {
        let pipeline = pipeline();
        let outcome = pipeline
            .run_stage(
                Stage::PostTranslation,
                "نص القانون процедура المدني",
                Language::Arabic,
            )
            .await;

        assert_eq!(outcome.status, StageStatus::Recovered);
        assert!(outcome.attempts >= 1);
        assert!(!outcome.text.contains("процедура"));
    }

    #[tokio::test]
    async fn test_runStage_finalStage_shouldEnforceZeroTolerance() {
        let pipeline = pipeline();
        let outcome = pipeline
            .run_stage(
                Stage::FinalValidation,
                "نص سليم تماما من القانون",
                Language::Arabic,
            )
            .await;

        assert_eq!(outcome.status, StageStatus::Passed);
        assert_eq!(outcome.result.aggregate_score, 100.0);
    }

    #[tokio::test]
    async fn test_runStage_finalStage_uncleanableText_shouldBlock() {
        // A user report makes legitimate Arabic text uncleanable: the cleaner
        // has no rule for it, so recovery is a no-op and the stage blocks.
        let detector = Arc::new(PatternDetector::new(DetectorConfig::default()).unwrap());
        detector.report_pattern("المحظور").unwrap();
        let pipeline = ValidationPipeline::new(
            PipelineConfig::default(),
            detector,
            Arc::new(ScriptPurityValidator::new()),
            Arc::new(FixedTerminologyValidator::perfect()),
        );

        let outcome = pipeline
            .run_stage(
                Stage::FinalValidation,
                "هذا النص يحتوي المحظور بوضوح",
                Language::Arabic,
            )
            .await;

        assert_eq!(outcome.status, StageStatus::Blocked);
    }

    #[tokio::test]
    async fn test_updateCheckpoint_warnAction_shouldPassWithWarnings() {
        let pipeline = pipeline();
        let mut config = pipeline.checkpoint(Stage::PostTranslation);
        config.failure_action = FailureAction::Warn;
        pipeline.update_checkpoint(config);

        let outcome = pipeline
            .run_stage(
                Stage::PostTranslation,
                "نص القانون процедура المدني",
                Language::Arabic,
            )
            .await;

        assert_eq!(outcome.status, StageStatus::PassedWithWarnings);
        assert!(outcome.status.is_passing());
    }

    #[tokio::test]
    async fn test_runStage_emptyText_shouldNotPassPreProcessing() {
        let pipeline = pipeline();
        let outcome = pipeline
            .run_stage(Stage::PreProcessing, "   ", Language::French)
            .await;

        assert!(!outcome.status.is_passing());
    }
}
