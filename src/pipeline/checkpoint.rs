/*!
 * Checkpoint configuration for the five pipeline stages.
 *
 * A checkpoint binds an ordered subset of validation layers to a pass
 * threshold and a failure policy. Checkpoints are static configuration
 * that an operator may adjust at runtime through the pipeline handle.
 */

use serde::{Deserialize, Serialize};

use super::layers::{LayerKind, ValidationIssue, ValidationLayerResult};

/// The five pipeline stages, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Gate on the raw source text
    PreProcessing,
    /// Gate after source-side cleaning
    PostCleaning,
    /// Last gate before invoking translation
    PreTranslation,
    /// Gate on the translated output
    PostTranslation,
    /// Terminal zero-tolerance gate
    FinalValidation,
}

impl Stage {
    /// All stages in order
    pub const ALL: [Stage; 5] = [
        Stage::PreProcessing,
        Stage::PostCleaning,
        Stage::PreTranslation,
        Stage::PostTranslation,
        Stage::FinalValidation,
    ];

    /// Whether this is the terminal stage
    pub fn is_final(&self) -> bool {
        matches!(self, Stage::FinalValidation)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::PreProcessing => "pre_processing",
            Stage::PostCleaning => "post_cleaning",
            Stage::PreTranslation => "pre_translation",
            Stage::PostTranslation => "post_translation",
            Stage::FinalValidation => "final_validation",
        };
        write!(f, "{}", s)
    }
}

/// What to do when a checkpoint fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureAction {
    /// Reject the text outright
    Block,
    /// Pass with recorded issues
    Warn,
    /// Run the configured recovery strategy and re-validate
    Recover,
    /// Route to external fallback-content generation
    Fallback,
}

/// Recovery strategy a checkpoint may invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryKind {
    /// Deterministic rule-based cleaning, then re-validate
    Clean,
    /// Re-invoke upstream translation
    Retry,
    /// Flag for manual review
    Escalate,
}

/// One pipeline stage's configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Which stage this configures
    pub stage: Stage,
    /// Layers to execute, ordered by their own priority at run time
    pub layers: Vec<LayerKind>,
    /// Aggregate score required to pass
    pub required_score: f64,
    /// Failure policy
    pub failure_action: FailureAction,
    /// Recovery strategy when failure_action is Recover
    pub recovery_kind: RecoveryKind,
    /// Maximum recovery attempts at this stage
    pub max_recovery_attempts: u32,
}

impl CheckpointConfig {
    /// Default configuration for a stage.
    ///
    /// The final stage requires a perfect score; its attempt cap is owned by
    /// the pipeline config so operators can widen it without touching the
    /// checkpoint table.
    pub fn default_for(stage: Stage) -> Self {
        match stage {
            Stage::PreProcessing => Self {
                stage,
                layers: vec![LayerKind::EncodingIntegrity, LayerKind::ContentQuality],
                required_score: 60.0,
                failure_action: FailureAction::Recover,
                recovery_kind: RecoveryKind::Clean,
                max_recovery_attempts: 2,
            },
            Stage::PostCleaning => Self {
                stage,
                layers: vec![
                    LayerKind::EncodingIntegrity,
                    LayerKind::ContentQuality,
                    LayerKind::PatternDetection,
                ],
                required_score: 75.0,
                failure_action: FailureAction::Recover,
                recovery_kind: RecoveryKind::Clean,
                max_recovery_attempts: 2,
            },
            Stage::PreTranslation => Self {
                stage,
                layers: vec![LayerKind::PatternDetection, LayerKind::ContentQuality],
                required_score: 80.0,
                failure_action: FailureAction::Warn,
                recovery_kind: RecoveryKind::Clean,
                max_recovery_attempts: 1,
            },
            Stage::PostTranslation => Self {
                stage,
                layers: vec![
                    LayerKind::EncodingIntegrity,
                    LayerKind::ContentQuality,
                    LayerKind::PatternDetection,
                    LayerKind::Purity,
                    LayerKind::Terminology,
                ],
                required_score: 85.0,
                failure_action: FailureAction::Recover,
                recovery_kind: RecoveryKind::Clean,
                max_recovery_attempts: 3,
            },
            Stage::FinalValidation => Self {
                stage,
                layers: vec![
                    LayerKind::EncodingIntegrity,
                    LayerKind::PatternDetection,
                    LayerKind::Purity,
                ],
                required_score: 100.0,
                failure_action: FailureAction::Recover,
                recovery_kind: RecoveryKind::Clean,
                max_recovery_attempts: 1,
            },
        }
    }
}

/// Aggregated outcome of running one checkpoint once
#[derive(Debug, Clone)]
pub struct CheckpointResult {
    /// The stage
    pub stage: Stage,
    /// Arithmetic mean of the active layers' scores
    pub aggregate_score: f64,
    /// Whether the aggregate met the required score
    pub passed: bool,
    /// Per-layer results
    pub layer_results: Vec<ValidationLayerResult>,
}

impl CheckpointResult {
    /// Build from layer results against a required score
    pub fn from_layers(
        stage: Stage,
        required_score: f64,
        layer_results: Vec<ValidationLayerResult>,
    ) -> Self {
        let aggregate_score = if layer_results.is_empty() {
            100.0
        } else {
            layer_results.iter().map(|r| r.score).sum::<f64>() / layer_results.len() as f64
        };
        Self {
            stage,
            aggregate_score,
            passed: aggregate_score >= required_score,
            layer_results,
        }
    }

    /// All issues across layers
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.layer_results.iter().flat_map(|r| r.issues.iter())
    }

    /// Issue messages, for error reporting
    pub fn issue_messages(&self) -> Vec<String> {
        self.issues().map(|i| i.message.clone()).collect()
    }
}
