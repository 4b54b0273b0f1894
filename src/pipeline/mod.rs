/*!
 * Multi-stage validation pipeline.
 *
 * This module gates text at five pipeline checkpoints with per-stage
 * recovery. It is split into several submodules:
 *
 * - `layers`: pluggable validation layers and their results
 * - `checkpoint`: stage configuration and aggregation
 * - `cleaning`: deterministic rule-based text cleaning
 * - `pipeline`: the stage driver with failure-policy handling
 */

pub use self::checkpoint::{
    CheckpointConfig, CheckpointResult, FailureAction, RecoveryKind, Stage,
};
pub use self::cleaning::{CleaningResult, CleaningStep, TextCleaner};
pub use self::layers::{
    ContentQualityLayer, EncodingLayer, IssueSeverity, LayerKind, PatternLayer, PurityLayer,
    TerminologyLayer, ValidationIssue, ValidationLayer, ValidationLayerResult,
};
pub use self::pipeline::{StageOutcome, StageStatus, ValidationPipeline};

pub mod checkpoint;
pub mod cleaning;
pub mod layers;
#[allow(clippy::module_inception)]
pub mod pipeline;
