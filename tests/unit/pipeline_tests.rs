/*!
 * Tests for the five-stage validation pipeline
 */

use std::sync::Arc;

use lexipure::app_config::{DetectorConfig, PipelineConfig};
use lexipure::backends::mock::{FixedTerminologyValidator, ScriptPurityValidator};
use lexipure::detector::PatternDetector;
use lexipure::language_utils::Language;
use lexipure::pipeline::{FailureAction, Stage, StageStatus, ValidationPipeline};

fn pipeline() -> ValidationPipeline {
    pipeline_with(PipelineConfig::default())
}

fn pipeline_with(config: PipelineConfig) -> ValidationPipeline {
    let detector = Arc::new(PatternDetector::new(DetectorConfig::default()).unwrap());
    ValidationPipeline::new(
        config,
        detector,
        Arc::new(ScriptPurityValidator::new()),
        Arc::new(FixedTerminologyValidator::perfect()),
    )
}

#[tokio::test]
async fn test_pipeline_cleanText_shouldPassEveryStage() {
    let pipeline = pipeline();
    let text = "يلتزم الطرف الثاني بتسليم البضاعة في الأجل المتفق عليه";

    for stage in Stage::ALL {
        let outcome = pipeline.run_stage(stage, text, Language::Arabic).await;
        assert!(outcome.status.is_passing(), "stage {} failed", stage);
        assert_eq!(outcome.attempts, 0);
    }
}

#[tokio::test]
async fn test_pipeline_contaminatedOutput_shouldBeCleanedAndRecovered() {
    let pipeline = pipeline();

    let outcome = pipeline
        .run_stage(
            Stage::PostTranslation,
            "Article premier du code процедура civil",
            Language::French,
        )
        .await;

    assert_eq!(outcome.status, StageStatus::Recovered);
    assert!(!outcome.text.contains("процедура"));
    assert!(outcome.attempts >= 1);
}

#[tokio::test]
async fn test_pipeline_finalStage_shouldRequirePerfectScore() {
    let pipeline = pipeline();

    let clean = pipeline
        .run_stage(
            Stage::FinalValidation,
            "Le tribunal a rejeté la requête",
            Language::French,
        )
        .await;
    assert_eq!(clean.status, StageStatus::Passed);
    assert_eq!(clean.result.aggregate_score, 100.0);
}

#[tokio::test]
async fn test_pipeline_finalStageRecoveryCap_shouldComeFromConfig() {
    let mut config = PipelineConfig::default();
    config.final_stage_max_recovery_attempts = 0;
    let pipeline = pipeline_with(config);

    // With zero attempts allowed, contaminated text cannot be cleaned at
    // the terminal gate and must block
    let outcome = pipeline
        .run_stage(
            Stage::FinalValidation,
            "Texte final процедура contaminé",
            Language::French,
        )
        .await;

    assert_eq!(outcome.status, StageStatus::Blocked);
    assert_eq!(outcome.attempts, 0);
}

#[tokio::test]
async fn test_pipeline_updateCheckpoint_shouldTakeEffectImmediately() {
    let pipeline = pipeline();

    let mut checkpoint = pipeline.checkpoint(Stage::PostTranslation);
    checkpoint.failure_action = FailureAction::Block;
    pipeline.update_checkpoint(checkpoint);

    let outcome = pipeline
        .run_stage(
            Stage::PostTranslation,
            "Texte процедура contaminé",
            Language::French,
        )
        .await;

    assert_eq!(outcome.status, StageStatus::Blocked);
}

#[test]
fn test_pipeline_emptyInput_shouldFailPreProcessing() {
    let pipeline = pipeline();

    let outcome = tokio_test::block_on(async {
        pipeline
            .run_stage(Stage::PreProcessing, "", Language::Arabic)
            .await
    });

    assert!(!outcome.status.is_passing());
}

#[tokio::test]
async fn test_pipeline_singleUiArtifact_shouldPassWithWarnings() {
    let pipeline = pipeline();

    // One template placeholder costs points but stays above the
    // post-cleaning threshold, so it is flagged rather than cleaned
    let outcome = pipeline
        .run_stage(
            Stage::PostCleaning,
            "المادة الأولى {{ placeholder }} من القانون",
            Language::Arabic,
        )
        .await;

    assert_eq!(outcome.status, StageStatus::PassedWithWarnings);
    assert!(!outcome.issue_messages().is_empty());
}

#[tokio::test]
async fn test_pipeline_manyUiArtifacts_shouldBeRemovedDuringRecovery() {
    let pipeline = pipeline();

    let outcome = pipeline
        .run_stage(
            Stage::PostCleaning,
            "المادة {{a}} الأولى {{b}} من {{c}} القانون {{d}} المدني",
            Language::Arabic,
        )
        .await;

    assert_eq!(outcome.status, StageStatus::Recovered);
    assert!(!outcome.text.contains("{{"));
}
