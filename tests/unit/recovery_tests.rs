/*!
 * Tests for strategy-chain error recovery
 */

use std::sync::Arc;

use lexipure::app_config::RecoveryConfig;
use lexipure::backends::mock::{MockBackend, MockFallbackGenerator, ScriptPurityValidator};
use lexipure::backends::{FallbackGenerator, TranslationBackend};
use lexipure::errors::{
    CoreError, PurityViolationError, SystemError, SystemErrorKind, TranslationError,
    TranslationErrorKind,
};
use lexipure::language_utils::LanguagePair;
use lexipure::recovery::{ContaminatedOutput, RecoveryEngine, StrategyKind};
use lexipure::request::{TranslationMethod, TranslationRequest};

use crate::common::mock_backends::FlakyBackend;

fn engine(
    alternates: Vec<Arc<dyn TranslationBackend>>,
    fallback: Arc<dyn FallbackGenerator>,
) -> RecoveryEngine {
    RecoveryEngine::new(
        None,
        alternates,
        fallback,
        Arc::new(ScriptPurityValidator::new()),
        RecoveryConfig::default(),
    )
}

fn request() -> TranslationRequest {
    TranslationRequest::new("نص العقد الأصلي", LanguagePair::ar_to_fr())
}

fn translation_error() -> CoreError {
    CoreError::Translation(TranslationError::new(
        TranslationErrorKind::MethodFailed,
        "primary_ai",
        "backend refused",
    ))
}

#[tokio::test]
async fn test_recover_contaminatedAlternate_shouldSwitchToNextAlternate() {
    let engine = engine(
        vec![
            Arc::new(MockBackend::contaminated("secondary", "процедура")),
            Arc::new(MockBackend::working("hybrid")),
        ],
        Arc::new(MockFallbackGenerator::working()),
    );

    let outcome = engine.recover(&request(), &translation_error(), None).await;

    assert_eq!(outcome.strategy, StrategyKind::MethodSwitching);
    assert_eq!(outcome.method, TranslationMethod::Hybrid);
    assert!(!outcome.text.contains("процедура"));
    assert_eq!(outcome.attempts, 1);
}

#[tokio::test]
async fn test_recover_failedStrategy_shouldNotBeRetriedWithinSession() {
    // The backend recovers after its first call, but the session has
    // already moved past method switching by then
    let flaky = Arc::new(FlakyBackend::new("secondary", 1));
    let engine = engine(
        vec![flaky.clone()],
        Arc::new(MockFallbackGenerator::working()),
    );

    let outcome = engine.recover(&request(), &translation_error(), None).await;

    assert_eq!(outcome.strategy, StrategyKind::GenerateFallback);
    assert_eq!(flaky.call_count(), 1);
}

#[tokio::test]
async fn test_recover_serviceDisruption_shouldServeDegradedEmergencyContent() {
    // A disrupted service must not be asked to translate anything; the
    // degraded path serves pre-vetted content directly
    let backend = MockBackend::working("secondary");
    let counter = backend.call_counter();
    let engine = engine(
        vec![Arc::new(backend)],
        Arc::new(MockFallbackGenerator::working()),
    );

    let error = CoreError::System(SystemError::new(
        SystemErrorKind::ServiceUnavailable,
        "primary provider overloaded",
    ));
    let outcome = engine.recover(&request(), &error, None).await;

    assert_eq!(outcome.strategy, StrategyKind::GracefulDegradation);
    assert_eq!(outcome.method, TranslationMethod::Emergency);
    assert!(outcome.quality_degraded);
    // Degraded results carry a reduced confidence
    assert!(outcome.confidence < 0.9);
    assert!(!outcome.text.is_empty());
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_recover_purityViolationWithPrimary_shouldRetryPrimary() {
    let primary = MockBackend::working("primary_ai");
    let counter = primary.call_counter();
    let engine = RecoveryEngine::new(
        Some(Arc::new(primary)),
        vec![Arc::new(MockBackend::working("secondary"))],
        Arc::new(MockFallbackGenerator::working()),
        Arc::new(ScriptPurityValidator::new()),
        RecoveryConfig::default(),
    );

    let error = CoreError::Purity(PurityViolationError {
        stage: "final_validation".to_string(),
        score: 80.0,
        required: 100.0,
        issues: vec!["foreign script run".to_string()],
    });
    let contaminated = ContaminatedOutput {
        text: "نص العقد процедура الأصلي".to_string(),
        method: TranslationMethod::PrimaryAi,
        confidence: 0.9,
    };

    let outcome = engine.recover(&request(), &error, Some(&contaminated)).await;

    assert_eq!(outcome.strategy, StrategyKind::QualityValidationRecovery);
    assert_eq!(outcome.method, TranslationMethod::PrimaryAi);
    assert!(!outcome.quality_degraded);
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_recover_exhaustedBudget_shouldStillServeEmergencyContent() {
    let mut config = RecoveryConfig::default();
    config.max_session_attempts = 0;
    let engine = RecoveryEngine::new(
        None,
        vec![Arc::new(MockBackend::working("secondary"))],
        Arc::new(MockFallbackGenerator::working()),
        Arc::new(ScriptPurityValidator::new()),
        config,
    );

    let outcome = engine.recover(&request(), &translation_error(), None).await;

    assert_eq!(outcome.strategy, StrategyKind::ApplyEmergencyContent);
    assert_eq!(outcome.method, TranslationMethod::Emergency);
    assert_eq!(outcome.purity_score, 100.0);
    assert!(!outcome.text.is_empty());
}

#[tokio::test]
async fn test_recover_generatedFallback_shouldPassPurityGate() {
    let engine = engine(vec![], Arc::new(MockFallbackGenerator::working()));

    let outcome = engine.recover(&request(), &translation_error(), None).await;

    assert_eq!(outcome.strategy, StrategyKind::GenerateFallback);
    assert_eq!(outcome.method, TranslationMethod::Fallback);
    assert_eq!(outcome.purity_score, 100.0);
    assert!(outcome.quality_degraded);
}

#[tokio::test]
async fn test_stats_failedSessionPath_shouldCountStrategyAttempts() {
    let engine = engine(
        vec![Arc::new(MockBackend::failing("secondary"))],
        Arc::new(MockFallbackGenerator::failing()),
    );

    engine.recover(&request(), &translation_error(), None).await;

    let stats = engine.stats();
    assert_eq!(stats.sessions, 1);
    assert_eq!(stats.successes, 1);
    let switching = stats
        .per_strategy
        .get(&StrategyKind::MethodSwitching)
        .copied()
        .unwrap();
    assert_eq!(switching.attempts, 1);
    assert_eq!(switching.successes, 0);
    let emergency = stats
        .per_strategy
        .get(&StrategyKind::ApplyEmergencyContent)
        .copied()
        .unwrap();
    assert_eq!(emergency.successes, 1);
}
