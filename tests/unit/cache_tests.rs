/*!
 * Tests for the quality-aware cache and its maintenance task
 */

use std::sync::Arc;

use lexipure::app_config::CacheConfig;
use lexipure::backends::mock::ScriptPurityValidator;
use lexipure::cache::{
    CacheMaintenance, InvalidationRule, QualityCache, QualityMetrics, RuleConfig, UserFeedback,
    WriteOutcome,
};
use lexipure::language_utils::{Language, LanguagePair};
use lexipure::request::{ContentType, TranslationMethod};

fn perfect() -> QualityMetrics {
    QualityMetrics {
        overall: 100.0,
        purity: 100.0,
        confidence: 0.95,
    }
}

#[test]
fn test_cache_key_shouldBeDeterministicAndDiscriminating() {
    let a = QualityCache::key("نص قانوني", LanguagePair::ar_to_fr(), ContentType::General);
    let b = QualityCache::key("نص قانوني", LanguagePair::ar_to_fr(), ContentType::General);
    let different_pair =
        QualityCache::key("نص قانوني", LanguagePair::fr_to_ar(), ContentType::General);
    let different_kind = QualityCache::key(
        "نص قانوني",
        LanguagePair::ar_to_fr(),
        ContentType::ContractClause,
    );

    assert_eq!(a, b);
    assert_ne!(a, different_pair);
    assert_ne!(a, different_kind);
}

#[test]
fn test_cache_set_impureResult_shouldReturnRejectedOutcome() {
    let cache = QualityCache::new(CacheConfig::default());

    let outcome = cache.set(
        "k",
        "texte contaminé",
        Language::French,
        TranslationMethod::PrimaryAi,
        QualityMetrics {
            overall: 96.0,
            purity: 96.0,
            confidence: 0.9,
        },
        None,
    );

    assert!(!outcome.is_written());
    assert!(matches!(outcome, WriteOutcome::Rejected { required, .. } if required == 100.0));
    assert!(cache.is_empty());
}

#[test]
fn test_cache_hitRate_shouldReflectReads() {
    let cache = QualityCache::new(CacheConfig::default());
    cache.set(
        "k",
        "texte",
        Language::French,
        TranslationMethod::PrimaryAi,
        perfect(),
        None,
    );

    assert!(cache.get("k").is_some());
    assert!(cache.get("missing").is_none());

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
}

#[test]
fn test_cache_setRules_shouldReplaceRuleSet() {
    let cache = QualityCache::new(CacheConfig::default());
    let custom = vec![RuleConfig {
        rule: InvalidationRule::LowConfidence { threshold: 0.99 },
        enabled: true,
    }];

    cache.set_rules(custom.clone());

    assert_eq!(cache.rules(), custom);
    // The new rule now gates reads: confidence 0.95 is below 0.99
    cache.set(
        "k",
        "texte",
        Language::French,
        TranslationMethod::PrimaryAi,
        perfect(),
        None,
    );
    assert!(cache.get("k").is_none());
}

#[tokio::test]
async fn test_maintenance_negativeFeedback_shouldInvalidateEntry() {
    let cache = Arc::new(QualityCache::new(CacheConfig::default()));
    let maintenance = Arc::new(CacheMaintenance::new(
        cache.clone(),
        Arc::new(ScriptPurityValidator::new()),
    ));

    cache.set(
        "entry",
        "texte valide",
        Language::French,
        TranslationMethod::PrimaryAi,
        perfect(),
        None,
    );
    cache.submit_feedback(UserFeedback {
        key: "entry".to_string(),
        positive: false,
        comment: Some("mistranslated clause".to_string()),
    });

    let report = maintenance.run_cycle().await;

    assert_eq!(report.feedback_invalidations, 1);
    assert!(cache.get("entry").is_none());
    assert!(!maintenance.open_alerts().is_empty());
}

#[tokio::test]
async fn test_maintenance_impureEntry_shouldBeRevalidatedOut() {
    let mut config = CacheConfig::default();
    config.zero_tolerance = false;
    config.quality_threshold = 0.0;
    let cache = Arc::new(QualityCache::new(config));
    let maintenance = Arc::new(CacheMaintenance::new(
        cache.clone(),
        Arc::new(ScriptPurityValidator::new()),
    ));

    cache.set(
        "bad",
        "texte процедура mélangé",
        Language::French,
        TranslationMethod::PrimaryAi,
        QualityMetrics {
            overall: 90.0,
            purity: 85.0,
            confidence: 0.9,
        },
        None,
    );

    let report = maintenance.run_cycle().await;

    assert_eq!(report.revalidation_invalidations, 1);
    assert!(cache.is_empty());
}
