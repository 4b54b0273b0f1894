/*!
 * Tests for blacklist pattern detection
 */

use lexipure::app_config::DetectorConfig;
use lexipure::detector::{
    PatternCategory, PatternDetector, PatternSpec, RiskLevel, Severity,
};
use lexipure::language_utils::Language;

fn detector() -> PatternDetector {
    PatternDetector::new(DetectorConfig::default()).unwrap()
}

#[test]
fn test_detect_cyrillicRunInArabicText_shouldBeCriticalRisk() {
    let detector = detector();

    let report = detector.detect("قانون процедура المدني", Language::Arabic);

    assert!(!report.is_clean());
    assert_eq!(report.risk, RiskLevel::Critical);
    assert!(report
        .matches
        .iter()
        .any(|m| m.category == PatternCategory::ForeignAlphabet
            && m.severity == Severity::Critical
            && m.content.contains("процедура")));
    assert!(!report.recommendations.is_empty());
}

#[test]
fn test_detect_cleanLegalText_shouldReportNothing() {
    let detector = detector();

    let arabic = detector.detect("المادة الأولى من القانون المدني", Language::Arabic);
    let french = detector.detect("Article premier du code civil", Language::French);

    assert!(arabic.is_clean());
    assert!(french.is_clean());
    assert_eq!(arabic.risk, RiskLevel::Low);
    assert!((arabic.confidence - 1.0).abs() < f64::EPSILON);
    assert!(french.is_clean());
}

#[test]
fn test_detect_templatePlaceholders_shouldBeFlagged() {
    let detector = detector();

    let report = detector.detect("نص فيه {{ placeholder }} ظاهر", Language::Arabic);

    assert!(!report.is_clean());
    assert!(report
        .matches
        .iter()
        .any(|m| m.category == PatternCategory::UiArtifact));
}

#[test]
fn test_detect_repeatedScan_shouldHitMemo() {
    let detector = detector();
    let text = "قانون процедура";

    detector.detect(text, Language::Arabic);
    detector.detect(text, Language::Arabic);

    let (hits, misses) = detector.memo_stats();
    assert_eq!(hits, 1);
    assert_eq!(misses, 1);
}

#[test]
fn test_reportPattern_shouldDetectOnNextScan() {
    let detector = detector();
    let clean = detector.detect("عبارة أبلغ عنها مستخدم", Language::Arabic);
    assert!(clean.is_clean());

    detector.report_pattern("عبارة أبلغ عنها").unwrap();

    let report = detector.detect("عبارة أبلغ عنها مستخدم", Language::Arabic);
    assert!(!report.is_clean());
    assert_eq!(report.risk, RiskLevel::Critical);
    assert!(report
        .matches
        .iter()
        .all(|m| m.category == PatternCategory::UserReported));
}

#[test]
fn test_reportPattern_withRegexMetacharacters_shouldMatchLiterally() {
    let detector = detector();
    detector.report_pattern("a.b*c").unwrap();

    // The dot and star must not act as regex operators
    assert!(detector.detect("plainte axbxc normale", Language::French).is_clean());
    assert!(!detector.detect("clause a.b*c douteuse", Language::French).is_clean());
}

#[test]
fn test_addPattern_overLengthBound_shouldBeRejected() {
    let detector = detector();
    let oversized = "x".repeat(500);

    let result = detector.add_pattern(
        PatternSpec::literal(&oversized),
        PatternCategory::UiArtifact,
        Severity::Low,
    );

    assert!(result.is_err());
}

#[test]
fn test_deactivatePattern_shouldStopMatchingAndInvalidateMemo() {
    let detector = detector();
    let id = detector.report_pattern("نمط مؤقت").unwrap();

    assert!(!detector.detect("هذا نمط مؤقت هنا", Language::Arabic).is_clean());

    assert!(detector.deactivate_pattern(id));

    // The mutation bumped the generation, so the memoized verdict is gone
    assert!(detector.detect("هذا نمط مؤقت هنا", Language::Arabic).is_clean());
}

#[test]
fn test_detect_manyHighSeverityMatches_shouldEscalateToCritical() {
    let detector = detector();

    // Four template placeholders exceed the high-severity limit of three
    let report = detector.detect(
        "نص {{a}} و {{b}} و {{c}} و {{d}} ملوث",
        Language::Arabic,
    );

    assert_eq!(report.risk, RiskLevel::Critical);
}
