/*!
 * Tests for export/import of operator state
 */

use lexipure::app_config::{CacheConfig, DetectorConfig};
use lexipure::cache::QualityCache;
use lexipure::detector::{Blacklist, PatternDetector};
use lexipure::export::{ExportDocument, RegressionCase, EXPORT_VERSION};
use lexipure::language_utils::Language;

fn detector() -> PatternDetector {
    PatternDetector::new(DetectorConfig::default()).unwrap()
}

#[test]
fn test_exportImportRoundTrip_shouldPreserveReportedPatterns() {
    let source = detector();
    source.report_pattern("صيغة خاطئة معروفة").unwrap();
    let cache = QualityCache::new(CacheConfig::default());

    let cases = vec![RegressionCase {
        name: "reported_pattern_flagged".to_string(),
        text: "نص فيه صيغة خاطئة معروفة".to_string(),
        language: Language::Arabic,
        expect_clean: false,
    }];
    let document = ExportDocument::capture(&source, &cache, cases);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    document.save_to_file(&path).unwrap();
    let loaded = ExportDocument::load_from_file(&path).unwrap();

    let target =
        PatternDetector::with_blacklist(DetectorConfig::default(), Blacklist::new());
    let fresh_cache = QualityCache::new(CacheConfig::default());
    loaded.apply(&target, &fresh_cache).unwrap();

    // The restored blacklist must pass the exported regression cases
    assert!(loaded.run_regressions(&target).is_empty());
    assert_eq!(fresh_cache.rules(), cache.rules());
}

#[test]
fn test_loadFromFile_withFutureVersion_shouldFail() {
    let detector = detector();
    let cache = QualityCache::new(CacheConfig::default());
    let mut document = ExportDocument::capture(&detector, &cache, vec![]);
    document.version = EXPORT_VERSION + 1;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.json");
    document.save_to_file(&path).unwrap();

    assert!(ExportDocument::load_from_file(&path).is_err());
}

#[test]
fn test_loadFromFile_withMalformedJson_shouldFail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"version\": 1,").unwrap();

    assert!(ExportDocument::load_from_file(&path).is_err());
}

#[test]
fn test_loadFromFile_missingFile_shouldFail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.json");

    assert!(ExportDocument::load_from_file(&path).is_err());
}

#[test]
fn test_capture_shouldRecordActivationState() {
    let source = detector();
    let id = source.report_pattern("نمط سيعطل").unwrap();
    assert!(source.deactivate_pattern(id));
    let cache = QualityCache::new(CacheConfig::default());

    let document = ExportDocument::capture(&source, &cache, vec![]);
    let target =
        PatternDetector::with_blacklist(DetectorConfig::default(), Blacklist::new());
    document.apply(&target, &cache).unwrap();

    // Deactivated patterns must stay inactive after import
    let report = target.detect("هذا نمط سيعطل هنا", Language::Arabic);
    assert!(report.is_clean());
}
