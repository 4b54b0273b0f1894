/*!
 * Versioned export and import of operator state.
 *
 * Blacklist patterns, cache invalidation rules and regression cases are
 * captured into a single JSON document so an operator can back up a tuned
 * deployment and restore it elsewhere. The document is versioned; imports
 * reject documents written by an incompatible format.
 */

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::cache::{QualityCache, RuleConfig};
use crate::detector::{PatternCategory, PatternDetector, PatternSpec, Provenance, Severity};
use crate::language_utils::Language;

/// Current document format version
pub const EXPORT_VERSION: u32 = 1;

/// One exportable blacklist pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRecord {
    /// The pattern spec (literal or expression)
    pub spec: PatternSpec,
    /// Category
    pub category: PatternCategory,
    /// Severity
    pub severity: Severity,
    /// Where the pattern came from
    pub provenance: Provenance,
    /// Whether it participates in scans
    pub active: bool,
    /// Times the pattern has matched
    pub detection_count: u64,
}

/// A known input with its expected detection outcome, re-runnable after
/// import to confirm the restored blacklist behaves as before
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionCase {
    /// Short case name
    pub name: String,
    /// The input text
    pub text: String,
    /// Language the text is scanned as
    pub language: Language,
    /// Whether the scan is expected to find nothing
    pub expect_clean: bool,
}

/// The export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Format version
    pub version: u32,
    /// When the document was captured
    pub exported_at: DateTime<Utc>,
    /// Blacklist patterns
    pub patterns: Vec<PatternRecord>,
    /// Cache invalidation rules
    pub rules: Vec<RuleConfig>,
    /// Regression cases
    pub regression_cases: Vec<RegressionCase>,
}

impl ExportDocument {
    /// Capture the current operator state
    pub fn capture(
        detector: &PatternDetector,
        cache: &QualityCache,
        regression_cases: Vec<RegressionCase>,
    ) -> Self {
        let patterns = detector.with_blacklist_read(|blacklist| {
            blacklist
                .entries()
                .iter()
                .map(|entry| PatternRecord {
                    spec: entry.spec.clone(),
                    category: entry.category,
                    severity: entry.severity,
                    provenance: entry.provenance,
                    active: entry.active,
                    detection_count: entry.detection_count,
                })
                .collect()
        });

        Self {
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            patterns,
            rules: cache.rules(),
            regression_cases,
        }
    }

    /// Restore the document into a detector and cache. Returns the number
    /// of patterns imported; individual pattern failures abort the import
    /// so a partially restored blacklist never goes unnoticed.
    pub fn apply(&self, detector: &PatternDetector, cache: &QualityCache) -> Result<usize> {
        if self.version != EXPORT_VERSION {
            bail!(
                "unsupported export document version {} (expected {})",
                self.version,
                EXPORT_VERSION
            );
        }

        let mut imported = 0usize;
        for record in &self.patterns {
            detector
                .restore_pattern(
                    record.spec.clone(),
                    record.category,
                    record.severity,
                    record.provenance,
                    record.active,
                )
                .with_context(|| {
                    format!("failed to import pattern '{}'", record.spec.source())
                })?;
            imported += 1;
        }

        cache.set_rules(self.rules.clone());
        info!(
            "Imported {} patterns and {} rules from export document",
            imported,
            self.rules.len()
        );
        Ok(imported)
    }

    /// Re-run the regression cases against a detector. Returns the names
    /// of failing cases.
    pub fn run_regressions(&self, detector: &PatternDetector) -> Vec<String> {
        self.regression_cases
            .iter()
            .filter(|case| {
                let report = detector.detect(&case.text, case.language);
                report.is_clean() != case.expect_clean
            })
            .map(|case| case.name.clone())
            .collect()
    }

    /// Write the document as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content).with_context(|| {
            format!("Failed to write export file: {}", path.as_ref().display())
        })?;
        Ok(())
    }

    /// Read and version-check a document
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read export file: {}", path.as_ref().display())
        })?;
        let document: ExportDocument =
            serde_json::from_str(&content).context("Failed to parse export file")?;
        if document.version != EXPORT_VERSION {
            bail!(
                "unsupported export document version {} (expected {})",
                document.version,
                EXPORT_VERSION
            );
        }
        Ok(document)
    }
}
