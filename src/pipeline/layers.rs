/*!
 * Pluggable validation layers.
 *
 * Each layer scores a text 0-100 and reports issues. Layers within one
 * checkpoint execute sequentially by ascending priority; a layer that
 * fails outright is recorded as a CRITICAL issue without aborting its
 * siblings (the checkpoint driver handles that).
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backends::{PurityValidator, TerminologyValidator};
use crate::detector::{PatternDetector, Severity};
use crate::language_utils::Language;

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueSeverity {
    /// Recorded but does not affect the verdict
    Warning,
    /// Scores against the layer
    Error,
    /// Text must not be served as-is
    Critical,
}

/// A single issue found by a layer
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Kind of issue, e.g. "foreign_alphabet"
    pub kind: String,
    /// Severity
    pub severity: IssueSeverity,
    /// Byte span in the text, when known
    pub span: Option<(usize, usize)>,
    /// Suggested fix, when known
    pub suggested_fix: Option<String>,
    /// Human-readable description
    pub message: String,
}

impl ValidationIssue {
    /// Create a warning issue
    pub fn warning(kind: &str, message: String) -> Self {
        Self {
            kind: kind.to_string(),
            severity: IssueSeverity::Warning,
            span: None,
            suggested_fix: None,
            message,
        }
    }

    /// Create an error issue
    pub fn error(kind: &str, message: String) -> Self {
        Self {
            kind: kind.to_string(),
            severity: IssueSeverity::Error,
            span: None,
            suggested_fix: None,
            message,
        }
    }

    /// Create a critical issue
    pub fn critical(kind: &str, message: String) -> Self {
        Self {
            kind: kind.to_string(),
            severity: IssueSeverity::Critical,
            span: None,
            suggested_fix: None,
            message,
        }
    }

    /// Attach a span
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some((start, end));
        self
    }

    /// Attach a suggested fix
    pub fn with_fix(mut self, fix: &str) -> Self {
        self.suggested_fix = Some(fix.to_string());
        self
    }
}

/// One layer's verdict for one checkpoint invocation
#[derive(Debug, Clone)]
pub struct ValidationLayerResult {
    /// Which layer produced this
    pub layer: LayerKind,
    /// Score, 0 - 100
    pub score: f64,
    /// Issues found
    pub issues: Vec<ValidationIssue>,
    /// Layer confidence in its own score, 0.0 - 1.0
    pub confidence: f64,
    /// Time the layer took
    pub elapsed: Duration,
}

/// Identifier of a built-in validation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Blacklist pattern detection
    PatternDetection,
    /// External purity validation
    Purity,
    /// External terminology consistency
    Terminology,
    /// Replacement/control character scan
    EncodingIntegrity,
    /// Generic content quality (length, repetition)
    ContentQuality,
}

impl LayerKind {
    /// Execution priority within a checkpoint, lower runs first
    pub fn priority(&self) -> u8 {
        match self {
            LayerKind::EncodingIntegrity => 10,
            LayerKind::ContentQuality => 20,
            LayerKind::PatternDetection => 30,
            LayerKind::Purity => 40,
            LayerKind::Terminology => 50,
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LayerKind::PatternDetection => "pattern_detection",
            LayerKind::Purity => "purity",
            LayerKind::Terminology => "terminology",
            LayerKind::EncodingIntegrity => "encoding_integrity",
            LayerKind::ContentQuality => "content_quality",
        };
        write!(f, "{}", s)
    }
}

/// A pluggable validation layer
#[async_trait]
pub trait ValidationLayer: Send + Sync {
    /// Which built-in slot this layer fills
    fn kind(&self) -> LayerKind;

    /// Validate text, producing a scored result
    async fn validate(
        &self,
        text: &str,
        language: Language,
    ) -> anyhow::Result<ValidationLayerResult>;
}

fn result(
    layer: LayerKind,
    score: f64,
    issues: Vec<ValidationIssue>,
    confidence: f64,
    started: Instant,
) -> ValidationLayerResult {
    ValidationLayerResult {
        layer,
        score: score.clamp(0.0, 100.0),
        issues,
        confidence,
        elapsed: started.elapsed(),
    }
}

/// Layer delegating to the pattern detector
pub struct PatternLayer {
    detector: Arc<PatternDetector>,
}

impl PatternLayer {
    /// Create over a shared detector
    pub fn new(detector: Arc<PatternDetector>) -> Self {
        Self { detector }
    }
}

#[async_trait]
impl ValidationLayer for PatternLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::PatternDetection
    }

    async fn validate(
        &self,
        text: &str,
        language: Language,
    ) -> anyhow::Result<ValidationLayerResult> {
        let started = Instant::now();
        let report = self.detector.detect(text, language);

        let mut score = 100.0;
        let mut issues = Vec::new();
        for m in &report.matches {
            let penalty = match m.severity {
                Severity::Low => 2.0,
                Severity::Medium => 8.0,
                Severity::High => 20.0,
                Severity::Critical => 100.0,
            };
            score -= penalty;

            let issue_severity = match m.severity {
                Severity::Critical => IssueSeverity::Critical,
                Severity::High => IssueSeverity::Error,
                _ => IssueSeverity::Warning,
            };
            issues.push(
                ValidationIssue {
                    kind: m.category.to_string(),
                    severity: issue_severity,
                    span: Some((m.start, m.end)),
                    suggested_fix: report
                        .recommendations
                        .iter()
                        .find(|r| r.category == m.category)
                        .map(|r| r.action.clone()),
                    message: format!("blacklisted pattern matched: {:?}", m.content),
                },
            );
        }

        Ok(result(
            self.kind(),
            score,
            issues,
            report.confidence,
            started,
        ))
    }
}

/// Layer delegating to the external purity validator
pub struct PurityLayer {
    validator: Arc<dyn PurityValidator>,
}

impl PurityLayer {
    /// Create over a shared validator
    pub fn new(validator: Arc<dyn PurityValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl ValidationLayer for PurityLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Purity
    }

    async fn validate(
        &self,
        text: &str,
        language: Language,
    ) -> anyhow::Result<ValidationLayerResult> {
        let started = Instant::now();
        let report = self.validator.validate_purity(text, language).await;

        let issues = report
            .violations
            .iter()
            .map(|v| {
                ValidationIssue::error(&v.dimension, v.detail.clone())
            })
            .collect();

        Ok(result(self.kind(), report.score.overall, issues, 0.95, started))
    }
}

/// Layer delegating to the external terminology validator
pub struct TerminologyLayer {
    validator: Arc<dyn TerminologyValidator>,
}

impl TerminologyLayer {
    /// Create over a shared validator
    pub fn new(validator: Arc<dyn TerminologyValidator>) -> Self {
        Self { validator }
    }
}

#[async_trait]
impl ValidationLayer for TerminologyLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Terminology
    }

    async fn validate(
        &self,
        text: &str,
        language: Language,
    ) -> anyhow::Result<ValidationLayerResult> {
        let started = Instant::now();
        let report = self.validator.validate_consistency(text, language).await;

        let issues = report
            .inconsistencies
            .iter()
            .map(|inc| {
                ValidationIssue::warning(
                    "terminology_inconsistency",
                    format!("'{}' should read '{}': {}", inc.term, inc.expected, inc.detail),
                )
                .with_fix(&inc.expected)
            })
            .collect();

        Ok(result(self.kind(), report.score, issues, 0.9, started))
    }
}

/// Layer scanning for replacement and control characters
#[derive(Debug, Default)]
pub struct EncodingLayer;

impl EncodingLayer {
    /// Create the layer
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ValidationLayer for EncodingLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::EncodingIntegrity
    }

    async fn validate(
        &self,
        text: &str,
        _language: Language,
    ) -> anyhow::Result<ValidationLayerResult> {
        let started = Instant::now();
        let mut issues = Vec::new();
        let mut bad = 0usize;

        for (offset, c) in text.char_indices() {
            let is_bad = c == '\u{FFFD}'
                || (c.is_control() && c != '\n' && c != '\t' && c != '\r');
            if is_bad {
                bad += 1;
                if issues.len() < 10 {
                    issues.push(
                        ValidationIssue::critical(
                            "encoding_corruption",
                            format!("corrupt character U+{:04X}", c as u32),
                        )
                        .with_span(offset, offset + c.len_utf8())
                        .with_fix("remove control and replacement characters"),
                    );
                }
            }
        }

        let total = text.chars().count().max(1);
        let score = 100.0 * (1.0 - bad as f64 / total as f64);

        Ok(result(self.kind(), score, issues, 1.0, started))
    }
}

/// Generic content quality layer: non-empty, minimum length, repetition
#[derive(Debug)]
pub struct ContentQualityLayer {
    min_length: usize,
    max_repetition_ratio: f64,
}

impl ContentQualityLayer {
    /// Create with explicit bounds
    pub fn new(min_length: usize, max_repetition_ratio: f64) -> Self {
        Self {
            min_length,
            max_repetition_ratio,
        }
    }
}

#[async_trait]
impl ValidationLayer for ContentQualityLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::ContentQuality
    }

    async fn validate(
        &self,
        text: &str,
        _language: Language,
    ) -> anyhow::Result<ValidationLayerResult> {
        let started = Instant::now();
        let mut issues = Vec::new();
        let mut score = 100.0;

        let trimmed = text.trim();
        if trimmed.is_empty() {
            issues.push(ValidationIssue::critical(
                "empty_content",
                "text is empty or whitespace-only".to_string(),
            ));
            return Ok(result(self.kind(), 0.0, issues, 1.0, started));
        }

        if trimmed.chars().count() < self.min_length {
            score -= 40.0;
            issues.push(ValidationIssue::error(
                "below_minimum_length",
                format!(
                    "text has {} characters, minimum is {}",
                    trimmed.chars().count(),
                    self.min_length
                ),
            ));
        }

        let words: Vec<&str> = trimmed.split_whitespace().collect();
        if words.len() >= 4 {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for w in &words {
                *counts.entry(*w).or_insert(0) += 1;
            }
            let most_common = counts.values().copied().max().unwrap_or(0);
            let repetition = most_common as f64 / words.len() as f64;
            if repetition > self.max_repetition_ratio {
                score -= 50.0;
                issues.push(ValidationIssue::error(
                    "excessive_repetition",
                    format!("repetition ratio {:.2} exceeds {:.2}", repetition, self.max_repetition_ratio),
                ));
            }
        }

        Ok(result(self.kind(), score, issues, 0.85, started))
    }
}
