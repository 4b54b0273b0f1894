/*!
 * Mock collaborator implementations for testing and the CLI demo.
 *
 * This module provides mocks that simulate different behaviors:
 * - `MockBackend::working()` - Always succeeds with clean translated text
 * - `MockBackend::contaminated(..)` - Succeeds but injects contamination
 * - `MockBackend::failing()` - Always fails with a translation error
 * - `MockBackend::network_down()` - Always fails with a network error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::{SystemError, SystemErrorKind, TranslationError, TranslationErrorKind};
use crate::language_utils::{Language, LanguagePair, Script};

use super::{
    BackendFailure, FallbackGenerator, GeneratedContent, PurityBreakdown, PurityReport,
    PurityValidator, PurityViolation, TerminologyReport, TerminologyValidator, TranslationBackend,
    TranslationOutput,
};

/// Behavior mode for the mock backend
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a clean translation
    Working,
    /// Succeeds but appends the given contamination to the output
    Contaminated { injection: String },
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with a translation error
    Failing,
    /// Always fails with a network-level system error
    NetworkDown,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock translation backend
#[derive(Debug)]
pub struct MockBackend {
    /// Stable method identifier
    method_id: String,
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures and assertions
    request_count: Arc<AtomicUsize>,
    /// Confidence reported on success
    confidence: f64,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(method_id: &str, behavior: MockBehavior) -> Self {
        Self {
            method_id: method_id.to_string(),
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            confidence: 0.92,
        }
    }

    /// Create a working mock backend that always succeeds
    pub fn working(method_id: &str) -> Self {
        Self::new(method_id, MockBehavior::Working)
    }

    /// Create a mock whose output carries the given contamination
    pub fn contaminated(method_id: &str, injection: &str) -> Self {
        Self::new(
            method_id,
            MockBehavior::Contaminated {
                injection: injection.to_string(),
            },
        )
    }

    /// Create an intermittently failing mock backend
    pub fn intermittent(method_id: &str, fail_every: usize) -> Self {
        Self::new(method_id, MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock backend
    pub fn failing(method_id: &str) -> Self {
        Self::new(method_id, MockBehavior::Failing)
    }

    /// Create a mock simulating network failure
    pub fn network_down(method_id: &str) -> Self {
        Self::new(method_id, MockBehavior::NetworkDown)
    }

    /// Create a slow mock backend
    pub fn slow(method_id: &str, delay_ms: u64) -> Self {
        Self::new(method_id, MockBehavior::Slow { delay_ms })
    }

    /// Override the confidence reported on success
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Number of translate calls received so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Shared handle to the call counter, for assertions after a move
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.request_count.clone()
    }

    fn clean_translation(&self, text: &str, languages: LanguagePair) -> String {
        // Deterministic pseudo-translation so tests can assert on output
        match languages.target {
            Language::French => format!("[fr] {}", text),
            Language::Arabic => format!("[ar] {}", text),
        }
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    fn method_id(&self) -> &str {
        &self.method_id
    }

    async fn translate(
        &self,
        text: &str,
        languages: LanguagePair,
        _context: Option<&str>,
    ) -> Result<TranslationOutput, BackendFailure> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;

        match &self.behavior {
            MockBehavior::Working => Ok(TranslationOutput {
                text: self.clean_translation(text, languages),
                confidence: self.confidence,
                method: self.method_id.clone(),
                warnings: vec![],
            }),
            MockBehavior::Contaminated { injection } => Ok(TranslationOutput {
                text: format!("{} {}", self.clean_translation(text, languages), injection),
                confidence: self.confidence,
                method: self.method_id.clone(),
                warnings: vec!["output may contain artifacts".to_string()],
            }),
            MockBehavior::Intermittent { fail_every } => {
                if *fail_every > 0 && count % fail_every == 0 {
                    Err(BackendFailure::Translation(TranslationError::new(
                        TranslationErrorKind::MethodFailed,
                        &self.method_id,
                        "intermittent mock failure",
                    )))
                } else {
                    Ok(TranslationOutput {
                        text: self.clean_translation(text, languages),
                        confidence: self.confidence,
                        method: self.method_id.clone(),
                        warnings: vec![],
                    })
                }
            }
            MockBehavior::Failing => Err(BackendFailure::Translation(TranslationError::new(
                TranslationErrorKind::MethodFailed,
                &self.method_id,
                "mock backend always fails",
            ))),
            MockBehavior::NetworkDown => Err(BackendFailure::System(SystemError::new(
                SystemErrorKind::NetworkError,
                "mock network unreachable",
            ))),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(std::time::Duration::from_millis(*delay_ms)).await;
                Ok(TranslationOutput {
                    text: self.clean_translation(text, languages),
                    confidence: self.confidence,
                    method: self.method_id.clone(),
                    warnings: vec![],
                })
            }
        }
    }
}

/// Script-scanning purity validator.
///
/// Scores text by the share of characters whose script matches the language,
/// which is enough for tests and the CLI demo: clean mock output scores 100,
/// contaminated output does not.
#[derive(Debug, Default)]
pub struct ScriptPurityValidator;

impl ScriptPurityValidator {
    /// Create the validator
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PurityValidator for ScriptPurityValidator {
    async fn validate_purity(&self, text: &str, language: Language) -> PurityReport {
        let mut violations = Vec::new();
        let mut foreign = 0usize;
        let mut control = 0usize;
        let mut total = 0usize;

        for c in text.chars() {
            total += 1;
            let script = Script::of_char(c);
            if script.is_foreign() {
                foreign += 1;
            }
            if c == '\u{FFFD}' || (c.is_control() && c != '\n' && c != '\t') {
                control += 1;
            }
        }

        let _ = language;
        let script_purity = if total == 0 {
            100.0
        } else {
            100.0 * (1.0 - foreign as f64 / total as f64)
        };
        let encoding_integrity = if total == 0 {
            100.0
        } else {
            100.0 * (1.0 - control as f64 / total as f64)
        };

        if foreign > 0 {
            violations.push(PurityViolation {
                dimension: "script_purity".to_string(),
                detail: format!("{} foreign-script characters", foreign),
            });
        }
        if control > 0 {
            violations.push(PurityViolation {
                dimension: "encoding_integrity".to_string(),
                detail: format!("{} control/replacement characters", control),
            });
        }

        let overall = script_purity.min(encoding_integrity);
        PurityReport {
            is_pure: violations.is_empty(),
            score: PurityBreakdown {
                overall,
                script_purity,
                terminology_consistency: 100.0,
                encoding_integrity,
                contextual_coherence: 100.0,
                ui_elements_removed: 100.0,
            },
            violations,
        }
    }
}

/// Terminology validator that accepts everything at a fixed score
#[derive(Debug)]
pub struct FixedTerminologyValidator {
    score: f64,
}

impl FixedTerminologyValidator {
    /// Create with the given score
    pub fn new(score: f64) -> Self {
        Self { score }
    }

    /// Create a validator that always reports perfect consistency
    pub fn perfect() -> Self {
        Self::new(100.0)
    }
}

#[async_trait]
impl TerminologyValidator for FixedTerminologyValidator {
    async fn validate_consistency(&self, _text: &str, _language: Language) -> TerminologyReport {
        TerminologyReport {
            is_valid: self.score >= 100.0,
            score: self.score,
            inconsistencies: vec![],
        }
    }
}

/// Mock fallback generator producing simple professional content
#[derive(Debug)]
pub struct MockFallbackGenerator {
    /// When true, every generate call fails
    failing: bool,
    /// Intents seen, for assertions
    intents: Mutex<Vec<String>>,
}

impl MockFallbackGenerator {
    /// Create a working generator
    pub fn working() -> Self {
        Self {
            failing: false,
            intents: Mutex::new(Vec::new()),
        }
    }

    /// Create a failing generator
    pub fn failing() -> Self {
        Self {
            failing: true,
            intents: Mutex::new(Vec::new()),
        }
    }

    /// Intents this generator has been asked for
    pub fn seen_intents(&self) -> Vec<String> {
        self.intents.lock().clone()
    }
}

#[async_trait]
impl FallbackGenerator for MockFallbackGenerator {
    async fn generate(
        &self,
        intent: &str,
        language: Language,
    ) -> Result<GeneratedContent, SystemError> {
        self.intents.lock().push(intent.to_string());

        if self.failing {
            return Err(SystemError::new(
                SystemErrorKind::ServiceUnavailable,
                "mock generator unavailable",
            ));
        }

        let content = match language {
            Language::French => {
                "Le contenu juridique demandé est en cours de préparation.".to_string()
            }
            Language::Arabic => "المحتوى القانوني المطلوب قيد الإعداد.".to_string(),
        };

        Ok(GeneratedContent {
            content,
            confidence: 0.7,
            method: "mock_fallback".to_string(),
            alternatives: vec![],
        })
    }
}
