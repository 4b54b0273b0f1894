/*!
 * External collaborator interfaces.
 *
 * The core never translates text itself. Translation backends, the purity
 * validator, the terminology validator and the fallback-content generator
 * are all trait-typed collaborators injected at construction, so they can
 * be swapped for mocks in tests or for real services in production.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::{SystemError, TranslationError};
use crate::language_utils::{Language, LanguagePair};

pub mod mock;

/// Output of a translation backend call
#[derive(Debug, Clone)]
pub struct TranslationOutput {
    /// Translated text
    pub text: String,
    /// Backend confidence, 0.0 - 1.0
    pub confidence: f64,
    /// Identifier of the method that produced the text
    pub method: String,
    /// Non-fatal warnings from the backend
    pub warnings: Vec<String>,
}

/// Failure modes a backend call can produce
#[derive(Debug, Clone)]
pub enum BackendFailure {
    /// The translation itself failed
    Translation(TranslationError),
    /// The backend or its transport is down
    System(SystemError),
}

/// A machine-translation backend (primary AI-based or secondary rule-based)
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Stable identifier, e.g. "primary_ai"
    fn method_id(&self) -> &str;

    /// Translate text between the given languages
    async fn translate(
        &self,
        text: &str,
        languages: LanguagePair,
        context: Option<&str>,
    ) -> Result<TranslationOutput, BackendFailure>;
}

/// Per-dimension purity breakdown, each 0 - 100
#[derive(Debug, Clone, Copy)]
pub struct PurityBreakdown {
    /// Combined score
    pub overall: f64,
    /// Freedom from foreign-script runs
    pub script_purity: f64,
    /// Consistency of legal terminology
    pub terminology_consistency: f64,
    /// Freedom from replacement/control characters
    pub encoding_integrity: f64,
    /// Coherence with the surrounding legal context
    pub contextual_coherence: f64,
    /// Freedom from UI artifacts
    pub ui_elements_removed: f64,
}

impl PurityBreakdown {
    /// A perfect breakdown, used for pre-vetted emergency templates
    pub fn perfect() -> Self {
        Self {
            overall: 100.0,
            script_purity: 100.0,
            terminology_consistency: 100.0,
            encoding_integrity: 100.0,
            contextual_coherence: 100.0,
            ui_elements_removed: 100.0,
        }
    }
}

/// A purity violation reported by the validator
#[derive(Debug, Clone)]
pub struct PurityViolation {
    /// Which dimension was violated
    pub dimension: String,
    /// Human-readable detail
    pub detail: String,
}

/// Result of purity validation
#[derive(Debug, Clone)]
pub struct PurityReport {
    /// Whether the text is considered pure
    pub is_pure: bool,
    /// Per-dimension scores
    pub score: PurityBreakdown,
    /// Violations found
    pub violations: Vec<PurityViolation>,
}

/// Validates that text is free of contamination
#[async_trait]
pub trait PurityValidator: Send + Sync + Debug {
    /// Validate the purity of text in the given language
    async fn validate_purity(&self, text: &str, language: Language) -> PurityReport;
}

/// A terminology inconsistency
#[derive(Debug, Clone)]
pub struct TerminologyInconsistency {
    /// The offending term
    pub term: String,
    /// Expected rendering
    pub expected: String,
    /// Detail
    pub detail: String,
}

/// Result of terminology validation
#[derive(Debug, Clone)]
pub struct TerminologyReport {
    /// Whether terminology usage is consistent
    pub is_valid: bool,
    /// Consistency score, 0 - 100
    pub score: f64,
    /// Inconsistencies found
    pub inconsistencies: Vec<TerminologyInconsistency>,
}

/// Validates legal-terminology consistency
#[async_trait]
pub trait TerminologyValidator: Send + Sync + Debug {
    /// Validate terminology consistency of text in the given language
    async fn validate_consistency(&self, text: &str, language: Language) -> TerminologyReport;
}

/// Content produced by the fallback generator
#[derive(Debug, Clone)]
pub struct GeneratedContent {
    /// The generated text
    pub content: String,
    /// Generator confidence, 0.0 - 1.0
    pub confidence: f64,
    /// Identifier of the generation method
    pub method: String,
    /// Alternative renderings, best first
    pub alternatives: Vec<String>,
}

/// Generates contextual fallback content from a detected intent
#[async_trait]
pub trait FallbackGenerator: Send + Sync + Debug {
    /// Generate fallback content for the given intent and language
    async fn generate(
        &self,
        intent: &str,
        language: Language,
    ) -> Result<GeneratedContent, SystemError>;
}
