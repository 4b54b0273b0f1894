/*!
 * Request and result types flowing through the core.
 *
 * A `TranslationRequest` is created by the caller and treated as read-only
 * by every component; the `ProcessedTranslation` carries the validated text
 * back with the quality metadata accumulated on the way.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::language_utils::LanguagePair;

/// Priority levels for request scheduling, lower value = more urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Interactive requests that block a user
    RealTime = 0,
    /// Urgent batch work
    Urgent = 1,
    /// Elevated priority
    High = 2,
    /// Default priority
    Normal = 3,
    /// Background work
    Low = 4,
}

impl Priority {
    /// All priorities in dispatch order
    pub const ALL: [Priority; 5] = [
        Priority::RealTime,
        Priority::Urgent,
        Priority::High,
        Priority::Normal,
        Priority::Low,
    ];

    /// Lane index for per-priority queues
    pub fn lane(&self) -> usize {
        *self as usize
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// The kind of legal content being translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Article of a statute or code
    LegalArticle,
    /// Court decision or ruling
    CourtDecision,
    /// Clause of a contract
    ContractClause,
    /// General legal prose
    General,
}

impl Default for ContentType {
    fn default() -> Self {
        ContentType::General
    }
}

/// A unit of translation work submitted by a caller
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Unique request id
    pub id: Uuid,
    /// Source text to translate
    pub text: String,
    /// Source and target languages
    pub languages: LanguagePair,
    /// Kind of content
    pub content_type: ContentType,
    /// Scheduling priority
    pub priority: Priority,
    /// Optional caller-supplied context (surrounding article, case name)
    pub context: Option<String>,
}

impl TranslationRequest {
    /// Create a request with default priority and content type
    pub fn new(text: &str, languages: LanguagePair) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            languages,
            content_type: ContentType::default(),
            priority: Priority::default(),
            context: None,
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the content type
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Attach caller context
    pub fn with_context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }
}

/// How the final text was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationMethod {
    /// Primary AI-based backend
    PrimaryAi,
    /// Secondary dictionary/rule-based backend
    Secondary,
    /// Both backends combined
    Hybrid,
    /// Contextual fallback content generation
    Fallback,
    /// Pre-vetted emergency template
    Emergency,
    /// Served from the quality-aware cache
    Cache,
}

impl std::fmt::Display for TranslationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TranslationMethod::PrimaryAi => "primary_ai",
            TranslationMethod::Secondary => "secondary",
            TranslationMethod::Hybrid => "hybrid",
            TranslationMethod::Fallback => "fallback",
            TranslationMethod::Emergency => "emergency",
            TranslationMethod::Cache => "cache",
        };
        write!(f, "{}", s)
    }
}

/// The validated result returned to a caller
#[derive(Debug, Clone)]
pub struct ProcessedTranslation {
    /// Id of the originating request
    pub request_id: Uuid,
    /// The validated translated text
    pub text: String,
    /// Method that produced the text
    pub method: TranslationMethod,
    /// Backend confidence, 0.0 - 1.0
    pub confidence: f64,
    /// Final purity score, 0 - 100
    pub purity_score: f64,
    /// True when the result came from recovery or emergency content
    pub quality_degraded: bool,
    /// Recovery strategy applied, if any
    pub recovery_action: Option<String>,
    /// Whether the result was served from cache
    pub from_cache: bool,
    /// Non-fatal issues recorded along the way
    pub warnings: Vec<String>,
}

impl ProcessedTranslation {
    /// Create a clean (non-degraded) result
    pub fn clean(
        request_id: Uuid,
        text: String,
        method: TranslationMethod,
        confidence: f64,
        purity_score: f64,
    ) -> Self {
        Self {
            request_id,
            text,
            method,
            confidence,
            purity_score,
            quality_degraded: false,
            recovery_action: None,
            from_cache: false,
            warnings: Vec::new(),
        }
    }

    /// Mark as served from cache
    pub fn mark_cached(mut self) -> Self {
        self.from_cache = true;
        self.method = TranslationMethod::Cache;
        self
    }
}
