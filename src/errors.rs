/*!
 * Error types for the lexipure core.
 *
 * This module contains custom error types for the request-processing core,
 * using the thiserror crate for ergonomic error definitions. The taxonomy
 * separates caller-visible conditions (malformed request, backpressure,
 * timeout) from recoverable ones (translation and purity failures, which
 * are intercepted by error recovery before they reach a caller).
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors caused by the request itself, surfaced directly to the caller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    /// The request text is empty or whitespace-only
    #[error("Request text is empty")]
    EmptyText,

    /// The request text exceeds the configured maximum length
    #[error("Request text exceeds maximum length: {length} > {max}")]
    TextTooLong {
        /// Actual text length in characters
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// The language pair is not supported by the core
    #[error("Unsupported language pair: {0} -> {1}")]
    UnsupportedLanguagePair(String, String),
}

/// Errors raised by the scheduler, surfaced directly to the caller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// The wait queue is at capacity; the caller may retry later
    #[error("Queue at capacity ({capacity}), request rejected")]
    QueueFull {
        /// Configured queue capacity
        capacity: usize,
    },

    /// The request deadline expired while queued or executing
    #[error("Request timed out after {elapsed_ms}ms ({phase})")]
    Timeout {
        /// Milliseconds elapsed when the deadline fired
        elapsed_ms: u64,
        /// Whether the request was queued or executing
        phase: TimeoutPhase,
    },

    /// The scheduler is shutting down and no longer admits requests
    #[error("Scheduler is shutting down")]
    ShuttingDown,
}

/// Where a request was when its deadline expired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    /// Still waiting in the priority queue
    Queued,
    /// Dispatched and executing against the translation path
    Executing,
}

impl std::fmt::Display for TimeoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutPhase::Queued => write!(f, "queued"),
            TimeoutPhase::Executing => write!(f, "executing"),
        }
    }
}

/// Kinds of upstream translation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationErrorKind {
    /// The backend returned an explicit failure
    MethodFailed,
    /// The backend returned empty or unusable output
    EmptyOutput,
    /// The backend response could not be interpreted
    InvalidResponse,
}

/// Errors from the upstream translation path, intercepted by error recovery
#[derive(Error, Debug, Clone)]
#[error("Translation failed ({kind:?}) via {method}: {message}")]
pub struct TranslationError {
    /// The kind of failure
    pub kind: TranslationErrorKind,
    /// The translation method that failed
    pub method: String,
    /// Failure detail
    pub message: String,
}

impl TranslationError {
    /// Create a new translation error
    pub fn new(kind: TranslationErrorKind, method: &str, message: &str) -> Self {
        Self {
            kind,
            method: method.to_string(),
            message: message.to_string(),
        }
    }
}

/// Output failed the purity or quality gate, intercepted by error recovery
#[derive(Error, Debug, Clone)]
#[error("Purity violation at {stage}: score {score} below required {required}")]
pub struct PurityViolationError {
    /// Pipeline stage that rejected the text
    pub stage: String,
    /// Aggregate score achieved
    pub score: f64,
    /// Score the stage required
    pub required: f64,
    /// Issues recorded by the failing checkpoint
    pub issues: Vec<String>,
}

/// Kinds of system-level failure, routed straight to emergency content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemErrorKind {
    /// Network-level failure reaching a collaborator
    NetworkError,
    /// A collaborator reported itself unavailable
    ServiceUnavailable,
    /// Unrecoverable internal failure
    Critical,
}

/// System-level errors; always answered with emergency content
#[derive(Error, Debug, Clone)]
#[error("System error ({kind:?}): {message}")]
pub struct SystemError {
    /// The kind of system failure
    pub kind: SystemErrorKind,
    /// Failure detail
    pub message: String,
}

impl SystemError {
    /// Create a new system error
    pub fn new(kind: SystemErrorKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

/// Main error type wrapping all core error categories
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Malformed or invalid request
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Scheduler-level condition (backpressure, timeout, shutdown)
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Upstream translation failure
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Purity or quality gate failure
    #[error("Purity error: {0}")]
    Purity(#[from] PurityViolationError),

    /// System-level failure
    #[error("System error: {0}")]
    System(#[from] SystemError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl CoreError {
    /// Whether error recovery should intercept this error instead of
    /// surfacing it to the caller
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::Translation(_) | CoreError::Purity(_) | CoreError::System(_)
        )
    }

    /// Whether the caller may usefully retry the same request
    pub fn is_retryable_by_caller(&self) -> bool {
        matches!(
            self,
            CoreError::Scheduler(SchedulerError::QueueFull { .. })
                | CoreError::Scheduler(SchedulerError::Timeout { .. })
        )
    }
}

// Utility conversions for error bridging
impl From<anyhow::Error> for CoreError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
