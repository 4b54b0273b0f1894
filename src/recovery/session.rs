/*!
 * Recovery session tracking.
 *
 * A session is opened per failed request and remembers which strategies
 * already failed; a strategy is never reselected within the same session.
 */

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::strategies::{ErrorClass, StrategyKind};

/// One attempted strategy within a session
#[derive(Debug, Clone)]
pub struct RecoveryAttempt {
    /// The strategy that ran
    pub strategy: StrategyKind,
    /// Whether it produced an accepted result
    pub succeeded: bool,
    /// Wall time the attempt took
    pub elapsed: Duration,
    /// Failure detail, if any
    pub detail: Option<String>,
    /// When the attempt finished
    pub at: DateTime<Utc>,
}

/// State of one recovery session
#[derive(Debug)]
pub struct RecoverySession {
    /// Session id
    pub id: Uuid,
    /// Id of the request being recovered
    pub request_id: Uuid,
    /// Error class fixed at session open
    pub error_class: ErrorClass,
    /// Attempts in order
    pub attempts: Vec<RecoveryAttempt>,
    failed: HashSet<StrategyKind>,
    started_at: Instant,
}

impl RecoverySession {
    /// Open a session for a classified error
    pub fn open(request_id: Uuid, error_class: ErrorClass) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_id,
            error_class,
            attempts: Vec::new(),
            failed: HashSet::new(),
            started_at: Instant::now(),
        }
    }

    /// Next strategy from the session's chain, skipping ones that already
    /// failed. Returns `None` when the chain or the attempt budget is
    /// exhausted.
    pub fn next_strategy(&self, max_attempts: usize) -> Option<StrategyKind> {
        if self.attempts.len() >= max_attempts {
            return None;
        }
        self.error_class
            .chain()
            .iter()
            .find(|s| !self.has_failed(**s))
            .copied()
    }

    /// Record a finished attempt
    pub fn record(&mut self, attempt: RecoveryAttempt) {
        if !attempt.succeeded {
            self.failed.insert(attempt.strategy);
        }
        self.attempts.push(attempt);
    }

    /// Whether the given strategy already failed in this session
    pub fn has_failed(&self, strategy: StrategyKind) -> bool {
        self.failed.contains(&strategy)
    }

    /// Total session duration so far
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
