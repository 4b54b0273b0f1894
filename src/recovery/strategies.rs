/*!
 * Recovery strategy selection.
 *
 * Every recoverable error is classified once, and the class fixes the
 * ordered strategy chain for the whole session. Chains always end in
 * emergency content, which cannot fail.
 */

use std::fmt;

use crate::errors::{CoreError, SystemErrorKind};

/// A recovery strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Retry through an alternate translation backend
    MethodSwitching,
    /// Retry the primary backend and revalidate; clean the rejected
    /// output when the retry fails
    QualityValidationRecovery,
    /// Serve emergency content tagged quality-degraded
    GracefulDegradation,
    /// Ask the fallback generator for substitute content
    GenerateFallback,
    /// Serve pre-vetted emergency content; terminal, always succeeds
    ApplyEmergencyContent,
}

impl StrategyKind {
    /// Stable identifier for logging and stats
    pub fn id(&self) -> &'static str {
        match self {
            StrategyKind::MethodSwitching => "method_switching",
            StrategyKind::QualityValidationRecovery => "quality_validation_recovery",
            StrategyKind::GracefulDegradation => "graceful_degradation",
            StrategyKind::GenerateFallback => "generate_fallback",
            StrategyKind::ApplyEmergencyContent => "apply_emergency_content",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Class of the error that opened a recovery session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// A translation backend failed or produced unusable output
    TranslationFailure,
    /// Output failed a purity gate
    PurityViolation,
    /// A backing service is degraded but reachable
    ServiceDisruption,
    /// The network is down; no backend can be reached
    NetworkOutage,
    /// Unrecoverable system state
    CriticalFailure,
}

impl ErrorClass {
    /// Classify a recoverable error
    pub fn classify(error: &CoreError) -> Self {
        match error {
            CoreError::Translation(_) => ErrorClass::TranslationFailure,
            CoreError::Purity(_) => ErrorClass::PurityViolation,
            CoreError::System(e) => match e.kind {
                SystemErrorKind::NetworkError => ErrorClass::NetworkOutage,
                SystemErrorKind::ServiceUnavailable => ErrorClass::ServiceDisruption,
                SystemErrorKind::Critical => ErrorClass::CriticalFailure,
            },
            // Request and scheduler errors are caller-side; if one reaches
            // recovery anyway, only emergency content is safe
            _ => ErrorClass::CriticalFailure,
        }
    }

    /// The ordered strategy chain for this class.
    ///
    /// Network outages and critical failures skip straight to emergency
    /// content; no backend call can succeed there.
    pub fn chain(&self) -> &'static [StrategyKind] {
        match self {
            ErrorClass::TranslationFailure => &[
                StrategyKind::MethodSwitching,
                StrategyKind::GenerateFallback,
                StrategyKind::ApplyEmergencyContent,
            ],
            ErrorClass::PurityViolation => &[
                StrategyKind::QualityValidationRecovery,
                StrategyKind::GenerateFallback,
                StrategyKind::ApplyEmergencyContent,
            ],
            ErrorClass::ServiceDisruption => &[
                StrategyKind::GracefulDegradation,
                StrategyKind::GenerateFallback,
                StrategyKind::ApplyEmergencyContent,
            ],
            ErrorClass::NetworkOutage | ErrorClass::CriticalFailure => {
                &[StrategyKind::ApplyEmergencyContent]
            }
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorClass::TranslationFailure => "translation_failure",
            ErrorClass::PurityViolation => "purity_violation",
            ErrorClass::ServiceDisruption => "service_disruption",
            ErrorClass::NetworkOutage => "network_outage",
            ErrorClass::CriticalFailure => "critical_failure",
        };
        write!(f, "{}", name)
    }
}
