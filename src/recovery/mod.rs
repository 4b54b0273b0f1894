/*!
 * Error recovery.
 *
 * Recoverable errors are classified once per session; the class fixes an
 * ordered strategy chain that is walked without reselecting failed
 * strategies and always terminates in pre-vetted emergency content.
 *
 * - `strategies`: error classification and strategy chains
 * - `session`: per-request session state and attempt history
 * - `engine`: the strategy runner and statistics
 */

pub use self::engine::{
    ContaminatedOutput, RecoveryEngine, RecoveryOutcome, RecoveryStats, StrategyCounters,
};
pub use self::session::{RecoveryAttempt, RecoverySession};
pub use self::strategies::{ErrorClass, StrategyKind};

pub mod engine;
pub mod session;
pub mod strategies;
