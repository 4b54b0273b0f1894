/*!
 * Proactive pattern detection against the mutable blacklist.
 *
 * - `blacklist`: validated pattern specs and the categorized entry store
 * - `detector`: the memoizing scanner with risk/confidence aggregation
 */

pub use self::blacklist::{
    Blacklist, BlacklistEntry, PatternCategory, PatternSpec, Provenance, Severity,
};
pub use self::detector::{
    DetectionReport, PatternDetector, PatternMatch, Recommendation, RiskLevel,
};

pub mod blacklist;
#[allow(clippy::module_inception)]
pub mod detector;
