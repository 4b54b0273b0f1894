/*!
 * Quality-aware translation cache.
 *
 * Cached results carry quality metrics, decay with age and are guarded by
 * invalidation rules. A single coordinated maintenance task owns the
 * periodic chores (revalidation, feedback, rules, degradation alerts).
 *
 * - `entry`: the cache entry model and decay/eviction scoring
 * - `rules`: toggleable invalidation rules
 * - `store`: the keyed store with zero-tolerance read/write gates
 * - `maintenance`: the background maintenance coordinator
 */

pub use self::entry::{decay_factor, CacheEntry, QualityMetrics};
pub use self::maintenance::{AlertKind, CacheMaintenance, MaintenanceReport, QualityAlert};
pub use self::rules::{default_rules, InvalidationRule, RuleConfig};
pub use self::store::{CacheHit, CacheStats, QualityCache, UserFeedback, WriteOutcome};

pub mod entry;
pub mod maintenance;
pub mod rules;
pub mod store;
