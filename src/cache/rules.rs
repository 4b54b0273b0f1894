/*!
 * Cache invalidation rules.
 *
 * Rules are evaluated on reads and during maintenance cycles; each can be
 * toggled at runtime and the whole set is exportable for backup/restore.
 */

use serde::{Deserialize, Serialize};

use crate::app_config::CacheConfig;
use crate::request::TranslationMethod;

use super::entry::CacheEntry;

/// A single invalidation rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum InvalidationRule {
    /// Entry older than the configured age limit
    AgeLimit {
        /// Maximum entry age in seconds
        max_age_secs: u64,
    },
    /// Purity below threshold while zero tolerance is active
    ZeroPurity,
    /// Producing method's confidence below threshold
    LowConfidence {
        /// Confidence floor, 0.0 - 1.0
        threshold: f64,
    },
    /// Result was produced by a fallback method
    FallbackMethodUsed,
}

impl InvalidationRule {
    /// Stable identifier for logging and export
    pub fn id(&self) -> &'static str {
        match self {
            InvalidationRule::AgeLimit { .. } => "age_limit",
            InvalidationRule::ZeroPurity => "zero_purity",
            InvalidationRule::LowConfidence { .. } => "low_confidence",
            InvalidationRule::FallbackMethodUsed => "fallback_method_used",
        }
    }

    /// Whether the rule matches (i.e. the entry must be invalidated)
    pub fn matches(&self, entry: &CacheEntry, config: &CacheConfig) -> bool {
        match self {
            InvalidationRule::AgeLimit { max_age_secs } => {
                entry.age().as_secs() > *max_age_secs
            }
            InvalidationRule::ZeroPurity => {
                config.zero_tolerance && entry.quality.purity < config.purity_threshold
            }
            InvalidationRule::LowConfidence { threshold } => entry.quality.confidence < *threshold,
            InvalidationRule::FallbackMethodUsed => matches!(
                entry.method,
                TranslationMethod::Fallback | TranslationMethod::Emergency
            ),
        }
    }
}

/// A rule together with its enabled flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// The rule
    pub rule: InvalidationRule,
    /// Whether it participates in evaluation
    pub enabled: bool,
}

/// Default rule set derived from the cache configuration.
///
/// The fallback-method rule ships disabled; fallback results are already
/// quality-flagged and invalidating them would defeat their purpose.
pub fn default_rules(config: &CacheConfig) -> Vec<RuleConfig> {
    vec![
        RuleConfig {
            rule: InvalidationRule::AgeLimit {
                max_age_secs: config.max_entry_age_secs,
            },
            enabled: true,
        },
        RuleConfig {
            rule: InvalidationRule::ZeroPurity,
            enabled: true,
        },
        RuleConfig {
            rule: InvalidationRule::LowConfidence {
                threshold: config.low_confidence_threshold,
            },
            enabled: true,
        },
        RuleConfig {
            rule: InvalidationRule::FallbackMethodUsed,
            enabled: config.invalidate_fallback_method,
        },
    ]
}

/// Whether any enabled rule matches the entry
pub fn any_rule_matches(rules: &[RuleConfig], entry: &CacheEntry, config: &CacheConfig) -> bool {
    rules
        .iter()
        .filter(|r| r.enabled)
        .any(|r| r.rule.matches(entry, config))
}
