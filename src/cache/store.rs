/*!
 * Quality-aware cache store.
 *
 * Memoizes only results that meet the purity threshold under the active
 * tolerance policy, serves entries only while TTL, decayed quality and the
 * enabled invalidation rules allow it, and evicts by composite
 * recency + frequency + quality score under capacity pressure.
 */

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::app_config::CacheConfig;
use crate::language_utils::{Language, LanguagePair};
use crate::request::{ContentType, TranslationMethod};

use super::entry::{CacheEntry, QualityMetrics};
use super::rules::{any_rule_matches, default_rules, RuleConfig};

/// Explicit outcome of a cache write; a purity-gated rejection is
/// observable, never a silent no-op
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The entry was stored
    Written,
    /// The entry failed the purity gate and was not stored
    Rejected {
        /// Purity score of the rejected result
        purity_score: f64,
        /// Threshold it failed to meet
        required: f64,
    },
}

impl WriteOutcome {
    /// Whether the write happened
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written)
    }
}

/// A successful cache read
#[derive(Debug, Clone)]
pub struct CacheHit {
    /// The cached text
    pub text: String,
    /// Method that produced it
    pub method: TranslationMethod,
    /// Quality metrics at write time
    pub quality: QualityMetrics,
}

/// User feedback on a served entry, drained during maintenance
#[derive(Debug, Clone)]
pub struct UserFeedback {
    /// Key of the entry the feedback is about
    pub key: String,
    /// Positive or negative
    pub positive: bool,
    /// Optional free-text comment
    pub comment: Option<String>,
}

/// Read/write counters
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Successful reads
    pub hits: u64,
    /// Misses (absent, expired, decayed or rule-invalidated)
    pub misses: u64,
    /// Writes accepted
    pub writes: u64,
    /// Writes rejected by the purity gate
    pub rejected_writes: u64,
    /// Entries evicted under pressure
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate over all reads
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// The quality-aware cache service
pub struct QualityCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    rules: RwLock<Vec<RuleConfig>>,
    feedback: Mutex<VecDeque<UserFeedback>>,
    stats: Mutex<CacheStats>,
    config: CacheConfig,
}

impl QualityCache {
    /// Create a cache with the default rule set
    pub fn new(config: CacheConfig) -> Self {
        let rules = default_rules(&config);
        Self {
            entries: RwLock::new(HashMap::new()),
            rules: RwLock::new(rules),
            feedback: Mutex::new(VecDeque::new()),
            stats: Mutex::new(CacheStats::default()),
            config,
        }
    }

    /// Deterministic cache key for a request
    pub fn key(text: &str, languages: LanguagePair, content_type: ContentType) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(languages.key().as_bytes());
        hasher.update(format!("{:?}", content_type).as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Read an entry if it is still servable.
    ///
    /// The hit path holds only a shared lock so concurrent readers do not
    /// serialize; access tracking lives inside the entry.
    pub fn get(&self, key: &str) -> Option<CacheHit> {
        let mut expired = false;
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if self.is_servable(entry) => {
                    entry.touch();
                    let hit = CacheHit {
                        text: entry.text.clone(),
                        method: entry.method.clone(),
                        quality: entry.quality,
                    };
                    drop(entries);
                    self.stats.lock().hits += 1;
                    debug!("Cache hit for {}", &key[..key.len().min(12)]);
                    return Some(hit);
                }
                Some(entry) => expired = entry.is_expired(),
                None => {}
            }
        }

        // Expired entries are dropped on the read path; re-check under the
        // write lock in case a fresh entry replaced it in the meantime
        if expired {
            let mut entries = self.entries.write();
            if entries.get(key).map(|e| e.is_expired()).unwrap_or(false) {
                entries.remove(key);
            }
        }
        self.stats.lock().misses += 1;
        None
    }

    /// Write an entry, subject to the purity gate
    pub fn set(
        &self,
        key: &str,
        text: &str,
        language: Language,
        method: TranslationMethod,
        quality: QualityMetrics,
        ttl: Option<Duration>,
    ) -> WriteOutcome {
        if self.config.zero_tolerance && quality.purity < self.config.purity_threshold {
            self.stats.lock().rejected_writes += 1;
            warn!(
                "Cache write rejected: purity {:.1} below threshold {:.1}",
                quality.purity, self.config.purity_threshold
            );
            return WriteOutcome::Rejected {
                purity_score: quality.purity,
                required: self.config.purity_threshold,
            };
        }

        let ttl = ttl.unwrap_or(Duration::from_secs(self.config.default_ttl_secs));
        let entry = CacheEntry::new(text.to_string(), language, method, quality, ttl);

        {
            let mut entries = self.entries.write();
            if entries.len() >= self.config.capacity && !entries.contains_key(key) {
                evict_lowest(&mut entries, &mut self.stats.lock());
            }
            entries.insert(key.to_string(), entry);
        }

        self.stats.lock().writes += 1;
        WriteOutcome::Written
    }

    /// Remove all entries whose text matches the pattern.
    ///
    /// A malformed pattern degrades to a no-op rather than raising.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let regex = match Regex::new(pattern) {
            Ok(r) => r,
            Err(e) => {
                warn!("Malformed invalidation pattern '{}': {}", pattern, e);
                return 0;
            }
        };

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !regex.is_match(&entry.text));
        before - entries.len()
    }

    /// Remove a single entry by key
    pub fn invalidate_key(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Queue user feedback for the next maintenance cycle
    pub fn submit_feedback(&self, feedback: UserFeedback) {
        self.feedback.lock().push_back(feedback);
    }

    /// Drain all queued feedback
    pub(crate) fn drain_feedback(&self) -> Vec<UserFeedback> {
        self.feedback.lock().drain(..).collect()
    }

    /// Current rule set
    pub fn rules(&self) -> Vec<RuleConfig> {
        self.rules.read().clone()
    }

    /// Replace the rule set (operator/import path)
    pub fn set_rules(&self, rules: Vec<RuleConfig>) {
        *self.rules.write() = rules;
    }

    /// Run a closure over every entry (maintenance path)
    pub(crate) fn for_each_entry<F: FnMut(&str, &CacheEntry)>(&self, mut f: F) {
        for (key, entry) in self.entries.read().iter() {
            f(key, entry);
        }
    }

    /// Remove entries failing any enabled invalidation rule; returns count
    pub(crate) fn apply_rules(&self) -> usize {
        let rules = self.rules.read().clone();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !any_rule_matches(&rules, entry, &self.config));
        before - entries.len()
    }

    /// Average decayed quality over all entries
    pub fn average_quality(&self) -> Option<f64> {
        let entries = self.entries.read();
        if entries.is_empty() {
            return None;
        }
        let sum: f64 = entries
            .values()
            .map(|e| e.decayed_quality(self.config.decay_rate_per_hour))
            .sum();
        Some(sum / entries.len() as f64)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copy of the counters
    pub fn stats(&self) -> CacheStats {
        *self.stats.lock()
    }

    /// Cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn is_servable(&self, entry: &CacheEntry) -> bool {
        if entry.is_expired() {
            return false;
        }
        if self.config.zero_tolerance && entry.quality.purity < self.config.purity_threshold {
            return false;
        }
        if entry.decayed_quality(self.config.decay_rate_per_hour) < self.config.quality_threshold {
            return false;
        }
        let rules = self.rules.read();
        !any_rule_matches(&rules, entry, &self.config)
    }
}

fn evict_lowest(entries: &mut HashMap<String, CacheEntry>, stats: &mut CacheStats) {
    let victim = entries
        .iter()
        .min_by(|a, b| {
            a.1.composite_score()
                .partial_cmp(&b.1.composite_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(k, _)| k.clone());

    if let Some(key) = victim {
        entries.remove(&key);
        stats.evictions += 1;
        debug!("Evicted cache entry {}", &key[..key.len().min(12)]);
    }
}
