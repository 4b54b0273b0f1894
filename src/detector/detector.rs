/*!
 * Stateful pattern detection over the blacklist.
 *
 * `detect` scans every active blacklist entry against the text and returns
 * all matches with spans, an aggregate risk level, a confidence estimate
 * derived from match density and severity weighting, and ranked remediation
 * recommendations. Scans are memoized by content hash and language in a
 * bounded, oldest-first-evicted cache; any blacklist mutation invalidates
 * the memo via the blacklist generation counter.
 */

use std::collections::{HashMap, VecDeque};

use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use sha2::{Digest, Sha256};

use crate::app_config::DetectorConfig;
use crate::language_utils::Language;

use super::blacklist::{
    Blacklist, BlacklistEntry, PatternCategory, PatternSpec, Provenance, Severity,
};

/// A single pattern match in scanned text
#[derive(Debug, Clone)]
pub struct PatternMatch {
    /// Id of the matching blacklist entry
    pub entry_id: u64,
    /// The matched content
    pub content: String,
    /// Byte offset where the match starts
    pub start: usize,
    /// Byte offset where the match ends
    pub end: usize,
    /// Category of the matching pattern
    pub category: PatternCategory,
    /// Severity of the matching pattern
    pub severity: Severity,
}

/// Aggregate risk of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    /// No or only cosmetic findings
    Low,
    /// Cleanable findings
    Medium,
    /// Strong contamination signal
    High,
    /// Critical findings, text must not be served
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

/// A ranked remediation recommendation
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    /// What to do
    pub action: String,
    /// Category it addresses
    pub category: PatternCategory,
    /// Rank, lower = apply first
    pub rank: usize,
}

/// Full result of one detection scan
#[derive(Debug, Clone)]
pub struct DetectionReport {
    /// Every match found
    pub matches: Vec<PatternMatch>,
    /// Aggregate risk level
    pub risk: RiskLevel,
    /// Confidence in the verdict, 0.0 - 1.0
    pub confidence: f64,
    /// Ranked remediation recommendations
    pub recommendations: Vec<Recommendation>,
}

impl DetectionReport {
    /// Whether the scan found anything
    pub fn is_clean(&self) -> bool {
        self.matches.is_empty()
    }

    /// Matches of at least the given severity
    pub fn matches_at_least(&self, severity: Severity) -> usize {
        self.matches.iter().filter(|m| m.severity >= severity).count()
    }
}

/// Bounded memo cache, oldest insertion evicted first
struct DetectionMemo {
    entries: HashMap<String, DetectionReport>,
    order: VecDeque<String>,
    capacity: usize,
    /// Blacklist generation the memo was built against
    generation: u64,
    hits: u64,
    misses: u64,
}

impl DetectionMemo {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
            generation: 0,
            hits: 0,
            misses: 0,
        }
    }

    fn get(&mut self, key: &str, generation: u64) -> Option<DetectionReport> {
        if self.generation != generation {
            self.entries.clear();
            self.order.clear();
            self.generation = generation;
        }
        match self.entries.get(key) {
            Some(report) => {
                self.hits += 1;
                Some(report.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn insert(&mut self, key: String, report: DetectionReport, generation: u64) {
        if self.generation != generation {
            self.entries.clear();
            self.order.clear();
            self.generation = generation;
        }
        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        if self.entries.insert(key.clone(), report).is_none() {
            self.order.push_back(key);
        }
    }
}

/// Stateful blacklist scanner with memoized results
#[derive(Debug)]
pub struct PatternDetector {
    blacklist: RwLock<Blacklist>,
    memo: Mutex<DetectionMemo>,
    config: DetectorConfig,
}

impl std::fmt::Debug for DetectionMemo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionMemo")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl PatternDetector {
    /// Create a detector with the built-in default blacklist
    pub fn new(config: DetectorConfig) -> anyhow::Result<Self> {
        let blacklist = Blacklist::with_defaults(&config)?;
        Ok(Self::with_blacklist(config, blacklist))
    }

    /// Create a detector over an existing blacklist
    pub fn with_blacklist(config: DetectorConfig, blacklist: Blacklist) -> Self {
        let memo_capacity = config.memo_capacity;
        Self {
            blacklist: RwLock::new(blacklist),
            memo: Mutex::new(DetectionMemo::new(memo_capacity)),
            config,
        }
    }

    /// Scan text against all active blacklist entries
    pub fn detect(&self, text: &str, language: Language) -> DetectionReport {
        let key = memo_key(text, language);

        let generation = self.blacklist.read().generation();
        if let Some(report) = self.memo.lock().get(&key, generation) {
            return report;
        }

        let (matches, matched_ids) = {
            let blacklist = self.blacklist.read();
            let mut matches = Vec::new();
            let mut matched_ids = Vec::new();
            for entry in blacklist.active_entries() {
                let before = matches.len();
                scan_entry(entry, text, &mut matches);
                if matches.len() > before {
                    matched_ids.push(entry.id);
                }
            }
            (matches, matched_ids)
        };

        // Counter bumps take the write path; scans stay on the read path
        if !matched_ids.is_empty() {
            let mut blacklist = self.blacklist.write();
            for id in &matched_ids {
                blacklist.record_detection(*id);
            }
        }

        let risk = self.aggregate_risk(&matches);
        let confidence = estimate_confidence(&matches, text);
        let recommendations = rank_recommendations(&matches);

        let report = DetectionReport {
            matches,
            risk,
            confidence,
            recommendations,
        };

        debug!(
            "Pattern scan ({}, {} chars): {} matches, risk {}",
            language,
            text.chars().count(),
            report.matches.len(),
            report.risk
        );

        self.memo.lock().insert(key, report.clone(), generation);
        report
    }

    /// Add a user-reported pattern as a regex-escaped literal.
    ///
    /// Enables closed-loop remediation of recurring failures without
    /// redeployment; the report enters at CRITICAL severity.
    pub fn report_pattern(&self, reported_text: &str) -> anyhow::Result<u64> {
        let id = self.blacklist.write().add(
            PatternSpec::literal(reported_text),
            PatternCategory::UserReported,
            Severity::Critical,
            Provenance::UserReport,
            &self.config,
        )?;
        info!("User-reported pattern added to blacklist (id {})", id);
        Ok(id)
    }

    /// Add a pattern at runtime
    pub fn add_pattern(
        &self,
        spec: PatternSpec,
        category: PatternCategory,
        severity: Severity,
    ) -> anyhow::Result<u64> {
        self.blacklist
            .write()
            .add(spec, category, severity, Provenance::Operator, &self.config)
    }

    /// Add a pattern with explicit provenance and activation state, used
    /// when restoring an exported blacklist
    pub fn restore_pattern(
        &self,
        spec: PatternSpec,
        category: PatternCategory,
        severity: Severity,
        provenance: Provenance,
        active: bool,
    ) -> anyhow::Result<u64> {
        let mut blacklist = self.blacklist.write();
        let id = blacklist.add(spec, category, severity, provenance, &self.config)?;
        if !active {
            blacklist.set_active(id, false);
        }
        Ok(id)
    }

    /// Deactivate a pattern
    pub fn deactivate_pattern(&self, id: u64) -> bool {
        self.blacklist.write().set_active(id, false)
    }

    /// Remove a pattern
    pub fn remove_pattern(&self, id: u64) -> bool {
        self.blacklist.write().remove(id)
    }

    /// Run a closure over the blacklist read guard (for export)
    pub fn with_blacklist_read<R>(&self, f: impl FnOnce(&Blacklist) -> R) -> R {
        f(&self.blacklist.read())
    }

    /// Memo hit/miss counters
    pub fn memo_stats(&self) -> (u64, u64) {
        let memo = self.memo.lock();
        (memo.hits, memo.misses)
    }

    fn aggregate_risk(&self, matches: &[PatternMatch]) -> RiskLevel {
        if matches.is_empty() {
            return RiskLevel::Low;
        }
        let criticals = matches.iter().filter(|m| m.severity == Severity::Critical).count();
        let highs = matches.iter().filter(|m| m.severity == Severity::High).count();

        if criticals > 0 || highs > self.config.high_match_limit {
            RiskLevel::Critical
        } else if highs > 0 {
            RiskLevel::High
        } else if matches.iter().any(|m| m.severity == Severity::Medium) {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Memo key: content hash plus language code
fn memo_key(text: &str, language: Language) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}:{}", hasher.finalize(), language.code())
}

fn scan_entry(entry: &BlacklistEntry, text: &str, matches: &mut Vec<PatternMatch>) {
    for found in entry.compiled.find_iter(text) {
        matches.push(PatternMatch {
            entry_id: entry.id,
            content: found.as_str().to_string(),
            start: found.start(),
            end: found.end(),
            category: entry.category,
            severity: entry.severity,
        });
    }
}

/// Confidence from match density and severity weighting.
///
/// Density is the share of text covered by matches; the severity term is the
/// mean weight of the matches found. A clean scan reports full confidence.
fn estimate_confidence(matches: &[PatternMatch], text: &str) -> f64 {
    if matches.is_empty() {
        return 1.0;
    }
    let total_len = text.len().max(1);
    let matched_len: usize = matches.iter().map(|m| m.end - m.start).sum();
    let density = (matched_len as f64 / total_len as f64).min(1.0);
    let mean_weight =
        matches.iter().map(|m| m.severity.weight()).sum::<f64>() / matches.len() as f64;

    (0.5 + 0.3 * mean_weight + 0.2 * density.sqrt()).min(1.0)
}

fn rank_recommendations(matches: &[PatternMatch]) -> Vec<Recommendation> {
    // One recommendation per category, ranked by the worst severity seen
    let mut worst: HashMap<PatternCategory, Severity> = HashMap::new();
    for m in matches {
        worst
            .entry(m.category)
            .and_modify(|s| {
                if m.severity > *s {
                    *s = m.severity;
                }
            })
            .or_insert(m.severity);
    }

    let mut ranked: Vec<(PatternCategory, Severity)> = worst.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .enumerate()
        .map(|(rank, (category, _))| Recommendation {
            action: remediation_for(category).to_string(),
            category,
            rank,
        })
        .collect()
}

fn remediation_for(category: PatternCategory) -> &'static str {
    match category {
        PatternCategory::ForeignAlphabet => "strip foreign-alphabet character runs",
        PatternCategory::UiArtifact => "remove UI artifact fragments",
        PatternCategory::MixedScript => "separate mixed-script boundaries with whitespace",
        PatternCategory::EncodingCorruption => "remove control and replacement characters",
        PatternCategory::UserReported => "apply user-reported pattern cleanup",
    }
}
