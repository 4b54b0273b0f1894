/*!
 * Blacklist of known problematic text patterns.
 *
 * Patterns are parsed into a validated, tagged representation (literal vs
 * compiled expression) with explicit complexity bounds before they are ever
 * scanned, so arbitrary strings - including user reports - cannot smuggle
 * pathological expressions into the hot path.
 */

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::app_config::DetectorConfig;

/// Category of a blacklisted pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    /// Characters from an alphabet foreign to both supported languages
    ForeignAlphabet,
    /// UI or system artifacts leaked into content
    UiArtifact,
    /// Unseparated boundaries between different scripts
    MixedScript,
    /// Replacement characters, control characters, mojibake
    EncodingCorruption,
    /// Literal reported by a user
    UserReported,
}

impl std::fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PatternCategory::ForeignAlphabet => "foreign_alphabet",
            PatternCategory::UiArtifact => "ui_artifact",
            PatternCategory::MixedScript => "mixed_script",
            PatternCategory::EncodingCorruption => "encoding_corruption",
            PatternCategory::UserReported => "user_reported",
        };
        write!(f, "{}", s)
    }
}

/// Severity of a pattern match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Cosmetic issue
    Low,
    /// Should be cleaned
    Medium,
    /// Almost certainly contamination
    High,
    /// Never acceptable in output
    Critical,
}

impl Severity {
    /// Weight used for confidence estimation
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Low => 0.25,
            Severity::Medium => 0.5,
            Severity::High => 0.75,
            Severity::Critical => 1.0,
        }
    }
}

/// Where a pattern came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Shipped with the core
    BuiltIn,
    /// Added by an operator at runtime
    Operator,
    /// Added through the user-report loop
    UserReport,
}

/// Validated, tagged pattern representation.
///
/// Stored as source text plus flags so it survives export/import; the
/// compiled automaton lives alongside in the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternSpec {
    /// Plain substring match
    Literal {
        /// The exact text to find
        text: String,
    },
    /// Compiled regular expression
    Expression {
        /// Regex source text
        source: String,
        /// Whether matching is case-insensitive
        case_insensitive: bool,
    },
}

impl PatternSpec {
    /// Literal constructor
    pub fn literal(text: &str) -> Self {
        PatternSpec::Literal {
            text: text.to_string(),
        }
    }

    /// Expression constructor
    pub fn expression(source: &str, case_insensitive: bool) -> Self {
        PatternSpec::Expression {
            source: source.to_string(),
            case_insensitive,
        }
    }

    /// Source text of the pattern
    pub fn source(&self) -> &str {
        match self {
            PatternSpec::Literal { text } => text,
            PatternSpec::Expression { source, .. } => source,
        }
    }

    /// Validate bounds and compile.
    ///
    /// Length and compiled-size limits reject pathological inputs instead of
    /// trusting them; the regex crate itself guarantees linear-time matching.
    pub fn compile(&self, config: &DetectorConfig) -> anyhow::Result<Regex> {
        let source = self.source();
        if source.is_empty() {
            anyhow::bail!("pattern source is empty");
        }
        if source.chars().count() > config.max_pattern_length {
            anyhow::bail!(
                "pattern source exceeds {} characters",
                config.max_pattern_length
            );
        }

        match self {
            PatternSpec::Literal { text } => {
                RegexBuilder::new(&regex::escape(text))
                    .size_limit(config.regex_size_limit)
                    .build()
                    .map_err(|e| anyhow::anyhow!("failed to compile literal pattern: {}", e))
            }
            PatternSpec::Expression {
                source,
                case_insensitive,
            } => RegexBuilder::new(source)
                .case_insensitive(*case_insensitive)
                .size_limit(config.regex_size_limit)
                .build()
                .map_err(|e| anyhow::anyhow!("failed to compile pattern '{}': {}", source, e)),
        }
    }
}

/// One known-bad pattern with its detection bookkeeping
#[derive(Debug, Clone)]
pub struct BlacklistEntry {
    /// Stable entry id
    pub id: u64,
    /// The validated pattern
    pub spec: PatternSpec,
    /// Compiled matcher
    pub compiled: Regex,
    /// Category of contamination
    pub category: PatternCategory,
    /// Severity assigned to matches
    pub severity: Severity,
    /// Whether the entry participates in scans
    pub active: bool,
    /// Where the entry came from
    pub provenance: Provenance,
    /// Times this pattern has matched
    pub detection_count: u64,
    /// Last time this pattern matched
    pub last_seen: Option<DateTime<Utc>>,
}

/// The mutable, prioritized pattern blacklist.
///
/// Read-heavy; callers hold it behind a `RwLock` and take the write path
/// only for mutations and detection-counter bumps.
#[derive(Debug)]
pub struct Blacklist {
    entries: Vec<BlacklistEntry>,
    next_id: u64,
    /// Bumped on every mutation so memo caches can invalidate
    generation: u64,
}

impl Blacklist {
    /// Create an empty blacklist
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            generation: 0,
        }
    }

    /// Create a blacklist seeded with the built-in contamination patterns
    pub fn with_defaults(config: &DetectorConfig) -> anyhow::Result<Self> {
        let mut blacklist = Self::new();

        let defaults: [(&str, bool, PatternCategory, Severity); 12] = [
            // Foreign alphabets (foreign to both Arabic and French)
            (r"[Ѐ-ӿ]+", false, PatternCategory::ForeignAlphabet, Severity::Critical),
            (r"[一-鿿]+", false, PatternCategory::ForeignAlphabet, Severity::Critical),
            (r"[Ͱ-Ͽ]+", false, PatternCategory::ForeignAlphabet, Severity::High),
            (r"[぀-ヿ]+", false, PatternCategory::ForeignAlphabet, Severity::Critical),
            // UI and system artifacts
            (r"\{\{\s*\w+\s*\}\}", false, PatternCategory::UiArtifact, Severity::High),
            (r"</?(?:div|span|button|input)\b[^>]*>", true, PatternCategory::UiArtifact, Severity::High),
            (r"\b(?:undefined|NaN|\[object Object\])\b", false, PatternCategory::UiArtifact, Severity::High),
            (r"(?:Loading\.\.\.|Click here|Submit|Cancel)", false, PatternCategory::UiArtifact, Severity::Medium),
            // Mixed-script boundaries: Arabic letter glued to a Latin/Cyrillic one
            (r"[؀-ۿ][A-Za-zЀ-ӿ]", false, PatternCategory::MixedScript, Severity::Medium),
            (r"[A-Za-z][؀-ۿ]", false, PatternCategory::MixedScript, Severity::Medium),
            // Encoding corruption
            (r"\u{FFFD}", false, PatternCategory::EncodingCorruption, Severity::Critical),
            (r"[\x00-\x08\x0B\x0C\x0E-\x1F]", false, PatternCategory::EncodingCorruption, Severity::High),
        ];

        for (source, case_insensitive, category, severity) in defaults {
            blacklist.add(
                PatternSpec::expression(source, case_insensitive),
                category,
                severity,
                Provenance::BuiltIn,
                config,
            )?;
        }

        Ok(blacklist)
    }

    /// Add a pattern; returns the new entry id
    pub fn add(
        &mut self,
        spec: PatternSpec,
        category: PatternCategory,
        severity: Severity,
        provenance: Provenance,
        config: &DetectorConfig,
    ) -> anyhow::Result<u64> {
        let compiled = spec.compile(config)?;
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(BlacklistEntry {
            id,
            spec,
            compiled,
            category,
            severity,
            active: true,
            provenance,
            detection_count: 0,
            last_seen: None,
        });
        self.generation += 1;
        Ok(id)
    }

    /// Activate or deactivate an entry
    pub fn set_active(&mut self, id: u64, active: bool) -> bool {
        let found = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| e.active = active)
            .is_some();
        if found {
            self.generation += 1;
        }
        found
    }

    /// Remove an entry
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.generation += 1;
        }
        removed
    }

    /// Record that an entry matched during a scan
    pub fn record_detection(&mut self, id: u64) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.detection_count += 1;
            entry.last_seen = Some(Utc::now());
        }
        // Counter bumps do not invalidate memoized scans
    }

    /// Active entries, scan order
    pub fn active_entries(&self) -> impl Iterator<Item = &BlacklistEntry> {
        self.entries.iter().filter(|e| e.active)
    }

    /// All entries
    pub fn entries(&self) -> &[BlacklistEntry] {
        &self.entries
    }

    /// Current mutation generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the blacklist is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::new()
    }
}
