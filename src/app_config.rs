/*!
 * Configuration for the lexipure core.
 *
 * This module handles the core configuration including loading, validating
 * and saving configuration settings as JSON. Every tunable carries a serde
 * default so a partial config file is enough.
 */

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Log level configuration
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Errors and warnings
    Warn,
    /// Standard output level
    #[default]
    Info,
    /// Verbose output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Scheduler tuning
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SchedulerConfig {
    /// Maximum concurrently executing requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Queue capacity as a multiple of max_concurrent
    #[serde(default = "default_queue_multiplier")]
    pub queue_capacity_multiplier: usize,

    /// Dispatch tick period in milliseconds
    #[serde(default = "default_dispatch_tick_ms")]
    pub dispatch_tick_ms: u64,

    /// Per-request deadline in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Grace period for in-flight requests during shutdown, milliseconds
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,
}

fn default_max_concurrent() -> usize {
    5
}

fn default_queue_multiplier() -> usize {
    10
}

fn default_dispatch_tick_ms() -> u64 {
    10
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_shutdown_grace_ms() -> u64 {
    5_000
}

impl SchedulerConfig {
    /// Total wait-queue capacity
    pub fn queue_capacity(&self) -> usize {
        self.max_concurrent * self.queue_capacity_multiplier
    }

    /// Dispatch tick as a Duration
    pub fn dispatch_tick(&self) -> Duration {
        Duration::from_millis(self.dispatch_tick_ms)
    }

    /// Request deadline as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Shutdown grace as a Duration
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_capacity_multiplier: default_queue_multiplier(),
            dispatch_tick_ms: default_dispatch_tick_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

/// Pattern detector tuning
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DetectorConfig {
    /// Bounded size of the detection memo cache
    #[serde(default = "default_memo_capacity")]
    pub memo_capacity: usize,

    /// HIGH-severity match count that escalates risk to critical
    #[serde(default = "default_high_match_limit")]
    pub high_match_limit: usize,

    /// Maximum accepted pattern source length in characters
    #[serde(default = "default_max_pattern_length")]
    pub max_pattern_length: usize,

    /// Compiled regex size limit in bytes, bounds pattern complexity
    #[serde(default = "default_regex_size_limit")]
    pub regex_size_limit: usize,
}

fn default_memo_capacity() -> usize {
    500
}

fn default_high_match_limit() -> usize {
    3
}

fn default_max_pattern_length() -> usize {
    256
}

fn default_regex_size_limit() -> usize {
    1 << 16
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            memo_capacity: default_memo_capacity(),
            high_match_limit: default_high_match_limit(),
            max_pattern_length: default_max_pattern_length(),
            regex_size_limit: default_regex_size_limit(),
        }
    }
}

/// Validation pipeline tuning
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Whether zero tolerance applies at the final stage
    #[serde(default = "default_true")]
    pub zero_tolerance: bool,

    /// Recovery attempts allowed at the final zero-tolerance stage
    #[serde(default = "default_final_stage_attempts")]
    pub final_stage_max_recovery_attempts: u32,

    /// Minimum content length accepted by the quality layer
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Maximum repetition ratio accepted by the quality layer
    #[serde(default = "default_max_repetition_ratio")]
    pub max_repetition_ratio: f64,
}

fn default_true() -> bool {
    true
}

fn default_final_stage_attempts() -> u32 {
    1
}

fn default_min_content_length() -> usize {
    3
}

fn default_max_repetition_ratio() -> f64 {
    0.6
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            zero_tolerance: default_true(),
            final_stage_max_recovery_attempts: default_final_stage_attempts(),
            min_content_length: default_min_content_length(),
            max_repetition_ratio: default_max_repetition_ratio(),
        }
    }
}

/// Quality-aware cache tuning
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before eviction
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Default entry TTL in seconds
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Exponential quality decay rate per hour of age
    #[serde(default = "default_decay_rate")]
    pub decay_rate_per_hour: f64,

    /// Minimum purity score for reads and writes
    #[serde(default = "default_purity_threshold")]
    pub purity_threshold: f64,

    /// Minimum decayed quality score for reads
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,

    /// Whether zero tolerance gates cache reads and writes
    #[serde(default = "default_true")]
    pub zero_tolerance: bool,

    /// Maintenance cycle period in seconds
    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,

    /// Entries revalidated per maintenance cycle
    #[serde(default = "default_revalidation_sample")]
    pub revalidation_sample_size: usize,

    /// Average-quality drop that raises a degradation alert
    #[serde(default = "default_degradation_delta")]
    pub degradation_alert_delta: f64,

    /// Age in seconds after which alerts auto-resolve
    #[serde(default = "default_alert_resolve_secs")]
    pub alert_auto_resolve_secs: u64,

    /// Confidence below which the low-confidence rule invalidates
    #[serde(default = "default_low_confidence")]
    pub low_confidence_threshold: f64,

    /// Maximum entry age in seconds for the age-limit rule
    #[serde(default = "default_max_entry_age_secs")]
    pub max_entry_age_secs: u64,

    /// Whether the fallback-method invalidation rule is enabled
    #[serde(default)]
    pub invalidate_fallback_method: bool,
}

fn default_cache_capacity() -> usize {
    1_000
}

fn default_ttl_secs() -> u64 {
    3_600
}

fn default_decay_rate() -> f64 {
    0.05
}

fn default_purity_threshold() -> f64 {
    100.0
}

fn default_quality_threshold() -> f64 {
    70.0
}

fn default_maintenance_interval_secs() -> u64 {
    60
}

fn default_revalidation_sample() -> usize {
    10
}

fn default_degradation_delta() -> f64 {
    10.0
}

fn default_alert_resolve_secs() -> u64 {
    3_600
}

fn default_low_confidence() -> f64 {
    0.4
}

fn default_max_entry_age_secs() -> u64 {
    86_400
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            default_ttl_secs: default_ttl_secs(),
            decay_rate_per_hour: default_decay_rate(),
            purity_threshold: default_purity_threshold(),
            quality_threshold: default_quality_threshold(),
            zero_tolerance: default_true(),
            maintenance_interval_secs: default_maintenance_interval_secs(),
            revalidation_sample_size: default_revalidation_sample(),
            degradation_alert_delta: default_degradation_delta(),
            alert_auto_resolve_secs: default_alert_resolve_secs(),
            low_confidence_threshold: default_low_confidence(),
            max_entry_age_secs: default_max_entry_age_secs(),
            invalidate_fallback_method: false,
        }
    }
}

/// Error recovery tuning
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecoveryConfig {
    /// Maximum strategy attempts within one recovery session
    #[serde(default = "default_max_session_attempts")]
    pub max_session_attempts: u32,

    /// Purity score a recovered result must reach
    #[serde(default = "default_recovered_purity")]
    pub recovered_purity_threshold: f64,
}

fn default_max_session_attempts() -> u32 {
    4
}

fn default_recovered_purity() -> f64 {
    100.0
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_session_attempts: default_max_session_attempts(),
            recovered_purity_threshold: default_recovered_purity(),
        }
    }
}

/// Top-level core configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Pattern detector settings
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Validation pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Quality-aware cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Error recovery settings
    #[serde(default)]
    pub recovery: RecoveryConfig,

    /// Maximum accepted request text length in characters
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_max_text_length() -> usize {
    20_000
}

// A derived Default would zero the serde field defaults, so defaults are
// spelled out to match what a `{}` document deserializes to
impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            detector: DetectorConfig::default(),
            pipeline: PipelineConfig::default(),
            cache: CacheConfig::default(),
            recovery: RecoveryConfig::default(),
            max_text_length: default_max_text_length(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let config: Config =
            serde_json::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.max_concurrent == 0 {
            return Err(anyhow!("scheduler.max_concurrent must be at least 1"));
        }
        if self.scheduler.queue_capacity_multiplier == 0 {
            return Err(anyhow!("scheduler.queue_capacity_multiplier must be at least 1"));
        }
        if self.cache.decay_rate_per_hour < 0.0 {
            return Err(anyhow!("cache.decay_rate_per_hour must be non-negative"));
        }
        if !(0.0..=100.0).contains(&self.cache.purity_threshold) {
            return Err(anyhow!("cache.purity_threshold must be within 0-100"));
        }
        if !(0.0..=1.0).contains(&self.cache.low_confidence_threshold) {
            return Err(anyhow!("cache.low_confidence_threshold must be within 0-1"));
        }
        if self.max_text_length == 0 {
            return Err(anyhow!("max_text_length must be at least 1"));
        }
        Ok(())
    }
}
