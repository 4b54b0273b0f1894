/*!
 * Cache entry model and quality scoring.
 *
 * Entries carry their quality metrics so reads can apply the exponential
 * age-based decay and eviction can rank entries by a composite
 * recency + frequency + quality score.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::language_utils::Language;
use crate::request::TranslationMethod;

/// Quality metrics attached to a cached result
#[derive(Debug, Clone, Copy)]
pub struct QualityMetrics {
    /// Overall quality score, 0 - 100
    pub overall: f64,
    /// Purity score, 0 - 100
    pub purity: f64,
    /// Producing method's confidence, 0.0 - 1.0
    pub confidence: f64,
}

/// Exponential age-based decay factor.
///
/// Identity at age zero and monotonically non-increasing with age.
pub fn decay_factor(age: Duration, rate_per_hour: f64) -> f64 {
    let hours = age.as_secs_f64() / 3600.0;
    (-rate_per_hour * hours).exp()
}

/// A memoized translation result.
///
/// Access tracking uses interior mutability so the store can serve reads
/// under a shared lock.
#[derive(Debug)]
pub struct CacheEntry {
    /// The validated translated text
    pub text: String,
    /// Target language of the text (for revalidation)
    pub language: Language,
    /// Method that produced the text
    pub method: TranslationMethod,
    /// Quality metrics at write time
    pub quality: QualityMetrics,
    /// When the entry was written
    pub created_at: Instant,
    /// When the entry expires
    pub expires_at: Instant,
    last_accessed: Mutex<Instant>,
    access_count: AtomicU64,
}

impl CacheEntry {
    /// Create a fresh entry
    pub fn new(
        text: String,
        language: Language,
        method: TranslationMethod,
        quality: QualityMetrics,
        ttl: Duration,
    ) -> Self {
        let now = Instant::now();
        Self {
            text,
            language,
            method,
            quality,
            created_at: now,
            expires_at: now + ttl,
            last_accessed: Mutex::new(now),
            access_count: AtomicU64::new(0),
        }
    }

    /// Entry age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Whether the TTL has passed
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Quality after exponential age decay
    pub fn decayed_quality(&self, rate_per_hour: f64) -> f64 {
        self.quality.overall * decay_factor(self.age(), rate_per_hour)
    }

    /// Record a read
    pub fn touch(&self) {
        *self.last_accessed.lock() = Instant::now();
        self.access_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of reads so far
    pub fn access_count(&self) -> u64 {
        self.access_count.load(Ordering::Relaxed)
    }

    /// Time of the most recent read (or creation)
    pub fn last_accessed(&self) -> Instant {
        *self.last_accessed.lock()
    }

    /// Composite eviction score; lower scores are evicted first.
    ///
    /// Recency and frequency each decay toward zero, quality contributes
    /// its normalized share.
    pub fn composite_score(&self) -> f64 {
        let idle_hours = self.last_accessed().elapsed().as_secs_f64() / 3600.0;
        let recency = (-idle_hours).exp();
        let frequency = (self.access_count() as f64 / 10.0).min(1.0);
        let quality = self.quality.overall / 100.0;

        0.4 * recency + 0.3 * frequency + 0.3 * quality
    }
}
