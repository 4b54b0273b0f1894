/*!
 * Coordinated cache maintenance.
 *
 * One background task owns every periodic cache chore - aggregate quality
 * recomputation, sampled revalidation against the purity validator,
 * feedback draining, invalidation rules, degradation alerts and alert
 * auto-resolution - so maintenance runs never overlap and shutdown is a
 * single notify.
 */

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, warn};
use parking_lot::Mutex;
use rand::seq::IndexedRandom;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backends::PurityValidator;
use crate::language_utils::Language;

use super::store::QualityCache;

/// Kind of a quality alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Negative user feedback invalidated an entry
    NegativeFeedback,
    /// Average cache quality dropped by more than the configured delta
    QualityDegradation,
    /// Sampled revalidation found an impure entry
    RevalidationFailure,
}

/// An operator-visible quality alert
#[derive(Debug, Clone)]
pub struct QualityAlert {
    /// Alert id
    pub id: Uuid,
    /// What happened
    pub kind: AlertKind,
    /// Detail
    pub message: String,
    /// When it was raised
    pub raised_at: DateTime<Utc>,
    /// Whether it has been resolved
    pub resolved: bool,
}

/// Summary of one maintenance cycle
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    /// Entries revalidated this cycle
    pub revalidated: usize,
    /// Entries invalidated because revalidation failed
    pub revalidation_invalidations: usize,
    /// Feedback items processed
    pub feedback_processed: usize,
    /// Entries invalidated by negative feedback
    pub feedback_invalidations: usize,
    /// Entries removed by invalidation rules
    pub rule_invalidations: usize,
    /// Average decayed quality after the cycle
    pub average_quality: Option<f64>,
    /// Whether a degradation alert was raised
    pub degradation_alert: bool,
    /// Alerts auto-resolved by age
    pub alerts_auto_resolved: usize,
}

/// The single-owner maintenance task
pub struct CacheMaintenance {
    cache: Arc<QualityCache>,
    purity: Arc<dyn PurityValidator>,
    alerts: Mutex<Vec<QualityAlert>>,
    previous_average: Mutex<Option<f64>>,
    shutdown: Notify,
}

impl CacheMaintenance {
    /// Create a maintenance coordinator over the given cache
    pub fn new(cache: Arc<QualityCache>, purity: Arc<dyn PurityValidator>) -> Self {
        Self {
            cache,
            purity,
            alerts: Mutex::new(Vec::new()),
            previous_average: Mutex::new(None),
            shutdown: Notify::new(),
        }
    }

    /// Spawn the periodic maintenance loop
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let this = self.clone();
        let period = Duration::from_secs(this.cache.config().maintenance_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so a fresh cache
            // is not revalidated at startup
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let report = this.run_cycle().await;
                        info!(
                            "Cache maintenance: {} revalidated, {} rule invalidations, avg quality {:?}",
                            report.revalidated, report.rule_invalidations, report.average_quality
                        );
                    }
                    _ = this.shutdown.notified() => break,
                }
            }
        })
    }

    /// Request the maintenance loop to stop
    pub fn stop(&self) {
        self.shutdown.notify_waiters();
    }

    /// Run one maintenance cycle
    pub async fn run_cycle(&self) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();
        let config = self.cache.config().clone();

        // 1. Sampled proactive revalidation
        let mut candidates: Vec<(String, String, Language)> = Vec::new();
        self.cache.for_each_entry(|key, entry| {
            candidates.push((key.to_string(), entry.text.clone(), entry.language));
        });
        // The rng is thread-local and must not live across an await point
        let sample: Vec<(String, String, Language)> = {
            let mut rng = rand::rng();
            candidates
                .choose_multiple(&mut rng, config.revalidation_sample_size)
                .cloned()
                .collect()
        };

        for (key, text, language) in sample {
            report.revalidated += 1;
            let purity = self.purity.validate_purity(&text, language).await;
            let failed = (config.zero_tolerance && !purity.is_pure)
                || purity.score.overall < config.purity_threshold;
            if failed && self.cache.invalidate_key(&key) {
                report.revalidation_invalidations += 1;
                self.raise_alert(
                    AlertKind::RevalidationFailure,
                    format!(
                        "revalidation failed for cached entry (purity {:.1})",
                        purity.score.overall
                    ),
                );
            }
        }

        // 2. Drain user feedback; negative feedback invalidates immediately
        for feedback in self.cache.drain_feedback() {
            report.feedback_processed += 1;
            if !feedback.positive {
                if self.cache.invalidate_key(&feedback.key) {
                    report.feedback_invalidations += 1;
                }
                // Keys are caller-supplied, so truncation must respect
                // char boundaries
                let key_prefix = feedback.key.get(..12).unwrap_or(&feedback.key);
                self.raise_alert(
                    AlertKind::NegativeFeedback,
                    format!(
                        "negative feedback on entry {}: {}",
                        key_prefix,
                        feedback.comment.as_deref().unwrap_or("no comment")
                    ),
                );
            }
        }

        // 3. Invalidation rules
        report.rule_invalidations = self.cache.apply_rules();

        // 4. Aggregate quality and degradation alerting
        report.average_quality = self.cache.average_quality();
        if let (Some(previous), Some(current)) =
            (*self.previous_average.lock(), report.average_quality)
        {
            if previous - current > config.degradation_alert_delta {
                report.degradation_alert = true;
                self.raise_alert(
                    AlertKind::QualityDegradation,
                    format!(
                        "average cache quality dropped from {:.1} to {:.1}",
                        previous, current
                    ),
                );
                warn!(
                    "Cache quality degradation: {:.1} -> {:.1}",
                    previous, current
                );
            }
        }
        *self.previous_average.lock() = report.average_quality;

        // 5. Auto-resolve stale alerts
        let cutoff = Utc::now() - chrono::Duration::seconds(config.alert_auto_resolve_secs as i64);
        let mut alerts = self.alerts.lock();
        for alert in alerts.iter_mut() {
            if !alert.resolved && alert.raised_at < cutoff {
                alert.resolved = true;
                report.alerts_auto_resolved += 1;
            }
        }

        report
    }

    /// All alerts raised so far, newest last
    pub fn alerts(&self) -> Vec<QualityAlert> {
        self.alerts.lock().clone()
    }

    /// Unresolved alerts only
    pub fn open_alerts(&self) -> Vec<QualityAlert> {
        self.alerts.lock().iter().filter(|a| !a.resolved).cloned().collect()
    }

    fn raise_alert(&self, kind: AlertKind, message: String) {
        self.alerts.lock().push(QualityAlert {
            id: Uuid::new_v4(),
            kind,
            message,
            raised_at: Utc::now(),
            resolved: false,
        });
    }
}
