/*!
 * The recovery engine.
 *
 * Walks a session's strategy chain against the primary and alternate
 * backends, the text cleaner and the fallback generator, validating every
 * candidate result before accepting it. Pre-vetted emergency content is
 * the terminal step, so recovery itself never fails.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{info, warn};
use parking_lot::Mutex;

use crate::app_config::RecoveryConfig;
use crate::backends::{FallbackGenerator, PurityValidator, TranslationBackend};
use crate::errors::CoreError;
use crate::language_utils::Language;
use crate::pipeline::TextCleaner;
use crate::request::{ContentType, TranslationMethod, TranslationRequest};

use super::session::{RecoveryAttempt, RecoverySession};
use super::strategies::{ErrorClass, StrategyKind};

/// The contaminated output that triggered a purity-violation session.
///
/// Cleaning-based strategies operate on this text rather than re-invoking
/// a backend.
#[derive(Debug, Clone)]
pub struct ContaminatedOutput {
    /// The rejected text
    pub text: String,
    /// Method that produced it
    pub method: TranslationMethod,
    /// Confidence the producing method reported
    pub confidence: f64,
}

/// A result accepted by recovery
#[derive(Debug, Clone)]
pub struct RecoveryOutcome {
    /// The recovered text
    pub text: String,
    /// Method that produced the text
    pub method: TranslationMethod,
    /// Confidence after recovery adjustments
    pub confidence: f64,
    /// Purity score of the recovered text
    pub purity_score: f64,
    /// Whether the result is quality-degraded
    pub quality_degraded: bool,
    /// Strategy that succeeded
    pub strategy: StrategyKind,
    /// Total attempts the session took
    pub attempts: usize,
}

/// Attempt/success counters for one strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyCounters {
    /// Times the strategy ran
    pub attempts: u64,
    /// Times it produced an accepted result
    pub successes: u64,
}

/// Running recovery statistics
#[derive(Debug, Clone, Default)]
pub struct RecoveryStats {
    /// Sessions opened
    pub sessions: u64,
    /// Sessions that ended with an accepted result
    pub successes: u64,
    /// Accumulated wall time across finished sessions
    pub total_time: Duration,
    /// Per-strategy counters
    pub per_strategy: HashMap<StrategyKind, StrategyCounters>,
    /// Sessions opened per error class
    pub per_class: HashMap<ErrorClass, u64>,
}

impl RecoveryStats {
    /// Fraction of sessions that recovered
    pub fn success_rate(&self) -> f64 {
        if self.sessions == 0 {
            0.0
        } else {
            self.successes as f64 / self.sessions as f64
        }
    }

    /// Mean wall time per finished session
    pub fn mean_recovery_time(&self) -> Option<Duration> {
        if self.successes == 0 {
            None
        } else {
            Some(self.total_time / self.successes as u32)
        }
    }
}

/// Recovery engine over the primary backend, alternates and generated
/// content
pub struct RecoveryEngine {
    primary: Option<Arc<dyn TranslationBackend>>,
    alternates: Vec<Arc<dyn TranslationBackend>>,
    fallback: Arc<dyn FallbackGenerator>,
    purity: Arc<dyn PurityValidator>,
    cleaner: TextCleaner,
    config: RecoveryConfig,
    stats: Mutex<RecoveryStats>,
}

impl RecoveryEngine {
    /// Create an engine over the given collaborators. The primary backend
    /// is retried by quality-validation recovery; `None` limits that
    /// strategy to cleaning the rejected output.
    pub fn new(
        primary: Option<Arc<dyn TranslationBackend>>,
        alternates: Vec<Arc<dyn TranslationBackend>>,
        fallback: Arc<dyn FallbackGenerator>,
        purity: Arc<dyn PurityValidator>,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            primary,
            alternates,
            fallback,
            purity,
            cleaner: TextCleaner::new(),
            config,
            stats: Mutex::new(RecoveryStats::default()),
        }
    }

    /// Recover from a classified error. Infallible: the strategy chain
    /// terminates in emergency content, which always produces a result.
    pub async fn recover(
        &self,
        request: &TranslationRequest,
        error: &CoreError,
        contaminated: Option<&ContaminatedOutput>,
    ) -> RecoveryOutcome {
        let class = ErrorClass::classify(error);
        let mut session = RecoverySession::open(request.id, class);

        {
            let mut stats = self.stats.lock();
            stats.sessions += 1;
            *stats.per_class.entry(class).or_insert(0) += 1;
        }
        info!(
            "Recovery session {} opened for request {} (class {})",
            session.id, request.id, class
        );

        loop {
            // When the attempt budget is exhausted before the chain reaches
            // its end, emergency content still applies as the safety net
            let strategy = session
                .next_strategy(self.config.max_session_attempts as usize)
                .unwrap_or(StrategyKind::ApplyEmergencyContent);

            let start = Instant::now();
            let result = self.run_strategy(strategy, request, contaminated).await;
            let elapsed = start.elapsed();

            {
                let mut stats = self.stats.lock();
                let counters = stats.per_strategy.entry(strategy).or_default();
                counters.attempts += 1;
                if result.is_ok() {
                    counters.successes += 1;
                }
            }

            match result {
                Ok(mut outcome) => {
                    session.record(RecoveryAttempt {
                        strategy,
                        succeeded: true,
                        elapsed,
                        detail: None,
                        at: Utc::now(),
                    });
                    outcome.strategy = strategy;
                    outcome.attempts = session.attempts.len();

                    let mut stats = self.stats.lock();
                    stats.successes += 1;
                    stats.total_time += session.elapsed();
                    info!(
                        "Recovery session {} succeeded via {} after {} attempt(s)",
                        session.id,
                        strategy,
                        session.attempts.len()
                    );
                    return outcome;
                }
                Err(detail) => {
                    warn!(
                        "Recovery strategy {} failed for request {}: {}",
                        strategy, request.id, detail
                    );
                    session.record(RecoveryAttempt {
                        strategy,
                        succeeded: false,
                        elapsed,
                        detail: Some(detail),
                        at: Utc::now(),
                    });
                }
            }
        }
    }

    /// Snapshot of the running statistics
    pub fn stats(&self) -> RecoveryStats {
        self.stats.lock().clone()
    }

    async fn run_strategy(
        &self,
        strategy: StrategyKind,
        request: &TranslationRequest,
        contaminated: Option<&ContaminatedOutput>,
    ) -> Result<RecoveryOutcome, String> {
        match strategy {
            StrategyKind::MethodSwitching => self.method_switching(request).await,
            StrategyKind::QualityValidationRecovery => {
                self.quality_validation_recovery(request, contaminated).await
            }
            StrategyKind::GracefulDegradation => self.graceful_degradation(request).await,
            StrategyKind::GenerateFallback => self.generate_fallback(request).await,
            StrategyKind::ApplyEmergencyContent => Ok(self.apply_emergency_content(request).await),
        }
    }

    /// Try each alternate backend in turn; accept the first output that
    /// passes the purity gate
    async fn method_switching(
        &self,
        request: &TranslationRequest,
    ) -> Result<RecoveryOutcome, String> {
        if self.alternates.is_empty() {
            return Err("no alternate backends configured".to_string());
        }

        let mut failures = Vec::new();
        for backend in &self.alternates {
            let output = match backend
                .translate(&request.text, request.languages, request.context.as_deref())
                .await
            {
                Ok(output) => output,
                Err(e) => {
                    failures.push(format!("{}: {:?}", backend.method_id(), e));
                    continue;
                }
            };

            match self.check_purity(&output.text, request.languages.target).await {
                Ok(score) => {
                    return Ok(RecoveryOutcome {
                        text: output.text,
                        method: method_from_id(backend.method_id()),
                        confidence: output.confidence,
                        purity_score: score,
                        quality_degraded: false,
                        strategy: StrategyKind::MethodSwitching,
                        attempts: 0,
                    });
                }
                Err(detail) => failures.push(format!("{}: {}", backend.method_id(), detail)),
            }
        }

        Err(format!("all alternates failed: {}", failures.join("; ")))
    }

    /// Retry the primary backend and revalidate its output; when the
    /// retry fails or stays contaminated, clean the rejected output and
    /// revalidate that instead
    async fn quality_validation_recovery(
        &self,
        request: &TranslationRequest,
        contaminated: Option<&ContaminatedOutput>,
    ) -> Result<RecoveryOutcome, String> {
        let mut failures = Vec::new();

        if let Some(primary) = &self.primary {
            match primary
                .translate(&request.text, request.languages, request.context.as_deref())
                .await
            {
                Ok(output) => {
                    match self.check_purity(&output.text, request.languages.target).await {
                        Ok(score) => {
                            return Ok(RecoveryOutcome {
                                text: output.text,
                                method: method_from_id(primary.method_id()),
                                confidence: output.confidence * 0.9,
                                purity_score: score,
                                quality_degraded: false,
                                strategy: StrategyKind::QualityValidationRecovery,
                                attempts: 0,
                            });
                        }
                        Err(detail) => {
                            failures.push(format!("{} retry: {}", primary.method_id(), detail))
                        }
                    }
                }
                Err(e) => failures.push(format!("{} retry: {:?}", primary.method_id(), e)),
            }
        }

        let contaminated = contaminated.ok_or_else(|| {
            format!(
                "no contaminated output to clean ({})",
                if failures.is_empty() {
                    "no primary backend configured".to_string()
                } else {
                    failures.join("; ")
                }
            )
        })?;

        let cleaned = self.cleaner.clean(&contaminated.text);
        if !cleaned.changed() {
            failures.push("cleaning removed nothing".to_string());
            return Err(failures.join("; "));
        }

        let score = self
            .check_purity(&cleaned.text, request.languages.target)
            .await
            .map_err(|detail| {
                failures.push(detail);
                failures.join("; ")
            })?;

        Ok(RecoveryOutcome {
            text: cleaned.text,
            method: contaminated.method.clone(),
            confidence: contaminated.confidence * 0.9,
            purity_score: score,
            quality_degraded: false,
            strategy: StrategyKind::QualityValidationRecovery,
            attempts: 0,
        })
    }

    /// Serve professionally worded emergency content at reduced
    /// confidence, tagged quality-degraded. System-level disruptions must
    /// not route text through a possibly degraded backend.
    async fn graceful_degradation(
        &self,
        request: &TranslationRequest,
    ) -> Result<RecoveryOutcome, String> {
        let text =
            emergency_template(request.languages.target, request.content_type).to_string();
        let score = self.check_purity(&text, request.languages.target).await?;

        Ok(RecoveryOutcome {
            text,
            method: TranslationMethod::Emergency,
            confidence: 0.3,
            purity_score: score,
            quality_degraded: true,
            strategy: StrategyKind::GracefulDegradation,
            attempts: 0,
        })
    }

    /// Ask the fallback generator for substitute content
    async fn generate_fallback(
        &self,
        request: &TranslationRequest,
    ) -> Result<RecoveryOutcome, String> {
        let intent = request.context.as_deref().unwrap_or(&request.text);
        let generated = self
            .fallback
            .generate(intent, request.languages.target)
            .await
            .map_err(|e| e.to_string())?;

        let score = self
            .check_purity(&generated.content, request.languages.target)
            .await?;

        Ok(RecoveryOutcome {
            text: generated.content,
            method: TranslationMethod::Fallback,
            confidence: generated.confidence,
            purity_score: score,
            quality_degraded: true,
            strategy: StrategyKind::GenerateFallback,
            attempts: 0,
        })
    }

    /// Serve the pre-vetted emergency template; never fails. The template
    /// still runs through the purity validator so the outcome carries a
    /// measured score rather than an assumed one.
    async fn apply_emergency_content(&self, request: &TranslationRequest) -> RecoveryOutcome {
        let text =
            emergency_template(request.languages.target, request.content_type).to_string();

        let report = self
            .purity
            .validate_purity(&text, request.languages.target)
            .await;
        if !report.is_pure || report.score.overall < self.config.recovered_purity_threshold {
            warn!(
                "Emergency template for request {} scored {:.1} (threshold {:.1}); serving anyway",
                request.id, report.score.overall, self.config.recovered_purity_threshold
            );
        }

        RecoveryOutcome {
            text,
            method: TranslationMethod::Emergency,
            confidence: 0.2,
            purity_score: report.score.overall,
            quality_degraded: true,
            strategy: StrategyKind::ApplyEmergencyContent,
            attempts: 0,
        }
    }

    async fn check_purity(&self, text: &str, language: Language) -> Result<f64, String> {
        let report = self.purity.validate_purity(text, language).await;
        if !report.is_pure || report.score.overall < self.config.recovered_purity_threshold {
            return Err(format!(
                "recovered text failed purity gate ({:.1} < {:.1})",
                report.score.overall, self.config.recovered_purity_threshold
            ));
        }
        Ok(report.score.overall)
    }
}

fn method_from_id(id: &str) -> TranslationMethod {
    match id {
        "primary_ai" => TranslationMethod::PrimaryAi,
        "hybrid" => TranslationMethod::Hybrid,
        _ => TranslationMethod::Secondary,
    }
}

fn emergency_template(language: Language, content_type: ContentType) -> &'static str {
    match (language, content_type) {
        (Language::French, ContentType::CourtDecision) => {
            "La traduction certifiée de cette décision est momentanément indisponible. \
             Le texte de la juridiction fait foi."
        }
        (Language::French, _) => {
            "Le service de traduction juridique est momentanément indisponible. \
             Le texte source fait foi; une traduction vérifiée sera fournie dès le \
             rétablissement du service."
        }
        (Language::Arabic, ContentType::CourtDecision) => {
            "الترجمة الموثقة لهذا القرار غير متاحة مؤقتا. نص المحكمة هو المرجع المعتمد."
        }
        (Language::Arabic, _) => {
            "خدمة الترجمة القانونية غير متاحة مؤقتا. النص المصدر هو المرجع المعتمد \
             وستتوفر ترجمة موثقة فور استئناف الخدمة."
        }
    }
}
