// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::app_config::Config;
use crate::backends::mock::{
    FixedTerminologyValidator, MockBackend, MockFallbackGenerator, ScriptPurityValidator,
};
use crate::cache::CacheMaintenance;
use crate::detector::PatternDetector;
use crate::export::ExportDocument;
use crate::language_utils::{Language, LanguagePair};
use crate::request::{ContentType, Priority, TranslationRequest};
use crate::scheduler::Scheduler;
use crate::service::TranslationCore;

mod app_config;
mod backends;
mod cache;
mod detector;
mod errors;
mod export;
mod language_utils;
mod pipeline;
mod recovery;
mod request;
mod scheduler;
mod service;

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan text against the contamination blacklist
    Check {
        /// The text to scan
        #[arg(value_name = "TEXT")]
        text: String,

        /// Language the text is scanned as ('ar' or 'fr')
        #[arg(short, long, default_value = "ar")]
        language: String,
    },

    /// Export blacklist patterns and cache rules to a JSON document
    Export {
        /// Output file path
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Import an exported document and re-run its regression cases
    Import {
        /// Input file path
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Run a demonstration workload through the full core with mock backends
    Demo,
}

/// Lexipure - bilingual legal-translation purity core
///
/// Processes Arabic/French legal-translation requests with zero tolerance
/// for contaminated output.
#[derive(Parser, Debug)]
#[command(name = "lexipure")]
#[command(version = "1.0.0")]
#[command(about = "Bilingual legal-translation purity core")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Colored stderr logger
struct CoreLogger {
    level: LevelFilter,
}

impl CoreLogger {
    fn new(level: LevelFilter) -> Self {
        CoreLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CoreLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CoreLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn load_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        Config::from_file(path)
    } else {
        Ok(Config::default())
    }
}

fn demo_core(config: Config) -> Result<TranslationCore> {
    TranslationCore::new(
        config,
        Arc::new(MockBackend::working("primary_ai")),
        vec![Arc::new(MockBackend::working("secondary"))],
        Arc::new(MockFallbackGenerator::working()),
        Arc::new(ScriptPurityValidator::new()),
        Arc::new(FixedTerminologyValidator::perfect()),
    )
}

fn run_check(config: &Config, text: &str, language: &str) -> Result<()> {
    let language = Language::from_code(language)
        .ok_or_else(|| anyhow!("unsupported language code '{}'", language))?;

    let detector = PatternDetector::new(config.detector.clone())?;
    let report = detector.detect(text, language);

    if report.is_clean() {
        println!("clean (confidence {:.2})", report.confidence);
        return Ok(());
    }

    println!(
        "{} match(es), risk {:?}, confidence {:.2}",
        report.matches.len(),
        report.risk,
        report.confidence
    );
    for m in &report.matches {
        println!(
            "  [{:?}/{}] '{}' at {}..{}",
            m.severity, m.category, m.content, m.start, m.end
        );
    }
    for recommendation in &report.recommendations {
        println!("  -> {}", recommendation.action);
    }
    Ok(())
}

fn run_export(config: Config, path: &Path) -> Result<()> {
    let core = demo_core(config)?;
    let document = ExportDocument::capture(&core.detector(), &core.cache(), vec![]);
    document.save_to_file(path)?;
    info!(
        "Exported {} patterns and {} rules to {}",
        document.patterns.len(),
        document.rules.len(),
        path.display()
    );
    Ok(())
}

fn run_import(config: Config, path: &Path) -> Result<()> {
    let document = ExportDocument::load_from_file(path)?;
    let core = demo_core(config)?;

    let imported = document.apply(&core.detector(), &core.cache())?;
    info!("Imported {} patterns from {}", imported, path.display());

    let failures = document.run_regressions(&core.detector());
    if failures.is_empty() {
        info!(
            "All {} regression cases passed",
            document.regression_cases.len()
        );
        Ok(())
    } else {
        Err(anyhow!("regression cases failed: {}", failures.join(", ")))
    }
}

async fn run_demo(config: Config) -> Result<()> {
    let maintenance_interval = config.cache.maintenance_interval_secs;
    let scheduler_config = config.scheduler.clone();
    let core = Arc::new(demo_core(config)?);

    let maintenance = Arc::new(CacheMaintenance::new(
        core.cache(),
        Arc::new(ScriptPurityValidator::new()),
    ));
    let maintenance_handle = maintenance.spawn();
    info!(
        "Cache maintenance running every {}s",
        maintenance_interval
    );

    let scheduler = Scheduler::new(scheduler_config, core.clone());

    let samples = [
        ("المادة الأولى: لكل شخص الحق في الاعتراف بشخصيته القانونية", Priority::Normal, ContentType::LegalArticle),
        ("حكمت المحكمة بقبول الطعن شكلا", Priority::Urgent, ContentType::CourtDecision),
        ("يلتزم الطرف الثاني بتسليم البضاعة في الأجل المتفق عليه", Priority::RealTime, ContentType::ContractClause),
    ];

    let requests: Vec<TranslationRequest> = samples
        .iter()
        .map(|(text, priority, content_type)| {
            TranslationRequest::new(text, LanguagePair::ar_to_fr())
                .with_priority(*priority)
                .with_content_type(*content_type)
        })
        .collect();

    let results = scheduler.submit_batch(requests).await;
    for result in results {
        match result {
            Ok(translation) => println!(
                "[{}] purity {:.0} cached={} -> {}",
                translation.method,
                translation.purity_score,
                translation.from_cache,
                translation.text
            ),
            Err(e) => warn!("Request failed: {}", e),
        }
    }

    let stats = scheduler.stats();
    info!(
        "Scheduler: {} submitted, {} completed, {} failed",
        stats.submitted, stats.completed, stats.failed
    );
    let cache_stats = core.cache().stats();
    info!(
        "Cache: {} hits, {} misses, {} writes",
        cache_stats.hits, cache_stats.misses, cache_stats.writes
    );

    scheduler.shutdown().await;
    maintenance.stop();
    let _ = maintenance_handle.await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = CommandLineOptions::parse();

    let config = load_config(&options.config_path)?;
    let level = options
        .log_level
        .map(LevelFilter::from)
        .unwrap_or_else(|| config.log_level.to_level_filter());
    CoreLogger::init(level)?;

    match options.command {
        Commands::Check { text, language } => run_check(&config, &text, &language),
        Commands::Export { path } => run_export(config, &path),
        Commands::Import { path } => run_import(config, &path),
        Commands::Demo => run_demo(config).await,
    }
}
