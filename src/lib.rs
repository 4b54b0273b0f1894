/*!
 * # Lexipure - bilingual legal-translation purity core
 *
 * A Rust library for processing Arabic/French legal-translation requests
 * with zero tolerance for contaminated output.
 *
 * ## Features
 *
 * - Priority-aware request scheduling with bounded concurrency and
 *   immediate backpressure
 * - A five-stage validation pipeline with deterministic cleaning recovery
 * - Proactive pattern detection against a mutable, exportable blacklist
 * - A quality-aware cache with age decay, invalidation rules and a single
 *   coordinated maintenance task
 * - Strategy-chain error recovery terminating in pre-vetted emergency
 *   content
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `request`: Request and result types
 * - `language_utils`: Arabic/French language and script utilities
 * - `scheduler`: Priority lanes, dispatch and deadlines
 * - `pipeline`: The five-stage validation pipeline
 * - `detector`: Blacklist pattern detection
 * - `cache`: The quality-aware cache and its maintenance task
 * - `recovery`: Error classification and recovery strategies
 * - `backends`: Trait seams for translation and validation collaborators
 * - `service`: The translation core wiring everything together
 * - `export`: Versioned export/import of operator state
 * - `errors`: Custom error types for the core
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod backends;
pub mod cache;
pub mod detector;
pub mod errors;
pub mod export;
pub mod language_utils;
pub mod pipeline;
pub mod recovery;
pub mod request;
pub mod scheduler;
pub mod service;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{CoreError, RequestError, SchedulerError};
pub use language_utils::{Language, LanguagePair};
pub use request::{ContentType, Priority, ProcessedTranslation, TranslationRequest};
pub use scheduler::{RequestProcessor, Scheduler};
pub use service::TranslationCore;
