/*!
 * Common test utilities for the lexipure test suite
 */

use std::sync::Arc;

use lexipure::app_config::Config;
use lexipure::backends::mock::{
    FixedTerminologyValidator, MockBackend, MockFallbackGenerator, ScriptPurityValidator,
};
use lexipure::language_utils::LanguagePair;
use lexipure::request::TranslationRequest;
use lexipure::service::TranslationCore;

// Re-export the extra mock backends module
pub mod mock_backends;

/// Initialize env_logger for a test; safe to call from every test since
/// only the first call wins
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A core over a fully working mock stack
pub fn working_core() -> TranslationCore {
    core_with_primary(MockBackend::working("primary_ai"))
}

/// A core with the given primary backend and a working secondary
pub fn core_with_primary(primary: MockBackend) -> TranslationCore {
    core_with_config(Config::default(), primary)
}

/// A core with explicit configuration and primary backend
pub fn core_with_config(config: Config, primary: MockBackend) -> TranslationCore {
    TranslationCore::new(
        config,
        Arc::new(primary),
        vec![Arc::new(MockBackend::working("secondary"))],
        Arc::new(MockFallbackGenerator::working()),
        Arc::new(ScriptPurityValidator::new()),
        Arc::new(FixedTerminologyValidator::perfect()),
    )
    .expect("mock core construction should succeed")
}

/// An Arabic-to-French request over the given text
pub fn arabic_request(text: &str) -> TranslationRequest {
    TranslationRequest::new(text, LanguagePair::ar_to_fr())
}

/// Clean Arabic legal sample text
pub fn sample_legal_text() -> &'static str {
    "المادة الأولى: لكل شخص الحق في الاعتراف بشخصيته القانونية"
}
