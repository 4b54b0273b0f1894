/*!
 * Extra mock backends for scenarios the library mocks do not cover
 */

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use lexipure::backends::{BackendFailure, TranslationBackend, TranslationOutput};
use lexipure::errors::{TranslationError, TranslationErrorKind};
use lexipure::language_utils::{Language, LanguagePair};

/// Backend that fails its first `failures` calls, then works
#[derive(Debug)]
pub struct FlakyBackend {
    method_id: String,
    failures: usize,
    calls: AtomicUsize,
}

impl FlakyBackend {
    pub fn new(method_id: &str, failures: usize) -> Self {
        Self {
            method_id: method_id.to_string(),
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationBackend for FlakyBackend {
    fn method_id(&self) -> &str {
        &self.method_id
    }

    async fn translate(
        &self,
        text: &str,
        languages: LanguagePair,
        _context: Option<&str>,
    ) -> Result<TranslationOutput, BackendFailure> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(BackendFailure::Translation(TranslationError::new(
                TranslationErrorKind::MethodFailed,
                &self.method_id,
                "flaky backend warming up",
            )));
        }

        let prefix = match languages.target {
            Language::French => "[fr]",
            Language::Arabic => "[ar]",
        };
        Ok(TranslationOutput {
            text: format!("{} {}", prefix, text),
            confidence: 0.88,
            method: self.method_id.clone(),
            warnings: vec![],
        })
    }
}
