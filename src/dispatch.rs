//! Concurrent fan-out of one message to its target languages
//!
//! One backend call is issued per target language, all at once, and the
//! engine waits for every one of them before merging. A failing language is
//! logged and left out of the result; it never takes its siblings down.

use crate::error::TranslateError;
use crate::mt::registry::ProviderRegistry;
use crate::mt::translator::{MachineTranslator, normalize_locale};
use futures::future::join_all;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+")
        .expect("URL pattern is valid")
});

/// Remove URLs from text before it is sent to a backend
pub fn strip_links(text: &str) -> String {
    URL_PATTERN.replace_all(text, "").trim().to_string()
}

/// One message to translate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    source_text: String,
    source_lang: String,
    target_langs: Vec<String>,
}

impl TranslationRequest {
    /// Duplicate target languages are dropped, keeping the first occurrence
    pub fn new(source_text: &str, source_lang: &str, target_langs: &[String]) -> Self {
        let mut deduped: Vec<String> = Vec::with_capacity(target_langs.len());
        for lang in target_langs {
            let lang = lang.trim();
            if !lang.is_empty() && !deduped.iter().any(|l| l == lang) {
                deduped.push(lang.to_string());
            }
        }
        Self {
            source_text: source_text.to_string(),
            source_lang: source_lang.trim().to_string(),
            target_langs: deduped,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    pub fn target_langs(&self) -> &[String] {
        &self.target_langs
    }

    fn is_source(&self, lang: &str) -> bool {
        lang == self.source_lang || normalize_locale(lang) == normalize_locale(&self.source_lang)
    }
}

/// Successful translations keyed by target language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMap(pub HashMap<String, String>);

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation(mut self, lang: &str, text: &str) -> Self {
        self.insert(lang, text);
        self
    }

    pub fn insert(&mut self, lang: &str, text: &str) {
        self.0.insert(lang.to_string(), text.to_string());
    }

    pub fn get(&self, lang: &str) -> Option<&String> {
        self.0.get(lang)
    }

    pub fn contains(&self, lang: &str) -> bool {
        self.0.contains_key(lang)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A target language that produced no translation
#[derive(Debug)]
pub struct LanguageFailure {
    pub target_lang: String,
    pub backend: Option<String>,
    pub elapsed: Duration,
    pub error: TranslateError,
}

/// Everything one dispatch produced
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub translations: TranslationMap,
    pub failures: Vec<LanguageFailure>,
    /// Per-call wall-clock time of the calls that succeeded
    pub timings: HashMap<String, Duration>,
}

impl DispatchReport {
    pub fn failure_for(&self, lang: &str) -> Option<&LanguageFailure> {
        self.failures.iter().find(|f| f.target_lang == lang)
    }
}

/// Issues translation calls against a shared registry
#[derive(Debug, Clone)]
pub struct DispatchEngine {
    registry: Arc<ProviderRegistry>,
}

impl DispatchEngine {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub async fn dispatch(&self, request: &TranslationRequest) -> TranslationMap {
        self.dispatch_detailed(request).await.translations
    }

    /// Dispatch and keep per-language failures and timings
    pub async fn dispatch_detailed(&self, request: &TranslationRequest) -> DispatchReport {
        let mut report = DispatchReport::default();
        let link_free = strip_links(request.source_text());

        let mut calls = Vec::new();
        for target_lang in request.target_langs() {
            if request.is_source(target_lang) {
                report
                    .translations
                    .insert(target_lang, request.source_text());
                continue;
            }

            // Nothing but links: there is no text left to translate
            if link_free.is_empty() {
                debug!(target_lang = %target_lang, "Message is only links, skipping backend");
                continue;
            }

            let backend = match self.registry.resolve(target_lang) {
                Ok(backend) => backend,
                Err(error) => {
                    warn!(
                        target_lang = %target_lang,
                        error = %error,
                        "No backend for target language"
                    );
                    report.failures.push(LanguageFailure {
                        target_lang: target_lang.clone(),
                        backend: None,
                        elapsed: Duration::ZERO,
                        error,
                    });
                    continue;
                }
            };

            let text = link_free.as_str();
            let source_lang = request.source_lang();
            calls.push(async move {
                let start = Instant::now();
                let result = backend.translate(text, source_lang, target_lang).await;
                (target_lang, backend.provider_name(), start.elapsed(), result)
            });
        }

        for (target_lang, backend, elapsed, result) in join_all(calls).await {
            match result {
                Ok(text) => {
                    info!(
                        backend,
                        source_lang = %request.source_lang(),
                        target_lang = %target_lang,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Translation finished"
                    );
                    debug!(target_lang = %target_lang, "Translated text: {}", text);
                    report.translations.insert(target_lang, &text);
                    report.timings.insert(target_lang.clone(), elapsed);
                }
                Err(error) => {
                    warn!(
                        backend,
                        source_lang = %request.source_lang(),
                        target_lang = %target_lang,
                        elapsed_ms = elapsed.as_millis() as u64,
                        error = %error,
                        "Translation failed"
                    );
                    report.failures.push(LanguageFailure {
                        target_lang: target_lang.clone(),
                        backend: Some(backend.to_string()),
                        elapsed,
                        error,
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mt::mock::{MockMode, MockTranslator};
    use crate::mt::registry::Backend;

    fn langs(langs: &[&str]) -> Vec<String> {
        langs.iter().map(|l| l.to_string()).collect()
    }

    fn engine_with(mock: &MockTranslator) -> DispatchEngine {
        DispatchEngine::new(Arc::new(ProviderRegistry::new(Backend::Mock(mock.clone()))))
    }

    // ========== Link Stripping Tests ==========

    #[test]
    fn test_strip_links() {
        assert_eq!(strip_links("看这个 https://example.com/a?b=1"), "看这个");
        assert_eq!(strip_links("http://a.io and http://b.io"), "and");
        assert_eq!(strip_links("no links here"), "no links here");
    }

    // ========== Request Tests ==========

    #[test]
    fn test_request_dedupes_targets() {
        let request = TranslationRequest::new("你好", "zh", &langs(&["en", "ja", "en", " "]));
        assert_eq!(request.target_langs(), &["en".to_string(), "ja".to_string()]);
    }

    // ========== Dispatch Tests ==========

    #[tokio::test]
    async fn test_source_language_short_circuits() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let engine = engine_with(&mock);
        let request = TranslationRequest::new("你好 https://x.io", "zh", &langs(&["zh"]));

        let map = engine.dispatch(&request).await;
        assert_eq!(map.get("zh").unwrap(), "你好 https://x.io");
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_links_stripped_before_backend() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let engine = engine_with(&mock);
        let request =
            TranslationRequest::new("看 https://example.com", "zh", &langs(&["zh", "en"]));

        let map = engine.dispatch(&request).await;
        assert_eq!(map.get("en").unwrap(), "看_en");
        assert_eq!(map.get("zh").unwrap(), "看 https://example.com");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_link_only_message_skips_backends() {
        let mock = MockTranslator::new(MockMode::NoOp);
        let engine = engine_with(&mock);
        let request = TranslationRequest::new(
            "https://example.com/page  http://b.io",
            "zh",
            &langs(&["zh", "en", "ja"]),
        );

        let report = engine.dispatch_detailed(&request).await;
        assert_eq!(mock.calls(), 0);
        assert!(report.failures.is_empty());
        assert_eq!(report.translations.len(), 1);
        assert_eq!(
            report.translations.get("zh").unwrap(),
            "https://example.com/page  http://b.io"
        );
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_siblings() {
        let ok = MockTranslator::new(MockMode::Suffix);
        let failing = MockTranslator::new(MockMode::Error("upstream 500".to_string()));
        let registry = ProviderRegistry::new(Backend::Mock(ok.clone()))
            .with_route("en", Backend::Mock(failing.clone()));
        let engine = DispatchEngine::new(Arc::new(registry));
        let request = TranslationRequest::new("你好", "zh", &langs(&["en", "ja"]));

        let report = engine.dispatch_detailed(&request).await;
        assert!(!report.translations.contains("en"));
        assert_eq!(report.translations.get("ja").unwrap(), "你好_ja");
        let failure = report.failure_for("en").unwrap();
        assert_eq!(failure.backend.as_deref(), Some("Mock Translator"));
        assert!(matches!(failure.error, TranslateError::TranslationError(_)));
        assert_eq!(failing.calls(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_language_reported() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let engine = engine_with(&mock);
        let request = TranslationRequest::new("你好", "zh", &langs(&["bad code", "en"]));

        let report = engine.dispatch_detailed(&request).await;
        assert_eq!(report.translations.len(), 1);
        assert!(matches!(
            report.failure_for("bad code").unwrap().error,
            TranslateError::UnsupportedLanguage { .. }
        ));
    }

    #[tokio::test]
    async fn test_all_fail_gives_empty_map() {
        let mock = MockTranslator::new(MockMode::AuthFailure);
        let engine = engine_with(&mock);
        let request = TranslationRequest::new("你好", "zh", &langs(&["en", "ja"]));

        let report = engine.dispatch_detailed(&request).await;
        assert!(report.translations.is_empty());
        assert_eq!(report.failures.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_run_concurrently() {
        let mock = MockTranslator::with_delay(MockMode::Suffix, 100);
        let engine = engine_with(&mock);
        let request = TranslationRequest::new("你好", "zh", &langs(&["en", "ja", "ko"]));

        let start = tokio::time::Instant::now();
        let map = engine.dispatch(&request).await;
        let elapsed = start.elapsed();

        assert_eq!(map.len(), 3);
        assert!(elapsed >= Duration::from_millis(100));
        assert!(
            elapsed < Duration::from_millis(200),
            "calls ran sequentially: {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_records_timings() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let engine = engine_with(&mock);
        let request = TranslationRequest::new("你好", "zh", &langs(&["en"]));

        let report = engine.dispatch_detailed(&request).await;
        assert!(report.timings.contains_key("en"));
    }
}
