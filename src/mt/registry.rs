//! Backend selection
//!
//! The registry maps each target language to exactly one backend: the
//! per-language route if one is configured, the default backend otherwise.
//! It is built once from the configuration, validating every referenced
//! backend's credentials, and is read-only afterwards.

use crate::config::AppConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::mt::azure::AzureTranslatorProvider;
use crate::mt::deeplx::DeepLxProvider;
use crate::mt::gemini::GeminiProvider;
use crate::mt::google_translate::GoogleTranslateProvider;
use crate::mt::mock::MockTranslator;
use crate::mt::openai::OpenAiProvider;
use crate::mt::translator::{MachineTranslator, normalize_locale, validate_locale};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Names accepted in `translation_service` and `routes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Google,
    Azure,
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
    #[serde(rename = "deeplx")]
    DeepLx,
    Mock,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Google => "google",
            BackendKind::Azure => "azure",
            BackendKind::OpenAi => "openai",
            BackendKind::Gemini => "gemini",
            BackendKind::DeepLx => "deeplx",
            BackendKind::Mock => "mock",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of translation backends
#[derive(Debug, Clone)]
pub enum Backend {
    Google(GoogleTranslateProvider),
    Azure(AzureTranslatorProvider),
    OpenAi(OpenAiProvider),
    Gemini(GeminiProvider),
    DeepLx(DeepLxProvider),
    Mock(MockTranslator),
}

impl Backend {
    /// Build and validate one backend from the configuration
    pub fn from_config(
        kind: BackendKind,
        config: &AppConfig,
        client: &reqwest::Client,
    ) -> TranslateResult<Self> {
        let client = client.clone();
        Ok(match kind {
            BackendKind::Google => {
                Backend::Google(GoogleTranslateProvider::from_config(&config.google, client)?)
            }
            BackendKind::Azure => {
                Backend::Azure(AzureTranslatorProvider::from_config(&config.azure, client)?)
            }
            BackendKind::OpenAi => {
                Backend::OpenAi(OpenAiProvider::from_config(&config.openai, client)?)
            }
            BackendKind::Gemini => {
                Backend::Gemini(GeminiProvider::from_config(&config.gemini, client)?)
            }
            BackendKind::DeepLx => {
                Backend::DeepLx(DeepLxProvider::from_config(&config.deeplx, client)?)
            }
            BackendKind::Mock => {
                Backend::Mock(MockTranslator::new(crate::mt::mock::MockMode::Suffix))
            }
        })
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Google(_) => BackendKind::Google,
            Backend::Azure(_) => BackendKind::Azure,
            Backend::OpenAi(_) => BackendKind::OpenAi,
            Backend::Gemini(_) => BackendKind::Gemini,
            Backend::DeepLx(_) => BackendKind::DeepLx,
            Backend::Mock(_) => BackendKind::Mock,
        }
    }

    /// Capability check for a target language
    pub fn supports(&self, target_locale: &str) -> bool {
        if validate_locale(target_locale).is_err() {
            return false;
        }
        match self {
            Backend::OpenAi(provider) => provider.supports(target_locale),
            _ => true,
        }
    }

    fn inner(&self) -> &dyn MachineTranslator {
        match self {
            Backend::Google(p) => p,
            Backend::Azure(p) => p,
            Backend::OpenAi(p) => p,
            Backend::Gemini(p) => p,
            Backend::DeepLx(p) => p,
            Backend::Mock(p) => p,
        }
    }
}

#[async_trait]
impl MachineTranslator for Backend {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String> {
        self.inner().translate(text, source_locale, target_locale).await
    }

    fn provider_name(&self) -> &str {
        self.inner().provider_name()
    }
}

/// Language → backend table
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    default: Backend,
    routes: BTreeMap<String, Backend>,
}

impl ProviderRegistry {
    pub fn new(default: Backend) -> Self {
        Self {
            default,
            routes: BTreeMap::new(),
        }
    }

    /// Route one language to a specific backend
    pub fn with_route(mut self, lang: &str, backend: Backend) -> Self {
        self.routes.insert(normalize_locale(lang), backend);
        self
    }

    /// Build every backend the configuration refers to
    ///
    /// Fails with `ConfigError` when any of them lacks its credentials.
    pub fn from_config(config: &AppConfig, client: &reqwest::Client) -> TranslateResult<Self> {
        let mut built: BTreeMap<BackendKind, Backend> = BTreeMap::new();
        for kind in config.referenced_backends() {
            built.insert(kind, Backend::from_config(kind, config, client)?);
        }

        let default = built
            .get(&config.translation_service)
            .cloned()
            .ok_or_else(|| {
                TranslateError::ConfigError(format!(
                    "default backend {} was not built",
                    config.translation_service
                ))
            })?;

        let mut registry = Self::new(default);
        for (lang, kind) in &config.routes {
            if let Some(backend) = built.get(kind) {
                registry = registry.with_route(lang, backend.clone());
            }
        }

        info!(
            default = %config.translation_service,
            routes = registry.routes.len(),
            "Translation backends initialized"
        );
        Ok(registry)
    }

    /// Backend responsible for a target language
    pub fn resolve(&self, target_lang: &str) -> TranslateResult<&Backend> {
        let backend = self
            .routes
            .get(&normalize_locale(target_lang))
            .unwrap_or(&self.default);

        if backend.supports(target_lang) {
            Ok(backend)
        } else {
            Err(TranslateError::UnsupportedLanguage {
                lang: target_lang.to_string(),
                backends: self.configured_backends(),
            })
        }
    }

    /// Names of the configured backends, default first
    pub fn configured_backends(&self) -> Vec<String> {
        let mut names = vec![self.default.kind().to_string()];
        for backend in self.routes.values() {
            let name = backend.kind().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenAiConfig;
    use crate::mt::mock::MockMode;

    fn openai_without_template() -> Backend {
        let config = OpenAiConfig {
            api_key: "sk-test".to_string(),
            ..Default::default()
        };
        Backend::OpenAi(OpenAiProvider::from_config(&config, reqwest::Client::new()).unwrap())
    }

    // ========== Resolution Tests ==========

    #[test]
    fn test_resolve_default() {
        let registry = ProviderRegistry::new(Backend::Mock(MockTranslator::new(MockMode::Suffix)));
        assert_eq!(registry.resolve("fr").unwrap().kind(), BackendKind::Mock);
    }

    #[test]
    fn test_resolve_route_override() {
        let registry = ProviderRegistry::new(Backend::Mock(MockTranslator::new(MockMode::Suffix)))
            .with_route("ja", openai_without_template());
        assert_eq!(registry.resolve("ja").unwrap().kind(), BackendKind::OpenAi);
        assert_eq!(registry.resolve("ja-JP").unwrap().kind(), BackendKind::OpenAi);
        assert_eq!(registry.resolve("en").unwrap().kind(), BackendKind::Mock);
    }

    #[test]
    fn test_resolve_unsupported_names_language_and_backends() {
        let registry = ProviderRegistry::new(openai_without_template())
            .with_route("de", Backend::Mock(MockTranslator::new(MockMode::Suffix)));
        match registry.resolve("fr") {
            Err(TranslateError::UnsupportedLanguage { lang, backends }) => {
                assert_eq!(lang, "fr");
                assert_eq!(backends, vec!["openai".to_string(), "mock".to_string()]);
            }
            other => panic!("Expected UnsupportedLanguage, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_invalid_code_unsupported() {
        let registry = ProviderRegistry::new(Backend::Mock(MockTranslator::new(MockMode::Suffix)));
        assert!(registry.resolve("e n").is_err());
    }

    // ========== Configuration Tests ==========

    #[test]
    fn test_from_config_builds_routes() {
        let config = AppConfig::from_json_str(
            r#"{
                "translation_service": "deeplx",
                "routes": { "ja": "openai" },
                "openai": { "api_key": "sk-test" }
            }"#,
        )
        .unwrap();
        let registry = ProviderRegistry::from_config(&config, &reqwest::Client::new()).unwrap();
        assert_eq!(registry.resolve("en").unwrap().kind(), BackendKind::DeepLx);
        assert_eq!(registry.resolve("ja").unwrap().kind(), BackendKind::OpenAi);
        assert_eq!(registry.configured_backends(), vec!["deeplx", "openai"]);
    }

    #[test]
    fn test_from_config_missing_credentials_fails_fast() {
        let config = AppConfig::from_json_str(
            r#"{
                "translation_service": "azure",
                "azure": { "key": "k", "endpoint": "https://x" }
            }"#,
        )
        .unwrap();
        let err = ProviderRegistry::from_config(&config, &reqwest::Client::new()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_backend_kind_serde_names() {
        let json = r#"["google","azure","openai","gemini","deeplx","mock"]"#;
        let kinds: Vec<BackendKind> = serde_json::from_str(json).unwrap();
        let names: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["google", "azure", "openai", "gemini", "deeplx", "mock"]);
    }

    #[tokio::test]
    async fn test_backend_delegates_translate() {
        let backend = Backend::Mock(MockTranslator::new(MockMode::Suffix));
        assert_eq!(backend.translate("hi", "en", "fr").await.unwrap(), "hi_fr");
        assert_eq!(backend.provider_name(), "Mock Translator");
    }
}
