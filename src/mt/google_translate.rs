//! Google Translate API provider
//!
//! Integrates with the Google Translate v2 REST API. The API key comes from
//! the `google.api_key` config entry or the `GOOGLE_TRANSLATE_API_KEY`
//! environment variable.

use crate::config::GoogleConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::mt::translator::{MachineTranslator, normalize_locale, status_error, validate_locale};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Google Translate API v2 provider
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    api_key: String,
    /// Shared HTTP client
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl GoogleTranslateProvider {
    /// Maximum characters per string (30KB per Google Translate API limits)
    const MAX_CHARS_PER_STRING: usize = 30_000;

    /// Create a provider with an explicit API key
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(TranslateError::ConfigError)` - If the API key is empty
    pub fn new(
        api_key: String,
        base_url: String,
        client: reqwest::Client,
        timeout: Duration,
    ) -> TranslateResult<Self> {
        if api_key.trim().is_empty() {
            return Err(TranslateError::ConfigError(
                "Google API key cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
        })
    }

    pub fn from_config(config: &GoogleConfig, client: reqwest::Client) -> TranslateResult<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            TranslateError::ConfigError(
                "Google translation service configuration is missing \
                 (google.api_key or GOOGLE_TRANSLATE_API_KEY)"
                    .to_string(),
            )
        })?;
        Self::new(api_key, config.url.clone(), client, config.timeout()?)
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }

        if text.len() > Self::MAX_CHARS_PER_STRING {
            return Err(TranslateError::TranslationError(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        let url = format!("{}?key={}", self.base_url, self.api_key);
        let body = json!({
            "q": [text],
            "source": normalize_locale(source_locale),
            "target": normalize_locale(target_locale),
            "format": "text"
        });

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(self.provider_name(), status, &error_text));
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            TranslateError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        json["data"]["translations"][0]["translatedText"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                TranslateError::TranslationError(
                    "Invalid API response: missing 'data.translations[0].translatedText'"
                        .to_string(),
                )
            })
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}
