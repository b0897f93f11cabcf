//! Azure AI Translator (Text Translation v3) provider

use crate::config::AzureConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::mt::translator::{MachineTranslator, normalize_locale, status_error, validate_locale};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct AzureTranslatorProvider {
    key: String,
    region: String,
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct AzureTranslation {
    text: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct AzureResponseItem {
    translations: Vec<AzureTranslation>,
}

impl AzureTranslatorProvider {
    pub fn new(
        key: String,
        region: String,
        endpoint: String,
        client: reqwest::Client,
        timeout: Duration,
    ) -> TranslateResult<Self> {
        if key.trim().is_empty() || region.trim().is_empty() || endpoint.trim().is_empty() {
            return Err(TranslateError::ConfigError(
                "Azure translation service configuration is missing \
                 (key, endpoint and region are required)"
                    .to_string(),
            ));
        }
        Ok(Self {
            key,
            region,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    pub fn from_config(config: &AzureConfig, client: reqwest::Client) -> TranslateResult<Self> {
        Self::new(
            config.key().unwrap_or_default(),
            config.region.clone(),
            config.endpoint.clone(),
            client,
            config.timeout()?,
        )
    }
}

impl std::fmt::Debug for AzureTranslatorProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureTranslatorProvider")
            .field("key", &"***")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for AzureTranslatorProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        let url = format!(
            "{}/translate?api-version=3.0&from={}&to={}",
            self.endpoint,
            normalize_locale(source_locale),
            normalize_locale(target_locale)
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Ocp-Apim-Subscription-Region", &self.region)
            .json(&json!([{ "Text": text }]))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(self.provider_name(), status, &body));
        }

        let items: Vec<AzureResponseItem> = response.json().await.map_err(|e| {
            TranslateError::TranslationError(format!("Failed to parse Azure response: {}", e))
        })?;

        let translation = items
            .into_iter()
            .next()
            .and_then(|item| item.translations.into_iter().next())
            .ok_or_else(|| {
                TranslateError::TranslationError(
                    "Azure response contained no translations".to_string(),
                )
            })?;

        debug!(to = %translation.to, "Azure translation received");
        Ok(translation.text)
    }

    fn provider_name(&self) -> &str {
        "Azure Translator"
    }
}
