//! DeepLX provider
//!
//! DeepLX answers with HTTP 200 even when the translation failed, so the
//! `code` field of the payload has to be checked as well.

use crate::config::DeepLxConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::mt::translator::{MachineTranslator, status_error, validate_locale};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DeepLxProvider {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct DeepLxRequest<'a> {
    text: &'a str,
    source_lang: String,
    target_lang: String,
}

#[derive(Debug, Deserialize)]
struct DeepLxResponse {
    code: u16,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl DeepLxProvider {
    pub fn new(url: String, client: reqwest::Client, timeout: Duration) -> TranslateResult<Self> {
        if url.trim().is_empty() {
            return Err(TranslateError::ConfigError(
                "DeepLX url cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            url,
            client,
            timeout,
        })
    }

    pub fn from_config(config: &DeepLxConfig, client: reqwest::Client) -> TranslateResult<Self> {
        Self::new(config.url.clone(), client, config.timeout()?)
    }
}

#[async_trait]
impl MachineTranslator for DeepLxProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        // DeepL expects upper-case codes but tolerates regional variants (EN-US, PT-BR)
        let request = DeepLxRequest {
            text,
            source_lang: source_locale.to_uppercase(),
            target_lang: target_locale.to_uppercase(),
        };

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(self.provider_name(), status, &body));
        }

        let result: DeepLxResponse = response.json().await.map_err(|e| {
            TranslateError::TranslationError(format!("Failed to parse DeepLX response: {}", e))
        })?;

        if result.code != 200 {
            return Err(TranslateError::TranslationError(format!(
                "DeepLX returned code {}: {}",
                result.code,
                result.message.unwrap_or_default()
            )));
        }

        result.data.ok_or_else(|| {
            TranslateError::TranslationError("DeepLX response missing 'data'".to_string())
        })
    }

    fn provider_name(&self) -> &str {
        "DeepLX"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn provider(url: String) -> DeepLxProvider {
        DeepLxProvider::new(url, reqwest::Client::new(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_translate_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/translate")
            .match_body(Matcher::Json(json!({
                "text": "你好",
                "source_lang": "ZH",
                "target_lang": "EN"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":200,"data":"Hello"}"#)
            .create_async()
            .await;

        let result = provider(format!("{}/translate", server.url()))
            .translate("你好", "zh", "en")
            .await
            .unwrap();
        assert_eq!(result, "Hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_payload_code_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/translate")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":429,"message":"Too many requests"}"#)
            .create_async()
            .await;

        let result = provider(format!("{}/translate", server.url()))
            .translate("你好", "zh", "en")
            .await;
        match result {
            Err(TranslateError::TranslationError(msg)) => assert!(msg.contains("429")),
            other => panic!("Expected TranslationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/translate")
            .with_status(503)
            .create_async()
            .await;

        let result = provider(format!("{}/translate", server.url()))
            .translate("你好", "zh", "en")
            .await;
        assert!(matches!(result, Err(TranslateError::TranslationError(_))));
    }

    #[test]
    fn test_empty_url_rejected() {
        let result = DeepLxProvider::new(
            " ".to_string(),
            reqwest::Client::new(),
            Duration::from_secs(1),
        );
        assert!(result.unwrap_err().is_config());
    }
}
