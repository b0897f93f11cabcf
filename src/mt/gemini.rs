//! Google Gemini `generateContent` provider

use crate::config::GeminiConfig;
use crate::detect::language_name;
use crate::error::{TranslateError, TranslateResult};
use crate::mt::openai::TARGET_LANGUAGE_PLACEHOLDER;
use crate::mt::translator::{MachineTranslator, status_error};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const DEFAULT_PROMPT: &str = "You are a professional translator. \
    Translate the user's message into tgt_lang. \
    If the text cannot be translated, repeat it precisely. \
    Respond with the translation only.";

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Clone)]
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    model: String,
    prompt_template: String,
    temperature: f32,
    client: reqwest::Client,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn from_config(config: &GeminiConfig, client: reqwest::Client) -> TranslateResult<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            TranslateError::ConfigError(
                "Gemini translation service configuration is missing \
                 (gemini.api_key or GEMINI_API_KEY)"
                    .to_string(),
            )
        })?;
        if config.model.trim().is_empty() {
            return Err(TranslateError::ConfigError(
                "Gemini model cannot be empty".to_string(),
            ));
        }
        let prompt_template = if config.prompt.trim().is_empty() {
            DEFAULT_PROMPT.to_string()
        } else {
            config.prompt.clone()
        };
        Ok(Self {
            api_key,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            prompt_template,
            temperature: config.temperature,
            client,
            timeout: config.timeout()?,
        })
    }

    /// Model name without the optional `models/` prefix
    fn api_model_name(&self) -> &str {
        self.model.strip_prefix("models/").unwrap_or(&self.model)
    }

    fn system_instruction(&self, target_locale: &str) -> String {
        let name = language_name(target_locale).unwrap_or(target_locale);
        self.prompt_template.replace(TARGET_LANGUAGE_PLACEHOLDER, name)
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GeminiProvider {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String> {
        let safety_settings: Vec<serde_json::Value> = SAFETY_CATEGORIES
            .iter()
            .map(|category| json!({ "category": category, "threshold": "BLOCK_NONE" }))
            .collect();

        let payload = json!({
            "system_instruction": { "parts": [{ "text": self.system_instruction(target_locale) }] },
            "contents": [{ "role": "user", "parts": [{ "text": text }] }],
            "generationConfig": { "temperature": self.temperature },
            "safetySettings": safety_settings
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            self.api_model_name()
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(self.provider_name(), status, &body));
        }

        let result: serde_json::Value = response.json().await.map_err(|e| {
            TranslateError::TranslationError(format!("Failed to parse Gemini response: {}", e))
        })?;

        result["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                let reason = result["promptFeedback"]["blockReason"]
                    .as_str()
                    .unwrap_or("no candidates");
                TranslateError::TranslationError(format!("Gemini returned no text: {}", reason))
            })
    }

    fn provider_name(&self) -> &str {
        "Gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(url: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: "g-key".to_string(),
            url: url.to_string(),
            model: "models/gemini-1.5-flash".to_string(),
            prompt: "Translate to tgt_lang".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let mut cfg = config("http://localhost");
        cfg.api_key = String::new();
        // The env fallback may be set on a developer machine
        if std::env::var("GEMINI_API_KEY").is_err() {
            let err = GeminiProvider::from_config(&cfg, reqwest::Client::new()).unwrap_err();
            assert!(err.is_config());
        }
    }

    #[test]
    fn test_system_instruction_uses_language_name() {
        let provider = GeminiProvider::from_config(
            &config("http://localhost"),
            reqwest::Client::new(),
        )
        .unwrap();
        assert_eq!(provider.system_instruction("ja"), "Translate to Japanese");
        assert_eq!(provider.api_model_name(), "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_translate_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_header("x-goog-api-key", "g-key")
            .match_body(Matcher::PartialJson(json!({
                "system_instruction": { "parts": [{ "text": "Translate to English" }] }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"Hello\n"}]}}]}"#)
            .create_async()
            .await;

        let provider = GeminiProvider::from_config(
            &config(&server.url()),
            reqwest::Client::new(),
        )
        .unwrap();
        assert_eq!(provider.translate("你好", "zh", "en").await.unwrap(), "Hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;

        let provider = GeminiProvider::from_config(
            &config(&server.url()),
            reqwest::Client::new(),
        )
        .unwrap();
        match provider.translate("你好", "zh", "en").await {
            Err(TranslateError::TranslationError(msg)) => assert!(msg.contains("SAFETY")),
            other => panic!("Expected TranslationError, got {:?}", other),
        }
    }
}
