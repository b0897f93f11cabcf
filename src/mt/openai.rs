//! OpenAI-compatible chat completions provider
//!
//! Translation is phrased as a rewrite request with a per-language system
//! prompt. English and Japanese have built-in prompts; a configured prompt
//! template (with `tgt_lang` standing for the language name) covers the rest.

use crate::config::OpenAiConfig;
use crate::detect::language_name;
use crate::error::{TranslateError, TranslateResult};
use crate::mt::translator::{MachineTranslator, normalize_locale, status_error};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const ENGLISH_PROMPT: &str = "If my text cannot be translated or contains nonsensical \
    content, just repeat my words precisely. As an American English expert, you'll help \
    users express themselves clearly. You're not just translating, but rephrasing to \
    maintain clarity. Use plain English and common idioms, and vary sentence lengths for \
    natural flow. Avoid regional expressions. Respond with the translated sentence.";

const JAPANESE_PROMPT: &str = "As a language expert, you are proficient in Chinese and \
    Japanese. If my text cannot be translated or contains nonsensical content, just repeat \
    my words precisely. You'll help users express themselves clearly. You're not just \
    translating, but rephrasing to maintain clarity. Use plain Japanese and common idioms, \
    and vary sentence lengths for natural flow. Avoid regional expressions. \
    Respond with the translated sentence.";

/// Placeholder replaced by the target language name in prompt templates
pub const TARGET_LANGUAGE_PLACEHOLDER: &str = "tgt_lang";

#[derive(Clone)]
pub struct OpenAiProvider {
    api_key: String,
    url: String,
    model: String,
    prompt_template: String,
    temperature: f32,
    client: reqwest::Client,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn from_config(config: &OpenAiConfig, client: reqwest::Client) -> TranslateResult<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            TranslateError::ConfigError(
                "OpenAI translation service configuration is missing \
                 (openai.api_key or OPENAI_API_KEY)"
                    .to_string(),
            )
        })?;
        Ok(Self {
            api_key,
            url: config.url.clone(),
            model: config.model.clone(),
            prompt_template: config.prompt.clone(),
            temperature: config.temperature,
            client,
            timeout: config.timeout()?,
        })
    }

    /// System prompt for a target language, if this provider can handle it
    pub fn system_prompt(&self, target_locale: &str) -> Option<String> {
        let lang = normalize_locale(target_locale);
        if !self.prompt_template.trim().is_empty() {
            let name = language_name(&lang).unwrap_or(target_locale);
            return Some(self.prompt_template.replace(TARGET_LANGUAGE_PLACEHOLDER, name));
        }
        match lang.as_str() {
            "en" => Some(ENGLISH_PROMPT.to_string()),
            "ja" => Some(JAPANESE_PROMPT.to_string()),
            _ => None,
        }
    }

    pub fn supports(&self, target_locale: &str) -> bool {
        self.system_prompt(target_locale).is_some()
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"***")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for OpenAiProvider {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String> {
        let system_content = self.system_prompt(target_locale).ok_or_else(|| {
            TranslateError::UnsupportedLanguage {
                lang: target_locale.to_string(),
                backends: vec![self.provider_name().to_string()],
            }
        })?;

        let payload = json!({
            "messages": [
                { "role": "system", "content": system_content },
                { "role": "user", "content": text }
            ],
            "stream": false,
            "model": self.model,
            "temperature": self.temperature,
            "presence_penalty": 0,
            "frequency_penalty": 0,
            "top_p": 1
        });

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        if !status.is_success() {
            return Err(status_error(self.provider_name(), status, &response_text));
        }

        let result: serde_json::Value = serde_json::from_str(&response_text).map_err(|e| {
            TranslateError::TranslationError(format!("OpenAI returned invalid JSON: {}", e))
        })?;

        result["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                TranslateError::TranslationError(format!(
                    "OpenAI response missing choices[0].message.content: {}",
                    response_text
                ))
            })
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(url: &str, prompt: &str) -> OpenAiConfig {
        OpenAiConfig {
            api_key: "sk-test".to_string(),
            url: url.to_string(),
            prompt: prompt.to_string(),
            ..Default::default()
        }
    }

    // ========== Prompt Tests ==========

    #[test]
    fn test_builtin_prompts() {
        let provider = OpenAiProvider::from_config(
            &config("http://localhost", ""),
            reqwest::Client::new(),
        )
        .unwrap();
        assert!(provider.system_prompt("en").unwrap().contains("American English"));
        assert!(provider.system_prompt("ja-JP").unwrap().contains("Japanese"));
        assert!(provider.system_prompt("fr").is_none());
        assert!(!provider.supports("ko"));
    }

    #[test]
    fn test_template_prompt() {
        let provider = OpenAiProvider::from_config(
            &config("http://localhost", "Translate into tgt_lang."),
            reqwest::Client::new(),
        )
        .unwrap();
        assert_eq!(provider.system_prompt("fr").unwrap(), "Translate into French.");
        assert!(provider.supports("ko"));
    }

    #[tokio::test]
    async fn test_unsupported_language_without_template() {
        let provider = OpenAiProvider::from_config(
            &config("http://localhost", ""),
            reqwest::Client::new(),
        )
        .unwrap();
        let result = provider.translate("你好", "zh", "fr").await;
        assert!(matches!(result, Err(TranslateError::UnsupportedLanguage { .. })));
    }

    // ========== HTTP Tests ==========

    #[tokio::test]
    async fn test_translate_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    { "role": "system", "content": ENGLISH_PROMPT },
                    { "role": "user", "content": "你好" }
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":" Hello \n"}}]}"#)
            .create_async()
            .await;

        let url = format!("{}/v1/chat/completions", server.url());
        let provider = OpenAiProvider::from_config(
            &config(&url, ""),
            reqwest::Client::new(),
        )
        .unwrap();
        assert_eq!(provider.translate("你好", "zh", "en").await.unwrap(), "Hello");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key"}}"#)
            .create_async()
            .await;

        let provider = OpenAiProvider::from_config(
            &config(&server.url(), ""),
            reqwest::Client::new(),
        )
        .unwrap();
        assert!(matches!(
            provider.translate("你好", "zh", "en").await,
            Err(TranslateError::AuthError(_))
        ));
    }
}
