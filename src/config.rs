//! Configuration file support
//!
//! The relay is configured by a single JSON document, usually `config.json`
//! inside the workspace directory:
//!
//! ```json
//! {
//!   "collapsed_length": 200,
//!   "translation_service": "deeplx",
//!   "routes": { "ja": "openai" },
//!   "openai": { "api_key": "sk-...", "model": "gpt-4o-mini" },
//!   "target_config": {
//!     "-1001234.42": { "source_lang": "zh", "target_langs": ["en", "ja"] },
//!     "0.42": { "source_lang": "zh", "target_langs": ["en"] }
//!   }
//! }
//! ```
//!
//! The configuration is read once and never mutated by this crate.

use crate::error::{TranslateError, TranslateResult};
use crate::mt::registry::BackendKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GOOGLE_URL: &str = "https://translation.googleapis.com/language/translate/v2";
pub const DEFAULT_AZURE_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";
pub const DEFAULT_DEEPLX_URL: &str = "https://api.deeplx.org/translate";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Top-level configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Quote annotations longer than this many code units are collapsed; 0 disables collapsing
    #[serde(default)]
    pub collapsed_length: usize,

    /// Backend used for every language without a route override
    pub translation_service: BackendKind,

    /// Per-language backend overrides, keyed by ISO 639-1 code
    #[serde(default)]
    pub routes: BTreeMap<String, BackendKind>,

    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub deeplx: DeepLxConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub target_config: TargetConfig,
}

impl AppConfig {
    /// Load `config.json` from a workspace directory
    pub fn load_from_workspace(workspace: impl AsRef<Path>) -> TranslateResult<Self> {
        Self::load(workspace.as_ref().join("config.json"))
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> TranslateResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TranslateError::ConfigError(format!(
                "{} not found",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> TranslateResult<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Every backend the configuration refers to, default first, without duplicates
    pub fn referenced_backends(&self) -> Vec<BackendKind> {
        let mut kinds = vec![self.translation_service];
        for kind in self.routes.values() {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds
    }
}

/// Use the configured value, falling back to an environment variable
fn secret_or_env(value: &str, env_var: &str) -> Option<String> {
    let value = value.trim();
    if !value.is_empty() {
        return Some(value.to_string());
    }
    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn timeout_from_secs(backend: &str, secs: u64) -> TranslateResult<Duration> {
    if secs == 0 {
        return Err(TranslateError::ConfigError(format!(
            "{} timeout must be greater than zero",
            backend
        )));
    }
    Ok(Duration::from_secs(secs))
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_google_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_google_url() -> String {
    DEFAULT_GOOGLE_URL.to_string()
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: default_google_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GoogleConfig {
    pub fn api_key(&self) -> Option<String> {
        secret_or_env(&self.api_key, "GOOGLE_TRANSLATE_API_KEY")
    }

    pub fn timeout(&self) -> TranslateResult<Duration> {
        timeout_from_secs("google", self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default = "default_azure_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub region: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_azure_endpoint() -> String {
    DEFAULT_AZURE_ENDPOINT.to_string()
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            endpoint: default_azure_endpoint(),
            region: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AzureConfig {
    pub fn key(&self) -> Option<String> {
        secret_or_env(&self.key, "AZURE_TRANSLATOR_KEY")
    }

    pub fn timeout(&self) -> TranslateResult<Duration> {
        timeout_from_secs("azure", self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepLxConfig {
    #[serde(default = "default_deeplx_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_deeplx_url() -> String {
    DEFAULT_DEEPLX_URL.to_string()
}

impl Default for DeepLxConfig {
    fn default() -> Self {
        Self {
            url: default_deeplx_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl DeepLxConfig {
    pub fn timeout(&self) -> TranslateResult<Duration> {
        timeout_from_secs("deeplx", self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_url")]
    pub url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// System prompt template; `tgt_lang` is replaced with the target language name
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_openai_url() -> String {
    DEFAULT_OPENAI_URL.to_string()
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: default_openai_url(),
            model: default_openai_model(),
            prompt: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OpenAiConfig {
    pub fn api_key(&self) -> Option<String> {
        secret_or_env(&self.api_key, "OPENAI_API_KEY")
    }

    pub fn timeout(&self) -> TranslateResult<Duration> {
        timeout_from_secs("openai", self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_url")]
    pub url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// System instruction template; `tgt_lang` is replaced with the target language name
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gemini_url() -> String {
    DEFAULT_GEMINI_URL.to_string()
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: default_gemini_url(),
            model: default_gemini_model(),
            prompt: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    pub fn api_key(&self) -> Option<String> {
        secret_or_env(&self.api_key, "GEMINI_API_KEY")
    }

    pub fn timeout(&self) -> TranslateResult<Duration> {
        timeout_from_secs("gemini", self.timeout_secs)
    }
}

/// Source language and ordered target languages for one chat or user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub source_lang: String,
    pub target_langs: Vec<String>,
}

impl Route {
    pub fn new(source_lang: &str, target_langs: &[&str]) -> Self {
        Self {
            source_lang: source_lang.to_string(),
            target_langs: target_langs.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Parse the `a|b|c` target list notation used by the chat commands
    pub fn from_pipe_list(source_lang: &str, targets: &str) -> TranslateResult<Self> {
        let target_langs: Vec<String> = targets
            .split('|')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if source_lang.trim().is_empty() || target_langs.is_empty() {
            return Err(TranslateError::ConfigError(
                "expected source_lang and at least one target language (a|b|c)".to_string(),
            ));
        }
        Ok(Self {
            source_lang: source_lang.trim().to_string(),
            target_langs,
        })
    }
}

/// Routes keyed by `"<chat_id>.<sender_id>"`, with `"0.<sender_id>"` as the sender's global route
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetConfig(pub HashMap<String, Route>);

impl TargetConfig {
    pub fn chat_key(chat_id: i64, sender_id: i64) -> String {
        format!("{}.{}", chat_id, sender_id)
    }

    pub fn global_key(sender_id: i64) -> String {
        format!("0.{}", sender_id)
    }

    /// Chat-specific route first, then the sender's global route
    pub fn route_for(&self, chat_id: i64, sender_id: i64) -> Option<&Route> {
        self.0
            .get(&Self::chat_key(chat_id, sender_id))
            .or_else(|| self.0.get(&Self::global_key(sender_id)))
    }
}
