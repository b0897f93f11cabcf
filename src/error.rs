//! Error types for the translation relay

use thiserror::Error;

/// Errors raised while configuring backends or translating a message
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Missing or invalid configuration. Fatal when raised at startup.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No configured backend can translate into the requested language
    #[error("Unsupported target language '{lang}' (configured backends: {})", .backends.join(", "))]
    UnsupportedLanguage { lang: String, backends: Vec<String> },

    /// Malformed language code
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Transport failure, including timeouts
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The backend rejected our credentials
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Non-success response or a payload we could not understand
    #[error("Translation error: {0}")]
    TranslationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslateError::NetworkError(format!("request timed out: {}", e))
        } else {
            TranslateError::NetworkError(e.to_string())
        }
    }
}

impl TranslateError {
    /// Whether the error is a startup configuration problem
    pub fn is_config(&self) -> bool {
        matches!(self, TranslateError::ConfigError(_))
    }
}

/// Result type for relay operations
pub type TranslateResult<T> = Result<T, TranslateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_language_names_backends() {
        let err = TranslateError::UnsupportedLanguage {
            lang: "xx".to_string(),
            backends: vec!["openai".to_string(), "deeplx".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'xx'"));
        assert!(msg.contains("openai, deeplx"));
    }

    #[test]
    fn test_is_config() {
        assert!(TranslateError::ConfigError("missing key".to_string()).is_config());
        assert!(!TranslateError::TranslationError("boom".to_string()).is_config());
    }

    #[test]
    fn test_json_error_converts() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json");
        let err: TranslateError = parse.unwrap_err().into();
        assert!(matches!(err, TranslateError::Json(_)));
    }
}
