//! Machine translation trait and locale helpers
//!
//! Every backend, whether it talks to a REST API or runs locally for tests,
//! is normalised to the same `translate(text, source, target)` signature
//! before the dispatch engine ever sees it.
//!
//! # Example
//!
//! ```ignore
//! use translate_relay::mt::{MachineTranslator, GoogleTranslateProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::new("api-key".to_string(), Default::default())?;
//!     let result = provider.translate("Hello, world!", "en", "fr").await?;
//!     println!("{}", result); // "Bonjour, le monde!"
//!     Ok(())
//! }
//! ```

use crate::error::{TranslateError, TranslateResult};
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// Implementations must be usable from several concurrent tasks at once:
/// the dispatch engine issues one call per target language without waiting
/// for the previous one to finish.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target language
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "zh", "en-US")
    /// * `target_locale` - Target language code (e.g., "en", "ja")
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text
    /// * `Err(TranslateError)` - If the backend call fails
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> TranslateResult<String>;

    /// Name of this translation provider, used in logs and error messages
    fn provider_name(&self) -> &str;
}

/// Normalize a locale code by stripping region information
///
/// - `en-US` → `en`
/// - `zh-Hans` → `zh`
/// - `pt_BR` → `pt`
/// - `JA` → `ja`
pub fn normalize_locale(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_lowercase()
}

/// Validate that a locale code contains only alphanumerics, hyphens and underscores
pub fn validate_locale(locale: &str) -> TranslateResult<()> {
    if locale.is_empty() {
        return Err(TranslateError::InvalidLocale(
            "Locale code is empty".to_string(),
        ));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(TranslateError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}

/// Map an HTTP error status onto the error taxonomy
///
/// 401/403 mean the credentials are wrong, which no retry will fix.
pub(crate) fn status_error(
    backend: &str,
    status: reqwest::StatusCode,
    body: &str,
) -> TranslateError {
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        TranslateError::AuthError(format!(
            "{} rejected credentials ({}): {}",
            backend, status, body
        ))
    } else {
        TranslateError::TranslationError(format!("{} returned {}: {}", backend, status, body))
    }
}
