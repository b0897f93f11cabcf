//! Language detection
//!
//! Detection is best-effort. A detector that cannot make a confident guess
//! returns `None`, and callers carry on as if nothing was detected.

use tracing::debug;
use whatlang::Lang;

/// Best-effort language identification
pub trait LanguageDetector: Send + Sync {
    /// ISO 639-1 code of the text's language, or `None` when unsure
    fn detect(&self, text: &str) -> Option<String>;
}

/// Local detector backed by the `whatlang` trigram models
#[derive(Debug, Clone, Default)]
pub struct WhatlangDetector {
    /// Accept guesses that whatlang itself flags as unreliable
    accept_unreliable: bool,
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepting_unreliable(mut self) -> Self {
        self.accept_unreliable = true;
        self
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Option<String> {
        // Very short messages give meaningless trigram statistics
        if text.trim().chars().count() < 3 {
            return None;
        }

        let info = whatlang::detect(text)?;
        if !info.is_reliable() && !self.accept_unreliable {
            debug!(
                lang = ?info.lang(),
                confidence = info.confidence(),
                "Language detection not reliable, ignoring"
            );
            return None;
        }

        let (code, name) = lang_to_code_and_name(info.lang())?;
        debug!(
            "Detected language: {} ({}) with confidence {:.2}",
            name,
            code,
            info.confidence()
        );
        Some(code.to_string())
    }
}

/// A detector that always returns the same answer, for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct FixedDetector(pub Option<String>);

impl FixedDetector {
    pub fn unknown() -> Self {
        Self(None)
    }

    pub fn always(code: &str) -> Self {
        Self(Some(code.to_string()))
    }
}

impl LanguageDetector for FixedDetector {
    fn detect(&self, _text: &str) -> Option<String> {
        self.0.clone()
    }
}

/// Converts a `whatlang::Lang` to its ISO 639-1 code and English name
fn lang_to_code_and_name(lang: Lang) -> Option<(&'static str, &'static str)> {
    LANGUAGES
        .iter()
        .find(|(l, _, _)| *l == lang)
        .map(|(_, code, name)| (*code, *name))
}

/// English name for an ISO 639-1 code, used to fill prompt templates
pub fn language_name(code: &str) -> Option<&'static str> {
    let code = crate::mt::translator::normalize_locale(code);
    LANGUAGES
        .iter()
        .find(|(_, c, _)| *c == code)
        .map(|(_, _, name)| *name)
}

const LANGUAGES: &[(Lang, &str, &str)] = &[
    (Lang::Afr, "af", "Afrikaans"),
    (Lang::Ara, "ar", "Arabic"),
    (Lang::Bul, "bg", "Bulgarian"),
    (Lang::Ben, "bn", "Bengali"),
    (Lang::Cat, "ca", "Catalan"),
    (Lang::Ces, "cs", "Czech"),
    (Lang::Cmn, "zh", "Chinese"),
    (Lang::Dan, "da", "Danish"),
    (Lang::Deu, "de", "German"),
    (Lang::Ell, "el", "Greek"),
    (Lang::Eng, "en", "English"),
    (Lang::Epo, "eo", "Esperanto"),
    (Lang::Spa, "es", "Spanish"),
    (Lang::Est, "et", "Estonian"),
    (Lang::Fin, "fi", "Finnish"),
    (Lang::Fra, "fr", "French"),
    (Lang::Heb, "he", "Hebrew"),
    (Lang::Hin, "hi", "Hindi"),
    (Lang::Hrv, "hr", "Croatian"),
    (Lang::Hun, "hu", "Hungarian"),
    (Lang::Ind, "id", "Indonesian"),
    (Lang::Ita, "it", "Italian"),
    (Lang::Jpn, "ja", "Japanese"),
    (Lang::Kat, "ka", "Georgian"),
    (Lang::Kor, "ko", "Korean"),
    (Lang::Lat, "la", "Latin"),
    (Lang::Lav, "lv", "Latvian"),
    (Lang::Lit, "lt", "Lithuanian"),
    (Lang::Mkd, "mk", "Macedonian"),
    (Lang::Nld, "nl", "Dutch"),
    (Lang::Nob, "nb", "Norwegian"),
    (Lang::Pol, "pl", "Polish"),
    (Lang::Por, "pt", "Portuguese"),
    (Lang::Ron, "ro", "Romanian"),
    (Lang::Rus, "ru", "Russian"),
    (Lang::Slk, "sk", "Slovak"),
    (Lang::Slv, "sl", "Slovenian"),
    (Lang::Swe, "sv", "Swedish"),
    (Lang::Tam, "ta", "Tamil"),
    (Lang::Tha, "th", "Thai"),
    (Lang::Tur, "tr", "Turkish"),
    (Lang::Ukr, "uk", "Ukrainian"),
    (Lang::Urd, "ur", "Urdu"),
    (Lang::Vie, "vi", "Vietnamese"),
];
