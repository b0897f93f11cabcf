//! Decide whether a message should be translated at all

use crate::detect::LanguageDetector;
use crate::mt::translator::normalize_locale;
use std::fmt;
use tracing::debug;

/// Why translation was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortCircuitReason {
    /// Nothing but whitespace
    Blank,
    /// Only emoji and pictographs
    EmojiOnly,
    /// The user already wrote in one of the target languages
    AlreadyTargetLanguage(String),
}

impl fmt::Display for ShortCircuitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortCircuitReason::Blank => write!(f, "blank"),
            ShortCircuitReason::EmojiOnly => write!(f, "emoji-only"),
            ShortCircuitReason::AlreadyTargetLanguage(lang) => {
                write!(f, "already-target-language ({})", lang)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    ShortCircuit(ShortCircuitReason),
}

impl GuardDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GuardDecision::Proceed)
    }
}

/// Short-circuits messages that need no translation
pub struct LanguageGuard<D> {
    detector: D,
}

impl<D: LanguageDetector> LanguageGuard<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    pub fn guard(&self, text: &str, source_lang: &str, target_langs: &[String]) -> GuardDecision {
        if text.trim().is_empty() {
            return GuardDecision::ShortCircuit(ShortCircuitReason::Blank);
        }

        if is_emoji_only(text) {
            return GuardDecision::ShortCircuit(ShortCircuitReason::EmojiOnly);
        }

        // Detection failures degrade to Proceed
        let Some(detected) = self.detector.detect(text) else {
            debug!("No confident language guess, proceeding");
            return GuardDecision::Proceed;
        };

        let detected = normalize_locale(&detected);
        let is_target = target_langs.iter().any(|t| normalize_locale(t) == detected);
        if is_target && detected != normalize_locale(source_lang) {
            debug!(detected = %detected, "Text already in a target language");
            return GuardDecision::ShortCircuit(ShortCircuitReason::AlreadyTargetLanguage(
                detected,
            ));
        }

        GuardDecision::Proceed
    }
}

/// True when every non-whitespace character is part of an emoji sequence
pub fn is_emoji_only(text: &str) -> bool {
    let mut saw_pictograph = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() || is_emoji_component(c) {
            continue;
        }
        if is_pictograph(c) {
            saw_pictograph = true;
            continue;
        }
        // Keycap base: 1️⃣ is '1' U+FE0F U+20E3, sometimes without the selector
        if is_keycap_base(c) && chars.peek().is_some_and(|&next| is_keycap_tail(next)) {
            saw_pictograph = true;
            continue;
        }
        return false;
    }
    saw_pictograph
}

fn is_keycap_base(c: char) -> bool {
    c.is_ascii_digit() || c == '#' || c == '*'
}

fn is_keycap_tail(c: char) -> bool {
    c == '\u{FE0F}' || c == '\u{20E3}'
}

/// Characters that only ever appear inside an emoji sequence
fn is_emoji_component(c: char) -> bool {
    matches!(c as u32,
        0x200D |            // Zero width joiner
        0x20E3 |            // Combining enclosing keycap
        0xFE00..=0xFE0F |   // Variation selectors
        0x1F3FB..=0x1F3FF | // Skin tone modifiers
        0xE0020..=0xE007F   // Tag characters (subdivision flags)
    )
}

/// Emoji presentation characters and pictographs
fn is_pictograph(c: char) -> bool {
    matches!(c as u32,
        0x00A9 | 0x00AE |
        0x203C | 0x2049 | 0x2122 | 0x2139 |
        0x2194..=0x21AA |
        0x231A..=0x23FF |   // Watch, hourglass, media controls
        0x24C2 |
        0x25AA..=0x25FE |
        0x2600..=0x26FF |   // Miscellaneous Symbols
        0x2700..=0x27BF |   // Dingbats
        0x2934 | 0x2935 |
        0x2B05..=0x2B55 |
        0x3030 | 0x303D | 0x3297 | 0x3299 |
        0x1F000..=0x1F02F | // Mahjong, Domino
        0x1F0CF |
        0x1F170..=0x1F251 | // Enclosed alphanumerics, regional indicators, ideographs
        0x1F300..=0x1FAFF   // Pictographs, emoticons, transport, geometric shapes extended
    )
}
