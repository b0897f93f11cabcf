//! Compose translations into one message with a quote annotation
//!
//! The message protocol addresses text in UTF-16 code units, so every offset
//! and length here is counted that way. A supplementary-plane character
//! (anything above U+FFFF, most emoji) is one `char` but two code units.

use crate::dispatch::TranslationMap;
use serde::Serialize;

/// Number of UTF-16 code units in `s`
pub fn code_unit_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Number of codepoints above U+FFFF in `s`
pub fn count_supplementary(s: &str) -> usize {
    s.chars().filter(|c| (*c as u32) > 0xFFFF).count()
}

/// Number of Unicode scalar values in `s`
pub fn codepoint_len(s: &str) -> usize {
    s.chars().count()
}

/// A block-quote formatting directive, in code units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuoteAnnotation {
    pub offset: usize,
    pub length: usize,
    pub collapsed: bool,
}

/// Output text plus the span of the secondary translations
///
/// `annotation_offset + annotation_length <= code_unit_len(full_text)` always holds.
/// When there is no secondary text both are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedMessage {
    pub full_text: String,
    pub annotation_offset: usize,
    pub annotation_length: usize,
    pub collapsed: bool,
}

impl ComposedMessage {
    /// The quote to attach, if there is anything to quote
    pub fn annotation(&self) -> Option<QuoteAnnotation> {
        (self.annotation_length > 0).then_some(QuoteAnnotation {
            offset: self.annotation_offset,
            length: self.annotation_length,
            collapsed: self.collapsed,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MessageComposer {
    /// 0 disables collapsing
    collapse_threshold: usize,
}

impl MessageComposer {
    pub fn new(collapse_threshold: usize) -> Self {
        Self { collapse_threshold }
    }

    pub fn collapse_threshold(&self) -> usize {
        self.collapse_threshold
    }

    /// Join translations in `target_langs` order
    ///
    /// The first language that has a translation becomes the primary text;
    /// the others follow it, one per line, inside the quote. Returns `None`
    /// when nothing was translated.
    pub fn compose(
        &self,
        translations: &TranslationMap,
        target_langs: &[String],
    ) -> Option<ComposedMessage> {
        let mut surviving = target_langs
            .iter()
            .filter_map(|lang| translations.get(lang).map(String::as_str));

        let primary = surviving.next()?;
        // An empty secondary would leave a quote around a bare newline
        let secondary = surviving
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if secondary.is_empty() {
            return Some(ComposedMessage {
                full_text: primary.to_string(),
                annotation_offset: 0,
                annotation_length: 0,
                collapsed: false,
            });
        }

        let full_text = format!("{}\n{}", primary, secondary);
        let full_len = code_unit_len(&full_text);
        // +1 for the newline between primary and secondary
        let annotation_offset = code_unit_len(primary) + 1;
        let annotation_length = full_len - annotation_offset;
        let collapsed =
            self.collapse_threshold > 0 && annotation_length > self.collapse_threshold;

        Some(ComposedMessage {
            full_text,
            annotation_offset,
            annotation_length,
            collapsed,
        })
    }
}
