//! Classifier seam between the viewport and a Unicode Bidi Algorithm backend.
//!
//! The viewport never interprets bidi classes itself. It hands one paragraph
//! of text to [`BidiClassifier::analyze`], asks the returned
//! [`ParagraphAnalysis`] for levels, and asks it to reorder one line (row)
//! at a time. Any error is recovered by the caller with explicit layout.

use core_config::ClassifierKind;
use core_ring::DirectionMode;
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("no bidi classifier available")]
    Unavailable,
    #[error("empty paragraph")]
    Empty,
    #[error("text split into {0} paragraphs")]
    MultipleParagraphs(usize),
    #[error("line {start}..{end} outside paragraph of {len} characters")]
    LineOutOfRange { start: usize, end: usize, len: usize },
}

/// Requested paragraph direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphBase {
    Ltr,
    Rtl,
    /// First strong character decides; `fallback_rtl` applies to neutral text.
    Auto { fallback_rtl: bool },
}

impl ParagraphBase {
    /// `None` for explicit modes, which never reach the classifier.
    pub fn from_mode(mode: DirectionMode) -> Option<Self> {
        match mode {
            DirectionMode::ExplicitLtr | DirectionMode::ExplicitRtl => None,
            DirectionMode::Implicit { rtl: false } => Some(ParagraphBase::Ltr),
            DirectionMode::Implicit { rtl: true } => Some(ParagraphBase::Rtl),
            DirectionMode::ImplicitAuto { rtl } => Some(ParagraphBase::Auto { fallback_rtl: rtl }),
        }
    }
}

/// Visual order of one line of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineOrder {
    /// `visual[v]` is the line-relative index of the character drawn at
    /// visual position `v`.
    pub visual: Vec<usize>,
    /// Line-relative levels after the line rules (trailing whitespace etc.).
    pub levels: Vec<u8>,
}

/// Resolved paragraph, valid while the text it was built from is borrowed.
pub trait ParagraphAnalysis {
    /// Resolved (possibly autodetected) paragraph direction.
    fn is_rtl(&self) -> bool;
    /// Number of characters analyzed.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Paragraph-level embedding level of character `index`.
    fn level(&self, index: usize) -> u8;
    /// Every character resolved to the paragraph's own level, so the
    /// paragraph reads in a single direction.
    fn is_single_direction(&self) -> bool;
    /// Reorder characters `line` (paragraph-relative character indices).
    fn reorder_line(&self, line: Range<usize>) -> Result<LineOrder, ClassifyError>;
}

/// Unicode Bidi Algorithm backend.
pub trait BidiClassifier: Send {
    fn name(&self) -> &'static str;

    /// `false` for backends that cannot reorder; callers skip straight to
    /// explicit layout.
    fn is_available(&self) -> bool {
        true
    }

    fn analyze<'t>(
        &self,
        text: &'t str,
        base: ParagraphBase,
    ) -> Result<Box<dyn ParagraphAnalysis + 't>, ClassifyError>;

    /// Bidi mirrored glyph of `ch`, `None` when it has none.
    fn mirror(&self, ch: char) -> Option<char> {
        unicode_bidi_mirroring::get_mirrored(ch)
    }
}

/// Backend for builds (or configurations) without bidi support.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitClassifier;

impl BidiClassifier for ExplicitClassifier {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn analyze<'t>(
        &self,
        _text: &'t str,
        _base: ParagraphBase,
    ) -> Result<Box<dyn ParagraphAnalysis + 't>, ClassifyError> {
        Err(ClassifyError::Unavailable)
    }
}

pub fn default_classifier() -> Box<dyn BidiClassifier> {
    #[cfg(feature = "unicode-bidi")]
    {
        Box::new(crate::unicode::UnicodeBidiClassifier)
    }
    #[cfg(not(feature = "unicode-bidi"))]
    {
        Box::new(ExplicitClassifier)
    }
}

pub fn classifier_for(kind: ClassifierKind) -> Box<dyn BidiClassifier> {
    match kind {
        ClassifierKind::Unicode => default_classifier(),
        ClassifierKind::Explicit => Box::new(ExplicitClassifier),
    }
}

/// Character fed to the classifier for a cell's base character.
///
/// Paragraph separators (bidi class B) would split the flat buffer into
/// several paragraphs; inside a terminal row they are just glyphs.
pub(crate) fn classifier_input(ch: char) -> char {
    match ch {
        '\u{000A}' | '\u{000D}' | '\u{001C}'..='\u{001E}' | '\u{0085}' | '\u{2029}' => ' ',
        _ => ch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_from_mode() {
        assert_eq!(ParagraphBase::from_mode(DirectionMode::ExplicitRtl), None);
        assert_eq!(
            ParagraphBase::from_mode(DirectionMode::Implicit { rtl: true }),
            Some(ParagraphBase::Rtl)
        );
        assert_eq!(
            ParagraphBase::from_mode(DirectionMode::ImplicitAuto { rtl: false }),
            Some(ParagraphBase::Auto {
                fallback_rtl: false
            })
        );
    }

    #[test]
    fn explicit_backend_is_unavailable() {
        let c = ExplicitClassifier;
        assert!(!c.is_available());
        assert_eq!(
            c.analyze("abc", ParagraphBase::Ltr).err(),
            Some(ClassifyError::Unavailable)
        );
        assert_eq!(c.mirror('('), Some(')'));
    }

    #[test]
    fn paragraph_separators_are_neutralized() {
        assert_eq!(classifier_input('\u{2029}'), ' ');
        assert_eq!(classifier_input('\u{001D}'), ' ');
        assert_eq!(classifier_input('\u{05D0}'), '\u{05D0}');
    }

    #[test]
    fn explicit_kind_selects_explicit_backend() {
        assert_eq!(classifier_for(ClassifierKind::Explicit).name(), "explicit");
    }
}
