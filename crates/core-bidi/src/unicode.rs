//! `unicode-bidi` backend.

use crate::classifier::{BidiClassifier, ClassifyError, LineOrder, ParagraphAnalysis, ParagraphBase};
use std::ops::Range;
use unicode_bidi::{BidiInfo, Direction, Level};

#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeBidiClassifier;

impl BidiClassifier for UnicodeBidiClassifier {
    fn name(&self) -> &'static str {
        "unicode-bidi"
    }

    fn analyze<'t>(
        &self,
        text: &'t str,
        base: ParagraphBase,
    ) -> Result<Box<dyn ParagraphAnalysis + 't>, ClassifyError> {
        if text.is_empty() {
            return Err(ClassifyError::Empty);
        }
        let level = match base {
            ParagraphBase::Ltr => Level::ltr(),
            ParagraphBase::Rtl => Level::rtl(),
            ParagraphBase::Auto { fallback_rtl } => match unicode_bidi::get_base_direction(text) {
                Direction::Ltr => Level::ltr(),
                Direction::Rtl => Level::rtl(),
                // No strong character: neutral content keeps the declared direction.
                _ if fallback_rtl => Level::rtl(),
                _ => Level::ltr(),
            },
        };
        let info = BidiInfo::new(text, Some(level));
        if info.paragraphs.len() != 1 {
            return Err(ClassifyError::MultipleParagraphs(info.paragraphs.len()));
        }
        let offsets = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        Ok(Box::new(UnicodeParagraph { info, offsets }))
    }
}

struct UnicodeParagraph<'t> {
    info: BidiInfo<'t>,
    /// Byte offset of every character, plus the text length.
    offsets: Vec<usize>,
}

impl UnicodeParagraph<'_> {
    fn paragraph_level(&self) -> Level {
        self.info.paragraphs[0].level
    }
}

impl ParagraphAnalysis for UnicodeParagraph<'_> {
    fn is_rtl(&self) -> bool {
        self.paragraph_level().is_rtl()
    }

    fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn level(&self, index: usize) -> u8 {
        self.info.levels[self.offsets[index]].number()
    }

    fn is_single_direction(&self) -> bool {
        let para = self.paragraph_level();
        self.info.levels.iter().all(|l| *l == para)
    }

    fn reorder_line(&self, line: Range<usize>) -> Result<LineOrder, ClassifyError> {
        if line.start > line.end || line.end > self.len() {
            return Err(ClassifyError::LineOutOfRange {
                start: line.start,
                end: line.end,
                len: self.len(),
            });
        }
        if line.is_empty() {
            return Ok(LineOrder::default());
        }
        let para = &self.info.paragraphs[0];
        let bytes = self.offsets[line.start]..self.offsets[line.end];
        // Levels for the whole text with the line rules applied to `bytes`.
        let reordered = self.info.reordered_levels(para, bytes);
        let levels: Vec<Level> = line.map(|i| reordered[self.offsets[i]]).collect();
        let visual = BidiInfo::reorder_visual(&levels);
        Ok(LineOrder {
            visual,
            levels: levels.iter().map(|l| l.number()).collect(),
        })
    }
}
