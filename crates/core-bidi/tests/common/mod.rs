#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_bidi::{
    BidiClassifier, ClassifyError, ParagraphAnalysis, ParagraphBase, RingView,
    UnicodeBidiClassifier,
};
use core_ring::{BidiFlags, Ring, Row};
use std::sync::{Arc, Mutex};

pub const HEBREW: &str = "\u{05D0}\u{05D1}\u{05D2}";

pub fn explicit_ltr() -> BidiFlags {
    BidiFlags::empty()
}

pub fn explicit_rtl() -> BidiFlags {
    BidiFlags::RTL
}

pub fn implicit_ltr() -> BidiFlags {
    BidiFlags::IMPLICIT
}

pub fn implicit_rtl() -> BidiFlags {
    BidiFlags::IMPLICIT | BidiFlags::RTL
}

pub fn implicit_auto() -> BidiFlags {
    BidiFlags::IMPLICIT | BidiFlags::AUTO
}

/// Ring holding one unwrapped row per entry of `lines`.
pub fn ring_of(lines: &[&str], flags: BidiFlags) -> Ring {
    let mut ring = Ring::new(1024);
    for line in lines {
        ring.push(Row::from_text(line, flags));
    }
    ring
}

pub fn viewport(width: usize, start: usize, len: usize) -> RingView {
    let mut view = RingView::new();
    view.set_width(width);
    view.set_rows(start, len);
    view
}

pub fn vis2log_row(view: &RingView, row: usize) -> Vec<isize> {
    (0..view.width() as isize).map(|c| view.vis2log(row, c)).collect()
}

pub fn log2vis_row(view: &RingView, row: usize) -> Vec<isize> {
    (0..view.width() as isize).map(|c| view.log2vis(row, c)).collect()
}

pub fn assert_bijective(view: &RingView, row: usize) {
    let w = view.width() as isize;
    for c in 0..w {
        assert_eq!(view.vis2log(row, view.log2vis(row, c)), c, "row {row} col {c}");
        assert_eq!(view.log2vis(row, view.vis2log(row, c)), c, "row {row} col {c}");
    }
}

/// Unicode classifier that records the character count of every paragraph
/// it is asked to analyze.
pub struct Recording {
    inner: UnicodeBidiClassifier,
    pub seen: Arc<Mutex<Vec<usize>>>,
}

impl Recording {
    pub fn new() -> (Self, Arc<Mutex<Vec<usize>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                inner: UnicodeBidiClassifier,
                seen: seen.clone(),
            },
            seen,
        )
    }
}

impl BidiClassifier for Recording {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn analyze<'t>(
        &self,
        text: &'t str,
        base: ParagraphBase,
    ) -> Result<Box<dyn ParagraphAnalysis + 't>, ClassifyError> {
        self.seen.lock().unwrap().push(text.chars().count());
        self.inner.analyze(text, base)
    }
}

/// Classifier whose line reordering always fails.
pub struct BrokenLines;

struct BrokenParagraph<'t>(Box<dyn ParagraphAnalysis + 't>);

impl ParagraphAnalysis for BrokenParagraph<'_> {
    fn is_rtl(&self) -> bool {
        self.0.is_rtl()
    }
    fn len(&self) -> usize {
        self.0.len()
    }
    fn level(&self, index: usize) -> u8 {
        self.0.level(index)
    }
    fn is_single_direction(&self) -> bool {
        self.0.is_single_direction()
    }
    fn reorder_line(
        &self,
        line: std::ops::Range<usize>,
    ) -> Result<core_bidi::LineOrder, ClassifyError> {
        Err(ClassifyError::LineOutOfRange {
            start: line.start,
            end: line.end,
            len: 0,
        })
    }
}

impl BidiClassifier for BrokenLines {
    fn name(&self) -> &'static str {
        "broken-lines"
    }

    fn analyze<'t>(
        &self,
        text: &'t str,
        base: ParagraphBase,
    ) -> Result<Box<dyn ParagraphAnalysis + 't>, ClassifyError> {
        let inner = UnicodeBidiClassifier.analyze(text, base)?;
        Ok(Box::new(BrokenParagraph(inner)))
    }
}
