//! Text to grid rows.
//!
//! Splits a logical line into rows of at most `width` columns the way a
//! terminal with autowrap does: a wide character that does not fit in the
//! remaining columns moves to the next row, leaving the tail unused; tabs
//! advance to the next multiple of [`TAB_WIDTH`] and are clipped at the
//! right margin. Every row but the last is marked `soft_wrapped`.

use crate::{BidiFlags, Row, RowAttr};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub const TAB_WIDTH: usize = 8;

/// Columns taken by grapheme `g` when printed at column `col`.
pub fn grapheme_columns(g: &str, col: usize) -> usize {
    if g == "\t" {
        return TAB_WIDTH - col % TAB_WIDTH;
    }
    // Zero-width or control clusters still take a cell of their own.
    UnicodeWidthStr::width(g).clamp(1, 2)
}

pub fn wrap_text(text: &str, width: usize, bidi: BidiFlags) -> Vec<Row> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut row = Row::new(RowAttr::new(bidi));
    let text = text.trim_end_matches(['\n', '\r']);

    for g in text.graphemes(true) {
        if row.len() == width {
            rows.push(std::mem::replace(&mut row, Row::new(RowAttr::new(bidi))).soft_wrapped(true));
        }
        let mut cols = grapheme_columns(g, row.len());
        if g == "\t" {
            cols = cols.min(width - row.len());
        } else if row.len() + cols > width {
            if cols > width {
                cols = width;
            } else {
                rows.push(
                    std::mem::replace(&mut row, Row::new(RowAttr::new(bidi))).soft_wrapped(true),
                );
            }
        }
        row.push_grapheme(g, cols);
    }
    rows.push(row);
    rows
}
