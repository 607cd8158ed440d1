//! Plain-text rendering of a computed viewport.
//!
//! Walks visual columns left to right and prints each character once, at
//! the leftmost visual column it occupies. RTL cells get their mirrored glyph,
//! shaped cells their presentation form.

use core_bidi::{RingView, mirror};
use core_ring::{Cell, Row, RowSource};

fn printable(cell: &Cell, base: char) -> String {
    let mut out = String::with_capacity(4);
    out.push(base);
    out.extend(cell.combining.iter());
    out
}

/// Logical column of the leader owning `col`.
fn leader_of(row: &Row, col: usize) -> Option<usize> {
    let mut lead = col;
    while row.cell(lead)?.is_fragment() {
        lead = lead.checked_sub(1)?;
    }
    Some(lead)
}

/// Visual rendering of viewport row `index`.
pub fn visual_line(view: &RingView, source: &dyn RowSource, index: usize) -> String {
    let width = view.width();
    let Some(row) = source.row_at(index) else {
        return " ".repeat(width);
    };
    let mirror_boxes = row.attr.bidi.mirrors_box_drawing();
    let mut printed = vec![false; width];
    let mut out = String::with_capacity(width);

    for vis in 0..width as isize {
        let log = view.vis2log(index, vis);
        let Some(lead) = usize::try_from(log).ok().and_then(|c| leader_of(row, c)) else {
            out.push(' ');
            continue;
        };
        // Fragment without a leader in this row.
        let Some(cell) = row.cell(lead).filter(|c| !c.is_fragment()) else {
            out.push(' ');
            continue;
        };
        // Tabs and other controls: one blank per column.
        if cell.base.is_control() {
            out.push(' ');
            continue;
        }
        if std::mem::replace(&mut printed[lead], true) {
            continue;
        }
        let glyph = match view.vis_get_shaped_char(index, view.log2vis(index, lead as isize)) {
            Some(shaped) => shaped,
            None if view.vis_is_rtl(index, vis) => {
                mirror(cell.base, mirror_boxes, Some(view.classifier())).unwrap_or(cell.base)
            }
            None => cell.base,
        };
        out.push_str(&printable(cell, glyph));
    }
    out
}

/// `vis2log` of row `index`, space separated.
pub fn map_line(view: &RingView, index: usize) -> String {
    (0..view.width() as isize)
        .map(|vis| view.vis2log(index, vis).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
