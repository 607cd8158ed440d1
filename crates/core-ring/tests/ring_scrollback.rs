use core_ring::{BidiFlags, Ring, RowSource, wrap_text};
use pretty_assertions::assert_eq;

fn text_of(ring: &Ring, index: usize) -> String {
    ring.row_at(index)
        .map(|row| {
            row.cells()
                .iter()
                .filter(|c| !c.is_fragment())
                .map(|c| c.base)
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn appended_paragraphs_chain_through_soft_wraps() {
    let mut ring = Ring::new(16);
    let first = ring.append_text("abcdefgh", 3, BidiFlags::IMPLICIT);
    let second = ring.append_text("xy", 3, BidiFlags::IMPLICIT);
    assert_eq!(first, 0..3);
    assert_eq!(second, 3..4);

    let wrapped: Vec<bool> = (0..4)
        .map(|i| ring.row_at(i).unwrap().attr.soft_wrapped)
        .collect();
    assert_eq!(wrapped, vec![true, true, false, false]);
    assert_eq!(text_of(&ring, 2), "gh");
}

#[test]
fn eviction_can_cut_a_paragraph() {
    let mut ring = Ring::new(2);
    let range = ring.append_text("abcdefgh", 3, BidiFlags::IMPLICIT);
    assert_eq!(range, 0..3);
    assert_eq!(ring.first_row(), 1);
    assert!(ring.row_at(0).is_none());
    // The retained head row still says it continues a paragraph.
    assert!(ring.row_at(1).unwrap().attr.soft_wrapped);
    assert_eq!(ring.len(), 2);
}

#[test]
fn wide_characters_and_tabs_fill_exact_columns() {
    let rows = wrap_text("\u{4E2D}\u{6587}\tz", 5, BidiFlags::empty());
    let lens: Vec<usize> = rows.iter().map(|r| r.len()).collect();
    // 中文 (4 columns) + tab clipped to 1 | z
    assert_eq!(lens, vec![5, 1]);
    assert!(rows[0].cell(4).unwrap().base == '\t');
}
