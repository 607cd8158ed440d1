//! Property tests: every computed row map is a total, invertible mapping.

mod common;
use common::*;

use core_ring::{BidiFlags, Ring, Row};
use proptest::prelude::*;

const ALPHABET: &[char] = &[
    'a', 'b', ' ', '1', '(', ')', '.', '\u{05D0}', '\u{05D1}', '\u{0628}', '\u{0644}', '\u{0661}',
    '\u{4E2D}', '\u{0301}',
];

fn line() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(ALPHABET), 0..18)
        .prop_map(|chars| chars.into_iter().collect())
}

fn flags() -> impl Strategy<Value = BidiFlags> {
    (0u8..16).prop_map(BidiFlags::from_bits_truncate)
}

fn scrollback() -> impl Strategy<Value = Vec<(String, bool, BidiFlags)>> {
    prop::collection::vec((line(), any::<bool>(), flags()), 1..12)
}

fn build(rows: &[(String, bool, BidiFlags)], max_rows: usize) -> Ring {
    let mut ring = Ring::new(max_rows);
    for (text, wrapped, flags) in rows {
        ring.push(Row::from_text(text, *flags).soft_wrapped(*wrapped));
    }
    ring
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn visible_rows_are_bijections(
        rows in scrollback(),
        width in 1usize..12,
        start in 0usize..12,
        len in 1usize..8,
        max in 1usize..6,
        ring_cap in 4usize..16,
    ) {
        let ring = build(&rows, ring_cap);
        let mut view = viewport(width, start, len);
        view.set_paragraph_length_max(max);
        view.recompute(&ring);
        let w = width as isize;
        for row in start..start + len {
            for c in 0..w {
                let v = view.log2vis(row, c);
                prop_assert!((0..w).contains(&v));
                prop_assert_eq!(view.vis2log(row, v), c);
                prop_assert_eq!(view.log2vis(row, view.vis2log(row, c)), c);
            }
        }
    }

    #[test]
    fn outside_columns_pass_through_or_mirror(
        rows in scrollback(),
        width in 1usize..12,
        k in 0isize..20,
    ) {
        let ring = build(&rows, 64);
        let mut view = viewport(width, 0, rows.len());
        view.recompute(&ring);
        let w = width as isize;
        for row in 0..rows.len() {
            let rtl = view.row_map(row).base_is_rtl();
            let (right, left) = (view.log2vis(row, w + k), view.log2vis(row, -1 - k));
            if rtl {
                prop_assert_eq!(right, -1 - k);
                prop_assert_eq!(left, w + k);
            } else {
                prop_assert_eq!(right, w + k);
                prop_assert_eq!(left, -1 - k);
            }
            prop_assert_eq!(view.vis_is_rtl(row, w + k), rtl);
            prop_assert_eq!(view.vis_get_shaped_char(row, -1 - k), None);
        }
    }

    #[test]
    fn wide_characters_are_never_split(rows in scrollback(), width in 2usize..12) {
        let ring = build(&rows, 64);
        let mut view = viewport(width, 0, rows.len());
        view.recompute(&ring);
        for (row, (text, _, _)) in rows.iter().enumerate() {
            let data = Row::from_text(text, BidiFlags::empty());
            let used = data.len().min(width);
            for (col, cell) in data.cells()[..used].iter().enumerate() {
                if cell.is_fragment() || cell.columns < 2 || col + 1 >= used {
                    continue;
                }
                let (a, b) = (view.log2vis(row, col as isize), view.log2vis(row, col as isize + 1));
                prop_assert_eq!((a - b).abs(), 1, "row {} col {}", row, col);
                if view.vis_is_rtl(row, a) {
                    prop_assert_eq!(a, b + 1);
                } else {
                    prop_assert_eq!(b, a + 1);
                }
            }
        }
    }
}
