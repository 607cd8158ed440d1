//! Bidirectional layout of a terminal viewport.
//!
//! A terminal keeps text in logical order, one character per cell, and lets
//! long lines soft-wrap onto following rows. This crate computes, for every
//! visible row, where each logical column is drawn (and the reverse), running
//! the Unicode Bidi Algorithm over whole paragraphs even when they start
//! above the viewport or continue below it.
//!
//! Exposed Components:
//! - `ring_view`: `RingView`, the viewport coordinator. Owns the row maps,
//!   finds paragraph boundaries, accumulates paragraph text and drives the
//!   classifier.
//! - `row_map`: `RowMap`, per-row logical <-> visual permutation plus
//!   per-column direction and shaped glyph.
//! - `classifier`: the `BidiClassifier` seam and the explicit (no-bidi)
//!   backend; `unicode` holds the `unicode-bidi` backend.
//! - `shaping`: Arabic contextual forms over the paragraph buffer.
//! - `mirror`: mirrored glyphs for RTL cells, box drawing included.
//!
//! Invariants:
//! - After `recompute` every visible row map is a bijection on `[0, W)` and
//!   `log2vis` is the exact inverse of `vis2log`.
//! - Columns outside `[0, W)` pass through (LTR) or mirror (RTL).
//! - A multi-column character occupies adjacent visual columns: ascending
//!   for even embedding levels, descending for odd ones.
//! - Work per recompute is bounded by `paragraph_length_max` rows above and
//!   below the viewport, never by scrollback size.
//!
//! Consumer contract (renderer, cursor, selection): draw visual column `v`
//! from logical column `vis2log(v)`; substitute `vis_get_shaped_char(v)` when
//! present; mirror the glyph when `vis_is_rtl(v)`.

pub mod classifier;
pub mod mirror;
pub mod ring_view;
pub mod row_map;
pub mod shaping;
#[cfg(feature = "unicode-bidi")]
pub mod unicode;

pub use classifier::{
    BidiClassifier, ClassifyError, ExplicitClassifier, LineOrder, ParagraphAnalysis, ParagraphBase,
    classifier_for, default_classifier,
};
pub use mirror::mirror;
pub use ring_view::{RecomputeStats, RingView, RingViewOptions};
pub use row_map::RowMap;
#[cfg(feature = "unicode-bidi")]
pub use unicode::UnicodeBidiClassifier;
