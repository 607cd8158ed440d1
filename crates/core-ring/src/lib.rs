//! Scrollback row model consumed by the bidi viewport.
//!
//! A terminal grid row is a sequence of cells. Every printed character owns
//! one leader cell; a character spanning N columns is followed by N-1
//! fragment cells which never carry a glyph of their own.
//!
//! Invariants:
//! - Leader: `fragment == false`, `columns >= 1`.
//! - Fragment: `fragment == true`, follows its leader (or another fragment of
//!   the same leader) with no gap.
//! - Row indices handed out by a [`RowSource`] are absolute and only grow;
//!   evicting old rows raises [`RowSource::first_row`] but never renumbers.
//!
//! The [`Ring`] here is a small in-memory scrollback used by tests and the
//! `ringview` binary. Real terminals plug their own storage in through
//! [`RowSource`].

use bitflags::bitflags;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::ops::Range;
use tracing::trace;

pub mod wrap;

pub use wrap::{TAB_WIDTH, grapheme_columns, wrap_text};

bitflags! {
    /// Per-row bidi attributes, as left behind by the escape sequences that
    /// select the paragraph direction mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BidiFlags: u8 {
        const IMPLICIT   = 0b0000_0001; // run the bidi algorithm
        const RTL        = 0b0000_0010; // declared (or default) direction
        const AUTO       = 0b0000_0100; // autodetect direction from content
        const BOX_MIRROR = 0b0000_1000; // mirror box drawing characters
    }
}

/// Direction handling requested for a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionMode {
    ExplicitLtr,
    ExplicitRtl,
    /// Run the classifier with a fixed paragraph direction.
    Implicit { rtl: bool },
    /// Run the classifier and detect the direction; `rtl` is the fallback for
    /// direction-neutral content.
    ImplicitAuto { rtl: bool },
}

impl BidiFlags {
    pub fn is_implicit(self) -> bool {
        self.contains(BidiFlags::IMPLICIT)
    }

    pub fn is_rtl(self) -> bool {
        self.contains(BidiFlags::RTL)
    }

    pub fn is_auto(self) -> bool {
        self.contains(BidiFlags::AUTO)
    }

    pub fn mirrors_box_drawing(self) -> bool {
        self.contains(BidiFlags::BOX_MIRROR)
    }

    /// `AUTO` without `IMPLICIT` has no effect, matching how terminals treat
    /// the autodetect bit for explicit paragraphs.
    pub fn mode(self) -> DirectionMode {
        let rtl = self.is_rtl();
        match (self.is_implicit(), self.is_auto()) {
            (false, _) if rtl => DirectionMode::ExplicitRtl,
            (false, _) => DirectionMode::ExplicitLtr,
            (true, false) => DirectionMode::Implicit { rtl },
            (true, true) => DirectionMode::ImplicitAuto { rtl },
        }
    }
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Base code point of the character (leader cells only).
    pub base: char,
    /// Combining marks stacked on `base`. Never fed to the bidi classifier.
    pub combining: SmallVec<[char; 2]>,
    /// Continuation slot of a multi-column character.
    pub fragment: bool,
    /// Columns occupied by the character this cell belongs to.
    pub columns: u8,
}

impl Cell {
    pub fn new(base: char, columns: u8) -> Self {
        Self {
            base,
            combining: SmallVec::new(),
            fragment: false,
            columns: columns.max(1),
        }
    }

    /// Continuation of a leader that spans `columns` columns.
    pub fn fragment(columns: u8) -> Self {
        Self {
            base: ' ',
            combining: SmallVec::new(),
            fragment: true,
            columns: columns.max(1),
        }
    }

    pub fn is_fragment(&self) -> bool {
        self.fragment
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowAttr {
    /// The paragraph continues on the next row.
    pub soft_wrapped: bool,
    pub bidi: BidiFlags,
}

impl RowAttr {
    pub fn new(bidi: BidiFlags) -> Self {
        Self {
            soft_wrapped: false,
            bidi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    cells: Vec<Cell>,
    pub attr: RowAttr,
}

impl Row {
    pub fn new(attr: RowAttr) -> Self {
        Self {
            cells: Vec::new(),
            attr,
        }
    }

    /// Build a single (unwrapped) row from text, expanding wide characters
    /// and tabs into leader + fragment cells.
    pub fn from_text(text: &str, bidi: BidiFlags) -> Self {
        let mut row = Row::new(RowAttr::new(bidi));
        for g in unicode_segmentation::UnicodeSegmentation::graphemes(text, true) {
            let cols = grapheme_columns(g, row.len());
            row.push_grapheme(g, cols);
        }
        row
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Append one grapheme cluster occupying `cols` columns: the first code
    /// point becomes the cell's base, the remainder its combining marks.
    pub fn push_grapheme(&mut self, g: &str, cols: usize) {
        let mut chars = g.chars();
        let Some(base) = chars.next() else {
            return;
        };
        let cols = cols.clamp(1, u8::MAX as usize) as u8;
        let mut leader = Cell::new(base, cols);
        leader.combining.extend(chars);
        self.cells.push(leader);
        for _ in 1..cols {
            self.cells.push(Cell::fragment(cols));
        }
    }

    pub fn soft_wrapped(mut self, wrapped: bool) -> Self {
        self.attr.soft_wrapped = wrapped;
        self
    }
}

/// Read-only access to scrollback rows by absolute index.
pub trait RowSource {
    /// Row at `index`, or `None` when it was evicted or not yet written.
    fn row_at(&self, index: usize) -> Option<&Row>;
    /// Absolute index of the oldest retained row.
    fn first_row(&self) -> usize;
    /// One past the absolute index of the newest row.
    fn next_row(&self) -> usize;
}

/// Bounded in-memory scrollback. Pushing past `max_rows` evicts the oldest row.
#[derive(Debug, Clone)]
pub struct Ring {
    rows: VecDeque<Row>,
    first: usize,
    max_rows: usize,
}

impl Ring {
    pub fn new(max_rows: usize) -> Self {
        Self {
            rows: VecDeque::new(),
            first: 0,
            max_rows: max_rows.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, returning its absolute index.
    pub fn push(&mut self, row: Row) -> usize {
        if self.rows.len() == self.max_rows {
            self.rows.pop_front();
            self.first += 1;
            trace!(target: "ring", first = self.first, "row_evicted");
        }
        self.rows.push_back(row);
        self.next_row() - 1
    }

    /// Append rows, returning the absolute index range they were given.
    pub fn extend<I: IntoIterator<Item = Row>>(&mut self, rows: I) -> Range<usize> {
        let start = self.next_row();
        for row in rows {
            self.push(row);
        }
        start..self.next_row()
    }

    /// Wrap `text` at `width` columns and append the resulting paragraph.
    pub fn append_text(&mut self, text: &str, width: usize, bidi: BidiFlags) -> Range<usize> {
        self.extend(wrap_text(text, width, bidi))
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        let offset = index.checked_sub(self.first)?;
        self.rows.get_mut(offset)
    }
}

impl RowSource for Ring {
    fn row_at(&self, index: usize) -> Option<&Row> {
        let offset = index.checked_sub(self.first)?;
        self.rows.get(offset)
    }

    fn first_row(&self) -> usize {
        self.first
    }

    fn next_row(&self) -> usize {
        self.first + self.rows.len()
    }
}
