//! Per-row logical <-> visual column mapping.
//!
//! A row map is either an identity layout (explicit paragraphs and
//! single-direction paragraphs: column `c` maps to `c`, or to `W-1-c` for
//! RTL) or a reordered layout backed by per-column arrays. Queries outside
//! `[0, W)` never touch the arrays: they pass through (LTR) or mirror around
//! the row (RTL), so `-1 <=> W`, `-2 <=> W+1`, and so on. Cursor and
//! selection code can therefore step one column past either edge without
//! special cases.
//!
//! Backing storage grows by doubling and is never released, so resizing a
//! window back and forth does not reallocate.

/// Minimum column capacity of a freshly created map.
pub const COLUMNS_BASELINE: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mapping {
    Identity,
    Reordered,
}

#[derive(Debug, Clone, Copy, Default)]
struct CellMap {
    log2vis: usize,
    vis2log: usize,
    vis_rtl: bool,
    shaped: Option<char>,
}

#[derive(Debug, Clone)]
pub struct RowMap {
    width: usize,
    base_rtl: bool,
    has_foreign: bool,
    mapping: Mapping,
    cells: Vec<CellMap>,
}

impl Default for RowMap {
    fn default() -> Self {
        Self::with_capacity(COLUMNS_BASELINE)
    }
}

impl RowMap {
    pub fn with_capacity(columns: usize) -> Self {
        Self {
            width: 0,
            base_rtl: false,
            has_foreign: false,
            mapping: Mapping::Identity,
            cells: vec![CellMap::default(); columns.max(1)],
        }
    }

    /// Set the row width, doubling the backing storage until it fits.
    pub fn set_width(&mut self, width: usize) {
        if width > self.cells.len() {
            let mut alloc = self.cells.len();
            while alloc < width {
                alloc *= 2;
            }
            self.cells.resize(alloc, CellMap::default());
        }
        self.width = width;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Columns the backing storage can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn is_identity(&self) -> bool {
        self.mapping == Mapping::Identity
    }

    pub fn base_is_rtl(&self) -> bool {
        self.base_rtl
    }

    /// The row's paragraph mixed both directions.
    pub fn has_foreign(&self) -> bool {
        self.has_foreign
    }

    fn stored(&self, col: isize) -> Option<&CellMap> {
        if self.mapping == Mapping::Identity || col < 0 || col as usize >= self.width {
            return None;
        }
        Some(&self.cells[col as usize])
    }

    fn pass_through(&self, col: isize) -> isize {
        if self.base_rtl {
            self.width as isize - 1 - col
        } else {
            col
        }
    }

    pub fn log2vis(&self, col: isize) -> isize {
        match self.stored(col) {
            Some(cell) => cell.log2vis as isize,
            None => self.pass_through(col),
        }
    }

    pub fn vis2log(&self, col: isize) -> isize {
        match self.stored(col) {
            Some(cell) => cell.vis2log as isize,
            None => self.pass_through(col),
        }
    }

    pub fn vis_is_rtl(&self, col: isize) -> bool {
        self.stored(col).map_or(self.base_rtl, |cell| cell.vis_rtl)
    }

    pub fn log_is_rtl(&self, col: isize) -> bool {
        self.stored(col)
            .map_or(self.base_rtl, |cell| self.cells[cell.log2vis].vis_rtl)
    }

    /// Presentation form to draw instead of the cell's character.
    pub fn vis_get_shaped_char(&self, col: isize) -> Option<char> {
        self.stored(col).and_then(|cell| cell.shaped)
    }

    pub(crate) fn set_identity(&mut self, rtl: bool) {
        self.mapping = Mapping::Identity;
        self.base_rtl = rtl;
        self.has_foreign = false;
    }

    pub(crate) fn set_has_foreign(&mut self, foreign: bool) {
        self.has_foreign = foreign;
    }

    /// Switch to the array-backed layout; callers then fill every visual
    /// column with `set_vis` and call `finish_reorder`.
    pub(crate) fn begin_reorder(&mut self, rtl: bool) {
        self.mapping = Mapping::Reordered;
        self.base_rtl = rtl;
        self.has_foreign = false;
        for cell in &mut self.cells[..self.width] {
            cell.shaped = None;
        }
    }

    pub(crate) fn set_vis(&mut self, vis: usize, log: usize, rtl: bool) {
        let cell = &mut self.cells[vis];
        cell.vis2log = log;
        cell.vis_rtl = rtl;
    }

    /// Array-backed equivalent of the identity layout, used when a
    /// single-direction row still carries shaped glyphs.
    pub(crate) fn fill_explicit(&mut self, rtl: bool) {
        self.begin_reorder(rtl);
        let w = self.width;
        for v in 0..w {
            let log = if rtl { w - 1 - v } else { v };
            self.set_vis(v, log, rtl);
        }
        self.finish_reorder();
    }

    /// Derive `log2vis` from `vis2log`.
    pub(crate) fn finish_reorder(&mut self) {
        const UNSET: usize = usize::MAX;
        let w = self.width;
        if cfg!(debug_assertions) {
            for cell in &mut self.cells[..w] {
                cell.log2vis = UNSET;
            }
        }
        for v in 0..w {
            let log = self.cells[v].vis2log;
            self.cells[log].log2vis = v;
        }
        debug_assert!(
            self.cells[..w].iter().all(|c| c.log2vis != UNSET),
            "reordered row is not a bijection"
        );
    }

    /// Record a shaped glyph for logical column `log`. Needs a finished
    /// reordered layout.
    pub(crate) fn set_shaped(&mut self, log: usize, ch: char) {
        debug_assert_eq!(self.mapping, Mapping::Reordered);
        if log < self.width {
            let vis = self.cells[log].log2vis;
            self.cells[vis].shaped = Some(ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reordered(width: usize, vis2log: &[usize], rtl: bool) -> RowMap {
        let mut map = RowMap::with_capacity(4);
        map.set_width(width);
        map.begin_reorder(rtl);
        for (v, &l) in vis2log.iter().enumerate() {
            map.set_vis(v, l, rtl);
        }
        map.finish_reorder();
        map
    }

    #[test]
    fn storage_doubles_and_never_shrinks() {
        let mut map = RowMap::with_capacity(4);
        map.set_width(9);
        assert_eq!(map.capacity(), 16);
        map.set_width(2);
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.width(), 2);
    }

    #[test]
    fn identity_ltr_and_rtl() {
        let mut map = RowMap::default();
        map.set_width(10);
        map.set_identity(false);
        assert!((0..10).all(|c| map.log2vis(c) == c && map.vis2log(c) == c));
        map.set_identity(true);
        assert!((0..10).all(|c| map.log2vis(c) == 9 - c && map.vis2log(c) == 9 - c));
        assert!(map.vis_is_rtl(3));
        assert_eq!(map.vis_get_shaped_char(3), None);
    }

    #[test]
    fn out_of_range_columns_pass_through_or_mirror() {
        let ltr = reordered(4, &[1, 0, 2, 3], false);
        assert_eq!(ltr.log2vis(-1), -1);
        assert_eq!(ltr.log2vis(4), 4);
        assert_eq!(ltr.vis2log(7), 7);
        assert!(!ltr.vis_is_rtl(-3));

        let rtl = reordered(4, &[3, 2, 0, 1], true);
        assert_eq!(rtl.log2vis(-1), 4);
        assert_eq!(rtl.log2vis(4), -1);
        assert_eq!(rtl.vis2log(5), -2);
        assert!(rtl.log_is_rtl(-1));
    }

    #[test]
    fn log2vis_is_the_inverse() {
        let map = reordered(5, &[4, 3, 0, 1, 2], true);
        for c in 0..5 {
            assert_eq!(map.vis2log(map.log2vis(c)), c);
            assert_eq!(map.log2vis(map.vis2log(c)), c);
        }
    }

    #[test]
    fn log_is_rtl_follows_visual_cell() {
        let mut map = RowMap::with_capacity(4);
        map.set_width(3);
        map.begin_reorder(false);
        map.set_vis(0, 0, false);
        map.set_vis(1, 2, true);
        map.set_vis(2, 1, true);
        map.finish_reorder();
        assert!(!map.log_is_rtl(0));
        assert!(map.log_is_rtl(1));
        assert!(map.vis_is_rtl(2));
    }

    #[test]
    fn shaped_glyph_lands_on_visual_column() {
        let mut map = reordered(3, &[2, 1, 0], true);
        map.set_shaped(0, '\u{FE91}');
        assert_eq!(map.vis_get_shaped_char(2), Some('\u{FE91}'));
        assert_eq!(map.vis_get_shaped_char(0), None);
        assert_eq!(map.vis_get_shaped_char(3), None);
        map.begin_reorder(true);
        assert_eq!(map.vis_get_shaped_char(2), None, "cleared on rebuild");
    }

    #[test]
    #[should_panic(expected = "not a bijection")]
    #[cfg(debug_assertions)]
    fn duplicate_visual_entry_is_caught() {
        reordered(3, &[0, 0, 2], false);
    }
}
