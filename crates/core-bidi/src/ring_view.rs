//! Viewport coordinator: bidi row maps for the visible rows of a scrollback.
//!
//! The view covers rows `[start, start + len)` of a [`RowSource`] and keeps
//! one [`RowMap`] per visible row. `recompute` walks the viewport paragraph
//! by paragraph. A paragraph is a chain of soft-wrapped rows and may start
//! above the viewport or continue below it; those rows are read for context
//! but only visible rows get a map.
//!
//! Paragraph layout never fails. Explicit rows, an unavailable classifier,
//! classifier errors and overlong paragraphs all degrade to the explicit
//! identity layout in the paragraph's declared direction.

use crate::classifier::{BidiClassifier, ParagraphAnalysis, ParagraphBase, classifier_input};
use crate::row_map::{COLUMNS_BASELINE, RowMap};
use crate::shaping::shape_arabic;
use core_config::{
    BidiConfig, Config, DEFAULT_PARAGRAPH_LENGTH_MAX, ViewportConfig, clamp_paragraph_length,
};
use core_ring::{Row, RowSource};
use std::collections::TryReserveError;
use std::ops::Range;
use tracing::{debug, trace, warn};

/// Minimum number of row maps allocated up front.
pub const ROWS_BASELINE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingViewOptions {
    pub paragraph_length_max: usize,
    pub shaping: bool,
    pub reserve_rows: usize,
    pub reserve_columns: usize,
}

impl Default for RingViewOptions {
    fn default() -> Self {
        Self {
            paragraph_length_max: DEFAULT_PARAGRAPH_LENGTH_MAX,
            shaping: true,
            reserve_rows: ROWS_BASELINE,
            reserve_columns: COLUMNS_BASELINE,
        }
    }
}

impl From<&BidiConfig> for RingViewOptions {
    fn from(cfg: &BidiConfig) -> Self {
        Self {
            paragraph_length_max: cfg.paragraph_length_max.max(1),
            shaping: cfg.shaping,
            ..Self::default()
        }
    }
}

impl From<&Config> for RingViewOptions {
    fn from(cfg: &Config) -> Self {
        let ViewportConfig {
            reserve_rows,
            reserve_columns,
        } = cfg.file.viewport;
        Self {
            reserve_rows: reserve_rows.max(1),
            reserve_columns: reserve_columns.max(1),
            ..Self::from(&cfg.effective_bidi())
        }
    }
}

/// Work done by the last `recompute`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeStats {
    pub paragraphs: usize,
    /// Rows fetched from the source, context rows included.
    pub rows_read: usize,
    /// Paragraphs laid out explicitly although their rows asked for implicit mode.
    pub fallbacks: usize,
}

/// Buffer slot of one logical character: first column and column count.
#[derive(Debug, Clone, Copy)]
struct Unit {
    col: usize,
    cols: usize,
}

/// One row's slice of the paragraph buffer.
#[derive(Debug, Clone)]
struct LineSpan {
    chars: Range<usize>,
    /// Columns of the row that carry content, `min(row length, width)`.
    used: usize,
}

/// Flat paragraph text, reused across paragraphs and recomputes.
#[derive(Default)]
struct ParagraphBuffer {
    chars: Vec<char>,
    units: Vec<Unit>,
    lines: Vec<LineSpan>,
    text: String,
    levels: Vec<u8>,
    shaped: Vec<(usize, char)>,
}

impl ParagraphBuffer {
    /// Make room for a paragraph of `rows` rows of `width` columns. Buffers
    /// only ever grow; capacity already held is kept.
    fn reserve_bound(&mut self, rows: usize, width: usize) -> Result<(), TryReserveError> {
        let chars = rows.saturating_mul(width);
        self.clear();
        self.chars.try_reserve(chars)?;
        self.units.try_reserve(chars)?;
        self.lines.try_reserve(rows)?;
        self.text.try_reserve(chars)?;
        Ok(())
    }

    fn clear(&mut self) {
        self.chars.clear();
        self.units.clear();
        self.lines.clear();
        self.text.clear();
        self.levels.clear();
        self.shaped.clear();
    }

    /// Append the first `width` columns of `row`. Fragments extend their
    /// leader; a fragment whose leader is not in the row stands for a space.
    fn push_row(&mut self, row: &Row, width: usize) {
        let begin = self.chars.len();
        let used = row.len().min(width);
        let mut leader_seen = false;
        for (col, cell) in row.cells()[..used].iter().enumerate() {
            if cell.is_fragment() && leader_seen {
                if let Some(unit) = self.units.last_mut() {
                    unit.cols += 1;
                }
                continue;
            }
            let ch = if cell.is_fragment() {
                ' '
            } else {
                leader_seen = true;
                classifier_input(cell.base)
            };
            self.chars.push(ch);
            self.units.push(Unit { col, cols: 1 });
        }
        self.lines.push(LineSpan {
            chars: begin..self.chars.len(),
            used,
        });
    }

    fn rows(&self) -> usize {
        self.lines.len()
    }

    /// Shaped glyphs belonging to `chars`.
    fn shaped_in(&self, chars: &Range<usize>) -> &[(usize, char)] {
        let lo = self.shaped.partition_point(|(i, _)| *i < chars.start);
        let hi = self.shaped.partition_point(|(i, _)| *i < chars.end);
        &self.shaped[lo..hi]
    }
}

pub struct RingView {
    classifier: Box<dyn BidiClassifier>,
    maps: Vec<RowMap>,
    start: usize,
    len: usize,
    width: usize,
    reserve_columns: usize,
    /// Limit as configured.
    requested_length_max: usize,
    /// `requested_length_max` clamped to the char budget at the current width.
    paragraph_length_max: usize,
    shaping: bool,
    valid: bool,
    stats: RecomputeStats,
    buf: ParagraphBuffer,
}

impl Default for RingView {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RingView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingView")
            .field("classifier", &self.classifier.name())
            .field("start", &self.start)
            .field("len", &self.len)
            .field("width", &self.width)
            .field("valid", &self.valid)
            .finish()
    }
}

impl RingView {
    pub fn new() -> Self {
        Self::with_options(RingViewOptions::default(), crate::default_classifier())
    }

    pub fn with_options(opts: RingViewOptions, classifier: Box<dyn BidiClassifier>) -> Self {
        let reserve_columns = opts.reserve_columns.max(1);
        let maps = (0..opts.reserve_rows.max(1))
            .map(|_| RowMap::with_capacity(reserve_columns))
            .collect();
        Self {
            classifier,
            maps,
            start: 0,
            len: 0,
            width: 0,
            reserve_columns,
            requested_length_max: opts.paragraph_length_max,
            paragraph_length_max: clamp_paragraph_length(opts.paragraph_length_max, 0),
            shaping: opts.shaping,
            valid: false,
            stats: RecomputeStats::default(),
            buf: ParagraphBuffer::default(),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Row maps allocated; grows by doubling, never shrinks.
    pub fn capacity(&self) -> usize {
        self.maps.len()
    }

    pub fn classifier(&self) -> &dyn BidiClassifier {
        self.classifier.as_ref()
    }

    /// Effective paragraph length limit in rows. Never exceeds what the char
    /// budget allows at the current width.
    pub fn paragraph_length_max(&self) -> usize {
        self.paragraph_length_max
    }

    fn clamp_length_max(&mut self) {
        let clamped = clamp_paragraph_length(self.requested_length_max, self.width);
        if clamped != self.requested_length_max {
            debug!(
                target: "bidi.ringview",
                requested = self.requested_length_max,
                clamped,
                width = self.width,
                "paragraph_length_max_clamped"
            );
        }
        self.paragraph_length_max = clamped;
    }

    pub fn last_stats(&self) -> RecomputeStats {
        self.stats
    }

    pub fn set_width(&mut self, width: usize) {
        if width == self.width {
            return;
        }
        self.width = width;
        for map in &mut self.maps {
            map.set_width(width);
        }
        self.clamp_length_max();
        self.invalidate();
    }

    /// Select the visible rows. Grows the row maps but computes nothing.
    pub fn set_rows(&mut self, start: usize, len: usize) {
        if len > self.maps.len() {
            let mut alloc = self.maps.len();
            while alloc < len {
                alloc *= 2;
            }
            let (width, columns) = (self.width, self.reserve_columns);
            self.maps.resize_with(alloc, || {
                let mut map = RowMap::with_capacity(columns);
                map.set_width(width);
                map
            });
            trace!(target: "bidi.ringview", alloc, "row_maps_grown");
        }
        if (start, len) != (self.start, self.len) {
            self.start = start;
            self.len = len;
            self.invalidate();
        }
    }

    pub fn set_classifier(&mut self, classifier: Box<dyn BidiClassifier>) {
        self.classifier = classifier;
        self.invalidate();
    }

    pub fn set_enable_shaping(&mut self, shaping: bool) {
        if shaping != self.shaping {
            self.shaping = shaping;
            self.invalidate();
        }
    }

    pub fn set_paragraph_length_max(&mut self, max: usize) {
        if max != self.requested_length_max {
            self.requested_length_max = max;
            self.clamp_length_max();
            self.invalidate();
        }
    }

    /// Mark the maps stale, e.g. after the row source changed content.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Recompute only if something changed since the last pass.
    pub fn update(&mut self, source: &dyn RowSource) -> bool {
        if self.valid {
            return false;
        }
        self.recompute(source);
        true
    }

    /// Rebuild every visible row map from `source`.
    pub fn recompute(&mut self, source: &dyn RowSource) {
        self.stats = RecomputeStats::default();
        let end = self.start + self.len;
        let mut row = self.start;

        let implicit = self.read(source, row).is_some_and(|r| r.attr.bidi.is_implicit());
        if implicit {
            match self.find_paragraph(source, row) {
                Some(first) => row = first,
                None => {
                    debug!(
                        target: "bidi.paragraph",
                        row,
                        max = self.paragraph_length_max,
                        "paragraph_start_not_found"
                    );
                }
            }
        }

        let mut buf = std::mem::take(&mut self.buf);
        while row < end {
            row = self.paragraph(source, row, &mut buf);
            self.stats.paragraphs += 1;
        }
        self.buf = buf;
        self.valid = true;
        trace!(
            target: "bidi.ringview",
            start = self.start,
            len = self.len,
            width = self.width,
            paragraphs = self.stats.paragraphs,
            rows_read = self.stats.rows_read,
            fallbacks = self.stats.fallbacks,
            "recompute"
        );
    }

    fn read<'s>(&mut self, source: &'s dyn RowSource, row: usize) -> Option<&'s Row> {
        self.stats.rows_read += 1;
        source.row_at(row)
    }

    /// First row of the paragraph containing `row`, searching at most
    /// `paragraph_length_max` rows up. `None` when the bound runs out.
    fn find_paragraph(&mut self, source: &dyn RowSource, row: usize) -> Option<usize> {
        let mut first = row;
        for _ in 0..self.paragraph_length_max {
            if first <= source.first_row() {
                return Some(first);
            }
            match self.read(source, first - 1) {
                Some(above) if above.attr.soft_wrapped => first -= 1,
                _ => return Some(first),
            }
        }
        None
    }

    fn explicit_line(&mut self, row: usize, rtl: bool) {
        if let Some(map) = self.visible_map_mut(row) {
            map.set_identity(rtl);
        }
    }

    /// Identity layout for the chain starting at `row`; stops after the first
    /// non-wrapped or missing row, or at the viewport end.
    fn explicit_paragraph(&mut self, source: &dyn RowSource, row: usize, rtl: bool) -> usize {
        let end = self.start + self.len;
        let mut row = row;
        while row < end {
            self.explicit_line(row, rtl);
            let wrapped = self.read(source, row).is_some_and(|r| r.attr.soft_wrapped);
            row += 1;
            if !wrapped {
                break;
            }
        }
        row
    }

    fn visible_map_mut(&mut self, row: usize) -> Option<&mut RowMap> {
        let idx = row.checked_sub(self.start).filter(|&i| i < self.len)?;
        Some(&mut self.maps[idx])
    }

    /// Lay out the paragraph starting at `row`; returns the row after it.
    fn paragraph(
        &mut self,
        source: &dyn RowSource,
        row: usize,
        buf: &mut ParagraphBuffer,
    ) -> usize {
        let Some(first) = self.read(source, row) else {
            return self.explicit_paragraph(source, row, false);
        };
        let flags = first.attr.bidi;
        let declared_rtl = flags.is_rtl();
        let Some(base) = ParagraphBase::from_mode(flags.mode()) else {
            return self.explicit_paragraph(source, row, declared_rtl);
        };
        if !self.classifier.is_available() {
            self.stats.fallbacks += 1;
            return self.explicit_paragraph(source, row, declared_rtl);
        }

        if let Err(err) = buf.reserve_bound(self.paragraph_length_max, self.width) {
            warn!(
                target: "bidi.paragraph",
                row,
                error = %err,
                max = self.paragraph_length_max,
                "paragraph_buffer_reserve_failed"
            );
            self.stats.fallbacks += 1;
            return self.explicit_paragraph(source, row, declared_rtl);
        }
        let mut next = row;
        loop {
            let Some(data) = self.read(source, next) else {
                break;
            };
            if buf.rows() == self.paragraph_length_max {
                debug!(
                    target: "bidi.paragraph",
                    row,
                    max = self.paragraph_length_max,
                    "paragraph_overlong_fallback"
                );
                self.stats.fallbacks += 1;
                return self.explicit_paragraph(source, row, declared_rtl);
            }
            buf.push_row(data, self.width);
            next += 1;
            if !data.attr.soft_wrapped {
                break;
            }
        }

        if buf.chars.is_empty() {
            return self.explicit_paragraph(source, row, declared_rtl);
        }
        buf.text.extend(buf.chars.iter());

        let analysis = match self.classifier.analyze(&buf.text, base) {
            Ok(analysis) => analysis,
            Err(err) => {
                debug!(target: "bidi.paragraph", row, error = %err, "classify_failed_fallback");
                self.stats.fallbacks += 1;
                return self.explicit_paragraph(source, row, declared_rtl);
            }
        };
        let rtl = analysis.is_rtl();
        let single = analysis.is_single_direction();

        if self.shaping {
            buf.levels.extend((0..analysis.len()).map(|i| analysis.level(i)));
            if buf.levels.iter().any(|l| l % 2 == 1) {
                buf.shaped = shape_arabic(&buf.chars, &buf.levels);
            }
        }

        for (i, line) in buf.lines.iter().enumerate() {
            let Some(map) = self.visible_map_mut(row + i) else {
                continue;
            };
            let shaped = buf.shaped_in(&line.chars);
            if single {
                if shaped.is_empty() {
                    map.set_identity(rtl);
                } else {
                    map.fill_explicit(rtl);
                    for &(k, ch) in shaped {
                        map.set_shaped(buf.units[k].col, ch);
                    }
                }
                continue;
            }
            match reorder_row(map, analysis.as_ref(), line, &buf.units, rtl) {
                Ok(()) => {
                    for &(k, ch) in shaped {
                        map.set_shaped(buf.units[k].col, ch);
                    }
                }
                Err(err) => {
                    debug!(
                        target: "bidi.paragraph",
                        row = row + i,
                        error = %err,
                        "line_reorder_failed"
                    );
                    map.set_identity(rtl);
                }
            }
            map.set_has_foreign(true);
        }
        next
    }

    pub fn row_map(&self, row: usize) -> &RowMap {
        debug_assert!(
            row >= self.start && row < self.start + self.len,
            "row {row} outside viewport {}..{}",
            self.start,
            self.start + self.len
        );
        &self.maps[row.wrapping_sub(self.start)]
    }

    pub fn log2vis(&self, row: usize, col: isize) -> isize {
        self.row_map(row).log2vis(col)
    }

    pub fn vis2log(&self, row: usize, col: isize) -> isize {
        self.row_map(row).vis2log(col)
    }

    pub fn log_is_rtl(&self, row: usize, col: isize) -> bool {
        self.row_map(row).log_is_rtl(col)
    }

    pub fn vis_is_rtl(&self, row: usize, col: isize) -> bool {
        self.row_map(row).vis_is_rtl(col)
    }

    pub fn vis_get_shaped_char(&self, row: usize, col: isize) -> Option<char> {
        self.row_map(row).vis_get_shaped_char(col)
    }
}

/// Write the visual order of one row into `map`, re-inflating each character
/// to its columns (ascending at even levels, descending at odd ones) and
/// padding the unused columns on the paragraph's starting side.
fn reorder_row(
    map: &mut RowMap,
    analysis: &dyn ParagraphAnalysis,
    line: &LineSpan,
    units: &[Unit],
    rtl: bool,
) -> Result<(), crate::ClassifyError> {
    let order = analysis.reorder_line(line.chars.clone())?;
    let width = map.width();
    map.begin_reorder(rtl);
    let mut vis = 0;
    if rtl {
        for _ in line.used..width {
            map.set_vis(vis, width - 1 - vis, true);
            vis += 1;
        }
    }
    for &i in &order.visual {
        let unit = units[line.chars.start + i];
        let odd = order.levels[i] % 2 == 1;
        for c in 0..unit.cols {
            let log = if odd {
                unit.col + unit.cols - 1 - c
            } else {
                unit.col + c
            };
            map.set_vis(vis, log, odd);
            vis += 1;
        }
    }
    while vis < width {
        map.set_vis(vis, vis, false);
        vis += 1;
    }
    map.finish_reorder();
    Ok(())
}
