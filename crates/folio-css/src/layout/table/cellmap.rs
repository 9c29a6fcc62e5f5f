//! The table grid.
//!
//! [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
//!
//! "Each cell is thus a rectangular box, one or more grid cells wide and
//! high." The [`Cellmap`] records which box occupies each grid slot, the
//! width statistics of every column, the height and offset of every row
//! and, in the collapsing border model, the border that won each grid edge.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::error::LayoutError;
use crate::layout::box_tree::BoxId;
use crate::style::values::{BorderStyle, ColorValue, Sides};

/// Differences below this are treated as rounding noise.
const EPSILON: f32 = 0.01;

/// Width statistics and used width of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Left edge, once the table is positioned.
    pub x: f32,
    /// Narrowest width the cells of the column fit in.
    pub min_width: f32,
    /// Width the cells want without wrapping.
    pub max_width: f32,
    /// Width assigned by [`Cellmap::distribute`].
    pub used_width: f32,
    /// Declared absolute width, or zero.
    pub absolute: f32,
    /// Declared percentage of the table width, or zero.
    pub percent: f32,
    /// No cell of the column declared a width.
    pub auto: bool,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            x: 0.0,
            min_width: 0.0,
            max_width: 0.0,
            used_width: 0.0,
            absolute: 0.0,
            percent: 0.0,
            auto: true,
        }
    }
}

/// Height and offset of one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Row {
    /// Top edge.
    pub y: f32,
    /// Height, once a cell of the row was laid out.
    pub height: Option<f32>,
}

/// Orientation of a grid edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Edge {
    /// Edge along the top of grid slot `(row, col)`.
    Horizontal,
    /// Edge along the left of grid slot `(row, col)`.
    Vertical,
}

/// A border taking part in conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BorderSpec {
    /// Used width in points.
    pub width: f32,
    /// Style.
    pub style: BorderStyle,
    /// Color.
    pub color: ColorValue,
}

impl BorderSpec {
    /// An absent border.
    pub const NONE: Self = Self {
        width: 0.0,
        style: BorderStyle::None,
        color: ColorValue::BLACK,
    };
}

/// [§ 17.6.2.1 Border conflict resolution](https://www.w3.org/TR/CSS2/tables.html#border-conflict-resolution)
///
/// Whether `new` replaces `old` on a shared edge.
///
/// "Borders with the 'border-style' of 'hidden' take precedence over all
/// other conflicting borders." "Borders with a style of 'none' have the
/// lowest priority." "If none of the styles are 'hidden' and at least one
/// of them is not 'none', then narrow borders are discarded in favor of
/// wider ones. If several have the same 'border-width' then styles are
/// preferred in this order..."
#[must_use]
pub fn border_wins(new: &BorderSpec, old: &BorderSpec) -> bool {
    match (new.style, old.style) {
        (_, BorderStyle::Hidden) => false,
        (BorderStyle::Hidden, _) => true,
        (BorderStyle::None, _) => false,
        (_, BorderStyle::None) => true,
        _ if new.width != old.width => new.width > old.width,
        _ => new.style.collapse_rank() > old.style.collapse_rank(),
    }
}

/// Grid slots covered by a cell, row or row group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Row indices, ascending.
    pub rows: Vec<usize>,
    /// Column indices, ascending.
    pub columns: Vec<usize>,
}

/// Declared width of a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeclaredWidth {
    /// `auto`.
    Auto,
    /// An absolute width, spread over the spanned columns.
    Absolute(f32),
    /// A percentage of the table width, spread over the spanned columns.
    Percent(f32),
}

/// Column totals used by width distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColumnTotals {
    /// Sum of minimum widths.
    pub min: f32,
    /// Sum of maximum widths.
    pub max: f32,
    /// Sum of the minimum widths of absolute columns.
    pub absolute: f32,
    /// Sum of percentages.
    pub percent: f32,
    /// Sum of the minimum widths of auto columns.
    pub auto_min: f32,
    /// Number of absolute columns.
    pub absolute_count: usize,
    /// Number of percentage columns.
    pub percent_count: usize,
    /// Number of auto columns.
    pub auto_count: usize,
}

/// Slot assignment and sizing state of one table.
#[derive(Debug, Clone, Default)]
pub struct Cellmap {
    num_rows: usize,
    num_cols: usize,
    row_cursor: usize,
    col_cursor: usize,
    cells: BTreeMap<(usize, usize), BoxId>,
    columns: Vec<Column>,
    rows: BTreeMap<usize, Row>,
    borders: HashMap<(usize, usize, Edge), BorderSpec>,
    frames: BTreeMap<BoxId, Span>,
    columns_locked: bool,
    fixed_layout: bool,
}

impl Cellmap {
    /// An empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A grid for the continuation of a split table. Column widths are
    /// copied and never change again, so the table keeps its shape on
    /// every page.
    #[must_use]
    pub fn with_locked_columns(columns: Vec<Column>, fixed_layout: bool) -> Self {
        Self {
            columns,
            columns_locked: true,
            fixed_layout,
            ..Self::default()
        }
    }

    /// Forget every registration. Locked column widths survive.
    pub fn reset(&mut self) {
        let columns = if self.columns_locked {
            std::mem::take(&mut self.columns)
        } else {
            Vec::new()
        };
        *self = Self {
            columns,
            columns_locked: self.columns_locked,
            fixed_layout: self.fixed_layout,
            ..Self::default()
        };
    }

    /// Whether cells were registered since the last reset.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Whether column widths are frozen.
    #[must_use]
    pub const fn columns_locked(&self) -> bool {
        self.columns_locked
    }

    /// Freeze column widths.
    pub const fn lock_columns(&mut self) {
        self.columns_locked = true;
    }

    /// `table-layout: fixed`.
    #[must_use]
    pub const fn is_fixed_layout(&self) -> bool {
        self.fixed_layout
    }

    /// Switch the fixed layout algorithm on or off.
    pub const fn set_fixed_layout(&mut self, fixed: bool) {
        self.fixed_layout = fixed;
    }

    /// Number of rows.
    #[must_use]
    pub const fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Row the next cell goes into.
    #[must_use]
    pub const fn row_cursor(&self) -> usize {
        self.row_cursor
    }

    /// All columns.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// One column; missing columns are created empty.
    pub fn column_mut(&mut self, index: usize) -> &mut Column {
        if index >= self.columns.len() {
            self.columns.resize_with(index + 1, Column::default);
        }
        &mut self.columns[index]
    }

    /// One row, if it was registered.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(&index)
    }

    /// One row; missing rows are created empty.
    pub fn row_mut(&mut self, index: usize) -> &mut Row {
        self.rows.entry(index).or_default()
    }

    /// Registered rows in order.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &Row)> + '_ {
        self.rows.iter().map(|(&i, r)| (i, r))
    }

    /// Box occupying a grid slot.
    #[must_use]
    pub fn cell_at(&self, row: usize, col: usize) -> Option<BoxId> {
        self.cells.get(&(row, col)).copied()
    }

    /// Registered boxes and the slots they cover.
    pub fn frames(&self) -> impl Iterator<Item = (BoxId, &Span)> + '_ {
        self.frames.iter().map(|(&id, span)| (id, span))
    }

    /// Whether a box was registered.
    #[must_use]
    pub fn contains(&self, id: BoxId) -> bool {
        self.frames.contains_key(&id)
    }

    /// [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
    ///
    /// Place a cell at the first free slot of the current row, at or after
    /// the column cursor, and claim `rowspan × colspan` slots. Slots held by
    /// a row-spanning cell of an earlier row are skipped. Returns the
    /// cell's top-left slot.
    pub fn place_cell(&mut self, id: BoxId, rowspan: usize, colspan: usize) -> (usize, usize) {
        let rowspan = rowspan.max(1);
        let colspan = colspan.max(1);
        let row = self.row_cursor;
        let mut col = self.col_cursor;
        while self.cells.contains_key(&(row, col)) {
            col += 1;
        }

        let rows: Vec<usize> = (row..row + rowspan).collect();
        let columns: Vec<usize> = (col..col + colspan).collect();
        for &r in &rows {
            for &c in &columns {
                let _ = self.cells.insert((r, c), id);
            }
            let _ = self.row_mut(r);
        }
        let _ = self.column_mut(col + colspan - 1);
        let _ = self.frames.insert(id, Span { rows, columns });

        self.num_cols = self.num_cols.max(col + colspan);
        self.num_rows = self.num_rows.max(row + rowspan);
        self.col_cursor = col + colspan;
        (row, col)
    }

    /// Close the current row.
    pub fn add_row(&mut self) {
        self.row_cursor += 1;
        self.num_rows = self.num_rows.max(self.row_cursor);
        let _ = self.row_mut(self.row_cursor.saturating_sub(1));
        self.col_cursor = 0;
    }

    /// Register a row or row group covering `rows`. Its column list stays
    /// empty, meaning every column.
    pub fn register_frame(&mut self, id: BoxId, rows: Vec<usize>) {
        let _ = self.frames.insert(
            id,
            Span {
                rows,
                columns: Vec::new(),
            },
        );
    }

    /// Slots covered by a registered box.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotInCellmap`] for unregistered boxes.
    pub fn spanned(&self, id: BoxId) -> Result<&Span, LayoutError> {
        self.frames.get(&id).ok_or(LayoutError::NotInCellmap(id))
    }

    /// Grow the columns spanned by a cell to hold its minimum and maximum
    /// widths, spreading any shortfall evenly, and record its declared width.
    pub fn grow_columns(
        &mut self,
        first: usize,
        span: usize,
        min: f32,
        max: f32,
        declared: DeclaredWidth,
    ) {
        if self.columns_locked {
            return;
        }
        let span = span.max(1);
        let count = span as f32;
        let columns = first..first + span;

        match declared {
            DeclaredWidth::Auto => {}
            DeclaredWidth::Absolute(width) => {
                let share = width / count;
                for c in columns.clone() {
                    let column = self.column_mut(c);
                    column.absolute = column.absolute.max(share);
                    column.auto = false;
                }
            }
            DeclaredWidth::Percent(percent) => {
                let share = percent / count;
                for c in columns.clone() {
                    let column = self.column_mut(c);
                    column.percent = column.percent.max(share);
                    column.auto = false;
                }
            }
        }

        let (have_min, have_max) = columns.clone().fold((0.0, 0.0), |(lo, hi), c| {
            let column = self.column_mut(c);
            (lo + column.min_width, hi + column.max_width)
        });
        let extra_min = (min - have_min).max(0.0) / count;
        let extra_max = (max - have_max).max(0.0) / count;
        for c in columns {
            let column = self.column_mut(c);
            column.min_width += extra_min;
            column.max_width = (column.max_width + extra_max).max(column.min_width);
        }
    }

    /// Resolve `spec` against the edge already stored at `(row, col, edge)`
    /// and return the width of the winner.
    pub fn resolve_border(&mut self, row: usize, col: usize, edge: Edge, spec: BorderSpec) -> f32 {
        let slot = self.borders.entry((row, col, edge)).or_insert(spec);
        if border_wins(&spec, slot) {
            *slot = spec;
        }
        if slot.style.is_invisible() {
            0.0
        } else {
            slot.width
        }
    }

    /// Winning border of one grid edge.
    #[must_use]
    pub fn border(&self, row: usize, col: usize, edge: Edge) -> BorderSpec {
        self.borders
            .get(&(row, col, edge))
            .copied()
            .unwrap_or(BorderSpec::NONE)
    }

    /// The four edges around grid slot `(row, col)`.
    #[must_use]
    pub fn border_properties(&self, row: usize, col: usize) -> Sides<BorderSpec> {
        Sides {
            top: self.border(row, col, Edge::Horizontal),
            right: self.border(row, col + 1, Edge::Vertical),
            bottom: self.border(row + 1, col, Edge::Horizontal),
            left: self.border(row, col, Edge::Vertical),
        }
    }

    /// Top-left corner of a registered box.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotInCellmap`] for unregistered boxes.
    pub fn frame_position(&self, id: BoxId) -> Result<(f32, f32), LayoutError> {
        let span = self.spanned(id)?;
        let x = self
            .columns
            .get(span.columns.first().copied().unwrap_or(0))
            .map_or(0.0, |c| c.x);
        let y = span
            .rows
            .first()
            .and_then(|r| self.rows.get(r))
            .map_or(0.0, |r| r.y);
        Ok((x, y))
    }

    /// Sum of the used widths of the box's columns.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotInCellmap`] for unregistered boxes.
    pub fn frame_width(&self, id: BoxId) -> Result<f32, LayoutError> {
        let span = self.spanned(id)?;
        if span.columns.is_empty() {
            return Ok(self.columns.iter().map(|c| c.used_width).sum());
        }
        Ok(span
            .columns
            .iter()
            .filter_map(|&c| self.columns.get(c))
            .map(|c| c.used_width)
            .sum())
    }

    /// Sum of the heights of the box's rows.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotInCellmap`] for unregistered boxes.
    pub fn frame_height(&self, id: BoxId) -> Result<f32, LayoutError> {
        let span = self.spanned(id)?;
        Ok(span
            .rows
            .iter()
            .filter_map(|r| self.rows.get(r))
            .filter_map(|r| r.height)
            .sum())
    }

    /// Set a column's used width, unless widths are locked.
    pub fn set_column_width(&mut self, col: usize, width: f32) {
        if self.columns_locked {
            return;
        }
        self.column_mut(col).used_width = width;
    }

    /// Grow a row to at least `height` and move the rows below it.
    pub fn set_row_height(&mut self, row: usize, height: f32) {
        let r = self.row_mut(row);
        r.height = Some(r.height.map_or(height, |h| h.max(height)));
        self.restack_rows_from(row);
    }

    /// Scale every row height by `factor` and restack.
    pub fn scale_row_heights(&mut self, factor: f32) {
        for row in self.rows.values_mut() {
            row.height = row.height.map(|h| h * factor);
        }
        if let Some(&first) = self.rows.keys().next() {
            self.restack_rows_from(first);
        }
    }

    /// Sum of all known row heights.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.rows.values().filter_map(|r| r.height).sum()
    }

    fn restack_rows_from(&mut self, row: usize) {
        let Some(start) = self.rows.get(&row) else {
            return;
        };
        let mut y = start.y + start.height.unwrap_or(0.0);
        for (_, r) in self.rows.range_mut(row + 1..) {
            r.y = y;
            y += r.height.unwrap_or(0.0);
        }
    }

    /// Set the top edge of the first row and restack.
    pub fn set_top(&mut self, y: f32) {
        let Some(&first) = self.rows.keys().next() else {
            return;
        };
        self.row_mut(first).y = y;
        self.restack_rows_from(first);
    }

    /// Lay the columns out left to right from `x`.
    pub fn assign_x_positions(&mut self, x: f32) {
        let mut x = x;
        for column in &mut self.columns {
            column.x = x;
            x += column.used_width;
        }
    }

    /// Forget a row and the cells that only live in it. Cells spanning
    /// other rows shrink.
    pub fn remove_row(&mut self, row_box: BoxId) {
        let Some(span) = self.frames.remove(&row_box) else {
            return;
        };
        let removed: BTreeSet<usize> = span.rows.into_iter().collect();
        for &r in &removed {
            let _ = self.rows.remove(&r);
        }
        self.cells.retain(|(r, _), _| !removed.contains(r));
        for span in self.frames.values_mut() {
            span.rows.retain(|r| !removed.contains(r));
        }
        self.frames.retain(|_, span| !span.rows.is_empty());
        self.num_rows = self.rows.keys().next_back().map_or(0, |&r| r + 1);
    }

    /// Forget a row group and all of its rows.
    pub fn remove_frame(&mut self, id: BoxId) {
        self.remove_row(id);
    }

    /// Totals over all columns.
    #[must_use]
    pub fn totals(&self) -> ColumnTotals {
        let mut totals = ColumnTotals::default();
        for column in &self.columns {
            totals.min += column.min_width;
            totals.max += column.max_width;
            if column.absolute > 0.0 {
                totals.absolute += column.min_width;
                totals.absolute_count += 1;
            } else if column.percent > 0.0 {
                totals.percent += column.percent;
                totals.percent_count += 1;
            } else {
                totals.auto_min += column.min_width;
                totals.auto_count += 1;
            }
        }
        totals
    }

    /// [§ 17.5.2 Table width algorithms](https://www.w3.org/TR/CSS2/tables.html#width-layout)
    ///
    /// Share `width` out among the columns.
    ///
    /// - At least the sum of the maxima and no declared widths: every
    ///   column gets its maximum plus a share of the extra space
    ///   proportional to that maximum.
    /// - Absolute widths only: absolute columns get their minimum, auto
    ///   columns split the rest equally.
    /// - Percentages only: percentages are scaled to 100% when they exceed
    ///   it or no auto column remains, and are bounded by the space left;
    ///   auto columns split the rest.
    /// - Both: absolute columns get their minimum, percentages apply to
    ///   what remains and auto columns split what is left after that.
    ///
    /// Below the sum of the minima every column gets its minimum. A final
    /// pass spreads rounding and leftovers so the used widths add up to
    /// `width` whenever that is at least the sum of the minima.
    pub fn distribute(&mut self, width: f32) {
        if self.columns_locked || self.columns.is_empty() {
            return;
        }
        let totals = self.totals();

        if (width - totals.max).abs() < EPSILON {
            for column in &mut self.columns {
                column.used_width = column.max_width;
            }
            return;
        }
        if width <= totals.min {
            for column in &mut self.columns {
                column.used_width = column.min_width;
            }
            return;
        }

        let has_absolute = totals.absolute_count > 0;
        let has_percent = totals.percent_count > 0;
        match (has_absolute, has_percent) {
            (false, false) => self.distribute_auto(width, &totals),
            (true, false) => self.distribute_absolute(width, &totals),
            (false, true) => self.distribute_percent(width, &totals),
            (true, true) => self.distribute_mixed(width, &totals),
        }
        self.reconcile(width);
    }

    fn distribute_auto(&mut self, width: f32, totals: &ColumnTotals) {
        if width > totals.max && totals.max > 0.0 {
            let increment = width - totals.max;
            for column in &mut self.columns {
                column.used_width = column.max_width + increment * column.max_width / totals.max;
            }
        } else {
            // Between the minima and the maxima: interpolate.
            let range = totals.max - totals.min;
            let t = if range > 0.0 { (width - totals.min) / range } else { 0.0 };
            for column in &mut self.columns {
                column.used_width = column.min_width + t * (column.max_width - column.min_width);
            }
        }
    }

    fn distribute_absolute(&mut self, width: f32, totals: &ColumnTotals) {
        let remaining = width - totals.absolute;
        let auto_share = if totals.auto_count > 0 {
            remaining / totals.auto_count as f32
        } else {
            0.0
        };
        for column in &mut self.columns {
            column.used_width = if column.absolute > 0.0 {
                column.min_width
            } else {
                auto_share.max(column.min_width)
            };
        }
    }

    fn distribute_percent(&mut self, width: f32, totals: &ColumnTotals) {
        let scale = if totals.percent > 100.0 || totals.auto_count == 0 {
            100.0 / totals.percent
        } else {
            1.0
        };
        let mut slack = width - totals.auto_min;
        let mut used = 0.0;
        for column in &mut self.columns {
            if column.percent > 0.0 {
                let share = (column.percent * scale * width / 100.0).min(slack.max(0.0));
                column.used_width = share.max(column.min_width);
                slack -= column.used_width;
                used += column.used_width;
            }
        }
        let auto_share = if totals.auto_count > 0 {
            (width - used) / totals.auto_count as f32
        } else {
            0.0
        };
        for column in &mut self.columns {
            if column.percent <= 0.0 {
                column.used_width = auto_share.max(column.min_width);
            }
        }
    }

    fn distribute_mixed(&mut self, width: f32, totals: &ColumnTotals) {
        let remaining = width - totals.absolute;
        let scale = if totals.percent > 100.0 { 100.0 / totals.percent } else { 1.0 };
        let mut slack = remaining - totals.auto_min;
        let mut used = totals.absolute;
        for column in &mut self.columns {
            if column.absolute > 0.0 {
                column.used_width = column.min_width;
            } else if column.percent > 0.0 {
                let share = (column.percent * scale * remaining / 100.0).min(slack.max(0.0));
                column.used_width = share.max(column.min_width);
                slack -= column.used_width;
                used += column.used_width;
            }
        }
        let auto_share = if totals.auto_count > 0 {
            (width - used) / totals.auto_count as f32
        } else {
            0.0
        };
        for column in &mut self.columns {
            if column.absolute <= 0.0 && column.percent <= 0.0 {
                column.used_width = auto_share.max(column.min_width);
            }
        }
    }

    /// Make the used widths add up to `width`: surplus goes to auto
    /// columns (all columns when there are none) in proportion to their
    /// maxima, a deficit is taken from the room above each column's
    /// minimum.
    fn reconcile(&mut self, width: f32) {
        let total: f32 = self.columns.iter().map(|c| c.used_width).sum();
        let residual = width - total;
        if residual.abs() <= EPSILON {
            return;
        }

        if residual > 0.0 {
            let any_auto = self.columns.iter().any(|c| c.auto);
            let targets: Vec<usize> = (0..self.columns.len())
                .filter(|&i| !any_auto || self.columns[i].auto)
                .collect();
            let weight: f32 = targets.iter().map(|&i| self.columns[i].max_width).sum();
            let count = targets.len() as f32;
            for &i in &targets {
                let share = if weight > 0.0 {
                    self.columns[i].max_width / weight
                } else {
                    1.0 / count
                };
                self.columns[i].used_width += residual * share;
            }
        } else {
            let room: f32 = self
                .columns
                .iter()
                .map(|c| (c.used_width - c.min_width).max(0.0))
                .sum();
            if room <= 0.0 {
                return;
            }
            let scale = (-residual).min(room) / room;
            for column in &mut self.columns {
                let above = (column.used_width - column.min_width).max(0.0);
                column.used_width -= above * scale;
            }
        }
    }
}
