//! Table structure, cell registration and grid geometry.
//!
//! [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! A table is laid out in two passes. The first ([`LayoutContext::ensure_cellmap`])
//! repairs the box structure, places every cell in the [`Cellmap`] and
//! collects per-column width statistics; it also runs when an ancestor asks
//! for the table's minimum and maximum widths. The second, in the table
//! reflower, shares the table width out among the columns, lays out the rows
//! and finally sizes every row, cell and row group from the grid.

mod cellmap;

pub use cellmap::{
    BorderSpec, Cellmap, Column, ColumnTotals, DeclaredWidth, Edge, Row, Span, border_wins,
};

use super::box_model::Point;
use super::box_tree::{BoxId, ContainingBlock, LayoutBox, LayoutKind};
use super::context::LayoutContext;
use super::line::LineBox;
use crate::error::LayoutError;
use crate::style::Style;
use crate::style::values::{
    AutoLength, BorderCollapse, BorderSide, DisplayValue, LengthValue, Side, Sides, TableLayout,
    VerticalAlign,
};

impl LayoutContext<'_> {
    /// The grid of a table.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidTree`] when the box has no grid yet.
    pub fn cellmap(&self, table: BoxId) -> Result<&Cellmap, LayoutError> {
        self.tree
            .get(table)?
            .cellmap
            .as_deref()
            .ok_or_else(|| LayoutError::InvalidTree(format!("table {table} has no cellmap")))
    }

    fn cellmap_mut(&mut self, table: BoxId) -> &mut Cellmap {
        self.tree[table].cellmap.get_or_insert_with(Box::default)
    }

    /// Whether the table collapses borders.
    #[must_use]
    pub fn is_collapsed(&self, table: BoxId) -> bool {
        self.tree[table].original_style.border_collapse == BorderCollapse::Collapse
    }

    /// Header row groups, repeated at the top of every continuation.
    #[must_use]
    pub fn header_groups(&self, table: BoxId) -> Vec<BoxId> {
        self.tree
            .children(table)
            .into_iter()
            .filter(|&c| {
                let b = &self.tree[c];
                b.kind == LayoutKind::TableRowGroup
                    && b.style.display == DisplayValue::TableHeaderGroup
            })
            .collect()
    }

    /// Captions of a table, laid out above the grid.
    #[must_use]
    pub fn captions(&self, table: BoxId) -> Vec<BoxId> {
        self.tree
            .children(table)
            .into_iter()
            .filter(|&c| self.is_caption(c))
            .collect()
    }

    fn is_caption(&self, id: BoxId) -> bool {
        self.tree[id].style.display == DisplayValue::TableCaption
    }

    /// [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
    ///
    /// "If a child C of a 'table' or 'inline-table' box is not a proper table
    /// child, then generate an anonymous 'table-row' box around C and all
    /// consecutive siblings of C that are not proper table children."
    ///
    /// Runs of stray cells in a table become anonymous rows, runs of
    /// anything else in a row become anonymous cells. Content that cannot
    /// live in a table at all moves after it.
    ///
    /// # Errors
    ///
    /// Structural errors from the tree edits.
    pub fn normalise_table(&mut self, table: BoxId) -> Result<(), LayoutError> {
        let mut anonymous_row: Option<BoxId> = None;
        let mut misplaced = Vec::new();

        for child in self.tree.children(table) {
            if self.tree[child].is_out_of_flow() {
                misplaced.push(child);
                continue;
            }
            match self.tree[child].kind {
                LayoutKind::TableRow => {
                    anonymous_row = None;
                    self.normalise_row(child)?;
                }
                LayoutKind::TableRowGroup => {
                    anonymous_row = None;
                    self.normalise_group(child)?;
                }
                _ if self.is_caption(child) => anonymous_row = None,
                LayoutKind::TableCell => {
                    let row = match anonymous_row {
                        Some(row) => row,
                        None => {
                            let row = self.anonymous_table_box(table, LayoutKind::TableRow)?;
                            self.tree.insert_before(table, row, child, true)?;
                            anonymous_row = Some(row);
                            row
                        }
                    };
                    self.tree.remove_child(table, child, true)?;
                    self.tree.append_child(row, child, true)?;
                }
                _ => misplaced.push(child),
            }
        }

        if misplaced.is_empty() {
            return Ok(());
        }
        let Some(parent) = self.tree.parent(table) else {
            return Ok(());
        };
        for &child in misplaced.iter().rev() {
            self.tree.remove_child(table, child, true)?;
            self.tree.insert_after(parent, child, table, true)?;
        }
        log::debug!("moved {} stray boxes out of table {table}", misplaced.len());
        Ok(())
    }

    fn normalise_group(&mut self, group: BoxId) -> Result<(), LayoutError> {
        let mut anonymous_row: Option<BoxId> = None;
        for child in self.tree.children(group) {
            if self.tree[child].kind == LayoutKind::TableRow {
                anonymous_row = None;
                self.normalise_row(child)?;
                continue;
            }
            let row = match anonymous_row {
                Some(row) => row,
                None => {
                    let row = self.anonymous_table_box(group, LayoutKind::TableRow)?;
                    self.tree.insert_before(group, row, child, true)?;
                    anonymous_row = Some(row);
                    row
                }
            };
            self.tree.remove_child(group, child, true)?;
            self.tree.append_child(row, child, true)?;
        }
        for row in self.tree.children(group) {
            self.normalise_row(row)?;
        }
        Ok(())
    }

    fn normalise_row(&mut self, row: BoxId) -> Result<(), LayoutError> {
        let mut anonymous_cell: Option<BoxId> = None;
        for child in self.tree.children(row) {
            if self.tree[child].kind == LayoutKind::TableCell {
                anonymous_cell = None;
                continue;
            }
            let cell = match anonymous_cell {
                Some(cell) => cell,
                None => {
                    let cell = self.anonymous_table_box(row, LayoutKind::TableCell)?;
                    self.tree.insert_before(row, cell, child, true)?;
                    anonymous_cell = Some(cell);
                    cell
                }
            };
            self.tree.remove_child(row, child, true)?;
            self.tree.append_child(cell, child, true)?;
        }
        Ok(())
    }

    fn anonymous_table_box(&mut self, parent: BoxId, kind: LayoutKind) -> Result<BoxId, LayoutError> {
        let (tag, display) = match kind {
            LayoutKind::TableRow => ("tr", DisplayValue::TableRow),
            LayoutKind::TableCell => ("td", DisplayValue::TableCell),
            _ => {
                return Err(LayoutError::InvalidTree(format!(
                    "no anonymous table box of kind {kind:?}"
                )));
            }
        };
        let mut style = Style::anonymous(&self.tree.get(parent)?.style);
        style.display = display;
        let node = self.tree.dom_mut().create_element(tag);
        Ok(self.tree.alloc(LayoutBox::new(node, kind, style)))
    }

    /// Normalise the table and register its cells, unless that already
    /// happened since the last reset.
    ///
    /// # Errors
    ///
    /// Structural errors.
    pub fn ensure_cellmap(&mut self, table: BoxId) -> Result<(), LayoutError> {
        if self.tree.get(table)?.cellmap.as_deref().is_some_and(Cellmap::is_populated) {
            return Ok(());
        }
        self.normalise_table(table)?;
        let fixed = self.tree[table].style.table_layout == TableLayout::Fixed;
        let collapse = self.is_collapsed(table);
        {
            let map = self.cellmap_mut(table);
            map.reset();
            map.set_fixed_layout(fixed);
        }
        let mut cells = Vec::new();
        self.register_part(table, table, collapse, &mut cells)?;
        for &cell in &cells {
            if collapse {
                self.apply_collapsed_borders(table, cell)?;
            }
            self.measure_cell(table, cell)?;
        }
        let map = self.cellmap(table)?;
        log::trace!(
            "table {table}: {} rows, {} columns",
            map.num_rows(),
            map.num_cols()
        );
        Ok(())
    }

    /// [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
    ///
    /// Places every cell in the grid and resolves border conflicts. The
    /// cells are collected in `cells`, in document order.
    fn register_part(
        &mut self,
        table: BoxId,
        id: BoxId,
        collapse: bool,
        cells: &mut Vec<BoxId>,
    ) -> Result<(), LayoutError> {
        let kind = self.tree[id].kind;
        if kind == LayoutKind::TableCell {
            self.register_cell(table, id, collapse);
            cells.push(id);
            return Ok(());
        }

        let start = self.cellmap_mut(table).row_cursor();
        for child in self.tree.children(id) {
            let c = &self.tree[child];
            if c.is_out_of_flow() || self.is_caption(child) {
                continue;
            }
            if matches!(
                c.kind,
                LayoutKind::TableRowGroup | LayoutKind::TableRow | LayoutKind::TableCell
            ) {
                self.register_part(table, child, collapse, cells)?;
            }
        }
        if kind == LayoutKind::TableRow {
            self.cellmap_mut(table).add_row();
        }
        let end = self.cellmap_mut(table).row_cursor();

        if kind != LayoutKind::Table && end > start {
            self.cellmap_mut(table).register_frame(id, (start..end).collect());
        }
        if collapse && kind != LayoutKind::TableRow && end > start {
            self.resolve_perimeter(table, id, start, end);
        }
        Ok(())
    }

    /// Row groups and the table itself take part in border conflicts along
    /// their outer edges.
    fn resolve_perimeter(&mut self, table: BoxId, id: BoxId, start: usize, end: usize) {
        let style = self.tree[id].style.clone();
        let spec = |side: Side| border_spec(&style, side);
        let map = self.cellmap_mut(table);
        let cols = map.num_cols();
        for row in start..end {
            let _ = map.resolve_border(row, 0, Edge::Vertical, spec(Side::Left));
            let _ = map.resolve_border(row, cols, Edge::Vertical, spec(Side::Right));
        }
        for col in 0..cols {
            let _ = map.resolve_border(start, col, Edge::Horizontal, spec(Side::Top));
            let _ = map.resolve_border(end, col, Edge::Horizontal, spec(Side::Bottom));
        }
    }

    fn register_cell(&mut self, table: BoxId, cell: BoxId, collapse: bool) {
        let node = self.tree[cell].node;
        let span_attribute = |name: &str| -> usize {
            self.tree
                .dom()
                .get_attribute(node, name)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(1)
                .max(1)
        };
        let rowspan = span_attribute("rowspan");
        let colspan = span_attribute("colspan");
        let (row, col) = self.cellmap_mut(table).place_cell(cell, rowspan, colspan);

        if collapse {
            self.resolve_cell_borders(table, cell, row, col, rowspan, colspan);
        } else {
            let (h, v) = self.tree[table].style.border_spacing_pt();
            self.tree[cell].style.margin = Sides {
                top: AutoLength::pt(v / 2.0),
                right: AutoLength::pt(h / 2.0),
                bottom: AutoLength::pt(v / 2.0),
                left: AutoLength::pt(h / 2.0),
            };
        }
    }

    /// Grow the columns of a registered cell to its minimum and maximum
    /// widths.
    fn measure_cell(&mut self, table: BoxId, cell: BoxId) -> Result<(), LayoutError> {
        if self.cellmap_mut(table).columns_locked() {
            return Ok(());
        }
        let span = self.cellmap(table)?.spanned(cell)?;
        let (col, colspan) = (span.columns.first().copied().unwrap_or(0), span.columns.len());
        let fixed = self.cellmap_mut(table).is_fixed_layout();
        let style = self.tree[cell].style.clone();
        let declared = match style.width {
            AutoLength::Length(LengthValue::Percent(p)) => DeclaredWidth::Percent(p),
            AutoLength::Length(l) => {
                DeclaredWidth::Absolute(style.to_pt(l, None) + self.tree[cell].horizontal_edges())
            }
            _ => DeclaredWidth::Auto,
        };
        let (min, max) = if fixed {
            match declared {
                DeclaredWidth::Absolute(w) => (w, w),
                _ => (0.0, 0.0),
            }
        } else {
            self.min_max_width(cell)?
        };
        let declared = match declared {
            DeclaredWidth::Absolute(_) => DeclaredWidth::Absolute(min),
            other => other,
        };
        self.cellmap_mut(table).grow_columns(col, colspan, min, max, declared);
        Ok(())
    }

    /// [§ 17.6.2.1 Border conflict resolution](https://www.w3.org/TR/CSS2/tables.html#border-conflict-resolution)
    ///
    /// Offer the cell's four sides to the grid edges it touches.
    fn resolve_cell_borders(
        &mut self,
        table: BoxId,
        cell: BoxId,
        row: usize,
        col: usize,
        rowspan: usize,
        colspan: usize,
    ) {
        let style = self.tree[cell].style.clone();
        let spec = |side: Side| border_spec(&style, side);
        let map = self.cellmap_mut(table);
        for i in 0..rowspan {
            let _ = map.resolve_border(row + i, col, Edge::Vertical, spec(Side::Left));
            let _ = map.resolve_border(row + i, col + colspan, Edge::Vertical, spec(Side::Right));
        }
        for j in 0..colspan {
            let _ = map.resolve_border(row, col + j, Edge::Horizontal, spec(Side::Top));
            let _ = map.resolve_border(row + rowspan, col + j, Edge::Horizontal, spec(Side::Bottom));
        }
    }

    /// [§ 17.6.2 The collapsing border model](https://www.w3.org/TR/CSS2/tables.html#collapsing-borders)
    ///
    /// "Borders are centered on the grid lines between the cells." Once
    /// every conflict is settled, each side of the cell keeps half of the
    /// widest border that won along it.
    fn apply_collapsed_borders(&mut self, table: BoxId, cell: BoxId) -> Result<(), LayoutError> {
        let map = self.cellmap(table)?;
        let span = map.spanned(cell)?;
        let (Some(&row), Some(&last_row)) = (span.rows.first(), span.rows.last()) else {
            return Ok(());
        };
        let (Some(&col), Some(&last_col)) = (span.columns.first(), span.columns.last()) else {
            return Ok(());
        };
        let widest = |edges: Vec<BorderSpec>| -> (f32, BorderSpec) {
            edges.into_iter().fold((0.0, BorderSpec::NONE), |acc, spec| {
                let width = if spec.style.is_invisible() { 0.0 } else { spec.width };
                if width > acc.0 || acc.0 == 0.0 {
                    (width, spec)
                } else {
                    acc
                }
            })
        };
        let sides = Sides {
            top: widest(span.columns.iter().map(|&c| map.border(row, c, Edge::Horizontal)).collect()),
            right: widest(span.rows.iter().map(|&r| map.border(r, last_col + 1, Edge::Vertical)).collect()),
            bottom: widest(
                span.columns
                    .iter()
                    .map(|&c| map.border(last_row + 1, c, Edge::Horizontal))
                    .collect(),
            ),
            left: widest(span.rows.iter().map(|&r| map.border(r, col, Edge::Vertical)).collect()),
        };

        let b = &mut self.tree[cell];
        for side in Side::ALL {
            let (width, spec) = *sides.get(side);
            *b.style.border.get_mut(side) = BorderSide {
                width: LengthValue::Pt(width / 2.0),
                style: spec.style,
                color: Some(spec.color),
            };
            *b.style.margin.get_mut(side) = AutoLength::ZERO;
        }
        Ok(())
    }

    /// Minimum and maximum widths of a table: its column sums plus the
    /// table's own margins, borders, padding and spacing.
    ///
    /// # Errors
    ///
    /// Structural errors.
    pub fn table_min_max(&mut self, table: BoxId) -> Result<(f32, f32), LayoutError> {
        self.ensure_cellmap(table)?;
        let totals = self.cellmap(table)?.totals();
        let style = &self.tree[table].original_style;
        let margins = style.margin_pt(Side::Left, None) + style.margin_pt(Side::Right, None);
        let delta = margins + self.table_edges(table);
        Ok((totals.min + delta, totals.max + delta))
    }

    /// Horizontal borders, padding and, in the separate model, the outer
    /// border spacing of a table.
    fn table_edges(&self, table: BoxId) -> f32 {
        let style = &self.tree[table].original_style;
        let padding = style.padding_pt(Side::Left, None) + style.padding_pt(Side::Right, None);
        if self.is_collapsed(table) {
            padding
        } else {
            let (h, _) = style.border_spacing_pt();
            padding + style.border_width_pt(Side::Left) + style.border_width_pt(Side::Right) + h
        }
    }

    /// [§ 17.5.2.2 Automatic table layout](https://www.w3.org/TR/CSS2/tables.html#auto-table-layout)
    ///
    /// Pick the grid width from the table's `width` (the border box) or,
    /// when it is `auto`, from the column maxima bounded by the containing
    /// block and the column minima. Then share it out among the columns and
    /// resolve `auto` horizontal margins, centring the table when both are
    /// `auto`.
    ///
    /// # Errors
    ///
    /// Structural errors.
    pub fn resolve_table_width(&mut self, table: BoxId, cb: ContainingBlock) -> Result<(), LayoutError> {
        let totals = self.cellmap(table)?.totals();
        let style = self.tree[table].original_style.clone();
        let cw = cb.w;
        let margin_left = style.length_in_pt(style.margin.left, Some(cw)).pt();
        let margin_right = style.length_in_pt(style.margin.right, Some(cw)).pt();
        let edges = self.table_edges(table);
        let delta = edges + margin_left.unwrap_or(0.0) + margin_right.unwrap_or(0.0);
        let min_width = style.length_in_pt(style.min_width, Some(cw)).or_zero() - edges;

        let width = match style.length_in_pt(style.width, Some(cw)).pt() {
            Some(declared) => (declared - edges).max(min_width).max(totals.min),
            None => {
                let width = if totals.max + delta < cw {
                    totals.max
                } else if cw - delta > totals.min {
                    cw - delta
                } else {
                    totals.min
                };
                width.max(min_width)
            }
        };

        let map = self.cellmap_mut(table);
        map.distribute(width);
        let width = if map.columns_locked() {
            map.columns().iter().map(|c| c.used_width).sum()
        } else {
            width
        };

        let slack = cw - width - edges;
        let (ml, mr) = match (margin_left, margin_right) {
            (None, None) => (slack.max(0.0) / 2.0, slack.max(0.0) / 2.0),
            (None, Some(r)) => (slack - r, r),
            (Some(l), None) => (l, slack - l),
            (Some(l), Some(r)) => (l, r),
        };
        let b = &mut self.tree[table];
        b.width = width;
        b.style.margin.left = AutoLength::pt(ml);
        b.style.margin.right = AutoLength::pt(mr);
        log::trace!("table {table} width {width} (columns {:.1}..{:.1})", totals.min, totals.max);
        Ok(())
    }

    /// Give every registered row, row group and cell its final geometry
    /// from the grid.
    ///
    /// # Errors
    ///
    /// Structural errors.
    pub fn assign_table_geometry(&mut self, table: BoxId) -> Result<(), LayoutError> {
        let frames: Vec<BoxId> = self.cellmap(table)?.frames().map(|(id, _)| id).collect();
        for id in frames {
            let map = self.cellmap(table)?;
            let (x, y) = map.frame_position(id)?;
            let width = map.frame_width(id)?;
            let height = map.frame_height(id)?;
            if self.tree[id].kind == LayoutKind::TableCell {
                self.set_cell_height(id, height);
            } else {
                let b = &mut self.tree[id];
                b.position = Some(Point { x, y });
                b.width = width;
                b.height = height;
            }
        }
        Ok(())
    }

    /// [§ 17.5.3 Table height algorithms](https://www.w3.org/TR/CSS2/tables.html#height-layout)
    ///
    /// Stretch a cell to the height of its rows and place its content per
    /// `vertical-align`: "middle: The center of the cell is aligned with the
    /// center of the rows it spans", "bottom: The bottom of the cell box is
    /// aligned with the bottom of the last row it spans". Safe to call again
    /// after the rows change.
    pub fn set_cell_height(&mut self, cell: BoxId, height: f32) {
        let b = &self.tree[cell];
        let new_height = (height - b.vertical_edges()).max(0.0);
        let content_y = b.content_box().y;
        let first_y = b.lines.first().map_or(content_y, |l| l.y);
        let content_height = b.lines.iter().map(LineBox::bottom).fold(first_y, f32::max) - first_y;
        let wanted = if new_height > content_height {
            match b.style.vertical_align {
                VerticalAlign::Middle => (new_height - content_height) / 2.0,
                VerticalAlign::Bottom | VerticalAlign::TextBottom => new_height - content_height,
                _ => 0.0,
            }
        } else {
            0.0
        };
        let dy = wanted - (first_y - content_y);
        let frames: Vec<BoxId> = b.lines.iter().flat_map(|l| l.frames.iter().copied()).collect();

        let b = &mut self.tree[cell];
        b.height = new_height;
        if dy == 0.0 {
            return;
        }
        for line in &mut b.lines {
            line.y += dy;
        }
        for frame in frames {
            self.tree.move_box(frame, 0.0, dy);
        }
    }

    /// Stretch the rows of a table proportionally to fill `height` and
    /// move the cells with their rows.
    ///
    /// # Errors
    ///
    /// Structural errors.
    pub fn stretch_rows(&mut self, table: BoxId, height: f32) -> Result<(), LayoutError> {
        let content = self.cellmap(table)?.total_height();
        if content <= 0.0 || height <= content {
            return Ok(());
        }
        self.cellmap_mut(table).scale_row_heights(height / content);

        let frames: Vec<BoxId> = self.cellmap(table)?.frames().map(|(id, _)| id).collect();
        for id in frames {
            if self.tree[id].kind != LayoutKind::TableCell {
                continue;
            }
            let (_, y) = self.cellmap(table)?.frame_position(id)?;
            let current = self.tree[id].position.map_or(y, |p| p.y);
            if y != current {
                self.tree.move_box(id, 0.0, y - current);
            }
        }
        self.assign_table_geometry(table)
    }

    /// Drop a row or row group that moves to the next page from its
    /// table's grid.
    ///
    /// # Errors
    ///
    /// Structural errors.
    pub fn forget_table_part(&mut self, table: BoxId, part: BoxId) -> Result<(), LayoutError> {
        match self.tree.get(part)?.kind {
            LayoutKind::TableRow | LayoutKind::TableRowGroup => {
                if let Some(map) = self.tree[table].cellmap.as_deref_mut() {
                    map.remove_row(part);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Give the continuation of a split table the column widths of the
    /// original.
    pub fn lock_table_columns(&mut self, original: BoxId, continuation: BoxId) {
        let Some(map) = self.tree[original].cellmap.as_deref() else {
            return;
        };
        let locked = Cellmap::with_locked_columns(map.columns().to_vec(), map.is_fixed_layout());
        self.tree[continuation].cellmap = Some(Box::new(locked));
    }
}

/// A box side as a conflict-resolution candidate.
fn border_spec(style: &Style, side: Side) -> BorderSpec {
    let border = style.border.get(side);
    BorderSpec {
        width: style.to_pt(border.width, None).max(0.0),
        style: border.style,
        color: style.border_color(side),
    }
}

#[cfg(test)]
mod tests {
    use folio_dom::DomTree;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::box_tree::BoxTree;
    use crate::layout::context::{ApproximateFontMetrics, NoImages};
    use crate::style::FontRegistry;
    use crate::style::values::BorderStyle;

    fn styled(display: DisplayValue) -> Style {
        let mut style = Style::default();
        style.display = display;
        style
    }

    fn boxed(tree: &mut BoxTree, tag: &str, kind: LayoutKind, style: Style) -> BoxId {
        let node = tree.dom_mut().create_element(tag);
        tree.alloc(LayoutBox::new(node, kind, style))
    }

    #[test]
    fn test_stray_cells_get_anonymous_row() {
        let mut tree = BoxTree::new(DomTree::new());
        let body = boxed(&mut tree, "body", LayoutKind::Block, styled(DisplayValue::Block));
        let table = boxed(&mut tree, "table", LayoutKind::Table, styled(DisplayValue::Table));
        tree.append_child(body, table, true).unwrap();
        let a = boxed(&mut tree, "td", LayoutKind::TableCell, styled(DisplayValue::TableCell));
        let b = boxed(&mut tree, "td", LayoutKind::TableCell, styled(DisplayValue::TableCell));
        let stray = boxed(&mut tree, "p", LayoutKind::Block, styled(DisplayValue::Block));
        for c in [a, b, stray] {
            tree.append_child(table, c, true).unwrap();
        }

        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = LayoutContext::new(tree, &config, &fonts, &metrics, &NoImages);
        ctx.normalise_table(table).unwrap();

        let rows = ctx.tree.children(table);
        assert_eq!(rows.len(), 1);
        assert_eq!(ctx.tree[rows[0]].kind, LayoutKind::TableRow);
        assert_eq!(ctx.tree.children(rows[0]), vec![a, b]);
        assert_eq!(ctx.tree.children(body), vec![table, stray]);
    }

    #[test]
    fn test_collapsed_cells_take_half_the_winner() {
        let mut tree = BoxTree::new(DomTree::new());
        let mut table_style = styled(DisplayValue::Table);
        table_style.border_collapse = BorderCollapse::Collapse;
        let table = boxed(&mut tree, "table", LayoutKind::Table, table_style);
        let row = boxed(&mut tree, "tr", LayoutKind::TableRow, styled(DisplayValue::TableRow));
        tree.append_child(table, row, true).unwrap();

        let mut left = styled(DisplayValue::TableCell);
        left.border.right = BorderSide {
            width: LengthValue::Pt(1.5),
            style: BorderStyle::Solid,
            color: None,
        };
        let mut right = styled(DisplayValue::TableCell);
        right.border.left = BorderSide {
            width: LengthValue::Pt(0.75),
            style: BorderStyle::Dashed,
            color: None,
        };
        let a = boxed(&mut tree, "td", LayoutKind::TableCell, left);
        let b = boxed(&mut tree, "td", LayoutKind::TableCell, right);
        tree.append_child(row, a, true).unwrap();
        tree.append_child(row, b, true).unwrap();

        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = LayoutContext::new(tree, &config, &fonts, &metrics, &NoImages);
        ctx.ensure_cellmap(table).unwrap();

        let edge = ctx.cellmap(table).unwrap().border(0, 1, Edge::Vertical);
        assert_eq!(edge.style, BorderStyle::Solid);
        assert_eq!(edge.width, 1.5);
        assert_eq!(ctx.tree[a].style.border.right.width, LengthValue::Pt(0.75));
        assert_eq!(ctx.tree[b].style.border.left.width, LengthValue::Pt(0.75));
        assert_eq!(ctx.tree[b].style.border.left.style, BorderStyle::Solid);
    }
}
