//! Tables, row groups, rows and cells.
//!
//! [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
//!
//! The table reflower owns the grid: it registers cells, picks the column
//! widths, lays out each row group and row in order and sizes everything
//! from the grid at the end. Rows and cells take their position from the
//! grid instead of from the flow.

use super::block::BLOCK_REFLOWER;
use super::{Positioner, Reflower};
use crate::error::LayoutError;
use crate::layout::box_model::Point;
use crate::layout::box_tree::{BoxId, ContainingBlock, LayoutKind};
use crate::layout::context::LayoutContext;
use crate::layout::line::LineBox;
use crate::style::values::{BorderStyle, LengthValue, Side};

/// Lays out tables.
#[derive(Debug)]
pub struct TableReflower;

/// Shared instance.
pub static TABLE_REFLOWER: TableReflower = TableReflower;

/// Lays out row groups.
#[derive(Debug)]
pub struct RowGroupReflower;

/// Shared instance.
pub static ROW_GROUP_REFLOWER: RowGroupReflower = RowGroupReflower;

/// Lays out rows.
#[derive(Debug)]
pub struct RowReflower;

/// Shared instance.
pub static ROW_REFLOWER: RowReflower = RowReflower;

/// Places cells on the grid.
#[derive(Debug)]
pub struct CellPositioner;

/// Shared instance.
pub static CELL_POSITIONER: CellPositioner = CellPositioner;

/// Lays out the content of cells.
#[derive(Debug)]
pub struct CellReflower;

/// Shared instance.
pub static CELL_REFLOWER: CellReflower = CellReflower;

impl Reflower for TableReflower {
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        block: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        if ctx.check_forced_page_break(id)? || ctx.page.full {
            return Ok(());
        }
        if ctx.tree[id].is_out_of_flow() {
            ctx.set_absolute_containing_block(id);
        }

        ctx.page.in_table += 1;
        let result = reflow_table(ctx, id);
        ctx.page.in_table = ctx.page.in_table.saturating_sub(1);
        result?;

        if let Some(block) = block {
            if ctx.tree[id].is_in_flow() && ctx.tree[id].position.is_some() {
                ctx.add_frame_to_line(block, id)?;
                if ctx.tree[id].is_block_level() {
                    ctx.add_line(block, true);
                }
            }
        }
        Ok(())
    }

    fn min_max_width(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(f32, f32), LayoutError> {
        ctx.table_min_max(id)
    }
}

fn reflow_table(ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(), LayoutError> {
    ctx.prepare_content(id)?;
    ctx.collapse_margins(id);
    ctx.ensure_cellmap(id)?;

    let collapse = ctx.is_collapsed(id);
    {
        let style = &mut ctx.tree[id].style;
        if collapse {
            for side in Side::ALL {
                let border = style.border.get_mut(side);
                border.width = LengthValue::ZERO;
                border.style = BorderStyle::None;
            }
        } else {
            let (h, v) = style.border_spacing_pt();
            let padding = |value: LengthValue, extra: f32| {
                LengthValue::Pt(style.to_pt(value, None) + extra / 2.0)
            };
            let top = padding(style.padding.top, v);
            let right = padding(style.padding.right, h);
            let bottom = padding(style.padding.bottom, v);
            let left = padding(style.padding.left, h);
            style.padding.top = top;
            style.padding.right = right;
            style.padding.bottom = bottom;
            style.padding.left = left;
        }
    }

    let cb = ctx.tree[id].cb(id, "table reflow")?;
    ctx.resolve_table_width(id, cb)?;
    ctx.position(id)?;

    let content = ctx.tree[id].content_box();
    let mut y = content.y;
    for caption in ctx.captions(id) {
        if ctx.page.full {
            break;
        }
        ctx.tree[caption].containing_block = Some(ContainingBlock {
            x: content.x,
            y,
            w: content.width,
            h: cb.h,
        });
        ctx.reflow(caption, None)?;
        if let Some(p) = ctx.tree[caption].position {
            y = p.y + ctx.tree[caption].margin_box().height;
        }
    }
    let grid_top = y;

    {
        let map = ctx.tree[id].cellmap.get_or_insert_with(Box::default);
        map.set_top(grid_top);
        map.assign_x_positions(content.x);
    }

    let nested = ctx.page.in_nested_table();
    let child_cb = ContainingBlock {
        x: content.x,
        y: grid_top,
        w: content.width,
        h: cb.h,
    };
    let mut child = ctx.tree[id].first_child;
    while let Some(c) = child {
        if ctx.page.full {
            break;
        }
        let is_grid_part = matches!(
            ctx.tree[c].kind,
            LayoutKind::TableRowGroup | LayoutKind::TableRow
        );
        if is_grid_part {
            ctx.tree[c].containing_block = Some(child_cb);
            ctx.reflow(c, None)?;
            if !nested {
                let _ = ctx.check_page_break(c)?;
            }
        }
        child = ctx.tree[c].next_sibling;
    }

    ctx.assign_table_geometry(id)?;
    let grid_height = ctx.cellmap(id)?.total_height();
    let style = &ctx.tree[id].style;
    let declared = style.length_in_pt(style.height, Some(cb.h)).pt();
    let captions = grid_top - content.y;
    let mut height = captions + grid_height;
    if let Some(declared) = declared {
        if declared - captions > grid_height {
            ctx.stretch_rows(id, declared - captions)?;
            height = declared;
        }
    }
    ctx.tree[id].height = height;
    log::trace!("table {id} laid out, height {height}");
    Ok(())
}

impl Reflower for RowGroupReflower {
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        _block: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        if ctx.page.full {
            return Ok(());
        }
        let cb = ctx.tree[id].cb(id, "row group reflow")?;
        let nested = ctx.page.in_nested_table();

        let mut child = ctx.tree[id].first_child;
        while let Some(c) = child {
            if ctx.page.full {
                break;
            }
            ctx.tree[c].containing_block = Some(cb);
            ctx.reflow(c, None)?;
            if !nested {
                let _ = ctx.check_page_break(c)?;
            }
            child = ctx.tree[c].next_sibling;
        }
        if ctx.page.full {
            return Ok(());
        }
        place_from_grid(ctx, id)
    }
}

impl Reflower for RowReflower {
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        _block: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        if ctx.page.full {
            return Ok(());
        }
        ctx.position(id)?;
        let cb = ctx.tree[id].cb(id, "row reflow")?;
        for cell in ctx.tree.children(id) {
            if ctx.page.full {
                return Ok(());
            }
            ctx.tree[cell].containing_block = Some(cb);
            ctx.reflow(cell, None)?;
        }
        place_from_grid(ctx, id)
    }
}

/// Rows and row groups take their box from the rows they cover.
fn place_from_grid(ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(), LayoutError> {
    let table = ctx.find_parent_table(id)?;
    let map = ctx.cellmap(table)?;
    if !map.contains(id) {
        return Ok(());
    }
    let (x, y) = map.frame_position(id)?;
    let width = map.frame_width(id)?;
    let height = map.frame_height(id)?;
    let b = &mut ctx.tree[id];
    b.position = Some(Point { x, y });
    b.width = width;
    b.height = height;
    Ok(())
}

impl Positioner for CellPositioner {
    fn position(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(), LayoutError> {
        let table = ctx.find_parent_table(id)?;
        let (x, y) = ctx.cellmap(table)?.frame_position(id)?;
        ctx.tree[id].position = Some(Point { x, y });
        Ok(())
    }
}

impl Reflower for CellReflower {
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        _block: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        let table = ctx.find_parent_table(id)?;
        let map = ctx.cellmap(table)?;
        let span = map.spanned(id)?.clone();
        let column_width = map.frame_width(id)?;
        let (_, grid_y) = map.frame_position(id)?;

        let cb = ctx.tree[id].cb(id, "cell reflow")?;
        ctx.tree[id].containing_block = Some(ContainingBlock { w: column_width, ..cb });
        ctx.prepare_content(id)?;
        ctx.position(id)?;

        let horizontal = ctx.tree[id].horizontal_edges();
        ctx.tree[id].width = (column_width - horizontal).max(0.0);

        let content = ctx.tree[id].content_box();
        {
            let b = &mut ctx.tree[id];
            b.lines = vec![LineBox::at(content.y)];
            b.current_line = 0;
        }
        let style = &ctx.tree[id].style;
        let indent = style.to_pt(style.text_indent, Some(content.width));
        if indent != 0.0 {
            ctx.increase_line_width(id, indent);
        }

        let child_cb = ContainingBlock {
            x: content.x,
            y: content.y,
            w: content.width,
            h: cb.h,
        };
        let mut child = ctx.tree[id].first_child;
        while let Some(c) = child {
            if ctx.page.full {
                break;
            }
            ctx.tree[c].containing_block = Some(child_cb);
            ctx.reflow(c, Some(id))?;
            child = ctx.tree[c].next_sibling;
        }

        let b = &ctx.tree[id];
        let bottom = b.lines.iter().map(LineBox::bottom).fold(content.y, f32::max);
        let content_height = bottom - content.y;
        let declared = b.style.length_in_pt(b.style.height, Some(cb.h)).pt();
        let height = declared.map_or(content_height, |d| d.max(content_height));
        let top_space = content.y - grid_y;
        let bottom_space = {
            let d = b.dimensions();
            d.padding.bottom + d.border.bottom + d.margin.bottom
        };
        ctx.tree[id].height = height;

        let per_row = (height + top_space + bottom_space) / span.rows.len().max(1) as f32;
        let map = ctx.tree[table].cellmap.get_or_insert_with(Box::default);
        for &row in &span.rows {
            map.set_row_height(row, per_row);
        }

        ctx.text_align(id)?;
        ctx.vertical_align(id)?;
        for c in ctx.tree.children(id) {
            ctx.position_relative(c);
        }
        Ok(())
    }

    fn min_max_width(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(f32, f32), LayoutError> {
        BLOCK_REFLOWER.min_max_width(ctx, id)
    }
}
