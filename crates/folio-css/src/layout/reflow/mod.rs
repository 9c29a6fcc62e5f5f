//! Positioners and reflowers.
//!
//! Every box carries two strategy objects chosen from its [`LayoutKind`]
//! when the box is built:
//!
//! - a [`Positioner`] decides where the box's margin box starts, relative to
//!   the flow it takes part in
//! - a [`Reflower`] sizes the box and lays out its children
//!
//! The strategies are zero-sized statics, so boxes store them as
//! `&'static dyn` references and clones share them.

use std::fmt;

use super::box_model::Point;
use super::box_tree::{BoxId, LayoutKind};
use super::context::LayoutContext;
use crate::error::LayoutError;
use crate::style::Style;
use crate::style::values::{DisplayValue, ListStylePosition, Position};

pub mod block;
pub mod image;
pub mod inline;
pub mod list;
pub mod page;
pub mod table;
pub mod text;

/// Places a box.
pub trait Positioner: fmt::Debug {
    /// Set the box's position from its containing block and the state of
    /// the enclosing line or block.
    ///
    /// # Errors
    ///
    /// [`LayoutError::MissingContainingBlock`] and other structural errors.
    fn position(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(), LayoutError>;
}

/// Sizes a box and lays out its subtree.
pub trait Reflower: fmt::Debug {
    /// Lay out the box. `block` is the nearest block container, whose line
    /// boxes inline-level content joins.
    ///
    /// # Errors
    ///
    /// Structural errors; resource problems are recorded as warnings.
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        block: Option<BoxId>,
    ) -> Result<(), LayoutError>;

    /// Minimum and maximum widths including the box's horizontal edges.
    ///
    /// # Errors
    ///
    /// Structural errors.
    fn min_max_width(&self, _ctx: &mut LayoutContext<'_>, _id: BoxId) -> Result<(f32, f32), LayoutError> {
        Ok((0.0, 0.0))
    }
}

/// Pick the positioner and reflower for a box.
#[must_use]
pub fn strategies_for(
    kind: LayoutKind,
    style: &Style,
) -> (&'static dyn Positioner, &'static dyn Reflower) {
    let block_like = |display: DisplayValue| -> &'static dyn Positioner {
        if display.is_inline_level() {
            &INLINE_POSITIONER
        } else {
            &BLOCK_POSITIONER
        }
    };
    let positioner: &'static dyn Positioner = match kind {
        LayoutKind::Page | LayoutKind::TableRowGroup | LayoutKind::TableRow => &NULL_POSITIONER,
        _ if style.position.is_out_of_flow() => &ABSOLUTE_POSITIONER,
        LayoutKind::Block | LayoutKind::ListItem | LayoutKind::Table => block_like(style.display),
        LayoutKind::Generated => {
            if style.display.is_block_level() {
                &BLOCK_POSITIONER
            } else {
                &INLINE_POSITIONER
            }
        }
        LayoutKind::ListBullet => {
            if style.list_style_position == ListStylePosition::Inside {
                &INLINE_POSITIONER
            } else {
                &list::BULLET_POSITIONER
            }
        }
        LayoutKind::TableCell => &table::CELL_POSITIONER,
        LayoutKind::Inline | LayoutKind::Text | LayoutKind::LineBreak | LayoutKind::Image => {
            &INLINE_POSITIONER
        }
    };
    let reflower: &'static dyn Reflower = match kind {
        LayoutKind::Page => &page::PAGE_REFLOWER,
        LayoutKind::Block | LayoutKind::ListItem => &block::BLOCK_REFLOWER,
        LayoutKind::Generated => {
            if style.display.is_block_level() {
                &block::BLOCK_REFLOWER
            } else {
                &inline::INLINE_REFLOWER
            }
        }
        LayoutKind::Inline => &inline::INLINE_REFLOWER,
        LayoutKind::LineBreak => &inline::LINE_BREAK_REFLOWER,
        LayoutKind::Text => &text::TEXT_REFLOWER,
        LayoutKind::Image => &image::IMAGE_REFLOWER,
        LayoutKind::ListBullet => &list::BULLET_REFLOWER,
        LayoutKind::Table => &table::TABLE_REFLOWER,
        LayoutKind::TableRowGroup => &table::ROW_GROUP_REFLOWER,
        LayoutKind::TableRow => &table::ROW_REFLOWER,
        LayoutKind::TableCell => &table::CELL_REFLOWER,
    };
    (positioner, reflower)
}

/// Positions assigned by the parent.
#[derive(Debug)]
pub struct NullPositioner;

static NULL_POSITIONER: NullPositioner = NullPositioner;

impl Positioner for NullPositioner {
    fn position(&self, _ctx: &mut LayoutContext<'_>, _id: BoxId) -> Result<(), LayoutError> {
        Ok(())
    }
}

/// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// "In a block formatting context, boxes are laid out one after the other,
/// vertically, beginning at the top of a containing block."
#[derive(Debug)]
pub struct BlockPositioner;

static BLOCK_POSITIONER: BlockPositioner = BlockPositioner;

impl Positioner for BlockPositioner {
    fn position(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(), LayoutError> {
        let cb = ctx.tree[id].cb(id, "block position")?;
        let in_table = ctx
            .tree
            .parent(id)
            .is_some_and(|p| ctx.tree[p].kind == LayoutKind::Table);
        let y = match ctx.find_block_parent(id) {
            Some(parent) if !in_table => {
                ctx.add_line(parent, true);
                ctx.tree[parent].line().y
            }
            _ => cb.y,
        };
        ctx.tree[id].position = Some(Point { x: cb.x, y });
        Ok(())
    }
}

/// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// "In an inline formatting context, boxes are laid out horizontally, one
/// after the other, beginning at the top of a containing block."
#[derive(Debug)]
pub struct InlinePositioner;

static INLINE_POSITIONER: InlinePositioner = InlinePositioner;

impl Positioner for InlinePositioner {
    fn position(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(), LayoutError> {
        let Some(block) = ctx.find_block_parent(id) else {
            let cb = ctx.tree[id].cb(id, "inline position")?;
            ctx.tree[id].position = Some(Point { x: cb.x, y: cb.y });
            return Ok(());
        };
        let content_x = ctx.tree[block].content_box().x;
        let line = ctx.tree[block].line();
        let position = Point {
            x: content_x + line.left + line.w,
            y: line.y,
        };
        ctx.tree[id].position = Some(position);
        Ok(())
    }
}

/// [§ 9.6 Absolute positioning](https://www.w3.org/TR/CSS2/visuren.html#absolute-positioning)
///
/// The block reflower resolves `left` and `top` into used values before
/// positioning; an `auto` `top` keeps the static position.
#[derive(Debug)]
pub struct AbsolutePositioner;

static ABSOLUTE_POSITIONER: AbsolutePositioner = AbsolutePositioner;

impl Positioner for AbsolutePositioner {
    fn position(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(), LayoutError> {
        let cb = ctx.tree[id].cb(id, "absolute position")?;
        let (static_x, static_y) = ctx.static_position(id, cb.x, cb.y);
        let style = &ctx.tree[id].style;
        let x = style
            .length_in_pt(style.offsets.left, Some(cb.w))
            .pt()
            .map_or(static_x, |left| cb.x + left);
        let y = style
            .length_in_pt(style.offsets.top, Some(cb.h))
            .pt()
            .map_or(static_y, |top| cb.y + top);
        ctx.tree[id].position = Some(Point { x, y });
        Ok(())
    }
}

impl LayoutContext<'_> {
    /// Where an out-of-flow box would sit in normal flow.
    #[must_use]
    pub fn static_position(&self, id: BoxId, default_x: f32, default_y: f32) -> (f32, f32) {
        self.find_block_parent(id).map_or((default_x, default_y), |block| {
            let b = &self.tree[block];
            let line = b.line();
            let y = if line.is_empty() { line.y } else { line.bottom() };
            (b.content_box().x, y)
        })
    }

    /// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
    ///
    /// "Once a box has been laid out according to the normal flow or
    /// floated, it may be shifted relative to this position."
    pub fn position_relative(&mut self, id: BoxId) {
        let b = &self.tree[id];
        if b.style.position != Position::Relative {
            return;
        }
        let cb = b.containing_block.unwrap_or_default();
        let style = &b.style;
        let offset = |start, end, reference| {
            match (
                style.length_in_pt(start, Some(reference)).pt(),
                style.length_in_pt(end, Some(reference)).pt(),
            ) {
                (Some(start), _) => start,
                (None, Some(end)) => -end,
                (None, None) => 0.0,
            }
        };
        let dx = offset(style.offsets.left, style.offsets.right, cb.w);
        let dy = offset(style.offsets.top, style.offsets.bottom, cb.h);
        self.tree.move_box(id, dx, dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategies_follow_kind_and_position() {
        let mut style = Style::default();
        style.display = DisplayValue::Block;
        let (positioner, reflower) = strategies_for(LayoutKind::Block, &style);
        assert_eq!(format!("{positioner:?}"), "BlockPositioner");
        assert_eq!(format!("{reflower:?}"), "BlockReflower");

        style.position = Position::Absolute;
        let (positioner, _) = strategies_for(LayoutKind::Block, &style);
        assert_eq!(format!("{positioner:?}"), "AbsolutePositioner");

        style.position = Position::Static;
        style.display = DisplayValue::InlineBlock;
        let (positioner, reflower) = strategies_for(LayoutKind::Block, &style);
        assert_eq!(format!("{positioner:?}"), "InlinePositioner");
        assert_eq!(format!("{reflower:?}"), "BlockReflower");
    }
}
