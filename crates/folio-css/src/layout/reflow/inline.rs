//! Inline boxes and forced line breaks.
//!
//! [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
//!
//! An inline box takes no space on a line itself. Its children are placed on
//! the line boxes of the enclosing block, and its own left and right edges
//! travel with its first and last text runs. When the content wraps, the
//! inline box is split so that each piece covers one line.

use super::Reflower;
use crate::error::LayoutError;
use crate::layout::box_model::Rect;
use crate::layout::box_tree::{BoxId, LayoutKind};
use crate::layout::context::LayoutContext;
use crate::style::values::{AutoLength, Side};

/// Lays out inline boxes.
#[derive(Debug)]
pub struct InlineReflower;

/// Shared instance.
pub static INLINE_REFLOWER: InlineReflower = InlineReflower;

/// Lays out `<br>`.
#[derive(Debug)]
pub struct LineBreakReflower;

/// Shared instance.
pub static LINE_BREAK_REFLOWER: LineBreakReflower = LineBreakReflower;

impl Reflower for InlineReflower {
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        block: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        if ctx.check_forced_page_break(id)? {
            return Ok(());
        }
        ctx.prepare_content(id)?;

        // [§ 10.3.1](https://www.w3.org/TR/CSS2/visudet.html#inline-width)
        // "A computed value of 'auto' for 'margin-left' or 'margin-right'
        // becomes a used value of '0'."
        for side in [Side::Left, Side::Right] {
            let margin = ctx.tree[id].style.margin.get_mut(side);
            if margin.is_auto() {
                *margin = AutoLength::ZERO;
            }
        }
        carry_edges_to_text(ctx, id);

        ctx.position(id)?;
        let cb = ctx.tree[id].cb(id, "inline reflow")?;
        let block = block.or_else(|| ctx.find_block_parent(id));

        let mut child = ctx.tree[id].first_child;
        while let Some(c) = child {
            ctx.tree[c].containing_block = Some(cb);
            ctx.reflow(c, block)?;
            if ctx.page.full || !ctx.tree[id].content_set {
                break;
            }
            child = ctx.tree[c].next_sibling;
        }

        let extent = ctx
            .tree
            .children(id)
            .into_iter()
            .filter(|&c| ctx.tree[c].position.is_some() && ctx.tree[c].is_in_flow())
            .map(|c| ctx.tree[c].border_box())
            .reduce(|a, b| a.union(&b));
        if let Some(Rect { x, y, width, height }) = extent {
            let b = &mut ctx.tree[id];
            if let Some(position) = &mut b.position {
                position.x = x;
                position.y = y;
            }
            b.width = width;
            b.height = height;
        }

        for c in ctx.tree.children(id) {
            ctx.position_relative(c);
        }
        if let Some(block) = block {
            ctx.add_frame_to_line(block, id)?;
        }
        Ok(())
    }

    fn min_max_width(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(f32, f32), LayoutError> {
        let mut min: f32 = 0.0;
        let mut max = 0.0;
        for child in ctx.tree.children(id) {
            if ctx.tree[child].is_out_of_flow() {
                continue;
            }
            let (child_min, child_max) = ctx.min_max_width(child)?;
            min = min.max(child_min);
            max += child_max;
        }
        let edges = ctx.tree[id].horizontal_edges();
        Ok((min + edges, max + edges))
    }
}

/// The first text run takes the inline box's left edges and the last one
/// its right edges, so the edges occupy space on the line.
fn carry_edges_to_text(ctx: &mut LayoutContext<'_>, id: BoxId) {
    let b = &ctx.tree[id];
    let style = b.style.clone();
    let (first, last) = (b.first_child, b.last_child);
    let mut copy = |target: Option<BoxId>, side: Side| {
        let Some(target) = target.filter(|&t| ctx.tree[t].kind == LayoutKind::Text) else {
            return;
        };
        let child_style = &mut ctx.tree[target].style;
        *child_style.margin.get_mut(side) = *style.margin.get(side);
        *child_style.padding.get_mut(side) = *style.padding.get(side);
        *child_style.border.get_mut(side) = *style.border.get(side);
    };
    copy(first, Side::Left);
    copy(last, Side::Right);
}

impl Reflower for LineBreakReflower {
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        block: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        let Some(block) = block.or_else(|| ctx.find_block_parent(id)) else {
            return ctx.position(id);
        };
        {
            let b = &mut ctx.tree[id];
            b.width = 0.0;
            b.height = b.style.line_height_pt();
        }
        ctx.add_frame_to_line(block, id)?;

        let b = &ctx.tree[id];
        if let (Some(next), Some(parent)) = (b.next_sibling, b.parent) {
            if ctx.tree[parent].kind == LayoutKind::Inline {
                ctx.split_inline(parent, next, false, false)?;
            }
        }
        Ok(())
    }
}

impl LayoutContext<'_> {
    /// Split inline box `inline` before `child`. The continuation is
    /// inserted right after `inline` and receives `child` and every later
    /// sibling.
    ///
    /// The original loses its right edges and the continuation its left
    /// edges. A background image that does not repeat horizontally stays on
    /// the first piece.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] when `child` is not a child of `inline`.
    pub fn split_inline(
        &mut self,
        inline: BoxId,
        child: BoxId,
        page_break: bool,
        forced: bool,
    ) -> Result<(), LayoutError> {
        if self.tree.get(child)?.parent != Some(inline) {
            return Err(LayoutError::NotAChild { parent: inline, child });
        }
        let parent = self
            .tree
            .parent(inline)
            .ok_or_else(|| LayoutError::InvalidTree(format!("inline box {inline} has no parent")))?;

        if page_break && self.tree[inline].first_child == Some(child) {
            return self.split(parent, Some(inline), page_break, forced);
        }

        self.revert_counter_increments(inline);
        let clone = self.tree.clone_box(inline);
        self.tree.insert_after(parent, clone, inline, true)?;

        self.tree[inline].style.clear_edges(Side::Right);
        {
            let c = &mut self.tree[clone];
            c.style.clear_edges(Side::Left);
            c.original_style.clear_edges(Side::Left);
            if !c.style.background_repeat.repeats_x() {
                c.style.background_image = None;
                c.original_style.background_image = None;
            }
        }

        for sibling in self.tree.siblings_from(child) {
            self.reset(sibling)?;
            self.tree.append_child(clone, sibling, true)?;
        }
        if let Some(last) = self.tree[inline].last_child {
            if self.tree[last].kind == LayoutKind::Text {
                self.tree[last].style.clear_edges(Side::Right);
            }
        }

        if page_break {
            self.split(parent, Some(clone), page_break, forced)
        } else if self.tree[parent].kind == LayoutKind::Inline {
            self.split_inline(parent, clone, false, false)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use folio_dom::DomTree;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::box_tree::{BoxTree, LayoutBox};
    use crate::layout::context::{ApproximateFontMetrics, NoImages};
    use crate::style::values::{BackgroundRepeat, LengthValue, Sides};
    use crate::style::{FontRegistry, Style};

    #[test]
    fn test_split_inline_moves_tail_and_edges() {
        let mut dom = DomTree::new();
        let p = dom.create_element("p");
        let span = dom.create_element("span");
        let mut tree = BoxTree::new(dom);
        let block = tree.alloc(LayoutBox::new(p, LayoutKind::Block, Style::default()));

        let mut style = Style::default();
        style.padding = Sides::all(LengthValue::Pt(4.0));
        style.background_image = Some("dots.png".into());
        style.background_repeat = BackgroundRepeat::RepeatY;
        let inline = tree.alloc(LayoutBox::new(span, LayoutKind::Inline, style));
        tree.append_child(block, inline, true).unwrap();

        let mut texts = Vec::new();
        for word in ["one ", "two ", "three"] {
            let node = tree.dom_mut().create_text(word);
            let t = tree.alloc(LayoutBox::new(node, LayoutKind::Text, Style::default()));
            tree.append_child(inline, t, true).unwrap();
            texts.push(t);
        }

        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = LayoutContext::new(tree, &config, &fonts, &metrics, &NoImages);
        ctx.split_inline(inline, texts[1], false, false).unwrap();

        let siblings = ctx.tree.children(block);
        assert_eq!(siblings.len(), 2);
        let clone = siblings[1];
        assert_eq!(ctx.tree.children(inline), vec![texts[0]]);
        assert_eq!(ctx.tree.children(clone), vec![texts[1], texts[2]]);
        assert_eq!(ctx.tree[inline].style.padding.right, LengthValue::ZERO);
        assert_eq!(ctx.tree[clone].style.padding.left, LengthValue::ZERO);
        assert_eq!(ctx.tree[clone].style.padding.right, LengthValue::Pt(4.0));
        assert_eq!(ctx.tree[clone].style.background_image, None);
        assert_eq!(ctx.tree[inline].style.background_image.as_deref(), Some("dots.png"));
    }
}
