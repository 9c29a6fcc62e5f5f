//! List item markers.
//!
//! [§ 12.5 Lists](https://www.w3.org/TR/CSS2/generate.html#lists)
//!
//! "An element with 'display: list-item' generates a principal block box for
//! the element's content and, depending on the values of 'list-style-type'
//! and 'list-style-image', possibly also a marker box as a visual indication
//! that the element is a list item."
//!
//! Outside markers hang to the left of the list item's first line and take
//! no space on it. Inside markers are the first inline box of that line.

use super::{Positioner, Reflower};
use crate::error::LayoutError;
use crate::layout::box_model::Point;
use crate::layout::box_tree::BoxId;
use crate::layout::context::LayoutContext;
use crate::layout::counters::{LIST_ITEM_COUNTER, format_counter};
use crate::style::values::ListStyleType;

/// Shape markers are this fraction of the font size, plus [`SHAPE_PADDING`].
pub const SHAPE_SIZE_RATIO: f32 = 0.35;

/// Room around a shape marker, in points.
pub const SHAPE_PADDING: f32 = 2.0;

/// Places outside markers.
#[derive(Debug)]
pub struct BulletPositioner;

/// Shared instance.
pub static BULLET_POSITIONER: BulletPositioner = BulletPositioner;

/// Sizes markers.
#[derive(Debug)]
pub struct BulletReflower;

/// Shared instance.
pub static BULLET_REFLOWER: BulletReflower = BulletReflower;

impl Positioner for BulletPositioner {
    fn position(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(), LayoutError> {
        let cb = ctx.tree[id].cb(id, "bullet position")?;
        let b = &ctx.tree[id];
        let (width, height) = (b.width, b.height);
        let line_height = b.style.line_height_pt();

        let line_y = ctx
            .tree
            .parent(id)
            .map_or(cb.y, |item| ctx.tree[item].line().y);
        let y = line_y + (line_height - height).max(0.0) / 2.0;
        ctx.tree[id].position = Some(Point { x: cb.x - width, y });
        Ok(())
    }
}

impl Reflower for BulletReflower {
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        block: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        let (width, height) = bullet_size(ctx, id)?;
        {
            let b = &mut ctx.tree[id];
            b.width = width;
            b.height = height;
        }
        if ctx.tree[id].is_inside_bullet() {
            if let Some(block) = block.or_else(|| ctx.find_block_parent(id)) {
                return ctx.add_frame_to_line(block, id);
            }
        }
        ctx.position(id)
    }

    fn min_max_width(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(f32, f32), LayoutError> {
        if !ctx.tree[id].is_inside_bullet() {
            return Ok((0.0, 0.0));
        }
        let (width, _) = bullet_size(ctx, id)?;
        Ok((width, width))
    }
}

/// Marker size. Counter markers record their text for painting.
fn bullet_size(ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(f32, f32), LayoutError> {
    if ctx.tree[id].image.as_ref().is_some_and(|i| i.is_drawable()) {
        let (width, height) = ctx.image_size(id, None, None);
        return Ok((width, height));
    }

    let style = ctx.tree[id].style.clone();
    let list_type = style.list_style_type;
    if list_type.is_shape() {
        let size = style.font_size_pt().mul_add(SHAPE_SIZE_RATIO, SHAPE_PADDING);
        ctx.tree[id].bullet_text = None;
        return Ok((size, size));
    }
    if list_type == ListStyleType::None {
        ctx.tree[id].bullet_text = None;
        return Ok((0.0, 0.0));
    }

    let value = ctx.counter_value(id, LIST_ITEM_COUNTER);
    let text = format!("{}. ", format_counter(value, list_type));
    let width = ctx.text_width(&style, &text)?;
    let height = ctx.font_height(&style)?;
    ctx.tree[id].bullet_text = Some(text);
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use folio_dom::DomTree;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::box_tree::{BoxTree, ContainingBlock, LayoutBox, LayoutKind};
    use crate::layout::context::{ApproximateFontMetrics, NoImages};
    use crate::style::values::LengthValue;
    use crate::style::{FontRegistry, Style};

    fn list_item(list_type: ListStyleType, ordinal: i32) -> (BoxTree, BoxId, BoxId) {
        let mut dom = DomTree::new();
        let ol = dom.create_element("ol");
        let li = dom.create_element("li");
        let marker = dom.create_element("li");
        let mut tree = BoxTree::new(dom);

        let list = tree.alloc(LayoutBox::new(ol, LayoutKind::Block, Style::default()));
        let _ = tree[list].counters.insert(LIST_ITEM_COUNTER.to_string(), ordinal);
        let item = tree.alloc(LayoutBox::new(li, LayoutKind::ListItem, Style::default()));
        tree.append_child(list, item, true).unwrap();

        let mut style = Style::default();
        style.font_size = LengthValue::Pt(10.0);
        style.list_style_type = list_type;
        let bullet = tree.alloc(LayoutBox::new(marker, LayoutKind::ListBullet, style));
        tree.append_child(item, bullet, false).unwrap();
        tree[bullet].containing_block = Some(ContainingBlock { x: 50.0, y: 20.0, w: 100.0, h: 100.0 });
        (tree, item, bullet)
    }

    #[test]
    fn test_outside_disc_hangs_left() {
        let (tree, item, bullet) = list_item(ListStyleType::Disc, 1);
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = LayoutContext::new(tree, &config, &fonts, &metrics, &NoImages);
        ctx.reflow(bullet, Some(item)).unwrap();

        let b = &ctx.tree[bullet];
        assert!((b.width - 5.5).abs() < 1e-4);
        let position = b.position.unwrap();
        assert!((position.x - 44.5).abs() < 1e-4);
        assert!(ctx.tree[item].line().is_empty());
    }

    #[test]
    fn test_counter_marker_text() {
        let (tree, item, bullet) = list_item(ListStyleType::UpperRoman, 4);
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = LayoutContext::new(tree, &config, &fonts, &metrics, &NoImages);
        ctx.reflow(bullet, Some(item)).unwrap();
        assert_eq!(ctx.tree[bullet].bullet_text.as_deref(), Some("IV. "));
        assert!((ctx.tree[bullet].width - 20.0).abs() < 1e-4);
    }
}
