//! The page box.
//!
//! [§ 13.2 Page boxes](https://www.w3.org/TR/CSS2/page.html#page-box)
//!
//! The root box holds one child per page: the document body and the
//! continuations page breaks append after it. Each child is laid out in the
//! page area of a fresh page; a break while laying it out appends the next
//! continuation, so the loop runs until a page is laid out without one.

use super::Reflower;
use crate::error::LayoutError;
use crate::layout::box_model::{Point, Rect};
use crate::layout::box_tree::{BoxId, ContainingBlock};
use crate::layout::context::{LayoutContext, PageState};
use crate::style::values::Position;

/// Lays out the page box.
#[derive(Debug)]
pub struct PageReflower;

/// Shared instance.
pub static PAGE_REFLOWER: PageReflower = PageReflower;

impl Reflower for PageReflower {
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        _block: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        let (page_width, page_height) = ctx.config.page_size();
        {
            let b = &mut ctx.tree[id];
            b.position = Some(Point { x: 0.0, y: 0.0 });
            b.width = page_width;
            b.height = page_height;
            b.containing_block = Some(ContainingBlock {
                x: 0.0,
                y: 0.0,
                w: page_width,
                h: page_height,
            });
        }

        let mut fixed: Vec<BoxId> = Vec::new();
        let mut child = ctx.tree[id].first_child;
        while let Some(root) = child {
            let number = ctx.page.number + 1;
            if number > ctx.config.max_pages {
                return Err(LayoutError::PageLimit(ctx.config.max_pages));
            }
            let margins = ctx.config.margins_for_page(number);
            let content = Rect {
                x: margins.left,
                y: margins.top,
                width: (page_width - margins.left - margins.right).max(0.0),
                height: (page_height - margins.top - margins.bottom).max(0.0),
            };
            ctx.page = PageState {
                number,
                root: Some(root),
                content,
                full: false,
                in_table: 0,
            };
            log::debug!(
                "page {number}: content area {:.1}x{:.1} at ({:.1}, {:.1})",
                content.width,
                content.height,
                content.x,
                content.y
            );

            // [§ 9.6.1](https://www.w3.org/TR/CSS2/visuren.html#fixed-positioning)
            // "boxes with fixed positions that are defined in the main flow
            // are reproduced on every page".
            if number == 1 {
                fixed = ctx
                    .tree
                    .children(root)
                    .into_iter()
                    .filter(|&c| ctx.tree[c].style.position == Position::Fixed)
                    .collect();
            } else {
                for &original in fixed.iter().rev() {
                    let copy = ctx.tree.deep_clone(original)?;
                    ctx.tree.prepend_child(root, copy, true)?;
                }
            }

            ctx.tree[root].containing_block = Some(ContainingBlock {
                x: content.x,
                y: content.y,
                w: content.width,
                h: content.height,
            });
            ctx.reflow(root, None)?;

            child = ctx.tree[root].next_sibling;
        }
        log::debug!("laid out {} pages", ctx.page.number);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use folio_dom::DomTree;

    use super::*;
    use crate::config::{LayoutConfig, PageMargins};
    use crate::layout::box_tree::{BoxTree, LayoutBox, LayoutKind};
    use crate::layout::context::{ApproximateFontMetrics, NoImages};
    use crate::style::values::{AutoLength, DisplayValue};
    use crate::style::{FontRegistry, Style};

    fn block_style() -> Style {
        let mut style = Style::default();
        style.display = DisplayValue::Block;
        style
    }

    fn document(heights: &[f32]) -> (BoxTree, BoxId, Vec<BoxId>) {
        let mut dom = DomTree::new();
        let html = dom.create_element("html");
        let mut tree = BoxTree::new(dom);
        let page = tree.alloc(LayoutBox::new(html, LayoutKind::Page, block_style()));
        let node = tree.dom_mut().create_element("body");
        let body = tree.alloc(LayoutBox::new(node, LayoutKind::Block, block_style()));
        tree.append_child(page, body, true).unwrap();
        let mut blocks = Vec::new();
        for &h in heights {
            let node = tree.dom_mut().create_element("div");
            let mut style = block_style();
            style.height = AutoLength::pt(h);
            let div = tree.alloc(LayoutBox::new(node, LayoutKind::Block, style));
            tree.append_child(body, div, true).unwrap();
            blocks.push(div);
        }
        (tree, page, blocks)
    }

    fn small_pages() -> LayoutConfig {
        LayoutConfig {
            page_size: Some((200.0, 300.0)),
            margins: PageMargins::uniform(50.0),
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn test_blocks_flow_onto_new_pages() {
        let (tree, page, blocks) = document(&[120.0, 120.0, 120.0]);
        let config = small_pages();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = LayoutContext::new(tree, &config, &fonts, &metrics, &NoImages);
        ctx.reflow(page, None).unwrap();

        // Each page area is 200pt tall: one 120pt block per page.
        assert_eq!(ctx.page.number, 3);
        let roots = ctx.tree.children(page);
        assert_eq!(roots.len(), 3);
        for (root, block) in roots.iter().zip(&blocks) {
            assert_eq!(ctx.tree.children(*root), vec![*block]);
            assert_eq!(ctx.tree[*block].position, Some(Point { x: 50.0, y: 50.0 }));
        }
    }

    #[test]
    fn test_page_limit() {
        let (tree, page, _) = document(&[150.0, 150.0, 150.0]);
        let config = LayoutConfig {
            max_pages: 2,
            ..small_pages()
        };
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = LayoutContext::new(tree, &config, &fonts, &metrics, &NoImages);
        assert!(matches!(ctx.reflow(page, None), Err(LayoutError::PageLimit(2))));
    }
}
