//! Page breaks.
//!
//! [§ 13.3 Page breaks](https://www.w3.org/TR/CSS2/page.html#page-breaks)
//!
//! Reflowers ask two questions of the page being filled. Before a block is
//! laid out, [`LayoutContext::check_forced_page_break`] honours
//! `page-break-before` and `page-break-after`. After a box is laid out,
//! [`LayoutContext::check_page_break`] checks whether it still fits and,
//! if not, searches backwards for the nearest place the page may end.
//! Either way the break is carried out by splitting the tree, and the page
//! stays full until the page reflower starts the next one.

use super::box_tree::{BoxId, LayoutKind};
use super::context::LayoutContext;
use crate::error::LayoutError;
use crate::style::values::{DisplayValue, PageBreak};

impl LayoutContext<'_> {
    /// Whether `id` holds the content of a page.
    #[must_use]
    pub fn is_page_content_root(&self, id: BoxId) -> bool {
        self.tree
            .parent(id)
            .is_some_and(|p| self.tree[p].kind == LayoutKind::Page)
    }

    /// Whether nothing that takes up space precedes `id` on its page.
    /// Repeated table headers do not count.
    #[must_use]
    pub fn is_first_on_page(&self, id: BoxId) -> bool {
        let mut current = id;
        loop {
            if self.tree[current].kind == LayoutKind::Page || self.is_page_content_root(current) {
                return true;
            }
            let occupied = std::iter::successors(self.tree[current].prev_sibling, |&s| {
                self.tree[s].prev_sibling
            })
            .any(|s| self.occupies_flow(s));
            if occupied {
                return false;
            }
            match self.tree.parent(current) {
                Some(parent) => current = parent,
                None => return true,
            }
        }
    }

    fn occupies_flow(&self, id: BoxId) -> bool {
        let b = &self.tree[id];
        if b.is_out_of_flow() {
            return false;
        }
        match b.kind {
            LayoutKind::ListBullet => b.is_inside_bullet(),
            LayoutKind::Text => !self.tree.text(id).trim().is_empty(),
            LayoutKind::TableRowGroup => b.style.display != DisplayValue::TableHeaderGroup,
            _ => true,
        }
    }

    fn is_inside_table(&self, id: BoxId) -> bool {
        self.tree
            .ancestors(id)
            .any(|a| self.tree[a].kind == LayoutKind::Table)
    }

    fn avoids_break_inside(&self, id: BoxId) -> bool {
        self.tree
            .ancestors(id)
            .take_while(|&a| self.tree[a].kind != LayoutKind::Page)
            .any(|a| self.tree[a].style.page_break_inside == PageBreak::Avoid)
    }

    fn previous_in_flow(&self, id: BoxId) -> Option<BoxId> {
        std::iter::successors(self.tree[id].prev_sibling, |&s| self.tree[s].prev_sibling)
            .find(|&s| self.occupies_flow(s))
    }

    /// Break before `id` if it, or the block before it, forces one.
    ///
    /// [§ 13.3.1](https://www.w3.org/TR/CSS2/page.html#page-break-props)
    /// "Always force a page break before (after) the generated box." A
    /// forced break in front of the first content of a page is dropped.
    ///
    /// # Errors
    ///
    /// Structural errors from the split.
    pub fn check_forced_page_break(&mut self, id: BoxId) -> Result<bool, LayoutError> {
        if self.page.full {
            return Ok(false);
        }
        let b = &self.tree[id];
        if !b.is_in_flow() || !b.is_block_level() || b.kind == LayoutKind::Page {
            return Ok(false);
        }
        if self.is_page_content_root(id) || self.is_first_on_page(id) {
            return Ok(false);
        }

        if self.tree[id].style.page_break_before.is_forced() {
            let b = &mut self.tree[id];
            b.style.page_break_before = PageBreak::Auto;
            b.original_style.page_break_before = PageBreak::Auto;
            log::debug!("page {}: forced break before box {id}", self.page.number);
            self.split(id, None, true, true)?;
            self.page.full = true;
            return Ok(true);
        }

        let Some(previous) = self.previous_in_flow(id) else {
            return Ok(false);
        };
        if !self.tree[previous].is_block_level() {
            return Ok(false);
        }
        let mut candidate = Some(previous);
        while let Some(c) = candidate {
            if self.tree[c].style.page_break_after.is_forced() {
                let b = &mut self.tree[c];
                b.style.page_break_after = PageBreak::Auto;
                b.original_style.page_break_after = PageBreak::Auto;
                log::debug!(
                    "page {}: forced break after box {c}, before box {id}",
                    self.page.number
                );
                self.split(id, None, true, true)?;
                self.page.full = true;
                return Ok(true);
            }
            // A forced break after the last block of the previous sibling
            // also ends up before `id`.
            candidate = std::iter::successors(self.tree[c].last_child, |&l| self.tree[l].prev_sibling)
                .find(|&l| self.occupies_flow(l))
                .filter(|&l| self.tree[l].is_block_level());
        }
        Ok(false)
    }

    /// Whether the page may end directly before `id`.
    ///
    /// [§ 13.3.3 Allowed page breaks](https://www.w3.org/TR/CSS2/page.html#allowed-page-breaks)
    ///
    /// "In the vertical margin between block-level boxes", "between line
    /// boxes inside a block container box", and between table rows.
    #[must_use]
    pub fn page_break_allowed(&self, id: BoxId) -> bool {
        let b = &self.tree[id];
        if b.kind == LayoutKind::Page || self.is_page_content_root(id) || b.is_out_of_flow() {
            return false;
        }
        if self.is_first_on_page(id) {
            return false;
        }

        if b.is_block_level() {
            if self.is_inside_table(id) || b.style.page_break_before == PageBreak::Avoid {
                return false;
            }
            let Some(previous) = self.previous_in_flow(id) else {
                return false;
            };
            let p = &self.tree[previous];
            if p.is_block_level() && p.style.page_break_after == PageBreak::Avoid {
                return false;
            }
            return !self.avoids_break_inside(id);
        }

        match b.kind {
            LayoutKind::Text | LayoutKind::Inline | LayoutKind::Image | LayoutKind::LineBreak => {
                if self.is_inside_table(id) || self.avoids_break_inside(id) {
                    return false;
                }
                if b.kind == LayoutKind::Text && self.tree.text(id).trim().is_empty() {
                    return false;
                }
                let Some(block) = self.find_block_parent(id) else {
                    return false;
                };
                let Some(line) = self.line_index_of(block, id) else {
                    return false;
                };
                let starts_line = self.tree[block].lines[line]
                    .frames
                    .first()
                    .is_some_and(|&f| f == id || self.tree.is_ancestor(id, f));
                let orphans = self.tree[block].style.orphans.max(1) as usize;
                starts_line && line >= orphans
            }
            LayoutKind::TableRow => {
                let Ok(table) = self.find_parent_table(id) else {
                    return false;
                };
                if self.is_inside_table(table) || self.avoids_break_inside(id) {
                    return false;
                }
                let in_header = self.tree.parent(id).is_some_and(|p| {
                    self.tree[p].style.display == DisplayValue::TableHeaderGroup
                });
                !in_header && self.first_body_row(table) != Some(id)
            }
            _ => false,
        }
    }

    /// First row of a table outside its header groups.
    fn first_body_row(&self, table: BoxId) -> Option<BoxId> {
        self.tree.children(table).into_iter().find_map(|c| {
            let b = &self.tree[c];
            match b.kind {
                LayoutKind::TableRow => Some(c),
                LayoutKind::TableRowGroup if b.style.display != DisplayValue::TableHeaderGroup => self
                    .tree
                    .children(c)
                    .into_iter()
                    .find(|&r| self.tree[r].kind == LayoutKind::TableRow),
                _ => None,
            }
        })
    }

    /// The box a break at `id` actually moves: content of a table only
    /// moves with its row of the outermost table.
    fn break_anchor(&self, id: BoxId) -> BoxId {
        let Some(outer) = self
            .tree
            .ancestors(id)
            .filter(|&a| self.tree[a].kind == LayoutKind::Table)
            .last()
        else {
            return id;
        };
        std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .take_while(|&a| a != outer)
            .find(|&a| {
                self.tree[a].kind == LayoutKind::TableRow
                    && self.find_parent_table(a).is_ok_and(|t| t == outer)
            })
            .unwrap_or(outer)
    }

    /// Check that a laid out box fits on the page and break the page if it
    /// does not. Returns whether a break was made.
    ///
    /// The backward search visits the box's own subtree from the end, then
    /// earlier siblings and their subtrees, then ancestors, and stops at the
    /// page's content root. If no break is allowed anywhere the box is
    /// pushed regardless of `avoid` hints, unless it already starts the
    /// page.
    ///
    /// # Errors
    ///
    /// Structural errors from the split.
    pub fn check_page_break(&mut self, id: BoxId) -> Result<bool, LayoutError> {
        let b = &self.tree[id];
        if self.page.full || b.already_pushed || b.kind == LayoutKind::Page {
            return Ok(false);
        }
        let Some(position) = b.position else {
            return Ok(false);
        };
        if self.is_page_content_root(id)
            || b.is_out_of_flow()
            || self.tree.ancestors(id).any(|a| self.tree[a].is_out_of_flow())
        {
            return Ok(false);
        }
        if b.kind == LayoutKind::ListBullet && !b.is_inside_bullet() {
            return Ok(false);
        }

        let mut max_y = position.y + self.margin_height(id)?;
        for a in self.tree.ancestors(id) {
            let ancestor = &self.tree[a];
            if ancestor.kind == LayoutKind::Page {
                break;
            }
            let d = ancestor.dimensions();
            max_y += d.margin.bottom + d.border.bottom + d.padding.bottom;
        }
        if max_y <= self.page.bottom() + 0.01 {
            return Ok(false);
        }
        log::trace!(
            "page {}: box {id} reaches {max_y:.2}, page ends at {:.2}",
            self.page.number,
            self.page.bottom()
        );

        let mut iter = id;
        let mut ascended = false;
        let found = loop {
            if self.page_break_allowed(iter) {
                break Some(iter);
            }
            if self.is_page_content_root(iter) || self.tree[iter].kind == LayoutKind::Page {
                break None;
            }
            if !ascended {
                if let Some(last) = self.tree[iter].last_child {
                    iter = last;
                    continue;
                }
            }
            ascended = false;
            if let Some(previous) = self.tree[iter].prev_sibling {
                iter = previous;
                continue;
            }
            match self.tree.parent(iter) {
                Some(parent) => {
                    iter = parent;
                    ascended = true;
                }
                None => break None,
            }
        };

        let target = match found {
            Some(target) => target,
            None => {
                let anchor = self.break_anchor(id);
                if self.is_first_on_page(anchor) || self.tree[anchor].already_pushed {
                    return Ok(false);
                }
                log::debug!(
                    "page {}: no allowed break before box {id}, pushing box {anchor}",
                    self.page.number
                );
                anchor
            }
        };

        log::debug!("page {}: breaking before box {target}", self.page.number);
        self.split(target, None, true, false)?;
        self.page.full = true;
        self.tree[target].already_pushed = true;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use folio_dom::DomTree;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::box_model::{Point, Rect};
    use crate::layout::box_tree::{BoxTree, LayoutBox};
    use crate::layout::context::{ApproximateFontMetrics, NoImages};
    use crate::style::values::{AutoLength, DisplayValue};
    use crate::style::{FontRegistry, Style};

    fn block_style() -> Style {
        let mut style = Style::default();
        style.display = DisplayValue::Block;
        style
    }

    /// page > body > [p; n], each paragraph placed 100pt below the last.
    fn paged(n: usize) -> (BoxTree, BoxId, BoxId, Vec<BoxId>) {
        let mut dom = DomTree::new();
        let html = dom.create_element("html");
        let mut tree = BoxTree::new(dom);
        let page = tree.alloc(LayoutBox::new(html, LayoutKind::Page, block_style()));
        let node = tree.dom_mut().create_element("body");
        let body = tree.alloc(LayoutBox::new(node, LayoutKind::Block, block_style()));
        tree.append_child(page, body, true).unwrap();
        let mut paragraphs = Vec::new();
        for i in 0..n {
            let node = tree.dom_mut().create_element("p");
            let mut style = block_style();
            style.height = AutoLength::pt(100.0);
            let p = tree.alloc(LayoutBox::new(node, LayoutKind::Block, style));
            tree.append_child(body, p, true).unwrap();
            tree[p].position = Some(Point { x: 0.0, y: i as f32 * 100.0 });
            tree[p].height = 100.0;
            paragraphs.push(p);
        }
        (tree, page, body, paragraphs)
    }

    fn context<'a>(
        tree: BoxTree,
        config: &'a LayoutConfig,
        fonts: &'a FontRegistry,
        metrics: &'a ApproximateFontMetrics,
    ) -> LayoutContext<'a> {
        let mut ctx = LayoutContext::new(tree, config, fonts, metrics, &NoImages);
        ctx.page.number = 1;
        ctx.page.content = Rect {
            x: 0.0,
            y: 0.0,
            width: 500.0,
            height: 250.0,
        };
        ctx
    }

    #[test]
    fn test_overflowing_block_moves_to_continuation() {
        let (tree, page, body, ps) = paged(3);
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = context(tree, &config, &fonts, &metrics);

        assert!(!ctx.check_page_break(ps[1]).unwrap());
        assert!(ctx.check_page_break(ps[2]).unwrap());
        assert!(ctx.page.full);

        let pages = ctx.tree.children(page);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], body);
        assert_eq!(ctx.tree.children(body), vec![ps[0], ps[1]]);
        assert_eq!(ctx.tree.children(pages[1]), vec![ps[2]]);
        assert!(ctx.tree[body].is_split);
        assert_eq!(ctx.tree[ps[2]].position, None);
    }

    #[test]
    fn test_avoid_inside_moves_break_before_block() {
        let (mut tree, page, _, ps) = paged(2);
        // ps[1] avoids breaks inside and holds two children, the second
        // of which overflows.
        tree[ps[1]].style.page_break_inside = PageBreak::Avoid;
        let mut inner = Vec::new();
        for y in [100.0, 200.0] {
            let node = tree.dom_mut().create_element("div");
            let mut style = block_style();
            style.height = AutoLength::pt(100.0);
            let div = tree.alloc(LayoutBox::new(node, LayoutKind::Block, style));
            tree.append_child(ps[1], div, true).unwrap();
            tree[div].position = Some(Point { x: 0.0, y });
            tree[div].height = 100.0;
            inner.push(div);
        }

        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = context(tree, &config, &fonts, &metrics);
        assert!(ctx.check_page_break(inner[1]).unwrap());

        let pages = ctx.tree.children(page);
        assert_eq!(pages.len(), 2);
        assert_eq!(ctx.tree.children(pages[1]), vec![ps[1]]);
        assert_eq!(ctx.tree.children(ps[1]), inner);
    }

    #[test]
    fn test_first_box_on_page_is_accepted() {
        let (mut tree, page, _, ps) = paged(1);
        tree[ps[0]].height = 400.0;
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = context(tree, &config, &fonts, &metrics);

        assert!(!ctx.check_page_break(ps[0]).unwrap());
        assert!(!ctx.page.full);
        assert_eq!(ctx.tree.children(page).len(), 1);
    }

    #[test]
    fn test_forced_break_before() {
        let (mut tree, page, _, ps) = paged(3);
        tree[ps[1]].style.page_break_before = PageBreak::Always;
        tree[ps[0]].style.page_break_before = PageBreak::Always;
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = context(tree, &config, &fonts, &metrics);

        assert!(!ctx.check_forced_page_break(ps[0]).unwrap());
        assert!(ctx.check_forced_page_break(ps[1]).unwrap());
        let pages = ctx.tree.children(page);
        assert_eq!(ctx.tree.children(pages[1]), vec![ps[1], ps[2]]);
        assert_eq!(ctx.tree[ps[1]].style.page_break_before, PageBreak::Auto);
    }

    #[test]
    fn test_forced_break_after_previous_sibling() {
        let (mut tree, page, _, ps) = paged(2);
        tree[ps[0]].style.page_break_after = PageBreak::Right;
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = context(tree, &config, &fonts, &metrics);

        assert!(ctx.check_forced_page_break(ps[1]).unwrap());
        let pages = ctx.tree.children(page);
        assert_eq!(ctx.tree.children(pages[1]), vec![ps[1]]);
    }

    #[test]
    fn test_break_rules_for_blocks() {
        let (mut tree, _, _, ps) = paged(3);
        tree[ps[1]].style.page_break_after = PageBreak::Avoid;
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let ctx = context(tree, &config, &fonts, &metrics);

        assert!(!ctx.page_break_allowed(ps[0]));
        assert!(ctx.page_break_allowed(ps[1]));
        assert!(!ctx.page_break_allowed(ps[2]));
    }
}
