//! Splitting the tree at a page break.
//!
//! Splitting a box at one of its children clones the box, inserts the clone
//! after it and moves the child and every later sibling into the clone.
//! The split then repeats one level up with the clone as the split point,
//! so that the break runs from the box up to the page: the page's content
//! root ends up with a continuation that becomes the next page.
//!
//! Moved boxes are reset to their unlaid state. Boxes left behind keep
//! their geometry, which is never touched again once the page is full.

use super::box_tree::{BoxId, LayoutKind};
use super::context::LayoutContext;
use super::line::LineBox;
use crate::error::LayoutError;
use crate::style::values::{AutoLength, DisplayValue, LengthValue, PageBreak};

impl LayoutContext<'_> {
    /// Split `id` before `child`; with no child, split the parent of `id`
    /// before `id`.
    ///
    /// A break after the first piece of a forced split keeps the top
    /// margin of the moved box; an unforced one drops it, as "a margin
    /// adjoining a page break is truncated".
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] when `child` is not a child of `id`, and
    /// other structural errors.
    pub fn split(
        &mut self,
        id: BoxId,
        child: Option<BoxId>,
        page_break: bool,
        forced: bool,
    ) -> Result<(), LayoutError> {
        let kind = self.tree.get(id)?.kind;
        if kind == LayoutKind::Page {
            return Ok(());
        }
        let Some(child) = child else {
            let parent = self
                .tree
                .parent(id)
                .ok_or_else(|| LayoutError::InvalidTree(format!("cannot split detached box {id}")))?;
            return self.split(parent, Some(id), page_break, forced);
        };
        if self.tree.get(child)?.parent != Some(id) {
            return Err(LayoutError::NotAChild { parent: id, child });
        }

        match kind {
            LayoutKind::Inline => self.split_inline(id, child, page_break, forced),
            LayoutKind::Table => self.split_table(id, child, page_break, forced),
            LayoutKind::TableRowGroup => self.split_row_group(id, child, page_break, forced),
            // Rows and cells are never divided; they move as a whole.
            LayoutKind::TableRow | LayoutKind::TableCell => self.split(id, None, page_break, forced),
            _ => self.split_block(id, child, page_break, forced),
        }
    }

    fn split_block(
        &mut self,
        id: BoxId,
        child: BoxId,
        page_break: bool,
        forced: bool,
    ) -> Result<(), LayoutError> {
        let content_root = self.is_page_content_root(id);
        if !content_root {
            self.revert_counter_increments(id);
        }
        let parent = self
            .tree
            .parent(id)
            .ok_or_else(|| LayoutError::InvalidTree(format!("cannot split detached box {id}")))?;

        let clone = self.tree.clone_box(id);
        if self.tree[id].kind == LayoutKind::Table {
            self.lock_table_columns(id, clone);
        }
        {
            let c = &mut self.tree[clone];
            c.style.text_indent = LengthValue::ZERO;
            c.original_style.text_indent = LengthValue::ZERO;
            c.style.page_break_before = PageBreak::Auto;
            c.original_style.page_break_before = PageBreak::Auto;
            c.already_pushed = true;
        }
        self.tree[id].is_split = true;

        if !content_root {
            let b = &mut self.tree[id];
            for style in [&mut b.style, &mut b.original_style] {
                style.margin.bottom = AutoLength::ZERO;
                style.padding.bottom = LengthValue::ZERO;
                style.border.bottom.width = LengthValue::ZERO;
            }
            let c = &mut self.tree[clone];
            for style in [&mut c.style, &mut c.original_style] {
                style.margin.top = AutoLength::ZERO;
                style.padding.top = LengthValue::ZERO;
                style.border.top.width = LengthValue::ZERO;
            }
        }

        self.tree.insert_after(parent, clone, id, true)?;
        if self.tree[id].is_block_container() {
            self.remove_frames_from_line(id, child)?;
        }

        for sibling in self.tree.siblings_from(child) {
            self.reset(sibling)?;
            self.tree.append_child(clone, sibling, true)?;
        }

        self.split(parent, Some(clone), page_break, forced)?;

        if page_break && !forced {
            self.tree[child].style.margin.top = AutoLength::ZERO;
        }

        // Counters reset by the box carry on from their current value in
        // the continuation instead of starting over.
        let resets: Vec<String> = self.tree[id]
            .style
            .counter_reset
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        for name in resets {
            let value = self.counter_value(id, &name);
            let _ = self.tree[clone].saved_resets.insert(name, value);
        }

        log::debug!("split box {id} before child {child}, continuation {clone}");
        Ok(())
    }

    /// [§ 17.2](https://www.w3.org/TR/CSS2/tables.html#table-display)
    /// "user agents may repeat header rows on each page spanned by a
    /// table".
    fn split_table(
        &mut self,
        table: BoxId,
        child: BoxId,
        page_break: bool,
        forced: bool,
    ) -> Result<(), LayoutError> {
        let headers = self.header_groups(table);
        if headers.is_empty() {
            self.forget_from(table, child)?;
            return self.split_block(table, child, page_break, forced);
        }

        let first_body = self.tree.children(table).into_iter().find(|&c| {
            let b = &self.tree[c];
            matches!(b.kind, LayoutKind::TableRowGroup | LayoutKind::TableRow)
                && b.style.display != DisplayValue::TableHeaderGroup
        });
        let at_start = headers.contains(&child) || first_body == Some(child);
        if at_start && !self.is_first_on_page(table) {
            // Nothing but the header would stay behind.
            return self.split(table, None, page_break, forced);
        }

        self.forget_from(table, child)?;
        let mut first_copy = None;
        for header in headers {
            let copy = self.tree.deep_clone(header)?;
            self.tree.insert_before(table, copy, child, true)?;
            let _ = first_copy.get_or_insert(copy);
        }
        self.split_block(table, first_copy.unwrap_or(child), page_break, forced)
    }

    fn split_row_group(
        &mut self,
        group: BoxId,
        child: BoxId,
        page_break: bool,
        forced: bool,
    ) -> Result<(), LayoutError> {
        let table = self.find_parent_table(group)?;
        self.forget_from(table, child)?;
        if self.tree[group].first_child == Some(child) {
            self.forget_table_part(table, group)?;
            return self.split(group, None, page_break, forced);
        }
        self.split_block(group, child, page_break, forced)
    }

    /// Drop `from` and its later siblings from the grid of `table`.
    fn forget_from(&mut self, table: BoxId, from: BoxId) -> Result<(), LayoutError> {
        for part in self.tree.siblings_from(from) {
            self.forget_table_part(table, part)?;
        }
        Ok(())
    }

    /// Return a subtree to its unlaid state before it is laid out again on
    /// another page. Split and push markers survive.
    ///
    /// # Errors
    ///
    /// Structural errors while removing generated content.
    pub fn reset(&mut self, id: BoxId) -> Result<(), LayoutError> {
        self.revert_counter_increments(id);
        for child in self.tree.children(id) {
            if self.tree[child].generated {
                self.tree.remove_child(id, child, true)?;
            } else {
                self.reset(child)?;
            }
        }

        let b = self.tree.get_mut(id)?;
        b.style = b.original_style.clone();
        b.containing_block = None;
        b.position = None;
        b.width = 0.0;
        b.height = 0.0;
        b.lines = vec![LineBox::default()];
        b.current_line = 0;
        b.counters.clear();
        b.content_set = false;
        b.min_max_cache = None;
        b.word_spacing = 0.0;
        b.bullet_text = None;
        if let Some(map) = b.cellmap.as_deref_mut() {
            map.reset();
        }
        Ok(())
    }
}
