//! The box tree: an arena of layout boxes over the document tree.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! "The following sections describe the types of boxes that may be generated
//! in CSS 2.1. A box's type affects, in part, its behavior in the visual
//! formatting model."
//!
//! Every [`LayoutBox`] refers to one DOM node and is linked to its parent,
//! children and siblings by [`BoxId`]. Structural edits made during layout
//! (splits, anonymous wrappers, generated content) can be mirrored into the
//! DOM so both trees keep the same shape.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use folio_common::ImageInfo;
use folio_dom::{DomTree, NodeId};
use serde::Serialize;

use super::box_model::{BoxDimensions, Point, Rect};
use super::line::LineBox;
use super::reflow::{self, Positioner, Reflower};
use super::table::Cellmap;
use crate::error::LayoutError;
use crate::style::Style;
use crate::style::values::{DisplayValue, ListStylePosition, Position};

/// Index of a box in its [`BoxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BoxId(pub usize);

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// "The position and size of an element's box(es) are sometimes computed
/// relative to a certain rectangle, called the containing block of the
/// element."
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ContainingBlock {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width; percentages of horizontal properties resolve against it.
    pub w: f32,
    /// Height still available.
    pub h: f32,
}

/// What a box is, and therefore which positioner and reflower lay it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LayoutKind {
    /// The document element; each of its continuations is one page.
    Page,
    /// Block container.
    Block,
    /// Inline element.
    Inline,
    /// Text run.
    Text,
    /// `<br>`.
    LineBreak,
    /// Replaced image.
    Image,
    /// `display: list-item`.
    ListItem,
    /// Marker box of a list item.
    ListBullet,
    /// `display: table` or `inline-table`.
    Table,
    /// Header, body or footer row group.
    TableRowGroup,
    /// `display: table-row`.
    TableRow,
    /// `display: table-cell`.
    TableCell,
    /// `::before` or `::after` content holder.
    Generated,
}

impl LayoutKind {
    /// Kinds that own line boxes.
    #[must_use]
    pub const fn is_block_container(self) -> bool {
        matches!(self, Self::Block | Self::ListItem | Self::TableCell)
    }

    /// Kinds that are part of a table's grid.
    #[must_use]
    pub const fn is_table_part(self) -> bool {
        matches!(self, Self::TableRowGroup | Self::TableRow | Self::TableCell)
    }

    /// Kinds whose boxes are placed on line boxes.
    #[must_use]
    pub const fn is_inline_content(self) -> bool {
        matches!(self, Self::Inline | Self::Text | Self::LineBreak | Self::Image)
    }
}

/// One box of the tree.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    /// The DOM node this box lays out.
    pub node: NodeId,
    /// Box kind.
    pub kind: LayoutKind,
    /// Used style. Layout writes resolved widths and margins into it.
    pub style: Style,
    /// The style as built, restored by [`reset`](crate::layout::split).
    pub original_style: Style,

    /// Parent box.
    pub parent: Option<BoxId>,
    /// First child.
    pub first_child: Option<BoxId>,
    /// Last child.
    pub last_child: Option<BoxId>,
    /// Previous sibling.
    pub prev_sibling: Option<BoxId>,
    /// Next sibling.
    pub next_sibling: Option<BoxId>,

    /// Set by the parent before this box is reflowed.
    pub containing_block: Option<ContainingBlock>,
    /// Top-left corner of the margin box, once positioned.
    pub position: Option<Point>,
    /// Content width.
    pub width: f32,
    /// Content height.
    pub height: f32,

    /// Line boxes of a block container.
    pub lines: Vec<LineBox>,
    /// Index of the line being filled.
    pub current_line: usize,

    /// Counters scoped to this box.
    pub counters: BTreeMap<String, i32>,
    /// Counter values carried over to a continuation box in place of its
    /// `counter-reset` values.
    pub saved_resets: BTreeMap<String, i32>,
    /// `(holder, counter, amount)` of every increment this box applied.
    pub applied_increments: Vec<(BoxId, String, i32)>,
    /// Whether counters and generated content were applied in this layout.
    pub content_set: bool,

    /// Cached minimum and maximum widths.
    pub min_max_cache: Option<(f32, f32)>,
    /// Extra word spacing from justification.
    pub word_spacing: f32,
    /// Grid of a table box.
    pub cellmap: Option<Box<Cellmap>>,
    /// Image of an image box or image bullet.
    pub image: Option<ImageInfo>,
    /// Marker text of a counter-style bullet.
    pub bullet_text: Option<String>,
    /// Synthetic content created during layout, removed on reset.
    pub generated: bool,
    /// Whether this box is a continuation made by a split.
    pub is_split: bool,
    /// Set on the box a page break was taken before, so the same break is
    /// not evaluated twice.
    pub already_pushed: bool,

    /// Placement strategy.
    pub positioner: &'static dyn Positioner,
    /// Layout strategy.
    pub reflower: &'static dyn Reflower,
}

impl LayoutBox {
    /// A fresh box with strategies chosen from `kind` and `style`.
    #[must_use]
    pub fn new(node: NodeId, kind: LayoutKind, style: Style) -> Self {
        let (positioner, reflower) = reflow::strategies_for(kind, &style);
        Self {
            node,
            kind,
            original_style: style.clone(),
            style,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            containing_block: None,
            position: None,
            width: 0.0,
            height: 0.0,
            lines: vec![LineBox::default()],
            current_line: 0,
            counters: BTreeMap::new(),
            saved_resets: BTreeMap::new(),
            applied_increments: Vec::new(),
            content_set: false,
            min_max_cache: None,
            word_spacing: 0.0,
            cellmap: None,
            image: None,
            bullet_text: None,
            generated: false,
            is_split: false,
            already_pushed: false,
            positioner,
            reflower,
        }
    }

    /// The containing block.
    ///
    /// # Errors
    ///
    /// [`LayoutError::MissingContainingBlock`] before the parent assigned one.
    pub fn cb(&self, id: BoxId, context: &'static str) -> Result<ContainingBlock, LayoutError> {
        self.containing_block
            .ok_or(LayoutError::MissingContainingBlock(id, context))
    }

    /// Whether this box holds line boxes.
    #[must_use]
    pub fn is_block_container(&self) -> bool {
        self.kind.is_block_container()
            || (self.kind == LayoutKind::Generated && self.style.display.is_block_level())
    }

    /// Block-level boxes stack vertically in their parent.
    #[must_use]
    pub fn is_block_level(&self) -> bool {
        match self.kind {
            LayoutKind::Block | LayoutKind::ListItem | LayoutKind::Page => {
                !matches!(self.style.display, DisplayValue::InlineBlock)
            }
            LayoutKind::Table => self.style.display != DisplayValue::InlineTable,
            LayoutKind::Generated => self.style.display.is_block_level(),
            _ => false,
        }
    }

    /// Absolutely or fixed positioned.
    #[must_use]
    pub fn is_out_of_flow(&self) -> bool {
        self.style.position.is_out_of_flow()
    }

    /// Takes part in normal flow.
    #[must_use]
    pub fn is_in_flow(&self) -> bool {
        !self.is_out_of_flow()
    }

    /// `position` other than `static`.
    #[must_use]
    pub fn is_positioned(&self) -> bool {
        self.style.position != Position::Static
    }

    /// A marker placed inside the first line.
    #[must_use]
    pub fn is_inside_bullet(&self) -> bool {
        self.kind == LayoutKind::ListBullet
            && self.style.list_style_position == ListStylePosition::Inside
    }

    /// Box dimensions from the used style and geometry.
    #[must_use]
    pub fn dimensions(&self) -> BoxDimensions {
        BoxDimensions::from_style(
            &self.style,
            self.position.unwrap_or_default(),
            self.width,
            self.height,
            self.containing_block.map(|cb| cb.w),
        )
    }

    /// [§ 8.1](https://www.w3.org/TR/CSS2/box.html#box-dimensions) margin box.
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        self.dimensions().margin_box()
    }

    /// Border box.
    #[must_use]
    pub fn border_box(&self) -> Rect {
        self.dimensions().border_box()
    }

    /// Padding box.
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        self.dimensions().padding_box()
    }

    /// Content box.
    #[must_use]
    pub fn content_box(&self) -> Rect {
        self.dimensions().content
    }

    /// Left and right margins, borders and paddings.
    #[must_use]
    pub fn horizontal_edges(&self) -> f32 {
        let d = self.dimensions();
        d.margin.horizontal() + d.border.horizontal() + d.padding.horizontal()
    }

    /// Top and bottom margins, borders and paddings.
    #[must_use]
    pub fn vertical_edges(&self) -> f32 {
        let d = self.dimensions();
        d.margin.vertical() + d.border.vertical() + d.padding.vertical()
    }

    /// The line being filled.
    #[must_use]
    pub fn line(&self) -> &LineBox {
        &self.lines[self.current_line]
    }

    /// The line being filled.
    pub fn line_mut(&mut self) -> &mut LineBox {
        &mut self.lines[self.current_line]
    }
}

/// Arena of boxes plus the DOM they lay out.
#[derive(Debug)]
pub struct BoxTree {
    dom: DomTree,
    boxes: Vec<LayoutBox>,
    root: Option<BoxId>,
}

impl Index<BoxId> for BoxTree {
    type Output = LayoutBox;

    fn index(&self, id: BoxId) -> &LayoutBox {
        &self.boxes[id.0]
    }
}

impl IndexMut<BoxId> for BoxTree {
    fn index_mut(&mut self, id: BoxId) -> &mut LayoutBox {
        &mut self.boxes[id.0]
    }
}

impl BoxTree {
    /// An empty tree over `dom`.
    #[must_use]
    pub const fn new(dom: DomTree) -> Self {
        Self {
            dom,
            boxes: Vec::new(),
            root: None,
        }
    }

    /// The underlying document.
    #[must_use]
    pub const fn dom(&self) -> &DomTree {
        &self.dom
    }

    /// The underlying document, mutably.
    pub const fn dom_mut(&mut self) -> &mut DomTree {
        &mut self.dom
    }

    /// The root box, if one was set.
    #[must_use]
    pub const fn root(&self) -> Option<BoxId> {
        self.root
    }

    /// Make `id` the root box.
    pub const fn set_root(&mut self, id: BoxId) {
        self.root = Some(id);
    }

    /// Number of boxes ever allocated, attached or not.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether no box was allocated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Checked access.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownBox`] for ids outside the arena.
    pub fn get(&self, id: BoxId) -> Result<&LayoutBox, LayoutError> {
        self.boxes.get(id.0).ok_or(LayoutError::UnknownBox(id))
    }

    /// Checked mutable access.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownBox`] for ids outside the arena.
    pub fn get_mut(&mut self, id: BoxId) -> Result<&mut LayoutBox, LayoutError> {
        self.boxes.get_mut(id.0).ok_or(LayoutError::UnknownBox(id))
    }

    /// Store a detached box.
    pub fn alloc(&mut self, layout_box: LayoutBox) -> BoxId {
        let id = BoxId(self.boxes.len());
        self.boxes.push(layout_box);
        id
    }

    // ===== navigation =====

    /// Parent box.
    #[must_use]
    pub fn parent(&self, id: BoxId) -> Option<BoxId> {
        self[id].parent
    }

    /// Children in order.
    #[must_use]
    pub fn children(&self, id: BoxId) -> Vec<BoxId> {
        let mut children = Vec::new();
        let mut child = self[id].first_child;
        while let Some(c) = child {
            children.push(c);
            child = self[c].next_sibling;
        }
        children
    }

    /// `id` followed by every later sibling.
    #[must_use]
    pub fn siblings_from(&self, id: BoxId) -> Vec<BoxId> {
        let mut result = vec![id];
        let mut next = self[id].next_sibling;
        while let Some(n) = next {
            result.push(n);
            next = self[n].next_sibling;
        }
        result
    }

    /// Ancestors from the parent up.
    pub fn ancestors(&self, id: BoxId) -> impl Iterator<Item = BoxId> + '_ {
        std::iter::successors(self[id].parent, |&p| self[p].parent)
    }

    /// Whether `ancestor` is a proper ancestor of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: BoxId, id: BoxId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Text of a text box.
    #[must_use]
    pub fn text(&self, id: BoxId) -> &str {
        self.dom.as_text(self[id].node).unwrap_or("")
    }

    /// Replace the text of a text box.
    ///
    /// # Errors
    ///
    /// [`LayoutError::Dom`] when the box does not lay out a text node.
    pub fn set_text(&mut self, id: BoxId, text: &str) -> Result<(), LayoutError> {
        let node = self[id].node;
        self.dom.set_text(node, text)?;
        Ok(())
    }

    /// Tag of the element behind a box.
    #[must_use]
    pub fn tag_name(&self, id: BoxId) -> Option<&str> {
        self.dom.tag_name(self[id].node)
    }

    // ===== structural edits =====

    fn unlink(&mut self, child: BoxId) {
        let Some(parent) = self[child].parent else {
            return;
        };
        let prev = self[child].prev_sibling;
        let next = self[child].next_sibling;
        match prev {
            Some(p) => self[p].next_sibling = next,
            None => self[parent].first_child = next,
        }
        match next {
            Some(n) => self[n].prev_sibling = prev,
            None => self[parent].last_child = prev,
        }
        let c = &mut self[child];
        c.parent = None;
        c.prev_sibling = None;
        c.next_sibling = None;
    }

    fn check_child(&self, parent: BoxId, child: BoxId) -> Result<(), LayoutError> {
        let _ = self.get(parent)?;
        if self.get(child)?.parent == Some(parent) {
            Ok(())
        } else {
            Err(LayoutError::NotAChild { parent, child })
        }
    }

    /// Insert `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownBox`] for ids outside the arena.
    pub fn append_child(
        &mut self,
        parent: BoxId,
        child: BoxId,
        update_dom: bool,
    ) -> Result<(), LayoutError> {
        let _ = self.get(parent)?;
        let _ = self.get(child)?;
        self.unlink(child);
        let last = self[parent].last_child;
        {
            let c = &mut self[child];
            c.parent = Some(parent);
            c.prev_sibling = last;
        }
        match last {
            Some(l) => self[l].next_sibling = Some(child),
            None => self[parent].first_child = Some(child),
        }
        self[parent].last_child = Some(child);

        if update_dom {
            let (p, c) = (self[parent].node, self[child].node);
            self.dom.append_child(p, c);
        }
        Ok(())
    }

    /// Insert `child` as the first child of `parent`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownBox`] for ids outside the arena.
    pub fn prepend_child(
        &mut self,
        parent: BoxId,
        child: BoxId,
        update_dom: bool,
    ) -> Result<(), LayoutError> {
        let _ = self.get(parent)?;
        let _ = self.get(child)?;
        self.unlink(child);
        let first = self[parent].first_child;
        {
            let c = &mut self[child];
            c.parent = Some(parent);
            c.next_sibling = first;
        }
        match first {
            Some(f) => self[f].prev_sibling = Some(child),
            None => self[parent].last_child = Some(child),
        }
        self[parent].first_child = Some(child);

        if update_dom {
            let (p, c) = (self[parent].node, self[child].node);
            self.dom.prepend_child(p, c);
        }
        Ok(())
    }

    /// Insert `child` immediately before `reference`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] when `reference` is not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: BoxId,
        child: BoxId,
        reference: BoxId,
        update_dom: bool,
    ) -> Result<(), LayoutError> {
        self.check_child(parent, reference)?;
        if child == reference {
            return Ok(());
        }
        self.unlink(child);
        let prev = self[reference].prev_sibling;
        {
            let c = &mut self[child];
            c.parent = Some(parent);
            c.prev_sibling = prev;
            c.next_sibling = Some(reference);
        }
        match prev {
            Some(p) => self[p].next_sibling = Some(child),
            None => self[parent].first_child = Some(child),
        }
        self[reference].prev_sibling = Some(child);

        if update_dom {
            self.mirror_insert(parent, child, reference, true)?;
        }
        Ok(())
    }

    /// Insert `child` immediately after `reference`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] when `reference` is not a child of `parent`.
    pub fn insert_after(
        &mut self,
        parent: BoxId,
        child: BoxId,
        reference: BoxId,
        update_dom: bool,
    ) -> Result<(), LayoutError> {
        self.check_child(parent, reference)?;
        if child == reference {
            return Ok(());
        }
        self.unlink(child);
        let next = self[reference].next_sibling;
        {
            let c = &mut self[child];
            c.parent = Some(parent);
            c.prev_sibling = Some(reference);
            c.next_sibling = next;
        }
        match next {
            Some(n) => self[n].prev_sibling = Some(child),
            None => self[parent].last_child = Some(child),
        }
        self[reference].next_sibling = Some(child);

        if update_dom {
            self.mirror_insert(parent, child, reference, false)?;
        }
        Ok(())
    }

    /// Mirror an insertion next to `reference` into the DOM. The boxes of an
    /// anonymous wrapper may sit under a different DOM parent, in which case
    /// the node is appended to the parent's node instead.
    fn mirror_insert(
        &mut self,
        parent: BoxId,
        child: BoxId,
        reference: BoxId,
        before: bool,
    ) -> Result<(), LayoutError> {
        let (p, c, r) = (self[parent].node, self[child].node, self[reference].node);
        if self.dom.parent(r) == Some(p) {
            if before {
                self.dom.insert_before(p, c, r)?;
            } else {
                self.dom.insert_after(p, c, r)?;
            }
        } else {
            self.dom.append_child(p, c);
        }
        Ok(())
    }

    /// Detach `child` from `parent`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NotAChild`] when `child` is not a child of `parent`.
    pub fn remove_child(
        &mut self,
        parent: BoxId,
        child: BoxId,
        update_dom: bool,
    ) -> Result<(), LayoutError> {
        self.check_child(parent, child)?;
        self.unlink(child);
        if update_dom {
            let (p, c) = (self[parent].node, self[child].node);
            if self.dom.parent(c) == Some(p) {
                self.dom.remove_child(p, c)?;
            }
        }
        Ok(())
    }

    /// Shallow copy of a box: a cloned DOM node, the original style and the
    /// same strategies. The copy is detached and unlaid.
    pub fn clone_box(&mut self, id: BoxId) -> BoxId {
        let node = self.dom.clone_node(self[id].node);
        let source = &self[id];
        let mut copy = LayoutBox::new(node, source.kind, source.original_style.clone());
        copy.image.clone_from(&source.image);
        copy.positioner = source.positioner;
        copy.reflower = source.reflower;
        self.alloc(copy)
    }

    /// Copy of the subtree rooted at `id`, returned detached.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownBox`] for ids outside the arena.
    pub fn deep_clone(&mut self, id: BoxId) -> Result<BoxId, LayoutError> {
        let copy = self.clone_box(id);
        for child in self.children(id) {
            if self[child].generated {
                continue;
            }
            let child_copy = self.deep_clone(child)?;
            self.append_child(copy, child_copy, true)?;
        }
        Ok(copy)
    }

    /// Shift a laid out subtree, including its line boxes.
    pub fn move_box(&mut self, id: BoxId, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let b = &mut self[id];
        if let Some(position) = &mut b.position {
            position.x += dx;
            position.y += dy;
        }
        for line in &mut b.lines {
            line.y += dy;
        }
        for child in self.children(id) {
            self.move_box(child, dx, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(children: usize) -> (BoxTree, BoxId, Vec<BoxId>) {
        let mut dom = DomTree::new();
        let div = dom.create_element("div");
        dom.append_child(NodeId::ROOT, div);
        let mut tree = BoxTree::new(dom);
        let parent = tree.alloc(LayoutBox::new(div, LayoutKind::Block, Style::default()));
        let mut ids = Vec::new();
        for _ in 0..children {
            let node = tree.dom_mut().create_element("p");
            let id = tree.alloc(LayoutBox::new(node, LayoutKind::Block, Style::default()));
            tree.append_child(parent, id, true).unwrap();
            ids.push(id);
        }
        (tree, parent, ids)
    }

    #[test]
    fn test_append_links_siblings() {
        let (tree, parent, ids) = tree_with(3);
        assert_eq!(tree.children(parent), ids);
        assert_eq!(tree[ids[1]].prev_sibling, Some(ids[0]));
        assert_eq!(tree[ids[1]].next_sibling, Some(ids[2]));
        assert_eq!(tree.dom().children(tree[parent].node).len(), 3);
    }

    #[test]
    fn test_insert_and_remove_mirror_dom() {
        let (mut tree, parent, ids) = tree_with(2);
        let node = tree.dom_mut().create_element("span");
        let extra = tree.alloc(LayoutBox::new(node, LayoutKind::Inline, Style::default()));
        tree.insert_after(parent, extra, ids[0], true).unwrap();
        assert_eq!(tree.children(parent), vec![ids[0], extra, ids[1]]);
        assert_eq!(tree.dom().children(tree[parent].node)[1], node);

        tree.remove_child(parent, ids[0], true).unwrap();
        assert_eq!(tree.children(parent), vec![extra, ids[1]]);
        assert_eq!(tree.dom().children(tree[parent].node).len(), 2);
        assert_eq!(tree[extra].prev_sibling, None);
    }

    #[test]
    fn test_reference_must_be_a_child() {
        let (mut tree, parent, ids) = tree_with(2);
        let err = tree.insert_before(ids[0], parent, ids[1], false).unwrap_err();
        assert!(matches!(err, LayoutError::NotAChild { .. }));
        assert!(matches!(
            tree.remove_child(ids[0], ids[1], false),
            Err(LayoutError::NotAChild { .. })
        ));
    }

    #[test]
    fn test_prepend_and_move() {
        let (mut tree, parent, ids) = tree_with(2);
        tree.prepend_child(parent, ids[1], false).unwrap();
        assert_eq!(tree.children(parent), vec![ids[1], ids[0]]);
        tree[ids[1]].position = Some(Point { x: 1.0, y: 2.0 });
        tree.move_box(parent, 3.0, 4.0);
        assert_eq!(tree[ids[1]].position, Some(Point { x: 4.0, y: 6.0 }));
    }

    #[test]
    fn test_deep_clone_copies_subtree() {
        let (mut tree, parent, _) = tree_with(3);
        let copy = tree.deep_clone(parent).unwrap();
        assert_eq!(tree.children(copy).len(), 3);
        assert_ne!(tree[copy].node, tree[parent].node);
        assert_eq!(tree[copy].parent, None);
    }
}
