//! Box tree construction.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! "The display property, determines the type of box or boxes that are
//! generated for an element."
//!
//! The document element becomes the page box and its body the content of
//! the first page. Below that every element produces one box chosen from
//! its `display` (with `<br>` and `<img>` special cased), list items get a
//! marker, `::before` and `::after` styles get generated boxes, and text
//! nodes become text boxes unless they are collapsible white space the
//! layout would drop anyway.

use std::rc::Rc;

use folio_common::{ImageInfo, Warnings};
use folio_dom::{DomTree, NodeId, NodeType};

use super::box_tree::{BoxId, BoxTree, LayoutBox, LayoutKind};
use super::context::ImageResolver;
use crate::error::LayoutError;
use crate::style::values::{DisplayValue, ListStyleType};
use crate::style::{Style, StyleMap};

/// Build the box tree of a document.
///
/// A document without a `<body>` gets one holding the children of the
/// document element. Unreadable images are replaced by the broken-image
/// placeholder and reported in `warnings`.
///
/// # Errors
///
/// [`LayoutError::InvalidTree`] for a document without an element.
pub fn build_box_tree(
    mut dom: DomTree,
    styles: &StyleMap,
    images: &dyn ImageResolver,
    warnings: &mut Warnings,
) -> Result<BoxTree, LayoutError> {
    let html = dom
        .document_element()
        .ok_or_else(|| LayoutError::InvalidTree("document has no root element".to_string()))?;
    let body = if let Some(body) = dom.body() {
        body
    } else {
        let body = dom.create_element("body");
        dom.move_children(html, body);
        dom.append_child(html, body);
        log::debug!("document has no body, wrapped the content of the root element");
        body
    };

    let mut builder = Builder {
        tree: BoxTree::new(dom),
        styles,
        images,
        warnings,
    };

    let mut root_style = styles
        .get(html)
        .map_or_else(|| Style::new(Rc::clone(styles.context())), |s| s.style.clone());
    root_style.display = DisplayValue::Block;
    let page = builder.tree.alloc(LayoutBox::new(html, LayoutKind::Page, root_style));
    builder.tree.set_root(page);

    let mut body_style = builder.element_styles(page, body).0;
    if !body_style.display.is_block_level() {
        body_style.display = DisplayValue::Block;
    }
    let body_box = builder.tree.alloc(LayoutBox::new(body, LayoutKind::Block, body_style));
    builder.tree.append_child(page, body_box, false)?;
    builder.build_children(body_box, body)?;

    log::debug!("built {} boxes", builder.tree.len());
    Ok(builder.tree)
}

/// Box kind for a `display` value; columns generate no boxes.
#[must_use]
pub const fn kind_for_display(display: DisplayValue) -> Option<LayoutKind> {
    match display {
        DisplayValue::Block | DisplayValue::InlineBlock | DisplayValue::TableCaption => {
            Some(LayoutKind::Block)
        }
        DisplayValue::ListItem => Some(LayoutKind::ListItem),
        DisplayValue::Inline => Some(LayoutKind::Inline),
        DisplayValue::Table | DisplayValue::InlineTable => Some(LayoutKind::Table),
        DisplayValue::TableRowGroup
        | DisplayValue::TableHeaderGroup
        | DisplayValue::TableFooterGroup => Some(LayoutKind::TableRowGroup),
        DisplayValue::TableRow => Some(LayoutKind::TableRow),
        DisplayValue::TableCell => Some(LayoutKind::TableCell),
        DisplayValue::TableColumn | DisplayValue::TableColumnGroup | DisplayValue::None => None,
    }
}

struct Builder<'a> {
    tree: BoxTree,
    styles: &'a StyleMap,
    images: &'a dyn ImageResolver,
    warnings: &'a mut Warnings,
}

impl Builder<'_> {
    fn element_styles(&self, parent: BoxId, node: NodeId) -> (Style, Option<Style>, Option<Style>) {
        self.styles.get(node).map_or_else(
            || (Style::anonymous(&self.tree[parent].style), None, None),
            |s| (s.style.clone(), s.before.clone(), s.after.clone()),
        )
    }

    fn display_of(&self, node: NodeId) -> Option<DisplayValue> {
        self.tree.dom().as_element(node)?;
        Some(self.styles.get(node).map_or(DisplayValue::Inline, |s| s.style.display))
    }

    fn build_children(&mut self, parent: BoxId, node: NodeId) -> Result<(), LayoutError> {
        let children = self.tree.dom().children(node).to_vec();
        for (index, &child) in children.iter().enumerate() {
            let Some(dom_node) = self.tree.dom().get(child) else {
                continue;
            };
            match &dom_node.node_type {
                NodeType::Element(_) => self.build_element(parent, child)?,
                NodeType::Text(data) => {
                    if self.keeps_text(parent, &children, index, data) {
                        let style = Style::anonymous(&self.tree[parent].style);
                        let id = self.tree.alloc(LayoutBox::new(child, LayoutKind::Text, style));
                        self.tree.append_child(parent, id, false)?;
                    }
                }
                NodeType::Comment(_) | NodeType::Document => {}
            }
        }
        Ok(())
    }

    /// [§ 16.6.1](https://www.w3.org/TR/CSS2/text.html#white-space-model)
    ///
    /// White space next to block-level siblings, at the edges of a block
    /// and inside table structure never produces visible content.
    fn keeps_text(&self, parent: BoxId, siblings: &[NodeId], index: usize, data: &str) -> bool {
        let p = &self.tree[parent];
        if matches!(
            p.kind,
            LayoutKind::Table | LayoutKind::TableRowGroup | LayoutKind::TableRow
        ) {
            return !data.trim().is_empty();
        }
        if !data.chars().all(char::is_whitespace) || p.style.white_space.preserves_spaces() {
            return !data.is_empty();
        }

        let is_block = |node: &NodeId| {
            self.display_of(*node)
                .is_some_and(|d| !d.is_inline_level() && d != DisplayValue::None)
        };
        let previous = siblings[..index]
            .iter()
            .rev()
            .find(|&&n| !self.is_comment(n));
        let next = siblings[index + 1..].iter().find(|&&n| !self.is_comment(n));
        let at_block_edge = p.is_block_container() && (previous.is_none() || next.is_none());
        !(at_block_edge || previous.is_some_and(is_block) || next.is_some_and(is_block))
    }

    fn is_comment(&self, node: NodeId) -> bool {
        self.tree
            .dom()
            .get(node)
            .is_some_and(|n| matches!(n.node_type, NodeType::Comment(_)))
    }

    fn build_element(&mut self, parent: BoxId, node: NodeId) -> Result<(), LayoutError> {
        let (style, before, after) = self.element_styles(parent, node);
        if style.display == DisplayValue::None {
            return Ok(());
        }
        let tag = self
            .tree
            .dom()
            .tag_name(node)
            .unwrap_or_default()
            .to_ascii_lowercase();
        let kind = match tag.as_str() {
            "br" => LayoutKind::LineBreak,
            "img" => LayoutKind::Image,
            _ => match kind_for_display(style.display) {
                Some(kind) => kind,
                None => return Ok(()),
            },
        };

        let image = (kind == LayoutKind::Image).then(|| {
            let src = self.tree.dom().get_attribute(node, "src").map(str::to_string);
            match src {
                Some(src) => {
                    let url = style.context().base_url.resolve(&src);
                    self.resolve_image(&url)
                }
                None => {
                    let _ = self.warnings.warn_once("Image", "<img> without a src attribute");
                    ImageInfo::broken()
                }
            }
        });

        let mut layout_box = LayoutBox::new(node, kind, style);
        layout_box.image = image;
        let id = self.tree.alloc(layout_box);
        self.tree.append_child(parent, id, false)?;

        if matches!(kind, LayoutKind::LineBreak | LayoutKind::Image) {
            return Ok(());
        }
        if kind == LayoutKind::ListItem {
            self.add_bullet(id)?;
        }
        if let Some(style) = before {
            self.add_generated(id, style, "::before")?;
        }
        self.build_children(id, node)?;
        if let Some(style) = after {
            self.add_generated(id, style, "::after")?;
        }
        if kind == LayoutKind::Table {
            self.move_footers_last(id)?;
        }
        Ok(())
    }

    fn resolve_image(&mut self, url: &str) -> ImageInfo {
        match self.images.resolve(url) {
            Ok(info) => info,
            Err(err) => {
                let _ = self.warnings.warn_once("Image", err.to_string());
                ImageInfo::broken()
            }
        }
    }

    /// [§ 12.5 Lists](https://www.w3.org/TR/CSS2/generate.html#lists)
    fn add_bullet(&mut self, item: BoxId) -> Result<(), LayoutError> {
        let style = Style::anonymous(&self.tree[item].style);
        let image = style.list_style_image.clone();
        if style.list_style_type == ListStyleType::None && image.is_none() {
            return Ok(());
        }
        let node = self.tree.dom_mut().create_element("::marker");
        let mut bullet = LayoutBox::new(node, LayoutKind::ListBullet, style);
        bullet.image = image.map(|url| self.resolve_image(&url));
        let id = self.tree.alloc(bullet);
        self.tree.prepend_child(item, id, false)
    }

    /// [§ 12.1](https://www.w3.org/TR/CSS2/generate.html#before-after-content)
    fn add_generated(&mut self, owner: BoxId, style: Style, pseudo: &str) -> Result<(), LayoutError> {
        let node = self.tree.dom_mut().create_element(pseudo);
        let id = self.tree.alloc(LayoutBox::new(node, LayoutKind::Generated, style));
        if pseudo == "::before" {
            self.tree.prepend_child(owner, id, false)
        } else {
            self.tree.append_child(owner, id, false)
        }
    }

    /// [§ 17.2](https://www.w3.org/TR/CSS2/tables.html#table-display)
    /// "table-footer-group ... is always displayed after all other rows and
    /// rowgroups".
    fn move_footers_last(&mut self, table: BoxId) -> Result<(), LayoutError> {
        let footers: Vec<BoxId> = self
            .tree
            .children(table)
            .into_iter()
            .filter(|&c| self.tree[c].style.display == DisplayValue::TableFooterGroup)
            .collect();
        for footer in footers {
            self.tree.remove_child(table, footer, false)?;
            self.tree.append_child(table, footer, false)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::layout::context::NoImages;
    use crate::style::{ElementDeclarations, StylesheetContext};

    fn element(dom: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
        let node = dom.create_element(tag);
        dom.append_child(parent, node);
        node
    }

    fn text(dom: &mut DomTree, parent: NodeId, data: &str) -> NodeId {
        let node = dom.create_text(data);
        dom.append_child(parent, node);
        node
    }

    fn build(dom: DomTree, declarations: &HashMap<NodeId, ElementDeclarations>) -> (BoxTree, Warnings) {
        let mut warnings = Warnings::new();
        let styles = StyleMap::from_declarations(
            &dom,
            declarations,
            Rc::new(StylesheetContext::default()),
            &mut warnings,
        );
        let tree = build_box_tree(dom, &styles, &NoImages, &mut warnings).unwrap();
        (tree, warnings)
    }

    #[test]
    fn test_kinds_and_white_space() {
        let mut dom = DomTree::new();
        let html = element(&mut dom, NodeId::ROOT, "html");
        let head = element(&mut dom, html, "head");
        let _ = element(&mut dom, head, "title");
        let body = element(&mut dom, html, "body");
        let _ = text(&mut dom, body, "\n  ");
        let p = element(&mut dom, body, "p");
        let _ = text(&mut dom, p, "Hello ");
        let b = element(&mut dom, p, "b");
        let _ = text(&mut dom, b, "world");
        let _ = text(&mut dom, body, "\n");
        let ul = element(&mut dom, body, "ul");
        let li = element(&mut dom, ul, "li");
        let _ = text(&mut dom, li, "item");
        let _ = element(&mut dom, body, "br");

        let (tree, warnings) = build(dom, &HashMap::new());
        assert!(warnings.is_empty());

        let page = tree.root().unwrap();
        assert_eq!(tree[page].kind, LayoutKind::Page);
        let roots = tree.children(page);
        assert_eq!(roots.len(), 1);
        let kinds: Vec<LayoutKind> = tree.children(roots[0]).iter().map(|&c| tree[c].kind).collect();
        assert_eq!(kinds, vec![LayoutKind::Block, LayoutKind::Block, LayoutKind::LineBreak]);

        let p_box = tree.children(roots[0])[0];
        let p_kinds: Vec<LayoutKind> = tree.children(p_box).iter().map(|&c| tree[c].kind).collect();
        assert_eq!(p_kinds, vec![LayoutKind::Text, LayoutKind::Inline]);

        let ul_box = tree.children(roots[0])[1];
        let li_box = tree.children(ul_box)[0];
        assert_eq!(tree[li_box].kind, LayoutKind::ListItem);
        let marker = tree.children(li_box)[0];
        assert_eq!(tree[marker].kind, LayoutKind::ListBullet);
        assert_eq!(tree[marker].style.list_style_type, ListStyleType::Disc);
    }

    #[test]
    fn test_missing_body_and_broken_image() {
        let mut dom = DomTree::new();
        let html = element(&mut dom, NodeId::ROOT, "html");
        let img = element(&mut dom, html, "img");
        dom.set_attribute(img, "src", "missing.png").unwrap();

        let (tree, warnings) = build(dom, &HashMap::new());
        let page = tree.root().unwrap();
        let body = tree.children(page)[0];
        assert_eq!(tree.tag_name(body), Some("body"));
        let image = tree.children(body)[0];
        assert_eq!(tree[image].kind, LayoutKind::Image);
        assert_eq!(tree[image].image, Some(ImageInfo::broken()));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_generated_boxes_and_footer_order() {
        let mut dom = DomTree::new();
        let html = element(&mut dom, NodeId::ROOT, "html");
        let body = element(&mut dom, html, "body");
        let h1 = element(&mut dom, body, "h1");
        let _ = text(&mut dom, h1, "Title");
        let table = element(&mut dom, body, "table");
        let tfoot = element(&mut dom, table, "tfoot");
        let _ = text(&mut dom, table, "\n");
        let tbody = element(&mut dom, table, "tbody");
        let _ = element(&mut dom, tfoot, "tr");
        let _ = element(&mut dom, tbody, "tr");

        let mut declarations = HashMap::new();
        let _ = declarations.insert(
            h1,
            ElementDeclarations {
                before: vec![("content".into(), "\"Chapter \"".into(), false)],
                ..ElementDeclarations::default()
            },
        );
        let (tree, _) = build(dom, &declarations);
        let body_box = tree.children(tree.root().unwrap())[0];
        let children = tree.children(body_box);
        let h1_box = children[0];
        let first = tree.children(h1_box)[0];
        assert_eq!(tree[first].kind, LayoutKind::Generated);
        assert_eq!(tree[first].style.content.as_deref(), Some("\"Chapter \""));

        let groups = tree.children(children[1]);
        assert_eq!(groups.len(), 2);
        assert_eq!(tree.tag_name(groups[0]), Some("tbody"));
        assert_eq!(tree.tag_name(groups[1]), Some("tfoot"));
    }
}
