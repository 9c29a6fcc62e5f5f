//! Document-level style context and the per-element style map.

use std::collections::HashMap;
use std::rc::Rc;

use folio_common::{BaseUrl, Warnings};
use folio_dom::{DomTree, NodeId, NodeType};

use super::computed::Style;
use super::ua;

/// Settings every [`Style`] of one document shares.
///
/// Held behind an `Rc`; cloning a style only bumps the count.
#[derive(Debug, Clone, PartialEq)]
pub struct StylesheetContext {
    /// Location the document was loaded from, for relative `url()` values.
    pub base_url: BaseUrl,
    /// Pixels per inch used when converting `px` values.
    pub dpi: f32,
    /// Initial `font-size` in points; also the `medium` keyword.
    pub default_font_size: f32,
    /// Initial `font-family`.
    pub default_font_family: String,
}

impl Default for StylesheetContext {
    fn default() -> Self {
        Self {
            base_url: BaseUrl::default(),
            dpi: 96.0,
            default_font_size: 12.0,
            default_font_family: "serif".to_string(),
        }
    }
}

/// Styles attached to one element: its own and those of its `::before` and
/// `::after` pseudo-elements.
#[derive(Debug, Clone)]
pub struct ElementStyles {
    /// The element's style.
    pub style: Style,
    /// `::before` style, when one applies and has `content`.
    pub before: Option<Style>,
    /// `::after` style, when one applies and has `content`.
    pub after: Option<Style>,
}

/// A declaration block: `(name, value, important)` triples in cascade order.
pub type Declarations = Vec<(String, String, bool)>;

/// Author declarations for one element.
#[derive(Debug, Clone, Default)]
pub struct ElementDeclarations {
    /// Declarations for the element itself.
    pub style: Declarations,
    /// Declarations for `::before`.
    pub before: Declarations,
    /// Declarations for `::after`.
    pub after: Declarations,
}

/// Resolved styles for every element of a document.
#[derive(Debug, Clone)]
pub struct StyleMap {
    context: Rc<StylesheetContext>,
    entries: HashMap<NodeId, ElementStyles>,
}

impl StyleMap {
    /// An empty map.
    #[must_use]
    pub fn new(context: Rc<StylesheetContext>) -> Self {
        Self {
            context,
            entries: HashMap::new(),
        }
    }

    /// The shared context.
    #[must_use]
    pub fn context(&self) -> &Rc<StylesheetContext> {
        &self.context
    }

    /// Attach styles to an element.
    pub fn insert(&mut self, node: NodeId, styles: ElementStyles) {
        let _ = self.entries.insert(node, styles);
    }

    /// Styles of an element, if any were attached.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&ElementStyles> {
        self.entries.get(&node)
    }

    /// Compute styles for every element from per-element author declarations.
    ///
    /// This stands in for a cascade: for each element the user-agent defaults
    /// for its tag are applied first, then the author declarations, then the
    /// result inherits from the parent element. Problems with individual
    /// declarations are recorded in `warnings`.
    pub fn from_declarations(
        dom: &DomTree,
        declarations: &HashMap<NodeId, ElementDeclarations>,
        context: Rc<StylesheetContext>,
        warnings: &mut Warnings,
    ) -> Self {
        let mut map = Self::new(context);
        let root_style = Style::new(Rc::clone(&map.context));
        map.compute_children(dom, NodeId::ROOT, &root_style, declarations, warnings);
        map
    }

    fn compute_children(
        &mut self,
        dom: &DomTree,
        parent: NodeId,
        parent_style: &Style,
        declarations: &HashMap<NodeId, ElementDeclarations>,
        warnings: &mut Warnings,
    ) {
        for &child in dom.children(parent) {
            let Some(node) = dom.get(child) else { continue };
            let NodeType::Element(element) = &node.node_type else {
                continue;
            };

            let own = declarations.get(&child);
            let mut style = Style::new(Rc::clone(&self.context));
            for (name, value) in ua::defaults_for(&element.tag_name, dom, child) {
                style.set_declaration(name, &value, false, warnings);
            }
            if let Some(own) = own {
                for (name, value, important) in &own.style {
                    style.set_declaration(name, value, *important, warnings);
                }
            }
            style.inherit(parent_style);

            let pseudo = |decls: &Declarations, warnings: &mut Warnings| -> Option<Style> {
                if decls.is_empty() {
                    return None;
                }
                let mut pseudo = Style::new(Rc::clone(&self.context));
                for (name, value, important) in decls {
                    pseudo.set_declaration(name, value, *important, warnings);
                }
                pseudo.inherit(&style);
                pseudo.content.is_some().then_some(pseudo)
            };
            let before = own.and_then(|o| pseudo(&o.before, warnings));
            let after = own.and_then(|o| pseudo(&o.after, warnings));

            self.compute_children(dom, child, &style, declarations, warnings);
            self.insert(child, ElementStyles { style, before, after });
        }
    }
}
