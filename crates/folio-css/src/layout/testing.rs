//! Small documents for the layout unit tests.

use std::collections::HashMap;

use folio_common::BaseUrl;
use folio_dom::{DomTree, NodeId};

use super::box_tree::{BoxId, LayoutKind};
use super::context::{ApproximateFontMetrics, NoImages};
use super::document::{LayoutResult, layout_with_declarations};
use crate::config::{LayoutConfig, PageMargins};
use crate::style::{ElementDeclarations, FontRegistry};

/// `html > body` plus the declarations of each element.
pub struct TestDocument {
    pub dom: DomTree,
    pub body: NodeId,
    declarations: HashMap<NodeId, ElementDeclarations>,
}

impl TestDocument {
    pub fn empty() -> Self {
        let mut dom = DomTree::new();
        let html = dom.create_element("html");
        dom.append_child(NodeId::ROOT, html);
        let body = dom.create_element("body");
        dom.append_child(html, body);
        Self {
            dom,
            body,
            declarations: HashMap::new(),
        }
    }

    pub fn element(&mut self, parent: NodeId, tag: &str, style: &[(&str, &str)]) -> NodeId {
        let node = self.dom.create_element(tag);
        self.dom.append_child(parent, node);
        if !style.is_empty() {
            self.declarations.entry(node).or_default().style = style
                .iter()
                .map(|&(name, value)| (name.to_string(), value.to_string(), false))
                .collect();
        }
        node
    }

    pub fn text(&mut self, parent: NodeId, text: &str) {
        let node = self.dom.create_text(text);
        self.dom.append_child(parent, node);
    }

    /// Lay out on a 700pt × 400pt page with 50pt margins.
    pub fn layout(self) -> LayoutResult {
        let config = LayoutConfig {
            page_size: Some((700.0, 400.0)),
            margins: PageMargins::uniform(50.0),
            ..LayoutConfig::default()
        };
        layout_with_declarations(
            self.dom,
            &self.declarations,
            BaseUrl::default(),
            &config,
            &FontRegistry::with_core_fonts("times"),
            &ApproximateFontMetrics::default(),
            &NoImages,
        )
        .expect("layout should succeed")
    }
}

/// Every box of every page, in document order.
pub fn all_boxes(result: &LayoutResult) -> Vec<BoxId> {
    result
        .pages
        .iter()
        .flat_map(|page| result.page_boxes(page))
        .collect()
}

/// The first box generated for `node`.
pub fn box_of(result: &LayoutResult, node: NodeId) -> BoxId {
    all_boxes(result)
        .into_iter()
        .find(|&id| result.tree[id].node == node)
        .expect("node has a box")
}

/// The text box holding exactly `text`.
pub fn text_box(result: &LayoutResult, text: &str) -> BoxId {
    all_boxes(result)
        .into_iter()
        .find(|&id| result.tree[id].kind == LayoutKind::Text && result.tree.text(id) == text)
        .unwrap_or_else(|| panic!("no text box {text:?}"))
}
