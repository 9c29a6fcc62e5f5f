//! Laying out a whole document.
//!
//! The entry point: build the box tree, reflow the page box and report one
//! [`PageLayout`] per page. Structural errors abort the conversion; every
//! recoverable problem ends up in [`LayoutResult::warnings`].

use std::collections::HashMap;

use folio_common::{BaseUrl, Warnings};
use folio_dom::{DomTree, NodeId};
use serde::Serialize;

use super::box_model::Rect;
use super::box_tree::{BoxId, BoxTree, LayoutKind};
use super::builder::build_box_tree;
use super::context::{FontMetrics, ImageResolver, LayoutContext};
use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::style::{ElementDeclarations, FontRegistry, StyleMap};

/// One page of a finished layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLayout {
    /// 1-based page number.
    pub number: usize,
    /// The document-element continuation laid out on this page.
    pub root: BoxId,
}

/// A laid-out document.
#[derive(Debug)]
pub struct LayoutResult {
    /// The finished box tree; every in-flow box has its position and size.
    pub tree: BoxTree,
    /// Pages in order.
    pub pages: Vec<PageLayout>,
    /// Number of pages.
    pub page_count: usize,
    /// Diagnostics gathered while styling and laying out.
    pub warnings: Warnings,
}

/// Geometry of one box, for reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxReport {
    /// The box.
    pub id: BoxId,
    /// Its kind.
    pub kind: LayoutKind,
    /// Tag of its element, if any.
    pub tag: Option<String>,
    /// Nesting depth below the page root.
    pub depth: usize,
    /// Border box, or `None` for a box that was never positioned.
    pub border_box: Option<Rect>,
}

impl LayoutResult {
    /// Boxes of one page in document order, starting with its root.
    #[must_use]
    pub fn page_boxes(&self, page: &PageLayout) -> Vec<BoxId> {
        let mut out = Vec::new();
        let mut stack = vec![page.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.tree.children(id).into_iter().rev());
        }
        out
    }

    /// Geometry of every box of one page.
    #[must_use]
    pub fn page_report(&self, page: &PageLayout) -> Vec<BoxReport> {
        self.page_boxes(page)
            .into_iter()
            .map(|id| {
                let b = &self.tree[id];
                BoxReport {
                    id,
                    kind: b.kind,
                    tag: self.tree.tag_name(id).map(str::to_string),
                    depth: self
                        .tree
                        .ancestors(id)
                        .take_while(|&a| self.tree[a].kind != LayoutKind::Page)
                        .count(),
                    border_box: b.position.map(|_| b.border_box()),
                }
            })
            .collect()
    }
}

/// Lay out a document whose styles are already computed.
///
/// # Errors
///
/// Any structural [`LayoutError`]: a document without elements, a missing
/// containing block, an unresolvable font or too many pages.
pub fn layout_document(
    dom: DomTree,
    styles: &StyleMap,
    config: &LayoutConfig,
    fonts: &FontRegistry,
    metrics: &dyn FontMetrics,
    images: &dyn ImageResolver,
) -> Result<LayoutResult, LayoutError> {
    let mut warnings = Warnings::new();
    let tree = build_box_tree(dom, styles, images, &mut warnings)?;
    let root = tree
        .root()
        .ok_or_else(|| LayoutError::InvalidTree("box tree has no root".to_string()))?;

    let mut ctx = LayoutContext::new(tree, config, fonts, metrics, images);
    ctx.warnings = warnings;
    ctx.reflow(root, None)?;

    let pages: Vec<PageLayout> = ctx
        .tree
        .children(root)
        .into_iter()
        .enumerate()
        .map(|(i, root)| PageLayout { number: i + 1, root })
        .collect();
    log::debug!(
        "layout finished: {} pages, {} warnings",
        pages.len(),
        ctx.warnings.len()
    );
    Ok(LayoutResult {
        page_count: pages.len(),
        pages,
        tree: ctx.tree,
        warnings: ctx.warnings,
    })
}

/// Compute styles from per-element declarations and lay the document out.
///
/// Declaration warnings are reported alongside the layout's own.
///
/// # Errors
///
/// As [`layout_document`].
pub fn layout_with_declarations(
    dom: DomTree,
    declarations: &HashMap<NodeId, ElementDeclarations>,
    base_url: BaseUrl,
    config: &LayoutConfig,
    fonts: &FontRegistry,
    metrics: &dyn FontMetrics,
    images: &dyn ImageResolver,
) -> Result<LayoutResult, LayoutError> {
    let mut warnings = Warnings::new();
    let styles = StyleMap::from_declarations(
        &dom,
        declarations,
        config.stylesheet_context(base_url),
        &mut warnings,
    );
    let mut result = layout_document(dom, &styles, config, fonts, metrics, images)?;
    warnings.absorb(result.warnings);
    result.warnings = warnings;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageMargins;
    use crate::layout::context::{ApproximateFontMetrics, NoImages};

    fn element(dom: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
        let node = dom.create_element(tag);
        dom.append_child(parent, node);
        node
    }

    #[test]
    fn test_pages_and_report() {
        let mut dom = DomTree::new();
        let html = element(&mut dom, NodeId::ROOT, "html");
        let body = element(&mut dom, html, "body");
        let mut declarations = HashMap::new();
        for _ in 0..3 {
            let div = element(&mut dom, body, "div");
            let _ = declarations.insert(
                div,
                ElementDeclarations {
                    style: vec![
                        ("height".into(), "150pt".into(), false),
                        ("widht".into(), "1pt".into(), false),
                    ],
                    ..ElementDeclarations::default()
                },
            );
        }
        let config = LayoutConfig {
            page_size: Some((300.0, 300.0)),
            margins: PageMargins::uniform(50.0),
            ..LayoutConfig::default()
        };
        let fonts = FontRegistry::with_core_fonts("times");
        let result = layout_with_declarations(
            dom,
            &declarations,
            BaseUrl::default(),
            &config,
            &fonts,
            &ApproximateFontMetrics::default(),
            &NoImages,
        )
        .unwrap();

        // 200pt of page area holds one 150pt div.
        assert_eq!(result.page_count, 3);
        assert_eq!(result.pages[2].number, 3);
        // The misspelt property warns once per distinct message.
        assert_eq!(result.warnings.len(), 1);

        let report = result.page_report(&result.pages[0]);
        let kinds: Vec<LayoutKind> = report.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![LayoutKind::Block, LayoutKind::Block]);
        assert_eq!(report[1].depth, 1);
        assert_eq!(
            report[1].border_box,
            Some(Rect {
                x: 50.0,
                y: 50.0,
                width: 200.0,
                height: 150.0
            })
        );
    }

    #[test]
    fn test_empty_document_is_invalid() {
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let styles = StyleMap::new(config.stylesheet_context(BaseUrl::default()));
        let err = layout_document(
            DomTree::new(),
            &styles,
            &config,
            &fonts,
            &ApproximateFontMetrics::default(),
            &NoImages,
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidTree(_)));
    }
}
