//! JSON document input.
//!
//! There is no HTML parser or selector engine in Folio, so the CLI reads a
//! document that is already a tree, with each element carrying its own
//! declarations:
//!
//! ```json
//! {
//!   "location": "https://example.com/docs/report.html",
//!   "document": {
//!     "tag": "html",
//!     "children": [
//!       { "tag": "body", "children": [
//!         { "tag": "p", "style": "text-align: justify", "children": [
//!           { "text": "Hello" }
//!         ]}
//!       ]}
//!     ]
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use folio_common::BaseUrl;
use folio_css::style::Declarations;
use folio_css::ElementDeclarations;
use folio_dom::{DomTree, NodeId};
use serde::Deserialize;

/// A whole input file.
#[derive(Debug, Deserialize)]
pub struct InputDocument {
    /// Where the document came from; relative URLs resolve against it.
    #[serde(default)]
    pub location: Option<String>,
    /// The document element.
    pub document: InputNode,
}

/// One node of the input tree.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InputNode {
    /// A text node.
    Text {
        /// Character data.
        text: String,
    },
    /// An element.
    Element {
        /// Tag name.
        tag: String,
        /// Attributes.
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        /// Declaration block of the element, as in a `style` attribute.
        #[serde(default)]
        style: String,
        /// Declaration block of `::before`.
        #[serde(default)]
        before: String,
        /// Declaration block of `::after`.
        #[serde(default)]
        after: String,
        /// Child nodes.
        #[serde(default)]
        children: Vec<InputNode>,
    },
}

/// A document ready for layout.
#[derive(Debug)]
pub struct LoadedDocument {
    /// The DOM.
    pub dom: DomTree,
    /// Declarations per element.
    pub declarations: HashMap<NodeId, ElementDeclarations>,
    /// Base for relative URLs.
    pub base_url: BaseUrl,
}

impl InputDocument {
    /// Read and parse an input file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Build the DOM and the declaration table.
    ///
    /// Without a `location`, relative URLs resolve against `input_dir`.
    pub fn into_document(self, input_dir: Option<&Path>) -> Result<LoadedDocument> {
        let location = match (&self.location, input_dir) {
            (Some(location), _) => location.clone(),
            (None, Some(dir)) => format!("{}/", dir.display()),
            (None, None) => String::new(),
        };
        let mut dom = DomTree::new();
        let mut declarations = HashMap::new();
        add_node(&mut dom, &mut declarations, NodeId::ROOT, self.document)?;
        Ok(LoadedDocument {
            dom,
            declarations,
            base_url: BaseUrl::from_location(&location),
        })
    }
}

fn add_node(
    dom: &mut DomTree,
    declarations: &mut HashMap<NodeId, ElementDeclarations>,
    parent: NodeId,
    node: InputNode,
) -> Result<()> {
    match node {
        InputNode::Text { text } => {
            let id = dom.create_text(&text);
            dom.append_child(parent, id);
        }
        InputNode::Element {
            tag,
            attrs,
            style,
            before,
            after,
            children,
        } => {
            let id = dom.create_element(&tag.to_ascii_lowercase());
            dom.append_child(parent, id);
            for (name, value) in &attrs {
                dom.set_attribute(id, name, value)
                    .with_context(|| format!("setting {name} on <{tag}>"))?;
            }
            let own = ElementDeclarations {
                style: parse_declarations(&style),
                before: parse_declarations(&before),
                after: parse_declarations(&after),
            };
            if !(own.style.is_empty() && own.before.is_empty() && own.after.is_empty()) {
                let _ = declarations.insert(id, own);
            }
            for child in children {
                add_node(dom, declarations, id, child)?;
            }
        }
    }
    Ok(())
}

/// Split a declaration block into `(name, value, important)` triples.
///
/// Semicolons inside quotes or parentheses do not end a declaration.
/// Declarations without a colon are dropped.
#[must_use]
pub fn parse_declarations(block: &str) -> Declarations {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quote = None;
    let mut depth = 0_usize;
    for c in block.chars() {
        match (c, quote) {
            ('"' | '\'', None) => quote = Some(c),
            (c, Some(q)) if c == q => quote = None,
            ('(', None) => depth += 1,
            (')', None) => depth = depth.saturating_sub(1),
            (';', None) if depth == 0 => {
                push_declaration(&mut out, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    push_declaration(&mut out, &current);
    out
}

fn push_declaration(out: &mut Declarations, text: &str) {
    let Some((name, value)) = text.split_once(':') else {
        return;
    };
    let name = name.trim().to_ascii_lowercase();
    let mut value = value.trim();
    let mut important = false;
    if let Some(stripped) = value.strip_suffix("!important") {
        value = stripped.trim_end();
        important = true;
    }
    if name.is_empty() || value.is_empty() {
        return;
    }
    out.push((name, value.to_string(), important));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let parsed = parse_declarations("width: 10pt; content: \"a;b\" ; color:red !important;bogus");
        assert_eq!(
            parsed,
            vec![
                ("width".to_string(), "10pt".to_string(), false),
                ("content".to_string(), "\"a;b\"".to_string(), false),
                ("color".to_string(), "red".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_url_semicolon_stays_in_value() {
        let parsed = parse_declarations("background-image: url(data:x;y)");
        assert_eq!(parsed[0].1, "url(data:x;y)");
    }

    #[test]
    fn test_builds_dom_and_declarations() {
        let input: InputDocument = serde_json::from_str(
            r#"{
                "location": "https://example.com/docs/index.html",
                "document": { "tag": "HTML", "children": [
                    { "tag": "body", "style": "margin: 0", "children": [
                        { "tag": "a", "attrs": { "href": "next.html" }, "children": [
                            { "text": "next" }
                        ]}
                    ]}
                ]}
            }"#,
        )
        .unwrap();
        let doc = input.into_document(None).unwrap();
        let html = doc.dom.document_element().unwrap();
        assert_eq!(doc.dom.tag_name(html), Some("html"));
        let body = doc.dom.body().unwrap();
        assert_eq!(doc.declarations[&body].style.len(), 1);
        let a = doc.dom.children(body)[0];
        assert_eq!(doc.dom.get_attribute(a, "href"), Some("next.html"));
        assert_eq!(doc.base_url.host, "example.com");
    }

    #[test]
    fn test_demo_document_loads() {
        let input: InputDocument =
            serde_json::from_str(include_str!("../demos/report.json")).unwrap();
        let doc = input.into_document(None).unwrap();
        assert!(doc.dom.body().is_some());
        assert!(doc.declarations.values().any(|d| !d.before.is_empty()));
    }
}
