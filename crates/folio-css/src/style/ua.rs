//! User-agent defaults.
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! There is no selector engine in this crate, so the default sheet is a table
//! keyed by tag name. Its declarations are applied before author declarations
//! and therefore lose to all of them.

use folio_dom::{DomTree, NodeId};

/// `(tags, declarations)` rows of the default sheet.
const UA_RULES: &[(&[&str], &[(&str, &str)])] = &[
    // [§ 15.3.1 Hidden elements]
    (
        &["head", "script", "style", "title", "meta", "link", "template", "base", "noscript"],
        &[("display", "none")],
    ),
    // [§ 15.3.3 Flow content]
    (
        &[
            "html", "body", "address", "article", "aside", "blockquote", "center", "dd", "div",
            "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "header", "hr",
            "main", "nav", "ol", "p", "pre", "section", "ul", "h1", "h2", "h3", "h4", "h5", "h6",
        ],
        &[("display", "block")],
    ),
    (&["p", "blockquote", "dl", "pre", "figure"], &[("margin", "1em 0")]),
    (&["blockquote", "figure"], &[("margin-left", "40px"), ("margin-right", "40px")]),
    (&["dd"], &[("margin-left", "40px")]),
    (&["pre"], &[("white-space", "pre"), ("font-family", "monospace")]),
    (&["code", "kbd", "samp", "tt"], &[("font-family", "monospace")]),
    (&["center"], &[("text-align", "center")]),
    (&["hr"], &[("border", "1px inset gray"), ("margin", "0.5em 0")]),
    // [§ 15.3.6 Sections and headings]
    (&["h1"], &[("font-size", "2em"), ("margin", "0.67em 0")]),
    (&["h2"], &[("font-size", "1.5em"), ("margin", "0.83em 0")]),
    (&["h3"], &[("font-size", "1.17em"), ("margin", "1em 0")]),
    (&["h4"], &[("margin", "1.33em 0")]),
    (&["h5"], &[("font-size", "0.83em"), ("margin", "1.67em 0")]),
    (&["h6"], &[("font-size", "0.67em"), ("margin", "2.33em 0")]),
    (
        &["h1", "h2", "h3", "h4", "h5", "h6", "b", "strong", "th"],
        &[("font-weight", "bold")],
    ),
    (&["i", "em", "cite", "var", "dfn", "address"], &[("font-style", "italic")]),
    (&["u", "ins"], &[("text-decoration", "underline")]),
    (&["s", "strike", "del"], &[("text-decoration", "line-through")]),
    (&["sub"], &[("vertical-align", "sub"), ("font-size", "smaller")]),
    (&["sup"], &[("vertical-align", "super"), ("font-size", "smaller")]),
    (&["small"], &[("font-size", "smaller")]),
    (&["big"], &[("font-size", "larger")]),
    (&["a"], &[("color", "blue"), ("text-decoration", "underline")]),
    // [§ 15.3.7 Lists]
    (&["ul", "ol"], &[("margin", "1em 0"), ("padding-left", "40px"), ("counter-reset", "list-item")]),
    (&["ol"], &[("list-style-type", "decimal")]),
    (&["ul"], &[("list-style-type", "disc")]),
    (&["li"], &[("display", "list-item")]),
    // [§ 15.3.8 Tables]
    (&["table"], &[("display", "table"), ("border-spacing", "2px")]),
    (&["caption"], &[("display", "table-caption"), ("text-align", "center")]),
    (&["colgroup"], &[("display", "table-column-group")]),
    (&["col"], &[("display", "table-column")]),
    (&["thead"], &[("display", "table-header-group"), ("vertical-align", "middle")]),
    (&["tbody"], &[("display", "table-row-group"), ("vertical-align", "middle")]),
    (&["tfoot"], &[("display", "table-footer-group"), ("vertical-align", "middle")]),
    (&["tr"], &[("display", "table-row"), ("vertical-align", "inherit")]),
    (
        &["td", "th"],
        &[("display", "table-cell"), ("padding", "1px"), ("vertical-align", "inherit")],
    ),
    (&["th"], &[("text-align", "center")]),
    (&["img"], &[("display", "inline")]),
];

/// Default declarations for an element, including presentational hints taken
/// from its attributes (`<ol start>`, `<td colspan>` widths, `<img width>`...).
#[must_use]
pub fn defaults_for(tag: &str, dom: &DomTree, node: NodeId) -> Vec<(&'static str, String)> {
    let mut declarations: Vec<(&'static str, String)> = UA_RULES
        .iter()
        .filter(|(tags, _)| tags.contains(&tag))
        .flat_map(|(_, decls)| decls.iter().map(|(n, v)| (*n, (*v).to_string())))
        .collect();

    let attribute = |name: &str| dom.get_attribute(node, name).map(str::trim);

    // [§ 4.4.5 The ol element](https://html.spec.whatwg.org/multipage/grouping-content.html#the-ol-element)
    // "The start attribute, if present, must be a valid integer giving the
    // ordinal value of the first list item."
    if tag == "ol" {
        if let Some(start) = attribute("start").and_then(|s| s.parse::<i32>().ok()) {
            let seed = start.saturating_sub(1);
            declarations.push(("counter-reset", format!("list-item {seed}")));
        }
    }

    // Presentational hints.
    for (attr, property) in [("width", "width"), ("height", "height")] {
        if matches!(tag, "img" | "table" | "td" | "th") {
            if let Some(value) = attribute(attr) {
                let value = if value.chars().all(|c| c.is_ascii_digit() || c == '.') {
                    format!("{value}px")
                } else {
                    value.to_string()
                };
                declarations.push((property, value));
            }
        }
    }
    if tag == "table" {
        if let Some(border) = attribute("border").and_then(|b| b.parse::<f32>().ok()) {
            if border > 0.0 {
                declarations.push(("border", format!("{border}px outset gray")));
            }
        }
        if let Some(spacing) = attribute("cellspacing").and_then(|s| s.parse::<f32>().ok()) {
            declarations.push(("border-spacing", format!("{spacing}px")));
        }
    }
    if let Some(align) = attribute("align") {
        if matches!(tag, "p" | "div" | "td" | "th" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6") {
            declarations.push(("text-align", align.to_ascii_lowercase()));
        }
    }
    declarations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_accumulate_in_order() {
        let mut dom = DomTree::new();
        let h1 = dom.create_element("h1");
        let decls = defaults_for("h1", &dom, h1);
        let names: Vec<&str> = decls.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["display", "font-size", "margin", "font-weight"]);
    }

    #[test]
    fn test_ol_start_seeds_counter() {
        let mut dom = DomTree::new();
        let ol = dom.create_element("ol");
        dom.set_attribute(ol, "start", "5").unwrap();
        let decls = defaults_for("ol", &dom, ol);
        assert_eq!(decls.last(), Some(&("counter-reset", "list-item 4".to_string())));

        dom.set_attribute(ol, "start", "-2147483648").unwrap();
        let decls = defaults_for("ol", &dom, ol);
        assert_eq!(
            decls.last(),
            Some(&("counter-reset", "list-item -2147483648".to_string()))
        );
    }
}
