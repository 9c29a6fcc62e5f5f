//! Integration tests for layout: width resolution, line breaking, tables,
//! counters and pagination, driven through `layout_with_declarations`.

use std::collections::{HashMap, HashSet};

use folio_common::BaseUrl;
use folio_css::config::PageMargins;
use folio_css::layout::table::Edge;
use folio_css::style::values::{BorderStyle, Side};
use folio_css::{
    ApproximateFontMetrics, BoxId, ElementDeclarations, FontRegistry, LayoutConfig, LayoutKind,
    LayoutResult, NoImages, layout_with_declarations,
};
use folio_dom::{DomTree, NodeId};
use quickcheck_macros::quickcheck;

/// A document under construction: `html > body` plus declarations.
struct Doc {
    dom: DomTree,
    body: NodeId,
    declarations: HashMap<NodeId, ElementDeclarations>,
}

impl Doc {
    fn new() -> Self {
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

    fn element(&mut self, parent: NodeId, tag: &str, style: &[(&str, &str)]) -> NodeId {
        let node = self.dom.create_element(tag);
        self.dom.append_child(parent, node);
        if !style.is_empty() {
            self.declarations.entry(node).or_default().style = declarations(style);
        }
        node
    }

    fn text(&mut self, parent: NodeId, text: &str) {
        let node = self.dom.create_text(text);
        self.dom.append_child(parent, node);
    }

    fn before(&mut self, node: NodeId, style: &[(&str, &str)]) {
        self.declarations.entry(node).or_default().before = declarations(style);
    }

    /// Lay out on a `width` × `height` page with 50pt margins.
    fn layout(self, width: f32, height: f32) -> LayoutResult {
        let config = LayoutConfig {
            page_size: Some((width, height)),
            margins: PageMargins::uniform(50.0),
            ..LayoutConfig::default()
        };
        let fonts = FontRegistry::with_core_fonts("times");
        layout_with_declarations(
            self.dom,
            &self.declarations,
            BaseUrl::default(),
            &config,
            &fonts,
            &ApproximateFontMetrics::default(),
            &NoImages,
        )
        .expect("layout should succeed")
    }
}

fn declarations(style: &[(&str, &str)]) -> Vec<(String, String, bool)> {
    style
        .iter()
        .map(|&(name, value)| (name.to_string(), value.to_string(), false))
        .collect()
}

/// Every box of every page, in document order.
fn all_boxes(result: &LayoutResult) -> Vec<BoxId> {
    result
        .pages
        .iter()
        .flat_map(|page| result.page_boxes(page))
        .collect()
}

fn find_kind(result: &LayoutResult, kind: LayoutKind) -> BoxId {
    all_boxes(result)
        .into_iter()
        .find(|&id| result.tree[id].kind == kind)
        .expect("box of the requested kind")
}

/// Texts of the text boxes under `id`, in order.
fn texts_under(result: &LayoutResult, id: BoxId) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if result.tree[current].kind == LayoutKind::Text {
            out.push(result.tree.text(current).to_string());
        }
        stack.extend(result.tree.children(current).into_iter().rev());
    }
    out
}

// ---------------------------------------------------------------------------
// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
// ---------------------------------------------------------------------------

#[test]
fn test_auto_width_with_auto_margins_centres_content() {
    let mut doc = Doc::new();
    let body = doc.body;
    let outer = doc.element(body, "div", &[("margin", "0 auto")]);
    let _ = doc.element(outer, "div", &[("width", "400pt"), ("height", "20pt")]);
    let result = doc.layout(700.0, 400.0);

    let report = result.page_report(&result.pages[0]);
    let outer = report
        .iter()
        .find(|r| r.depth == 1)
        .and_then(|r| r.border_box)
        .expect("outer div is placed");
    // 600pt of page area, 400pt of content, 100pt on either side.
    assert_eq!(outer.width, 400.0);
    assert_eq!(outer.x, 150.0);

    let inner = report
        .iter()
        .find(|r| r.depth == 2)
        .and_then(|r| r.border_box)
        .expect("inner div is placed");
    assert_eq!(inner.x, 150.0);
}

#[test]
fn test_percentage_width_and_fixed_margins() {
    let mut doc = Doc::new();
    let body = doc.body;
    let _ = doc.element(
        body,
        "div",
        &[("width", "50%"), ("margin-left", "30pt"), ("padding", "0 10pt")],
    );
    let result = doc.layout(700.0, 400.0);
    let report = result.page_report(&result.pages[0]);
    let div = report[1].border_box.expect("div is placed");
    assert_eq!(div.x, 80.0);
    assert_eq!(div.width, 320.0);
}

// ---------------------------------------------------------------------------
// [§ 16.6 White space](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
// ---------------------------------------------------------------------------

#[test]
fn test_words_wrap_to_the_container_width() {
    let mut doc = Doc::new();
    let body = doc.body;
    // 9pt per character: "The" is 27pt, "quick" 45pt.
    let p = doc.element(body, "div", &[("width", "50pt"), ("font-size", "18pt")]);
    doc.text(p, "The quick brown fox");
    let result = doc.layout(700.0, 400.0);

    let block = all_boxes(&result)
        .into_iter()
        .find(|&id| result.tree[id].kind == LayoutKind::Block && result.tree[id].width == 50.0)
        .expect("the narrow div");
    assert_eq!(texts_under(&result, block), ["The", "quick", "brown", "fox"]);
    assert_eq!(result.tree[block].lines.len(), 4);

    let ys: Vec<f32> = result.tree[block].lines.iter().map(|l| l.y).collect();
    assert!(ys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_full_line_is_not_justified() {
    for (width, expected_spacing) in [(45.0, 0.0), (50.0, 5.0)] {
        let mut doc = Doc::new();
        let body = doc.body;
        let width_value = format!("{width}pt");
        let p = doc.element(
            body,
            "div",
            &[
                ("width", width_value.as_str()),
                ("font-size", "10pt"),
                ("text-align", "justify"),
            ],
        );
        doc.text(p, "abcd efgh ijkl");
        let result = doc.layout(700.0, 400.0);

        let block = all_boxes(&result)
            .into_iter()
            .find(|&id| result.tree[id].width == width && result.tree[id].kind == LayoutKind::Block)
            .expect("the justified div");
        let first = result.tree[block].lines[0].frames[0];
        assert_eq!(result.tree.text(first), "abcd efgh");
        assert_eq!(result.tree[first].word_spacing, expected_spacing);
        assert_eq!(result.tree[block].lines[0].w, width);

        // The last line is never stretched.
        let last = result.tree[block].lines[1].frames[0];
        assert_eq!(result.tree[last].word_spacing, 0.0);
    }
}

#[test]
fn test_justify_spreads_slack_between_words() {
    let mut doc = Doc::new();
    let body = doc.body;
    let p = doc.element(
        body,
        "div",
        &[("width", "48pt"), ("font-size", "10pt"), ("text-align", "justify")],
    );
    doc.text(p, "ab cd ef ghijkl");
    let result = doc.layout(700.0, 400.0);

    let block = all_boxes(&result)
        .into_iter()
        .find(|&id| result.tree[id].width == 48.0 && result.tree[id].kind == LayoutKind::Block)
        .expect("the justified div");
    let line = &result.tree[block].lines[0];
    let first = line.frames[0];
    assert_eq!(result.tree.text(first), "ab cd ef");
    assert_eq!(line.wc, 3);
    // 40pt of words in 48pt: 8pt over two gaps.
    assert_eq!(result.tree[first].word_spacing, 4.0);
    assert_eq!(line.w, 48.0);
}

// ---------------------------------------------------------------------------
// [§ 17.6.2 The collapsing border model](https://www.w3.org/TR/CSS2/tables.html#collapsing-borders)
// ---------------------------------------------------------------------------

#[test]
fn test_collapsed_edge_keeps_the_wider_border() {
    let mut doc = Doc::new();
    let body = doc.body;
    let table = doc.element(body, "table", &[("border-collapse", "collapse")]);
    for row in 0..3 {
        let tr = doc.element(table, "tr", &[]);
        for col in 0..2 {
            let style: &[(&str, &str)] = match (row, col) {
                (0, 0) => &[("border-right", "2px solid")],
                (0, 1) => &[("border-left", "1px dashed")],
                _ => &[],
            };
            let td = doc.element(tr, "td", style);
            doc.text(td, "x");
        }
    }
    let result = doc.layout(700.0, 400.0);

    let table = find_kind(&result, LayoutKind::Table);
    let map = result.tree[table].cellmap.as_deref().expect("table has a grid");
    let shared = map.border(0, 1, Edge::Vertical);
    assert_eq!(shared.style, BorderStyle::Solid);
    assert_eq!(shared.width, 1.5);
    assert_eq!(map.border_properties(0, 0).right, shared);
    assert_eq!(map.border_properties(0, 1).left, shared);
    // Rows below declare nothing.
    assert_eq!(map.border(1, 1, Edge::Vertical).style, BorderStyle::None);
}

#[test]
fn test_auto_columns_share_slack_by_maximum_width() {
    let mut doc = Doc::new();
    let body = doc.body;
    let table = doc.element(body, "table", &[("width", "600pt")]);
    let tr = doc.element(table, "tr", &[]);
    for width in ["50pt", "100pt", "150pt"] {
        let td = doc.element(tr, "td", &[]);
        let _ = doc.element(td, "div", &[("width", width), ("height", "10pt")]);
    }
    let result = doc.layout(700.0, 400.0);

    let table = find_kind(&result, LayoutKind::Table);
    let map = result.tree[table].cellmap.as_deref().expect("table has a grid");
    let columns = map.columns();
    assert_eq!(columns.len(), 3);
    let increments: Vec<f32> = columns.iter().map(|c| c.used_width - c.max_width).collect();
    assert!(increments[0] > 0.0);
    assert!(increments[0] < increments[1] && increments[1] < increments[2]);
    let ratio = increments[2] / increments[0];
    let expected = columns[2].max_width / columns[0].max_width;
    assert!((ratio - expected).abs() < 0.01, "{ratio} vs {expected}");
    // Columns sit left to right without overlapping.
    assert!(columns.windows(2).all(|w| w[0].x + w[0].used_width <= w[1].x));
}

#[test]
fn test_collapsed_half_widths_come_from_the_resolved_grid() {
    let mut doc = Doc::new();
    let body = doc.body;
    let table = doc.element(body, "table", &[("border-collapse", "collapse")]);
    let tr = doc.element(table, "tr", &[]);
    for style in [("border-right", "1pt solid"), ("border-left", "4pt solid")] {
        let td = doc.element(tr, "td", &[style]);
        doc.text(td, "x");
    }
    let result = doc.layout(700.0, 400.0);

    let cells: Vec<BoxId> = all_boxes(&result)
        .into_iter()
        .filter(|&id| result.tree[id].kind == LayoutKind::TableCell)
        .collect();
    assert_eq!(cells.len(), 2);
    // The first cell is registered before its neighbour widens the edge.
    assert_eq!(result.tree[cells[0]].style.border_width_pt(Side::Right), 2.0);
    assert_eq!(result.tree[cells[1]].style.border_width_pt(Side::Left), 2.0);
}

/// Used widths of a one-row collapsed table whose cells declare `widths`.
fn column_widths(table_width: &str, widths: &[Option<&str>]) -> Vec<f32> {
    let mut doc = Doc::new();
    let body = doc.body;
    let table = doc.element(
        body,
        "table",
        &[("border-collapse", "collapse"), ("width", table_width)],
    );
    let tr = doc.element(table, "tr", &[]);
    for width in widths {
        let style: Vec<(&str, &str)> = match width {
            Some(width) => vec![("padding", "0"), ("width", width)],
            None => vec![("padding", "0")],
        };
        let td = doc.element(tr, "td", &style);
        doc.text(td, "x");
    }
    let result = doc.layout(700.0, 400.0);

    let table = find_kind(&result, LayoutKind::Table);
    let map = result.tree[table].cellmap.as_deref().expect("table has a grid");
    map.columns().iter().map(|c| c.used_width).collect()
}

#[test]
fn test_percentage_columns_take_their_share() {
    let widths = column_widths("400pt", &[Some("25%"), Some("50%"), None]);
    assert_eq!(widths, [100.0, 200.0, 100.0]);
    assert!((widths.iter().sum::<f32>() - 400.0).abs() < 0.01);
}

#[test]
fn test_percentage_of_what_fixed_columns_leave() {
    let widths = column_widths("500pt", &[Some("100pt"), Some("20%"), None]);
    assert_eq!(widths, [100.0, 80.0, 320.0]);
    assert!((widths.iter().sum::<f32>() - 500.0).abs() < 0.01);
}

// ---------------------------------------------------------------------------
// [§ 12.4 Automatic counters and numbering](https://www.w3.org/TR/CSS2/generate.html#counters)
// ---------------------------------------------------------------------------

#[test]
fn test_counter_in_generated_content() {
    let mut doc = Doc::new();
    let body = doc.body;
    let list = doc.element(body, "ol", &[("counter-reset", "item"), ("list-style-type", "none")]);
    for label in ["Alpha", "Beta", "Gamma"] {
        let li = doc.element(list, "li", &[("counter-increment", "item")]);
        doc.before(li, &[("content", "counter(item) \". \"")]);
        doc.text(li, label);
    }
    let result = doc.layout(700.0, 400.0);

    let generated: Vec<String> = all_boxes(&result)
        .into_iter()
        .filter(|&id| result.tree[id].generated && result.tree[id].kind == LayoutKind::Text)
        .map(|id| result.tree.text(id).to_string())
        .collect();
    assert_eq!(generated, ["1. ", "2. ", "3. "]);
}

#[test]
fn test_li_value_sets_the_ordinal() {
    let mut doc = Doc::new();
    let body = doc.body;
    let list = doc.element(body, "ol", &[]);
    for value in [Some("-2147483648"), None, Some("7"), None] {
        let li = doc.element(list, "li", &[]);
        if let Some(value) = value {
            doc.dom.set_attribute(li, "value", value).unwrap();
        }
        doc.text(li, "item");
    }
    let result = doc.layout(700.0, 400.0);

    let markers: Vec<String> = all_boxes(&result)
        .into_iter()
        .filter(|&id| result.tree[id].kind == LayoutKind::ListBullet)
        .filter_map(|id| result.tree[id].bullet_text.clone())
        .collect();
    assert_eq!(markers, ["-2147483648. ", "-2147483647. ", "7. ", "8. "]);
}

// ---------------------------------------------------------------------------
// [§ 13.3 Page breaks](https://www.w3.org/TR/CSS2/page.html#page-breaks)
// ---------------------------------------------------------------------------

#[test]
fn test_avoid_inside_moves_the_whole_block() {
    let mut doc = Doc::new();
    let body = doc.body;
    let _ = doc.element(body, "div", &[("height", "120pt")]);
    let kept = doc.element(body, "div", &[("page-break-inside", "avoid")]);
    for _ in 0..3 {
        let _ = doc.element(kept, "div", &[("height", "40pt")]);
    }
    // 200pt of page area: 120pt + 3 × 40pt does not fit.
    let result = doc.layout(300.0, 300.0);
    assert_eq!(result.page_count, 2);

    let first = result.page_report(&result.pages[0]);
    assert_eq!(first.len(), 2);

    let second = result.page_report(&result.pages[1]);
    let depths: Vec<usize> = second.iter().map(|r| r.depth).collect();
    assert_eq!(depths, [0, 1, 2, 2, 2]);
    let kept_box = second[1].border_box.expect("kept block is placed");
    assert_eq!(kept_box.y, 50.0);
    assert_eq!(kept_box.height, 120.0);
    assert_eq!(second[4].border_box.map(|b| b.y), Some(130.0));
}

#[test]
fn test_forced_break_before() {
    let mut doc = Doc::new();
    let body = doc.body;
    let _ = doc.element(body, "div", &[("height", "20pt")]);
    let _ = doc.element(body, "div", &[("height", "20pt"), ("page-break-before", "always")]);
    let result = doc.layout(300.0, 300.0);
    assert_eq!(result.page_count, 2);
    assert_eq!(result.pages[1].number, 2);
}

#[test]
fn test_lines_continue_on_the_next_page() {
    let mut doc = Doc::new();
    let body = doc.body;
    // 10pt text on 11pt lines, 5 characters per line: 30 lines of 110pt
    // pages need three pages.
    let p = doc.element(body, "div", &[("width", "25pt"), ("font-size", "10pt")]);
    let words = vec!["abcd"; 30].join(" ");
    doc.text(p, &words);
    let result = doc.layout(300.0, 210.0);
    assert!(result.page_count >= 3);

    let mut seen = Vec::new();
    for page in &result.pages {
        seen.extend(texts_under(&result, page.root));
    }
    let joined: Vec<&str> = seen.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    assert_eq!(joined.len(), 30);
}

#[quickcheck]
fn prop_pagination_places_every_block_once(items: Vec<(u8, bool)>) -> bool {
    let mut doc = Doc::new();
    let body = doc.body;
    let mut nodes = HashSet::new();
    for &(height, avoid) in &items {
        let avoid = if avoid { "avoid" } else { "auto" };
        let wrapper = doc.element(body, "div", &[("page-break-inside", avoid)]);
        let height = format!("{}pt", u16::from(height) + 1);
        let inner = doc.element(wrapper, "div", &[("height", height.as_str())]);
        let _ = nodes.insert(wrapper);
        let _ = nodes.insert(inner);
    }
    let result = doc.layout(300.0, 300.0);

    let placed: HashSet<NodeId> = all_boxes(&result)
        .into_iter()
        .filter(|&id| result.tree.tag_name(id) == Some("div"))
        .map(|id| result.tree[id].node)
        .collect();
    placed == nodes && result.page_count >= 1 && result.page_count <= items.len().max(1)
}
