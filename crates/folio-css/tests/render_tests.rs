//! Integration tests for painting a finished layout onto a recording canvas.

use std::collections::HashMap;

use folio_common::BaseUrl;
use folio_css::config::PageMargins;
use folio_css::layout::Rect;
use folio_css::paint::{DisplayCommand, EventLog, NoEvents, OverlayText};
use folio_css::style::FontSubtype;
use folio_css::style::values::ColorValue;
use folio_css::{
    ApproximateFontMetrics, DisplayListCanvas, ElementDeclarations, FontRegistry, LayoutConfig,
    LayoutResult, NoImages, PageTextOverlay, Renderer, layout_with_declarations,
};
use folio_dom::{DomTree, NodeId};

fn config() -> LayoutConfig {
    LayoutConfig {
        page_size: Some((300.0, 300.0)),
        margins: PageMargins::uniform(50.0),
        ..LayoutConfig::default()
    }
}

/// `html > body > div*` where each div gets `style` and optional text.
fn layout(divs: &[(&[(&str, &str)], Option<&str>)]) -> (LayoutResult, Vec<NodeId>) {
    let mut dom = DomTree::new();
    let html = dom.create_element("html");
    dom.append_child(NodeId::ROOT, html);
    let body = dom.create_element("body");
    dom.append_child(html, body);

    let mut declarations = HashMap::new();
    let mut nodes = Vec::new();
    for &(style, text) in divs {
        let div = dom.create_element("div");
        dom.append_child(body, div);
        if let Some(text) = text {
            let t = dom.create_text(text);
            dom.append_child(div, t);
        }
        let _ = declarations.insert(
            div,
            ElementDeclarations {
                style: style
                    .iter()
                    .map(|&(n, v)| (n.to_string(), v.to_string(), false))
                    .collect(),
                ..ElementDeclarations::default()
            },
        );
        nodes.push(div);
    }
    let result = layout_with_declarations(
        dom,
        &declarations,
        BaseUrl::default(),
        &config(),
        &FontRegistry::with_core_fonts("times"),
        &ApproximateFontMetrics::default(),
        &NoImages,
    )
    .expect("layout should succeed");
    (result, nodes)
}

fn render(result: &LayoutResult, overlay: Option<&PageTextOverlay>) -> DisplayListCanvas {
    let config = config();
    let fonts = FontRegistry::with_core_fonts("times");
    let metrics = ApproximateFontMetrics::default();
    let mut renderer = Renderer::new(&config, &fonts, &metrics, &NoImages);
    if let Some(overlay) = overlay {
        renderer = renderer.with_overlay(overlay);
    }
    let mut canvas = DisplayListCanvas::new();
    renderer
        .render(result, &mut canvas, &mut NoEvents)
        .expect("render should succeed");
    canvas
}

#[test]
fn test_background_border_and_text_in_painting_order() {
    let (result, _) = layout(&[(
        &[
            ("height", "40pt"),
            ("background-color", "red"),
            ("border", "1pt solid black"),
        ],
        Some("Hello"),
    )]);
    let canvas = render(&result, None);
    assert_eq!(canvas.pages().len(), 1);
    assert_eq!(canvas.pages()[0].width, 300.0);

    let commands: Vec<&DisplayCommand> = canvas.commands().collect();
    let fill = commands
        .iter()
        .position(|c| matches!(c, DisplayCommand::FillRect { color, .. } if *color == ColorValue::rgb(255, 0, 0)))
        .expect("background is filled");
    match commands[fill] {
        DisplayCommand::FillRect { rect, .. } => assert_eq!(
            *rect,
            Rect {
                x: 50.0,
                y: 50.0,
                width: 200.0,
                height: 42.0
            }
        ),
        _ => unreachable!(),
    }

    let borders: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, DisplayCommand::Polygon { fill: true, .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(borders.len(), 4);
    assert!(borders.iter().all(|&i| i > fill));

    let text = commands
        .iter()
        .position(|c| matches!(c, DisplayCommand::DrawText(run) if run.text == "Hello"))
        .expect("text is drawn");
    assert!(text > borders[3]);
}

#[test]
fn test_events_are_balanced_per_page() {
    let (result, _) = layout(&[
        (&[("height", "150pt")], None),
        (&[("height", "150pt")], None),
    ]);
    assert_eq!(result.page_count, 2);

    let config = config();
    let fonts = FontRegistry::with_core_fonts("times");
    let metrics = ApproximateFontMetrics::default();
    let renderer = Renderer::new(&config, &fonts, &metrics, &NoImages);
    let mut canvas = DisplayListCanvas::new();
    let mut events = EventLog::default();
    renderer.render(&result, &mut canvas, &mut events).unwrap();

    assert_eq!(events.entries.first().map(String::as_str), Some("begin_page 1"));
    assert_eq!(events.entries.last().map(String::as_str), Some("end_page 2"));
    let begins = events.entries.iter().filter(|e| e.starts_with("begin_frame")).count();
    let ends = events.entries.iter().filter(|e| e.starts_with("end_frame")).count();
    // Body and one div on each page.
    assert_eq!(begins, 4);
    assert_eq!(begins, ends);
}

#[test]
fn test_overlay_sees_the_page_count() {
    let (result, _) = layout(&[
        (&[("height", "150pt")], None),
        (&[("height", "150pt")], None),
    ]);
    let mut overlay = PageTextOverlay::new();
    overlay.add(OverlayText {
        x: 50.0,
        y: 270.0,
        template: "Page {PAGE_NUM} of {PAGE_COUNT}".to_string(),
        font: FontRegistry::with_core_fonts("times")
            .resolve(&["serif".to_string()], FontSubtype::Normal)
            .unwrap(),
        size: 8.0,
        color: ColorValue::BLACK,
    });
    let canvas = render(&result, Some(&overlay));

    let stamped: Vec<String> = canvas
        .pages()
        .iter()
        .map(|page| match page.commands.last() {
            Some(DisplayCommand::DrawText(run)) => run.text.clone(),
            other => panic!("expected overlay text last, got {other:?}"),
        })
        .collect();
    assert_eq!(stamped, ["Page 1 of 2", "Page 2 of 2"]);
}

#[test]
fn test_anchors_and_links() {
    let mut dom = DomTree::new();
    let html = dom.create_element("html");
    dom.append_child(NodeId::ROOT, html);
    let body = dom.create_element("body");
    dom.append_child(html, body);
    let div = dom.create_element("div");
    dom.append_child(body, div);
    dom.set_attribute(div, "id", "intro").unwrap();
    let a = dom.create_element("a");
    dom.append_child(div, a);
    dom.set_attribute(a, "href", "https://example.com/next").unwrap();
    let text = dom.create_text("next");
    dom.append_child(a, text);

    let result = layout_with_declarations(
        dom,
        &HashMap::new(),
        BaseUrl::default(),
        &config(),
        &FontRegistry::with_core_fonts("times"),
        &ApproximateFontMetrics::default(),
        &NoImages,
    )
    .unwrap();
    let canvas = render(&result, None);

    let names: Vec<&str> = canvas
        .commands()
        .filter_map(|c| match c {
            DisplayCommand::NamedDest { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, ["intro"]);

    let link = canvas
        .commands()
        .find_map(|c| match c {
            DisplayCommand::Link { url, rect } => Some((url.clone(), *rect)),
            _ => None,
        })
        .expect("link is recorded");
    assert_eq!(link.0, "https://example.com/next");
    // "next" at 12pt is 24pt wide.
    assert_eq!(link.1.width, 24.0);

    // `a` is underlined by default.
    assert!(canvas.commands().any(|c| matches!(c, DisplayCommand::Line { .. })));
}

#[test]
fn test_collapsed_grid_paints_each_edge_once() {
    let mut dom = DomTree::new();
    let html = dom.create_element("html");
    dom.append_child(NodeId::ROOT, html);
    let body = dom.create_element("body");
    dom.append_child(html, body);
    let table = dom.create_element("table");
    dom.append_child(body, table);

    let style = |pairs: &[(&str, &str)]| ElementDeclarations {
        style: pairs
            .iter()
            .map(|&(n, v)| (n.to_string(), v.to_string(), false))
            .collect(),
        ..ElementDeclarations::default()
    };
    let mut declarations = HashMap::new();
    let _ = declarations.insert(table, style(&[("border-collapse", "collapse")]));
    for _ in 0..2 {
        let tr = dom.create_element("tr");
        dom.append_child(table, tr);
        for _ in 0..2 {
            let td = dom.create_element("td");
            dom.append_child(tr, td);
            let text = dom.create_text("x");
            dom.append_child(td, text);
            let _ = declarations.insert(td, style(&[("border", "1pt solid blue")]));
        }
    }

    let result = layout_with_declarations(
        dom,
        &declarations,
        BaseUrl::default(),
        &config(),
        &FontRegistry::with_core_fonts("times"),
        &ApproximateFontMetrics::default(),
        &NoImages,
    )
    .unwrap();
    let canvas = render(&result, None);

    // Four tops and four lefts, plus the bottoms of the last row and the
    // rights of the last column.
    let strips: Vec<Rect> = canvas
        .commands()
        .filter_map(|c| match c {
            DisplayCommand::FillRect { rect, color } if *color == ColorValue::rgb(0, 0, 255) => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(strips.len(), 12);
    assert!(strips.iter().all(|r| r.width.min(r.height) == 1.0));
}

#[test]
fn test_display_list_serializes() {
    let (result, _) = layout(&[(&[("background-color", "#00ff00"), ("height", "10pt")], None)]);
    let canvas = render(&result, None);
    let json = serde_json::to_value(canvas.pages()).unwrap();
    let first = &json[0]["commands"][0];
    assert_eq!(first["op"], "fill_rect");
    assert_eq!(first["rect"]["height"], 10.0);
}
