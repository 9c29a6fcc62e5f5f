//! Printing layout results.

use std::fmt::Write as _;

use folio_common::Warning;
use folio_css::layout::BoxReport;
use folio_css::paint::PageCommands;
use folio_css::LayoutResult;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Geometry of one page, for `--json`.
#[derive(Debug, Serialize)]
pub struct PageReport {
    /// 1-based page number.
    pub number: usize,
    /// Boxes in document order.
    pub boxes: Vec<BoxReport>,
}

/// Everything `--json` prints.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// Page size in points.
    pub page_size: (f32, f32),
    /// Number of pages.
    pub page_count: usize,
    /// Per-page geometry.
    pub pages: Vec<PageReport>,
    /// Diagnostics.
    pub warnings: &'a [Warning],
}

impl<'a> JsonReport<'a> {
    /// Collect the report of a finished layout.
    #[must_use]
    pub fn new(result: &'a LayoutResult, warnings: &'a [Warning], page_size: (f32, f32)) -> Self {
        Self {
            page_size,
            page_count: result.page_count,
            pages: result
                .pages
                .iter()
                .map(|page| PageReport {
                    number: page.number,
                    boxes: result.page_report(page),
                })
                .collect(),
            warnings,
        }
    }
}

/// Display-list output for `--display-list --json`.
#[derive(Debug, Serialize)]
pub struct DisplayListReport<'a> {
    /// Recorded pages.
    pub pages: &'a [PageCommands],
}

/// Human readable box tree of every page.
#[must_use]
pub fn format_pages(result: &LayoutResult, page_size: (f32, f32), color: bool) -> String {
    let mut out = String::new();
    for page in &result.pages {
        let heading = format!(
            "=== Page {} of {} ({:.2} x {:.2}pt) ===",
            page.number, result.page_count, page_size.0, page_size.1
        );
        if color {
            let _ = writeln!(out, "{}", heading.bold());
        } else {
            let _ = writeln!(out, "{heading}");
        }
        for entry in result.page_report(page) {
            let _ = writeln!(out, "{}", format_box(result, &entry, color));
        }
        out.push('\n');
    }
    out
}

fn format_box(result: &LayoutResult, entry: &BoxReport, color: bool) -> String {
    let indent = "  ".repeat(entry.depth);
    let label = match &entry.tag {
        Some(tag) => format!("<{tag}>"),
        None => {
            let text = result.tree.text(entry.id);
            if text.is_empty() {
                "(anonymous)".to_string()
            } else {
                format!("{:?}", truncate(text, 32))
            }
        }
    };
    let kind = format!("{:?}", entry.kind);
    let geometry = entry.border_box.map_or_else(
        || "not placed".to_string(),
        |r| {
            format!(
                "x={:.2} y={:.2} w={:.2} h={:.2}",
                r.x, r.y, r.width, r.height
            )
        },
    );
    if color {
        format!(
            "{indent}{} {} {}",
            label.cyan(),
            kind.dimmed(),
            geometry.green()
        )
    } else {
        format!("{indent}{label} {kind} {geometry}")
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max).collect();
        short.push('…');
        short
    }
}

/// One line per warning.
#[must_use]
pub fn format_warnings(warnings: &[Warning], color: bool) -> String {
    let mut out = String::new();
    for warning in warnings {
        if color {
            let _ = writeln!(out, "{} {warning}", "warning:".yellow().bold());
        } else {
            let _ = writeln!(out, "warning: {warning}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }

    #[test]
    fn test_warnings_plain() {
        let warnings = vec![Warning {
            component: "CSS".to_string(),
            message: "unknown property 'widht'".to_string(),
        }];
        assert_eq!(
            format_warnings(&warnings, false),
            "warning: [CSS] unknown property 'widht'\n"
        );
    }
}
