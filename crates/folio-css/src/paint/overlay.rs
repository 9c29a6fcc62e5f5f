//! Text stamped on every page once the page count is known.
//!
//! Page numbers cannot be laid out with the document because the total is
//! only known at the end, so they are drawn in a final pass at fixed
//! positions.

use super::canvas::{Canvas, TextRun};
use crate::style::FontFace;
use crate::style::values::ColorValue;

/// Replaced by the current page number.
pub const PAGE_NUM: &str = "{PAGE_NUM}";

/// Replaced by the number of pages.
pub const PAGE_COUNT: &str = "{PAGE_COUNT}";

/// One registered string.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayText {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Template with optional placeholders.
    pub template: String,
    /// Face.
    pub font: FontFace,
    /// Size in points.
    pub size: f32,
    /// Color.
    pub color: ColorValue,
}

/// Strings drawn on every page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTextOverlay {
    texts: Vec<OverlayText>,
}

impl PageTextOverlay {
    /// No strings.
    #[must_use]
    pub const fn new() -> Self {
        Self { texts: Vec::new() }
    }

    /// Register a string.
    pub fn add(&mut self, text: OverlayText) {
        self.texts.push(text);
    }

    /// Whether anything is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Draw every string for page `number` of `count`.
    pub fn apply(&self, canvas: &mut dyn Canvas, number: usize, count: usize) {
        for text in &self.texts {
            canvas.text(&TextRun {
                x: text.x,
                y: text.y,
                baseline: text.y + text.size * 0.8,
                text: substitute(&text.template, number, count),
                font: text.font.clone(),
                size: text.size,
                color: text.color,
                word_spacing: 0.0,
                char_spacing: 0.0,
            });
        }
    }
}

/// Fill in the page placeholders of `template`.
#[must_use]
pub fn substitute(template: &str, number: usize, count: usize) -> String {
    template
        .replace(PAGE_NUM, &number.to_string())
        .replace(PAGE_COUNT, &count.to_string())
}
