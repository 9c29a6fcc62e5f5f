//! The output device.
//!
//! Layout never draws. The renderer turns a finished box tree into calls on
//! a [`Canvas`], which a backend maps onto its own primitives. Coordinates
//! are in points from the top-left corner of the page.

use serde::Serialize;

use crate::layout::box_model::{Point, Rect};
use crate::style::FontFace;
use crate::style::values::ColorValue;

/// How a line or outline is stroked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    /// Line color.
    pub color: ColorValue,
    /// Line width in points.
    pub width: f32,
    /// On/off lengths; empty for a solid line.
    pub dash: Vec<f32>,
}

impl Stroke {
    /// A solid line.
    #[must_use]
    pub const fn solid(color: ColorValue, width: f32) -> Self {
        Self {
            color,
            width,
            dash: Vec::new(),
        }
    }
}

/// A run of text placed on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    /// Left edge of the first glyph.
    pub x: f32,
    /// Top of the font box.
    pub y: f32,
    /// Baseline, from the top of the page.
    pub baseline: f32,
    /// The glyphs.
    pub text: String,
    /// Face to set them in.
    pub font: FontFace,
    /// Font size in points.
    pub size: f32,
    /// Fill color.
    pub color: ColorValue,
    /// Extra space after every U+0020.
    pub word_spacing: f32,
    /// Extra space after every character.
    pub char_spacing: f32,
}

/// Drawing operations a page-based backend provides.
pub trait Canvas {
    /// Start page `number` (1-based) of `width` × `height` points.
    fn begin_page(&mut self, number: usize, width: f32, height: f32);

    /// Finish the current page.
    fn end_page(&mut self);

    /// A straight line.
    fn line(&mut self, from: Point, to: Point, stroke: &Stroke);

    /// A stroked rectangle.
    fn rectangle(&mut self, rect: Rect, stroke: &Stroke);

    /// A filled rectangle.
    fn filled_rectangle(&mut self, rect: Rect, color: ColorValue);

    /// A closed polygon, filled or stroked with a hairline.
    fn polygon(&mut self, points: &[Point], color: ColorValue, fill: bool);

    /// A circle, filled or stroked with a hairline.
    fn circle(&mut self, center: Point, radius: f32, color: ColorValue, fill: bool);

    /// An image file scaled into `rect`.
    fn image(&mut self, path: &str, rect: Rect);

    /// A run of text.
    fn text(&mut self, run: &TextRun);

    /// Restrict drawing to `rect` until the matching [`Canvas::pop_clip`].
    fn push_clip(&mut self, rect: Rect);

    /// Drop the innermost clip.
    fn pop_clip(&mut self);

    /// A named destination for internal links.
    fn add_named_dest(&mut self, name: &str, at: Point);

    /// A clickable area pointing at `url`.
    fn add_link(&mut self, url: &str, rect: Rect);
}
