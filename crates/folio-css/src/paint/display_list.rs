//! Display List - a recorded sequence of drawing commands
//!
//! [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! [`DisplayListCanvas`] implements [`Canvas`] by recording every call, one
//! list per page, so a layout can be inspected, serialized or replayed on a
//! real backend later.

use serde::Serialize;

use super::canvas::{Canvas, Stroke, TextRun};
use crate::layout::box_model::{Point, Rect};
use crate::style::values::ColorValue;

/// A single drawing command.
///
/// [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
///
/// Commands are recorded in painting order (back to front).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DisplayCommand {
    /// A straight line.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke.
        stroke: Stroke,
    },
    /// A stroked rectangle.
    Rectangle {
        /// Outline.
        rect: Rect,
        /// Stroke.
        stroke: Stroke,
    },
    /// Fill a rectangle with a solid color.
    ///
    /// Used for backgrounds and collapsed table borders.
    FillRect {
        /// Area.
        rect: Rect,
        /// Fill color.
        color: ColorValue,
    },
    /// A closed polygon; border sides are drawn as trapezoids.
    Polygon {
        /// Corners.
        points: Vec<Point>,
        /// Color.
        color: ColorValue,
        /// Filled rather than stroked.
        fill: bool,
    },
    /// A circle, used for list markers.
    Circle {
        /// Centre.
        center: Point,
        /// Radius.
        radius: f32,
        /// Color.
        color: ColorValue,
        /// Filled rather than stroked.
        fill: bool,
    },
    /// Draw an image file scaled into a rectangle.
    ///
    /// [CSS 2.1 Appendix E.2](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
    /// "the replaced content of replaced inline-level elements"
    DrawImage {
        /// Local path of the image.
        path: String,
        /// Target rectangle.
        rect: Rect,
    },
    /// Draw text.
    ///
    /// [CSS 2.1 Appendix E.2](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
    /// "the element's text"
    DrawText(TextRun),
    /// Push a clip rectangle onto the clip stack.
    ///
    /// [§ 11.1.1 overflow](https://www.w3.org/TR/CSS2/visufx.html#overflow)
    PushClip {
        /// Clip area.
        rect: Rect,
    },
    /// Pop the most recent clip rectangle from the clip stack.
    PopClip,
    /// A link target.
    NamedDest {
        /// Anchor name.
        name: String,
        /// Position.
        at: Point,
    },
    /// A link area.
    Link {
        /// Target URL.
        url: String,
        /// Clickable area.
        rect: Rect,
    },
}

/// Commands of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageCommands {
    /// 1-based page number.
    pub number: usize,
    /// Page width in points.
    pub width: f32,
    /// Page height in points.
    pub height: f32,
    /// Commands in painting order.
    pub commands: Vec<DisplayCommand>,
}

/// A [`Canvas`] that records its calls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayListCanvas {
    pages: Vec<PageCommands>,
    open: bool,
}

impl DisplayListCanvas {
    /// An empty recording.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pages: Vec::new(),
            open: false,
        }
    }

    /// Recorded pages.
    #[must_use]
    pub fn pages(&self) -> &[PageCommands] {
        &self.pages
    }

    /// All commands of all pages, in order.
    pub fn commands(&self) -> impl Iterator<Item = &DisplayCommand> + '_ {
        self.pages.iter().flat_map(|p| p.commands.iter())
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.iter().map(|p| p.commands.len()).sum()
    }

    /// Whether nothing was drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, command: DisplayCommand) {
        if !self.open {
            // Drawing outside a page goes to an implicit page 0.
            self.pages.push(PageCommands::default());
            self.open = true;
        }
        if let Some(page) = self.pages.last_mut() {
            page.commands.push(command);
        }
    }
}

impl Canvas for DisplayListCanvas {
    fn begin_page(&mut self, number: usize, width: f32, height: f32) {
        self.pages.push(PageCommands {
            number,
            width,
            height,
            commands: Vec::new(),
        });
        self.open = true;
    }

    fn end_page(&mut self) {
        self.open = false;
    }

    fn line(&mut self, from: Point, to: Point, stroke: &Stroke) {
        self.push(DisplayCommand::Line {
            from,
            to,
            stroke: stroke.clone(),
        });
    }

    fn rectangle(&mut self, rect: Rect, stroke: &Stroke) {
        self.push(DisplayCommand::Rectangle {
            rect,
            stroke: stroke.clone(),
        });
    }

    fn filled_rectangle(&mut self, rect: Rect, color: ColorValue) {
        self.push(DisplayCommand::FillRect { rect, color });
    }

    fn polygon(&mut self, points: &[Point], color: ColorValue, fill: bool) {
        self.push(DisplayCommand::Polygon {
            points: points.to_vec(),
            color,
            fill,
        });
    }

    fn circle(&mut self, center: Point, radius: f32, color: ColorValue, fill: bool) {
        self.push(DisplayCommand::Circle {
            center,
            radius,
            color,
            fill,
        });
    }

    fn image(&mut self, path: &str, rect: Rect) {
        self.push(DisplayCommand::DrawImage {
            path: path.to_string(),
            rect,
        });
    }

    fn text(&mut self, run: &TextRun) {
        self.push(DisplayCommand::DrawText(run.clone()));
    }

    fn push_clip(&mut self, rect: Rect) {
        self.push(DisplayCommand::PushClip { rect });
    }

    fn pop_clip(&mut self) {
        self.push(DisplayCommand::PopClip);
    }

    fn add_named_dest(&mut self, name: &str, at: Point) {
        self.push(DisplayCommand::NamedDest {
            name: name.to_string(),
            at,
        });
    }

    fn add_link(&mut self, url: &str, rect: Rect) {
        self.push(DisplayCommand::Link {
            url: url.to_string(),
            rect,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_per_page() {
        let mut canvas = DisplayListCanvas::new();
        canvas.begin_page(1, 100.0, 200.0);
        canvas.filled_rectangle(Rect::default(), ColorValue::BLACK);
        canvas.end_page();
        canvas.begin_page(2, 100.0, 200.0);
        canvas.pop_clip();
        canvas.end_page();

        assert_eq!(canvas.pages().len(), 2);
        assert_eq!(canvas.pages()[1].number, 2);
        assert_eq!(canvas.len(), 2);
        assert_eq!(canvas.commands().last(), Some(&DisplayCommand::PopClip));
    }

    #[test]
    fn test_serializes_with_op_tag() {
        let mut canvas = DisplayListCanvas::new();
        canvas.begin_page(1, 10.0, 10.0);
        canvas.add_link("https://example.com/", Rect::default());
        let json = serde_json::to_value(canvas.pages()).unwrap();
        assert_eq!(json[0]["commands"][0]["op"], "link");
        assert_eq!(json[0]["commands"][0]["url"], "https://example.com/");
    }
}
