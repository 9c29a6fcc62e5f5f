//! CSS Box Model types.
//!
//! [§ 8 Box model](https://www.w3.org/TR/CSS2/box.html)
//!
//! All coordinates are in points, with the origin at the top-left corner of
//! the page and y growing downwards.

use serde::Serialize;

use crate::style::Style;
use crate::style::values::Side;

/// A point on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

/// A rectangle positioned on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Edge sizes for padding, border, or margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// `left + right`
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// `top + bottom`
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    fn from_fn(mut f: impl FnMut(Side) -> f32) -> Self {
        Self {
            top: f(Side::Top),
            right: f(Side::Right),
            bottom: f(Side::Bottom),
            left: f(Side::Left),
        }
    }
}

/// Used edges and content area of one box.
///
/// [§ 8.1 Box dimensions](https://www.w3.org/TR/CSS2/box.html#box-dimensions)
///
/// "Each box has a content area (e.g., text, an image, etc.) and optional
/// surrounding padding, border, and margin areas."
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoxDimensions {
    /// Content area.
    pub content: Rect,
    /// Padding widths.
    pub padding: EdgeSizes,
    /// Border widths.
    pub border: EdgeSizes,
    /// Margin widths.
    pub margin: EdgeSizes,
}

impl BoxDimensions {
    /// Derive the edges from a style and place the margin box at `origin`.
    ///
    /// Percentages resolve against `containing_width`; `auto` margins count as
    /// zero, so callers resolve them into the style first.
    #[must_use]
    pub fn from_style(
        style: &Style,
        origin: Point,
        content_width: f32,
        content_height: f32,
        containing_width: Option<f32>,
    ) -> Self {
        let margin = EdgeSizes::from_fn(|side| style.margin_pt(side, containing_width));
        let border = EdgeSizes::from_fn(|side| style.border_width_pt(side));
        let padding = EdgeSizes::from_fn(|side| style.padding_pt(side, containing_width));
        Self {
            content: Rect {
                x: origin.x + margin.left + border.left + padding.left,
                y: origin.y + margin.top + border.top + padding.top,
                width: content_width,
                height: content_height,
            },
            padding,
            border,
            margin,
        }
    }

    // [§ 8.1 Box dimensions](https://www.w3.org/TR/CSS2/box.html#box-dimensions)
    //
    // ┌─────────────────────────────────────────┐
    // │              margin-top                 │
    // │   ┌─────────────────────────────────┐   │
    // │   │          border-top             │   │
    // │   │   ┌─────────────────────────┐   │   │
    // │   │   │      padding-top        │   │   │
    // │   │   │   ┌─────────────────┐   │   │   │
    // │ m │ b │ p │                 │ p │ b │ m │
    // │ a │ o │ a │     CONTENT     │ a │ o │ a │
    // │ r │ r │ d │                 │ d │ r │ r │
    // │ g │ d │ d │                 │ d │ d │ g │
    // │ i │ e │ i │                 │ i │ e │ i │
    // │ n │ r │ n │                 │ n │ r │ n │
    // │   │   │ g │                 │ g │   │   │
    // │   │   │   └─────────────────┘   │   │   │
    // │   │   │      padding-bottom     │   │   │
    // │   │   └─────────────────────────┘   │   │
    // │   │          border-bottom          │   │
    // │   └─────────────────────────────────┘   │
    // │              margin-bottom              │
    // └─────────────────────────────────────────┘

    /// "The margin edge surrounds the box margin."
    ///
    /// ```text
    /// x = content.x - padding.left - border.left - margin.left
    /// width = content.width + padding, border and margin on both sides
    /// ```
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        let border_box = self.border_box();
        Rect {
            x: border_box.x - self.margin.left,
            y: border_box.y - self.margin.top,
            width: border_box.width + self.margin.horizontal(),
            height: border_box.height + self.margin.vertical(),
        }
    }

    /// "The padding edge surrounds the box padding."
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        Rect {
            x: self.content.x - self.padding.left,
            y: self.content.y - self.padding.top,
            width: self.content.width + self.padding.horizontal(),
            height: self.content.height + self.padding.vertical(),
        }
    }

    /// "The border edge surrounds the box's border."
    #[must_use]
    pub fn border_box(&self) -> Rect {
        let padding_box = self.padding_box();
        Rect {
            x: padding_box.x - self.border.left,
            y: padding_box.y - self.border.top,
            width: padding_box.width + self.border.horizontal(),
            height: padding_box.height + self.border.vertical(),
        }
    }

    /// "The content edge surrounds the rectangle given by the width and
    /// height of the box."
    #[must_use]
    pub const fn content_box(&self) -> Rect {
        self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::values::AutoLength;

    #[test]
    fn test_boxes_nest() {
        let mut warnings = folio_common::Warnings::new();
        let mut style = Style::default();
        style.set_declaration("margin", "10pt", false, &mut warnings);
        style.set_declaration("border", "2pt solid black", false, &mut warnings);
        style.set_declaration("padding", "5%", false, &mut warnings);
        assert!(warnings.is_empty());

        let dims = BoxDimensions::from_style(&style, Point { x: 0.0, y: 0.0 }, 100.0, 50.0, Some(200.0));
        assert_eq!(dims.content, Rect { x: 22.0, y: 22.0, width: 100.0, height: 50.0 });
        assert_eq!(dims.padding_box(), Rect { x: 12.0, y: 12.0, width: 120.0, height: 70.0 });
        assert_eq!(dims.border_box(), Rect { x: 10.0, y: 10.0, width: 124.0, height: 74.0 });
        assert_eq!(dims.margin_box(), Rect { x: 0.0, y: 0.0, width: 144.0, height: 94.0 });
    }

    #[test]
    fn test_auto_margins_count_as_zero() {
        let mut style = Style::default();
        style.margin.left = AutoLength::Auto;
        let dims = BoxDimensions::from_style(&style, Point::default(), 10.0, 10.0, Some(100.0));
        assert_eq!(dims.margin.left, 0.0);
    }

    #[test]
    fn test_union() {
        let a = Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let b = Rect { x: 5.0, y: -5.0, width: 10.0, height: 10.0 };
        assert_eq!(a.union(&b), Rect { x: 0.0, y: -5.0, width: 15.0, height: 15.0 });
    }
}
