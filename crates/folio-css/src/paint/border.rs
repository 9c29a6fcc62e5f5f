//! Border geometry.
//!
//! [§ 8.5.3 Border style](https://www.w3.org/TR/CSS2/box.html#border-style-properties)
//!
//! Each side of a border is a trapezoid between the outer and inner border
//! edges, mitred into its neighbours at the corners. Styles are built from
//! that shape: `double` draws the outer and inner thirds, the 3D styles
//! split the side into two halves of different shades, and `dotted` and
//! `dashed` stroke the centre line.

use super::canvas::{Canvas, Stroke};
use crate::layout::box_model::{Point, Rect};
use crate::layout::table::BorderSpec;
use crate::style::values::{BorderStyle, ColorValue, Side, Sides};

/// How far the 3D styles shade towards black or white.
const SHADE: f32 = 0.5;

/// Corners of one side's trapezoid, outer edge first.
#[must_use]
pub fn side_trapezoid(rect: Rect, widths: Sides<f32>, side: Side) -> [Point; 4] {
    let (x, y, r, b) = (rect.x, rect.y, rect.right(), rect.bottom());
    let p = |x, y| Point { x, y };
    match side {
        Side::Top => [
            p(x, y),
            p(r, y),
            p(r - widths.right, y + widths.top),
            p(x + widths.left, y + widths.top),
        ],
        Side::Right => [
            p(r, y),
            p(r, b),
            p(r - widths.right, b - widths.bottom),
            p(r - widths.right, y + widths.top),
        ],
        Side::Bottom => [
            p(r, b),
            p(x, b),
            p(x + widths.left, b - widths.bottom),
            p(r - widths.right, b - widths.bottom),
        ],
        Side::Left => [
            p(x, b),
            p(x, y),
            p(x + widths.left, y + widths.top),
            p(x + widths.left, b - widths.bottom),
        ],
    }
}

/// `rect` shrunk by a fraction of each border width.
fn shrink(rect: Rect, widths: Sides<f32>, fraction: f32) -> Rect {
    let (t, r, b, l) = (
        widths.top * fraction,
        widths.right * fraction,
        widths.bottom * fraction,
        widths.left * fraction,
    );
    Rect {
        x: rect.x + l,
        y: rect.y + t,
        width: (rect.width - l - r).max(0.0),
        height: (rect.height - t - b).max(0.0),
    }
}

fn scale(widths: Sides<f32>, fraction: f32) -> Sides<f32> {
    Sides {
        top: widths.top * fraction,
        right: widths.right * fraction,
        bottom: widths.bottom * fraction,
        left: widths.left * fraction,
    }
}

/// Whether `side` is one of the two sides the light falls on.
const fn is_top_left(side: Side) -> bool {
    matches!(side, Side::Top | Side::Left)
}

/// Dash pattern of a dotted or dashed line of `width`.
#[must_use]
pub fn dash_pattern(style: BorderStyle, width: f32) -> Vec<f32> {
    match style {
        BorderStyle::Dotted => vec![width, width],
        BorderStyle::Dashed => vec![3.0 * width, 3.0 * width],
        _ => Vec::new(),
    }
}

/// Paint the four sides of a border.
///
/// `rect` is the border box; `specs` carry the used widths, styles and
/// colors.
pub fn paint_border(canvas: &mut dyn Canvas, rect: Rect, specs: &Sides<BorderSpec>) {
    let widths = Sides {
        top: visible_width(&specs.top),
        right: visible_width(&specs.right),
        bottom: visible_width(&specs.bottom),
        left: visible_width(&specs.left),
    };
    for side in Side::ALL {
        let spec = specs.get(side);
        if *widths.get(side) <= 0.0 {
            continue;
        }
        paint_side(canvas, rect, widths, side, spec);
    }
}

fn visible_width(spec: &BorderSpec) -> f32 {
    if spec.style.is_invisible() || spec.color.is_transparent() {
        0.0
    } else {
        spec.width
    }
}

fn paint_side(canvas: &mut dyn Canvas, rect: Rect, widths: Sides<f32>, side: Side, spec: &BorderSpec) {
    let color = spec.color;
    match spec.style {
        BorderStyle::None | BorderStyle::Hidden => {}
        BorderStyle::Solid => {
            canvas.polygon(&side_trapezoid(rect, widths, side), color, true);
        }
        BorderStyle::Double => {
            let third = scale(widths, 1.0 / 3.0);
            canvas.polygon(&side_trapezoid(rect, third, side), color, true);
            let inner = shrink(rect, widths, 2.0 / 3.0);
            canvas.polygon(&side_trapezoid(inner, third, side), color, true);
        }
        BorderStyle::Dotted | BorderStyle::Dashed => {
            let width = *widths.get(side);
            let (from, to) = centre_line(rect, widths, side);
            let stroke = Stroke {
                color,
                width,
                dash: dash_pattern(spec.style, width),
            };
            canvas.line(from, to, &stroke);
        }
        BorderStyle::Groove | BorderStyle::Ridge => {
            // Groove: dark outer half, light inner half. Ridge the reverse.
            let (outer, inner) = if spec.style == BorderStyle::Groove {
                (color.darken(SHADE), color.lighten(SHADE))
            } else {
                (color.lighten(SHADE), color.darken(SHADE))
            };
            let half = scale(widths, 0.5);
            canvas.polygon(&side_trapezoid(rect, half, side), outer, true);
            let inner_rect = shrink(rect, widths, 0.5);
            canvas.polygon(&side_trapezoid(inner_rect, half, side), inner, true);
        }
        BorderStyle::Inset | BorderStyle::Outset => {
            let darker = (spec.style == BorderStyle::Inset) == is_top_left(side);
            let shade = if darker {
                color.darken(SHADE)
            } else {
                color.lighten(SHADE)
            };
            canvas.polygon(&side_trapezoid(rect, widths, side), shade, true);
        }
    }
}

/// The line through the middle of one side.
fn centre_line(rect: Rect, widths: Sides<f32>, side: Side) -> (Point, Point) {
    let p = |x, y| Point { x, y };
    match side {
        Side::Top => {
            let y = rect.y + widths.top / 2.0;
            (p(rect.x, y), p(rect.right(), y))
        }
        Side::Bottom => {
            let y = rect.bottom() - widths.bottom / 2.0;
            (p(rect.x, y), p(rect.right(), y))
        }
        Side::Left => {
            let x = rect.x + widths.left / 2.0;
            (p(x, rect.y), p(x, rect.bottom()))
        }
        Side::Right => {
            let x = rect.right() - widths.right / 2.0;
            (p(x, rect.y), p(x, rect.bottom()))
        }
    }
}

/// One segment of a collapsed table border, centred on a grid line.
///
/// `strip` is the full-width rectangle the segment covers.
pub fn paint_collapsed_segment(canvas: &mut dyn Canvas, strip: Rect, spec: &BorderSpec, horizontal: bool) {
    let width = visible_width(spec);
    if width <= 0.0 {
        return;
    }
    match spec.style {
        BorderStyle::Dotted | BorderStyle::Dashed => {
            let (from, to) = if horizontal {
                let y = strip.y + strip.height / 2.0;
                (Point { x: strip.x, y }, Point { x: strip.right(), y })
            } else {
                let x = strip.x + strip.width / 2.0;
                (Point { x, y: strip.y }, Point { x, y: strip.bottom() })
            };
            let stroke = Stroke {
                color: spec.color,
                width,
                dash: dash_pattern(spec.style, width),
            };
            canvas.line(from, to, &stroke);
        }
        BorderStyle::Double => {
            let third = width / 3.0;
            let (a, b) = if horizontal {
                (
                    Rect { height: third, ..strip },
                    Rect {
                        y: strip.bottom() - third,
                        height: third,
                        ..strip
                    },
                )
            } else {
                (
                    Rect { width: third, ..strip },
                    Rect {
                        x: strip.right() - third,
                        width: third,
                        ..strip
                    },
                )
            };
            canvas.filled_rectangle(a, spec.color);
            canvas.filled_rectangle(b, spec.color);
        }
        _ => canvas.filled_rectangle(strip, shade_collapsed(spec)),
    }
}

fn shade_collapsed(spec: &BorderSpec) -> ColorValue {
    match spec.style {
        BorderStyle::Inset | BorderStyle::Groove => spec.color.darken(SHADE),
        BorderStyle::Outset | BorderStyle::Ridge => spec.color.lighten(SHADE),
        _ => spec.color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::display_list::{DisplayCommand, DisplayListCanvas};

    fn spec(width: f32, style: BorderStyle) -> BorderSpec {
        BorderSpec {
            width,
            style,
            color: ColorValue::rgb(100, 100, 100),
        }
    }

    const RECT: Rect = Rect {
        x: 10.0,
        y: 20.0,
        width: 100.0,
        height: 50.0,
    };

    #[test]
    fn test_trapezoid_mitres_corners() {
        let widths = Sides {
            top: 2.0,
            right: 4.0,
            bottom: 6.0,
            left: 8.0,
        };
        let top = side_trapezoid(RECT, widths, Side::Top);
        assert_eq!(top[0], Point { x: 10.0, y: 20.0 });
        assert_eq!(top[2], Point { x: 106.0, y: 22.0 });
        assert_eq!(top[3], Point { x: 18.0, y: 22.0 });
        let left = side_trapezoid(RECT, widths, Side::Left);
        assert_eq!(left[3], Point { x: 18.0, y: 64.0 });
    }

    #[test]
    fn test_styles_map_to_primitives() {
        let mut canvas = DisplayListCanvas::new();
        canvas.begin_page(1, 200.0, 200.0);
        let specs = Sides {
            top: spec(3.0, BorderStyle::Solid),
            right: spec(3.0, BorderStyle::Double),
            bottom: spec(3.0, BorderStyle::Dashed),
            left: spec(3.0, BorderStyle::None),
        };
        paint_border(&mut canvas, RECT, &specs);
        let commands: Vec<&DisplayCommand> = canvas.commands().collect();
        // solid: 1 polygon, double: 2 polygons, dashed: 1 line, none: nothing.
        assert_eq!(commands.len(), 4);
        assert!(matches!(commands[0], DisplayCommand::Polygon { fill: true, .. }));
        match commands[3] {
            DisplayCommand::Line { stroke, from, .. } => {
                assert_eq!(stroke.dash, vec![9.0, 9.0]);
                assert_eq!(from.y, 68.5);
            }
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn test_inset_shades_top_left_darker() {
        let mut canvas = DisplayListCanvas::new();
        let base = ColorValue::rgb(100, 100, 100);
        let specs = Sides::all(spec(2.0, BorderStyle::Inset));
        paint_border(&mut canvas, RECT, &specs);
        let colors: Vec<ColorValue> = canvas
            .commands()
            .filter_map(|c| match c {
                DisplayCommand::Polygon { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors[0], base.darken(SHADE));
        assert_eq!(colors[1], base.lighten(SHADE));
        assert_eq!(colors[3], base.darken(SHADE));
    }
}
