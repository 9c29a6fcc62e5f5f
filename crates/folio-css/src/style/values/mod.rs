//! CSS value types and parsing.

mod color;
mod keywords;
mod length;

pub use color::{ColorValue, parse_color};
pub use keywords::{
    BackgroundRepeat, BorderCollapse, BorderStyle, DisplayValue, Float, FontStyle, FontVariant,
    ListStylePosition, ListStyleType, Overflow, PageBreak, Position, TableLayout, TextAlign,
    TextDecoration, TextTransform, Visibility, WhiteSpace,
};
pub use length::{AutoLength, LengthValue, PT_PER_INCH, UsedLength, parse_auto_length, parse_length};

use serde::Serialize;

/// One value per box side, in CSS order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Sides<T> {
    /// Top side.
    pub top: T,
    /// Right side.
    pub right: T,
    /// Bottom side.
    pub bottom: T,
    /// Left side.
    pub left: T,
}

impl<T: Copy> Sides<T> {
    /// The same value on all four sides.
    pub const fn all(value: T) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// Expand the 1-4 value shorthand form.
    ///
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    /// "If there is only one component value, it applies to all sides. If
    /// there are two values, the top and bottom margins are set to the first
    /// value and the right and left margins are set to the second. If there
    /// are three values, the top is set to the first value, the left and
    /// right are set to the second, and the bottom is set to the third."
    pub fn from_shorthand(values: &[T]) -> Option<Self> {
        match *values {
            [a] => Some(Self::all(a)),
            [v, h] => Some(Self { top: v, right: h, bottom: v, left: h }),
            [t, h, b] => Some(Self { top: t, right: h, bottom: b, left: h }),
            [top, right, bottom, left] => Some(Self { top, right, bottom, left }),
            _ => None,
        }
    }
}

/// A box side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    /// Top edge.
    Top,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
}

impl Side {
    /// All sides in CSS order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];
}

impl<T> Sides<T> {
    /// Borrow one side.
    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::Top => &self.top,
            Side::Right => &self.right,
            Side::Bottom => &self.bottom,
            Side::Left => &self.left,
        }
    }

    /// Mutably borrow one side.
    pub const fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Top => &mut self.top,
            Side::Right => &mut self.right,
            Side::Bottom => &mut self.bottom,
            Side::Left => &mut self.left,
        }
    }
}

/// [§ 8.5 Border properties](https://www.w3.org/TR/CSS2/box.html#border-properties)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BorderSide {
    /// Specified width (defaults to `medium`).
    pub width: LengthValue,
    /// Line style.
    pub style: BorderStyle,
    /// Explicit color; `None` means the element's `color`.
    pub color: Option<ColorValue>,
}

impl Default for BorderSide {
    fn default() -> Self {
        Self {
            width: LengthValue::Pt(1.5),
            style: BorderStyle::None,
            color: None,
        }
    }
}

/// [§ 14.2.1 'background-position'](https://www.w3.org/TR/CSS2/colors.html#propdef-background-position)
///
/// Keywords are stored as percentages: `left`/`top` = 0%, `center` = 50%,
/// `right`/`bottom` = 100%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundPosition {
    /// Horizontal offset.
    pub x: LengthValue,
    /// Vertical offset.
    pub y: LengthValue,
}

impl Default for BackgroundPosition {
    fn default() -> Self {
        Self {
            x: LengthValue::Percent(0.0),
            y: LengthValue::Percent(0.0),
        }
    }
}

impl BackgroundPosition {
    /// Parse one or two position tokens.
    #[must_use]
    pub fn parse(value: &str, dpi: f32) -> Option<Self> {
        let tokens: Vec<String> = value.split_whitespace().map(str::to_ascii_lowercase).collect();
        let keyword = |t: &str| match t {
            "left" | "top" => Some(LengthValue::Percent(0.0)),
            "center" => Some(LengthValue::Percent(50.0)),
            "right" | "bottom" => Some(LengthValue::Percent(100.0)),
            _ => None,
        };
        let component = |t: &str| keyword(t).or_else(|| parse_length(t, dpi));
        match tokens.as_slice() {
            [single] => {
                let v = component(single)?;
                // A lone vertical keyword positions y and centers x.
                if single == "top" || single == "bottom" {
                    Some(Self { x: LengthValue::Percent(50.0), y: v })
                } else {
                    Some(Self { x: v, y: LengthValue::Percent(50.0) })
                }
            }
            [first, second] => {
                let swapped = matches!(first.as_str(), "top" | "bottom")
                    || matches!(second.as_str(), "left" | "right");
                let (a, b) = (component(first)?, component(second)?);
                Some(if swapped { Self { x: b, y: a } } else { Self { x: a, y: b } })
            }
            _ => None,
        }
    }
}

/// [§ 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum VerticalAlign {
    /// Align baselines.
    #[default]
    Baseline,
    /// Center in the line.
    Middle,
    /// Subscript.
    Sub,
    /// Superscript.
    Super,
    /// Align with the top of the parent's font.
    TextTop,
    /// Align with the bottom of the parent's font.
    TextBottom,
    /// Align with the top of the line box.
    Top,
    /// Align with the bottom of the line box.
    Bottom,
    /// Raise by a length (positive is up).
    Length(LengthValue),
}

impl VerticalAlign {
    /// Parse a keyword or a length.
    #[must_use]
    pub fn parse(value: &str, dpi: f32) -> Option<Self> {
        Some(match value.trim().to_ascii_lowercase().as_str() {
            "baseline" => Self::Baseline,
            "middle" => Self::Middle,
            "sub" => Self::Sub,
            "super" => Self::Super,
            "text-top" => Self::TextTop,
            "text-bottom" => Self::TextBottom,
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            other => Self::Length(parse_length(other, dpi)?),
        })
    }
}

/// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum LineHeight {
    /// "Tells user agents to set the used value to a 'reasonable' value based
    /// on the font of the element."
    #[default]
    Normal,
    /// "The used value of the property is this number multiplied by the
    /// element's font size."
    Number(f32),
    /// A length or a percentage of the font size.
    Length(LengthValue),
}

impl LineHeight {
    /// Parse `normal`, a bare number or a length.
    #[must_use]
    pub fn parse(value: &str, dpi: f32) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        if value == "normal" {
            return Some(Self::Normal);
        }
        if let Ok(n) = value.parse::<f32>() {
            return n.is_finite().then_some(Self::Number(n));
        }
        parse_length(&value, dpi).map(Self::Length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sides_shorthand() {
        let s = Sides::from_shorthand(&[1, 2, 3]).unwrap();
        assert_eq!((s.top, s.right, s.bottom, s.left), (1, 2, 3, 2));
        assert!(Sides::<i32>::from_shorthand(&[]).is_none());
        assert!(Sides::from_shorthand(&[1, 2, 3, 4, 5]).is_none());
    }

    #[test]
    fn test_background_position_keywords() {
        let p = BackgroundPosition::parse("bottom right", 96.0).unwrap();
        assert_eq!(p.x, LengthValue::Percent(100.0));
        assert_eq!(p.y, LengthValue::Percent(100.0));
        let p = BackgroundPosition::parse("top", 96.0).unwrap();
        assert_eq!(p.x, LengthValue::Percent(50.0));
        assert_eq!(p.y, LengthValue::Percent(0.0));
        let p = BackgroundPosition::parse("10pt 25%", 96.0).unwrap();
        assert_eq!(p.x, LengthValue::Pt(10.0));
        assert_eq!(p.y, LengthValue::Percent(25.0));
    }

    #[test]
    fn test_line_height_forms() {
        assert_eq!(LineHeight::parse("1.5", 96.0), Some(LineHeight::Number(1.5)));
        assert_eq!(LineHeight::parse("normal", 96.0), Some(LineHeight::Normal));
        assert_eq!(
            LineHeight::parse("150%", 96.0),
            Some(LineHeight::Length(LengthValue::Percent(150.0)))
        );
    }
}
