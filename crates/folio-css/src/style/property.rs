//! Longhand property names.
//!
//! Shorthands (`margin`, `border`, `font`, ...) never appear here; they are
//! expanded into these longhands before a value is stored.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// A longhand CSS property the style model understands.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Property {
    Display,
    Position,
    Float,
    Top,
    Right,
    Bottom,
    Left,
    Width,
    Height,
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,
    BorderTopStyle,
    BorderRightStyle,
    BorderBottomStyle,
    BorderLeftStyle,
    BorderTopColor,
    BorderRightColor,
    BorderBottomColor,
    BorderLeftColor,
    FontFamily,
    FontSize,
    FontWeight,
    FontStyle,
    FontVariant,
    LineHeight,
    LetterSpacing,
    WordSpacing,
    Color,
    BackgroundColor,
    BackgroundImage,
    BackgroundRepeat,
    BackgroundPosition,
    TextAlign,
    TextIndent,
    TextDecoration,
    TextTransform,
    WhiteSpace,
    VerticalAlign,
    ListStyleType,
    ListStylePosition,
    ListStyleImage,
    PageBreakBefore,
    PageBreakAfter,
    PageBreakInside,
    Orphans,
    Widows,
    BorderCollapse,
    BorderSpacing,
    TableLayout,
    Overflow,
    Visibility,
    Content,
    CounterReset,
    CounterIncrement,
}

/// [§ 6.2 Inheritance](https://www.w3.org/TR/CSS2/cascade.html#inheritance)
///
/// Properties whose definition says "Inherited: yes".
pub const INHERITED_PROPERTIES: [Property; 21] = [
    Property::Color,
    Property::FontFamily,
    Property::FontSize,
    Property::FontWeight,
    Property::FontStyle,
    Property::FontVariant,
    Property::LineHeight,
    Property::LetterSpacing,
    Property::WordSpacing,
    Property::TextAlign,
    Property::TextIndent,
    Property::TextTransform,
    Property::WhiteSpace,
    Property::ListStyleType,
    Property::ListStylePosition,
    Property::ListStyleImage,
    Property::Orphans,
    Property::Widows,
    Property::Visibility,
    Property::BorderCollapse,
    Property::BorderSpacing,
];

impl Property {
    /// Whether the property inherits by default.
    #[must_use]
    pub fn is_inherited(self) -> bool {
        INHERITED_PROPERTIES.contains(&self)
    }
}
