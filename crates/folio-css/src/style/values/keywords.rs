//! Keyword-valued properties.
//!
//! Every enum parses from and prints to its CSS keyword spelling through
//! `strum`, so `"table-row-group".parse::<DisplayValue>()` works directly.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// [§ 9.2.4 The 'display' property](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum DisplayValue {
    /// "This value causes an element to generate one or more inline boxes."
    #[default]
    Inline,
    /// "This value causes an element to generate a block box."
    Block,
    /// "This value causes an element to generate a principal block box and a
    /// marker box."
    ListItem,
    /// "This value causes an element to generate an inline-level block container."
    InlineBlock,
    /// Block-level table.
    Table,
    /// Inline-level table.
    InlineTable,
    /// Row group.
    TableRowGroup,
    /// Row group repeated at the top of every page a table spans.
    TableHeaderGroup,
    /// Row group placed after the body rows.
    TableFooterGroup,
    /// Row.
    TableRow,
    /// Column group (not rendered).
    TableColumnGroup,
    /// Column (not rendered).
    TableColumn,
    /// Cell.
    TableCell,
    /// Caption.
    TableCaption,
    /// "This value causes an element to not appear in the formatting structure."
    None,
}

impl DisplayValue {
    /// Block-level boxes stack vertically in their parent.
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(self, Self::Block | Self::ListItem | Self::Table | Self::TableCaption)
    }

    /// Inline-level boxes flow in line boxes.
    #[must_use]
    pub const fn is_inline_level(self) -> bool {
        matches!(self, Self::Inline | Self::InlineBlock | Self::InlineTable)
    }

    /// Row groups of any flavour.
    #[must_use]
    pub const fn is_row_group(self) -> bool {
        matches!(
            self,
            Self::TableRowGroup | Self::TableHeaderGroup | Self::TableFooterGroup
        )
    }
}

/// [§ 9.3.1 Choosing a positioning scheme](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Position {
    /// Normal flow.
    #[default]
    Static,
    /// Normal flow, then offset.
    Relative,
    /// Removed from flow, placed against the containing block.
    Absolute,
    /// Removed from flow, placed against the page and repeated on every page.
    Fixed,
}

impl Position {
    /// Absolute and fixed boxes do not take part in normal flow.
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// [§ 9.5.1 The 'float' property](https://www.w3.org/TR/CSS2/visuren.html#float-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Float {
    /// Not floated.
    #[default]
    None,
    /// Float left.
    Left,
    /// Float right.
    Right,
}

/// [§ 16.2 Alignment](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Flush right.
    Right,
    /// Centered.
    #[strum(to_string = "center", serialize = "centre")]
    Center,
    /// Stretch word spacing to fill lines.
    Justify,
}

/// [§ 16.6 White space](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum WhiteSpace {
    /// Collapse and wrap.
    #[default]
    Normal,
    /// Preserve, break only at newlines.
    Pre,
    /// Collapse, never wrap.
    Nowrap,
    /// Preserve and wrap.
    PreWrap,
    /// Collapse spaces, keep newlines, wrap.
    PreLine,
}

impl WhiteSpace {
    /// Whether leading and trailing spaces are significant.
    #[must_use]
    pub const fn preserves_spaces(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap)
    }
}

/// [§ 16.5 Capitalization](https://www.w3.org/TR/CSS2/text.html#caps-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TextTransform {
    /// Text as written.
    #[default]
    None,
    /// First letter of every word upper-cased.
    Capitalize,
    /// All upper case.
    Uppercase,
    /// All lower case.
    Lowercase,
}

/// [§ 16.3.1 Underlining, overlining, striking](https://www.w3.org/TR/CSS2/text.html#lining-striking-props)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TextDecoration {
    /// No line.
    #[default]
    None,
    /// Line below the text.
    Underline,
    /// Line above the text.
    Overline,
    /// Line through the middle.
    LineThrough,
}

/// [§ 8.5.3 Border style](https://www.w3.org/TR/CSS2/box.html#border-style-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BorderStyle {
    /// "No border; the computed border width is zero."
    #[default]
    None,
    /// "Same as 'none', except in terms of border conflict resolution for
    /// table elements."
    Hidden,
    /// "The border is a series of dots."
    Dotted,
    /// "The border is a series of short line segments."
    Dashed,
    /// "The border is a single line segment."
    Solid,
    /// "The border is two solid lines."
    Double,
    /// "The border looks as though it were carved into the canvas."
    Groove,
    /// "The opposite of 'groove'."
    Ridge,
    /// "The border makes the box look as though it were embedded in the canvas."
    Inset,
    /// "The opposite of 'inset'."
    Outset,
}

impl BorderStyle {
    /// [§ 17.6.2.1 Border conflict resolution](https://www.w3.org/TR/CSS2/tables.html#border-conflict-resolution)
    ///
    /// "If border styles differ only in color, [...] styles are preferred in
    /// this order: 'double', 'solid', 'dashed', 'dotted', 'ridge', 'outset',
    /// 'groove', and the lowest: 'inset'."
    #[must_use]
    pub const fn collapse_rank(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Inset => 1,
            Self::Groove => 2,
            Self::Outset => 3,
            Self::Ridge => 4,
            Self::Dotted => 5,
            Self::Dashed => 6,
            Self::Solid => 7,
            Self::Double => 8,
            Self::Hidden => 9,
        }
    }

    /// `none` and `hidden` paint nothing and have zero width.
    #[must_use]
    pub const fn is_invisible(self) -> bool {
        matches!(self, Self::None | Self::Hidden)
    }
}

/// [§ 12.5.1 Lists](https://www.w3.org/TR/CSS2/generate.html#list-style)
///
/// Also used for the style argument of `counter()` and `counters()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ListStyleType {
    /// Filled circle.
    #[default]
    Disc,
    /// Hollow circle.
    Circle,
    /// Filled square.
    Square,
    /// 1, 2, 3.
    Decimal,
    /// 01, 02, 03.
    DecimalLeadingZero,
    /// i, ii, iii.
    LowerRoman,
    /// I, II, III.
    UpperRoman,
    /// a, b, c.
    #[strum(to_string = "lower-alpha", serialize = "lower-latin")]
    LowerAlpha,
    /// A, B, C.
    #[strum(to_string = "upper-alpha", serialize = "upper-latin")]
    UpperAlpha,
    /// α, β, γ.
    LowerGreek,
    /// Α, Β, Γ.
    UpperGreek,
    /// No marker.
    None,
}

impl ListStyleType {
    /// Glyph markers drawn as shapes rather than text.
    #[must_use]
    pub const fn is_shape(self) -> bool {
        matches!(self, Self::Disc | Self::Circle | Self::Square)
    }
}

/// [§ 12.5.1](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ListStylePosition {
    /// Marker outside the principal box.
    #[default]
    Outside,
    /// Marker as the first inline box.
    Inside,
}

/// [§ 13.3.1 Page break properties](https://www.w3.org/TR/CSS2/page.html#page-break-props)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PageBreak {
    /// "Neither force nor forbid a page break."
    #[default]
    Auto,
    /// "Always force a page break."
    Always,
    /// "Avoid a page break."
    Avoid,
    /// Force one or two breaks so the next page is a left page.
    Left,
    /// Force one or two breaks so the next page is a right page.
    Right,
}

impl PageBreak {
    /// `always`, `left` and `right` force a break.
    #[must_use]
    pub const fn is_forced(self) -> bool {
        matches!(self, Self::Always | Self::Left | Self::Right)
    }
}

/// [§ 17.6 Borders](https://www.w3.org/TR/CSS2/tables.html#borders)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BorderCollapse {
    /// Cells keep their own borders.
    #[default]
    Separate,
    /// Adjacent cell borders merge.
    Collapse,
}

/// [§ 17.5.2 Table width algorithms](https://www.w3.org/TR/CSS2/tables.html#width-layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TableLayout {
    /// Content-driven column widths.
    #[default]
    Auto,
    /// Column widths fixed by the first row.
    Fixed,
}

/// [§ 11.1.1 Overflow](https://www.w3.org/TR/CSS2/visufx.html#overflow)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Overflow {
    /// Content may spill out.
    #[default]
    Visible,
    /// Content is clipped.
    Hidden,
    /// Clipped (no scrolling on paper).
    Scroll,
    /// Clipped when it overflows.
    Auto,
}

impl Overflow {
    /// Anything but `visible` clips on paper.
    #[must_use]
    pub const fn clips(self) -> bool {
        !matches!(self, Self::Visible)
    }
}

/// [§ 11.2 Visibility](https://www.w3.org/TR/CSS2/visufx.html#visibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Visibility {
    /// Drawn.
    #[default]
    Visible,
    /// Laid out but not drawn.
    Hidden,
    /// Same as hidden outside tables.
    Collapse,
}

/// [§ 15.7 Font styling](https://www.w3.org/TR/CSS2/fonts.html#font-styling)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic face.
    Italic,
    /// Slanted face, treated as italic.
    Oblique,
}

/// [§ 15.8 Small-caps](https://www.w3.org/TR/CSS2/fonts.html#small-caps)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FontVariant {
    /// Regular glyphs.
    #[default]
    Normal,
    /// Small capitals (rendered as upper case).
    SmallCaps,
}

/// [§ 14.2.1 Background properties](https://www.w3.org/TR/CSS2/colors.html#propdef-background-repeat)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BackgroundRepeat {
    /// Tile both ways.
    #[default]
    Repeat,
    /// Tile horizontally.
    RepeatX,
    /// Tile vertically.
    RepeatY,
    /// Draw once.
    NoRepeat,
}

impl BackgroundRepeat {
    /// Whether tiles repeat along x.
    #[must_use]
    pub const fn repeats_x(self) -> bool {
        matches!(self, Self::Repeat | Self::RepeatX)
    }

    /// Whether tiles repeat along y.
    #[must_use]
    pub const fn repeats_y(self) -> bool {
        matches!(self, Self::Repeat | Self::RepeatY)
    }
}
