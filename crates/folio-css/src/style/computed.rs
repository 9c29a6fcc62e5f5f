//! The typed style record bound to each layout box.
//!
//! [§ 6.1 Specified, computed, and actual values](https://www.w3.org/TR/CSS2/cascade.html#value-stages)
//!
//! A [`Style`] starts from the CSS 2.1 initial values, receives declarations
//! through [`Style::set_declaration`], then inherits from its parent with
//! [`Style::inherit`]. Lengths stay unresolved until layout asks for them in
//! points with a reference size, because percentages depend on the
//! containing block.

use std::collections::HashSet;
use std::rc::Rc;

use folio_common::Warnings;
use serde::Serialize;

use super::font::FontSubtype;
use super::property::{INHERITED_PROPERTIES, Property};
use super::shorthand::{self, Expansion};
use super::stylesheet::StylesheetContext;
use super::values::{
    AutoLength, BackgroundPosition, BackgroundRepeat, BorderCollapse, BorderSide, ColorValue,
    DisplayValue, Float, FontStyle, FontVariant, LengthValue, LineHeight, ListStylePosition,
    ListStyleType, Overflow, PageBreak, Position, Side, Sides, TableLayout, TextAlign,
    TextDecoration, TextTransform, UsedLength, VerticalAlign, Visibility, WhiteSpace, parse_auto_length,
    parse_color, parse_length,
};

/// Used value of `line-height: normal` as a multiple of the font size.
pub const DEFAULT_LINE_HEIGHT: f32 = 1.2;

/// [§ 15.7 Font size](https://www.w3.org/TR/CSS2/fonts.html#font-size-props)
///
/// Absolute-size keywords as multiples of the default font size.
const FONT_SIZE_KEYWORDS: [(&str, f32); 7] = [
    ("xx-small", 0.6),
    ("x-small", 0.75),
    ("small", 0.889),
    ("medium", 1.0),
    ("large", 1.2),
    ("x-large", 1.5),
    ("xx-large", 2.0),
];

/// Resolved CSS properties of one box.
#[derive(Debug, Clone, Serialize)]
pub struct Style {
    /// [§ 9.2.4 'display'](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
    pub display: DisplayValue,
    /// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    pub position: Position,
    /// Parsed but laid out as `none`.
    pub float: Float,
    /// `top`, `right`, `bottom`, `left` box offsets.
    pub offsets: Sides<AutoLength>,
    /// [§ 10.2 'width'](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    pub width: AutoLength,
    /// [§ 10.5 'height'](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    pub height: AutoLength,
    /// `min-width`
    pub min_width: AutoLength,
    /// `min-height`
    pub min_height: AutoLength,
    /// `max-width`
    pub max_width: AutoLength,
    /// `max-height`
    pub max_height: AutoLength,
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    pub margin: Sides<AutoLength>,
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding: Sides<LengthValue>,
    /// [§ 8.5 Border properties](https://www.w3.org/TR/CSS2/box.html#border-properties)
    pub border: Sides<BorderSide>,
    /// Prioritised family list, lowercase, unquoted.
    pub font_family: Vec<String>,
    /// Specified size; relative units resolve against the parent's size.
    pub font_size: LengthValue,
    /// Numeric weight (400 normal, 700 bold).
    pub font_weight: u16,
    /// `font-style`
    pub font_style: FontStyle,
    /// `font-variant`
    pub font_variant: FontVariant,
    /// `line-height`
    pub line_height: LineHeight,
    /// Extra space between characters.
    pub letter_spacing: LengthValue,
    /// Extra space between words.
    pub word_spacing: LengthValue,
    /// Foreground color.
    pub color: ColorValue,
    /// `None` is `transparent`.
    pub background_color: Option<ColorValue>,
    /// Resolved URL of the background image.
    pub background_image: Option<String>,
    /// `background-repeat`
    pub background_repeat: BackgroundRepeat,
    /// `background-position`
    pub background_position: BackgroundPosition,
    /// `text-align`
    pub text_align: TextAlign,
    /// First-line indentation.
    pub text_indent: LengthValue,
    /// `text-decoration`
    pub text_decoration: TextDecoration,
    /// `text-transform`
    pub text_transform: TextTransform,
    /// `white-space`
    pub white_space: WhiteSpace,
    /// `vertical-align`
    pub vertical_align: VerticalAlign,
    /// `list-style-type`
    pub list_style_type: ListStyleType,
    /// `list-style-position`
    pub list_style_position: ListStylePosition,
    /// Resolved URL of the marker image.
    pub list_style_image: Option<String>,
    /// [§ 13.3.1 Page break properties](https://www.w3.org/TR/CSS2/page.html#page-break-props)
    pub page_break_before: PageBreak,
    /// `page-break-after`
    pub page_break_after: PageBreak,
    /// `page-break-inside` (`auto` or `avoid`)
    pub page_break_inside: PageBreak,
    /// Minimum lines left at the bottom of a page.
    pub orphans: u32,
    /// Minimum lines carried to the top of a page. Parsed, not enforced.
    pub widows: u32,
    /// `border-collapse`
    pub border_collapse: BorderCollapse,
    /// Horizontal and vertical `border-spacing`.
    pub border_spacing: (LengthValue, LengthValue),
    /// `table-layout`
    pub table_layout: TableLayout,
    /// `overflow`
    pub overflow: Overflow,
    /// `visibility`
    pub visibility: Visibility,
    /// Raw `content` value; `None` for `normal`/`none`.
    pub content: Option<String>,
    /// `(name, value)` pairs of `counter-reset`.
    pub counter_reset: Vec<(String, i32)>,
    /// `(name, increment)` pairs of `counter-increment`.
    pub counter_increment: Vec<(String, i32)>,

    /// Resolved font size of the parent, in points.
    parent_font_size: f32,
    #[serde(skip)]
    explicit: HashSet<Property>,
    #[serde(skip)]
    important: HashSet<Property>,
    #[serde(skip)]
    inherit_requested: HashSet<Property>,
    #[serde(skip)]
    context: Rc<StylesheetContext>,
}

impl Default for Style {
    fn default() -> Self {
        Self::new(Rc::new(StylesheetContext::default()))
    }
}

impl Style {
    /// A style holding the CSS 2.1 initial values.
    #[must_use]
    pub fn new(context: Rc<StylesheetContext>) -> Self {
        let font_size = context.default_font_size;
        Self {
            display: DisplayValue::Inline,
            position: Position::Static,
            float: Float::None,
            offsets: Sides::all(AutoLength::Auto),
            width: AutoLength::Auto,
            height: AutoLength::Auto,
            min_width: AutoLength::ZERO,
            min_height: AutoLength::ZERO,
            max_width: AutoLength::None,
            max_height: AutoLength::None,
            margin: Sides::all(AutoLength::ZERO),
            padding: Sides::all(LengthValue::ZERO),
            border: Sides::all(BorderSide::default()),
            font_family: vec![context.default_font_family.to_ascii_lowercase()],
            font_size: LengthValue::Pt(font_size),
            font_weight: 400,
            font_style: FontStyle::Normal,
            font_variant: FontVariant::Normal,
            line_height: LineHeight::Normal,
            letter_spacing: LengthValue::ZERO,
            word_spacing: LengthValue::ZERO,
            color: ColorValue::BLACK,
            background_color: None,
            background_image: None,
            background_repeat: BackgroundRepeat::Repeat,
            background_position: BackgroundPosition::default(),
            text_align: TextAlign::Left,
            text_indent: LengthValue::ZERO,
            text_decoration: TextDecoration::None,
            text_transform: TextTransform::None,
            white_space: WhiteSpace::Normal,
            vertical_align: VerticalAlign::Baseline,
            list_style_type: ListStyleType::Disc,
            list_style_position: ListStylePosition::Outside,
            list_style_image: None,
            page_break_before: PageBreak::Auto,
            page_break_after: PageBreak::Auto,
            page_break_inside: PageBreak::Auto,
            orphans: 2,
            widows: 2,
            border_collapse: BorderCollapse::Separate,
            border_spacing: (LengthValue::ZERO, LengthValue::ZERO),
            table_layout: TableLayout::Auto,
            overflow: Overflow::Visible,
            visibility: Visibility::Visible,
            content: None,
            counter_reset: Vec::new(),
            counter_increment: Vec::new(),
            parent_font_size: font_size,
            explicit: HashSet::new(),
            important: HashSet::new(),
            inherit_requested: HashSet::new(),
            context,
        }
    }

    /// A style for an anonymous box (text, generated content, bullets,
    /// anonymous table rows): initial values plus inheritance from `parent`.
    #[must_use]
    pub fn anonymous(parent: &Self) -> Self {
        let mut style = Self::new(Rc::clone(&parent.context));
        style.inherit(parent);
        style
    }

    /// The document context shared by this style.
    #[must_use]
    pub fn context(&self) -> &Rc<StylesheetContext> {
        &self.context
    }

    /// Whether `property` was set by a declaration.
    #[must_use]
    pub fn is_explicit(&self, property: Property) -> bool {
        self.explicit.contains(&property)
    }

    /// Whether `property` carries `!important`.
    #[must_use]
    pub fn is_important(&self, property: Property) -> bool {
        self.important.contains(&property)
    }

    // ===== declarations =====

    /// Apply one `name: value [!important]` declaration.
    ///
    /// Shorthands expand into their longhands first. Unknown property names
    /// and values that fail to parse are reported to `warnings` and otherwise
    /// ignored; a normal declaration never replaces an important one.
    pub fn set_declaration(&mut self, name: &str, value: &str, important: bool, warnings: &mut Warnings) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();

        let longhands = match shorthand::expand(&name, value, self.context.dpi) {
            Expansion::Longhands(longhands) => longhands,
            Expansion::Invalid => {
                let _ = warnings.warn_once("CSS", format!("invalid value '{value}' for '{name}'"));
                return;
            }
            Expansion::NotShorthand => match name.parse::<Property>() {
                Ok(property) => vec![(property, value.to_string())],
                Err(_) => {
                    let _ = warnings.warn_once("CSS", format!("unknown property '{name}'"));
                    return;
                }
            },
        };

        for (property, value) in longhands {
            if self.is_important(property) && !important {
                continue;
            }
            if !self.apply(property, &value, warnings) {
                let _ = warnings.warn_once(
                    "CSS",
                    format!("invalid value '{value}' for '{}'", property.as_ref()),
                );
                continue;
            }
            let _ = self.explicit.insert(property);
            if important {
                let _ = self.important.insert(property);
            }
        }
    }

    /// Parse `value` into the field behind `property`. Returns `false` when
    /// the value is not valid for the property.
    fn apply(&mut self, property: Property, value: &str, warnings: &mut Warnings) -> bool {
        use Property as P;

        let lower = value.to_ascii_lowercase();
        if lower == "inherit" {
            let _ = self.inherit_requested.insert(property);
            return true;
        }
        let _ = self.inherit_requested.remove(&property);

        let dpi = self.context.dpi;
        let length = || parse_length(&lower, dpi);
        let auto_length = || parse_auto_length(&lower, dpi);

        macro_rules! set {
            ($field:expr, $parsed:expr) => {
                match $parsed {
                    Some(v) => {
                        $field = v;
                        true
                    }
                    None => false,
                }
            };
        }
        macro_rules! keyword {
            ($field:expr) => {
                set!($field, lower.parse().ok())
            };
        }

        match property {
            P::Display => keyword!(self.display),
            P::Position => keyword!(self.position),
            P::Float => match lower.parse::<Float>() {
                Ok(float) => {
                    if float != Float::None {
                        let _ = warnings.warn_once("Layout", "floats are not supported; laid out as 'float: none'");
                    }
                    self.float = float;
                    true
                }
                Err(_) => false,
            },
            P::Top => set!(self.offsets.top, auto_length()),
            P::Right => set!(self.offsets.right, auto_length()),
            P::Bottom => set!(self.offsets.bottom, auto_length()),
            P::Left => set!(self.offsets.left, auto_length()),
            P::Width => set!(self.width, auto_length().filter(|l| !l.is_none())),
            P::Height => set!(self.height, auto_length().filter(|l| !l.is_none())),
            P::MinWidth => set!(self.min_width, length().map(AutoLength::Length)),
            P::MinHeight => set!(self.min_height, length().map(AutoLength::Length)),
            P::MaxWidth => set!(self.max_width, auto_length().filter(|l| !l.is_auto())),
            P::MaxHeight => set!(self.max_height, auto_length().filter(|l| !l.is_auto())),
            P::MarginTop => set!(self.margin.top, auto_length().filter(|l| !l.is_none())),
            P::MarginRight => set!(self.margin.right, auto_length().filter(|l| !l.is_none())),
            P::MarginBottom => set!(self.margin.bottom, auto_length().filter(|l| !l.is_none())),
            P::MarginLeft => set!(self.margin.left, auto_length().filter(|l| !l.is_none())),
            P::PaddingTop => set!(self.padding.top, length()),
            P::PaddingRight => set!(self.padding.right, length()),
            P::PaddingBottom => set!(self.padding.bottom, length()),
            P::PaddingLeft => set!(self.padding.left, length()),
            P::BorderTopWidth => set!(self.border.top.width, length()),
            P::BorderRightWidth => set!(self.border.right.width, length()),
            P::BorderBottomWidth => set!(self.border.bottom.width, length()),
            P::BorderLeftWidth => set!(self.border.left.width, length()),
            P::BorderTopStyle => keyword!(self.border.top.style),
            P::BorderRightStyle => keyword!(self.border.right.style),
            P::BorderBottomStyle => keyword!(self.border.bottom.style),
            P::BorderLeftStyle => keyword!(self.border.left.style),
            P::BorderTopColor => set!(self.border.top.color, parse_border_color(&lower)),
            P::BorderRightColor => set!(self.border.right.color, parse_border_color(&lower)),
            P::BorderBottomColor => set!(self.border.bottom.color, parse_border_color(&lower)),
            P::BorderLeftColor => set!(self.border.left.color, parse_border_color(&lower)),
            P::FontFamily => set!(self.font_family, parse_font_family(value)),
            P::FontSize => set!(self.font_size, self.parse_font_size(&lower)),
            P::FontWeight => set!(self.font_weight, parse_font_weight(&lower)),
            P::FontStyle => keyword!(self.font_style),
            P::FontVariant => keyword!(self.font_variant),
            P::LineHeight => set!(self.line_height, LineHeight::parse(&lower, dpi)),
            P::LetterSpacing => set!(self.letter_spacing, parse_spacing(&lower, dpi)),
            P::WordSpacing => set!(self.word_spacing, parse_spacing(&lower, dpi)),
            P::Color => set!(self.color, parse_color(&lower)),
            P::BackgroundColor => set!(
                self.background_color,
                parse_color(&lower).map(|c| (!c.is_transparent()).then_some(c))
            ),
            P::BackgroundImage => set!(self.background_image, self.parse_url(value)),
            P::BackgroundRepeat => keyword!(self.background_repeat),
            P::BackgroundPosition => set!(self.background_position, BackgroundPosition::parse(&lower, dpi)),
            P::TextAlign => keyword!(self.text_align),
            P::TextIndent => set!(self.text_indent, length()),
            P::TextDecoration => keyword!(self.text_decoration),
            P::TextTransform => keyword!(self.text_transform),
            P::WhiteSpace => keyword!(self.white_space),
            P::VerticalAlign => set!(self.vertical_align, VerticalAlign::parse(&lower, dpi)),
            P::ListStyleType => keyword!(self.list_style_type),
            P::ListStylePosition => keyword!(self.list_style_position),
            P::ListStyleImage => set!(self.list_style_image, self.parse_url(value)),
            P::PageBreakBefore => keyword!(self.page_break_before),
            P::PageBreakAfter => keyword!(self.page_break_after),
            P::PageBreakInside => set!(
                self.page_break_inside,
                lower.parse::<PageBreak>().ok().filter(|b| matches!(b, PageBreak::Auto | PageBreak::Avoid))
            ),
            P::Orphans => set!(self.orphans, lower.parse().ok()),
            P::Widows => set!(self.widows, lower.parse().ok()),
            P::BorderCollapse => {
                if lower == "groups" {
                    let _ = warnings.warn_once("CSS", "'border-collapse: groups' is not supported");
                    return true;
                }
                keyword!(self.border_collapse)
            }
            P::BorderSpacing => set!(self.border_spacing, parse_border_spacing(&lower, dpi)),
            P::TableLayout => keyword!(self.table_layout),
            P::Overflow => keyword!(self.overflow),
            P::Visibility => keyword!(self.visibility),
            P::Content => {
                self.content = match lower.as_str() {
                    "normal" | "none" => None,
                    _ => Some(value.to_string()),
                };
                true
            }
            P::CounterReset => set!(self.counter_reset, parse_counter_list(value, 0)),
            P::CounterIncrement => set!(self.counter_increment, parse_counter_list(value, 1)),
        }
    }

    fn parse_font_size(&self, value: &str) -> Option<LengthValue> {
        if let Some(&(_, ratio)) = FONT_SIZE_KEYWORDS.iter().find(|(k, _)| *k == value) {
            return Some(LengthValue::Pt(ratio * self.context.default_font_size));
        }
        match value {
            "smaller" => Some(LengthValue::Percent(100.0 / 1.2)),
            "larger" => Some(LengthValue::Percent(120.0)),
            _ => parse_length(value, self.context.dpi).filter(|l| l.to_pt(1.0, Some(1.0)) >= 0.0),
        }
    }

    /// `url(...)` resolved against the stylesheet base, `None` for `none`.
    fn parse_url(&self, value: &str) -> Option<Option<String>> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("none") {
            return Some(None);
        }
        let inner = value
            .strip_prefix("url(")
            .or_else(|| value.strip_prefix("URL("))?
            .strip_suffix(')')?
            .trim()
            .trim_matches(['"', '\'']);
        Some(Some(self.context.base_url.resolve(inner)))
    }

    // ===== inheritance =====

    /// [§ 6.2 Inheritance](https://www.w3.org/TR/CSS2/cascade.html#inheritance)
    ///
    /// Copy every inherited property the child did not set itself, plus
    /// properties explicitly declared `inherit`. An `!important` parent value
    /// beats a normal child value. The parent's resolved font size is always
    /// recorded so relative units resolve correctly.
    pub fn inherit(&mut self, parent: &Self) {
        self.parent_font_size = parent.font_size_pt();

        for property in INHERITED_PROPERTIES {
            let child_wins = self.is_explicit(property)
                && !(parent.is_important(property) && !self.is_important(property));
            if !child_wins {
                self.copy_inherited(property, parent);
                if parent.is_important(property) {
                    let _ = self.important.insert(property);
                }
            }
        }

        let requested: Vec<Property> = self.inherit_requested.iter().copied().collect();
        for property in requested {
            self.copy_inherited(property, parent);
        }
    }

    /// Copy an inherited value, resolving font-relative lengths against the
    /// parent so they are not applied twice.
    fn copy_inherited(&mut self, property: Property, parent: &Self) {
        let parent_size = parent.font_size_pt();
        match property {
            Property::FontSize => self.font_size = LengthValue::Pt(parent_size),
            Property::LineHeight => {
                self.line_height = match parent.line_height {
                    LineHeight::Length(_) => LineHeight::Length(LengthValue::Pt(parent.line_height_pt())),
                    other => other,
                };
            }
            Property::LetterSpacing => self.letter_spacing = parent.letter_spacing.absolutize(parent_size),
            Property::WordSpacing => self.word_spacing = parent.word_spacing.absolutize(parent_size),
            Property::TextIndent => self.text_indent = parent.text_indent.absolutize(parent_size),
            other => self.copy_property(other, parent),
        }
    }

    /// Overlay every explicit property of `other` onto `self`.
    ///
    /// A property of `self` marked important survives unless `other` is
    /// important too.
    pub fn merge(&mut self, other: &Self) {
        let properties: Vec<Property> = other.explicit.iter().copied().collect();
        for property in properties {
            if self.is_important(property) && !other.is_important(property) {
                continue;
            }
            self.copy_property(property, other);
            let _ = self.explicit.insert(property);
            if other.is_important(property) {
                let _ = self.important.insert(property);
            }
        }
        if other.is_explicit(Property::FontSize) {
            self.parent_font_size = other.parent_font_size;
        }
    }

    fn copy_property(&mut self, property: Property, from: &Self) {
        use Property as P;
        match property {
            P::Display => self.display = from.display,
            P::Position => self.position = from.position,
            P::Float => self.float = from.float,
            P::Top => self.offsets.top = from.offsets.top,
            P::Right => self.offsets.right = from.offsets.right,
            P::Bottom => self.offsets.bottom = from.offsets.bottom,
            P::Left => self.offsets.left = from.offsets.left,
            P::Width => self.width = from.width,
            P::Height => self.height = from.height,
            P::MinWidth => self.min_width = from.min_width,
            P::MinHeight => self.min_height = from.min_height,
            P::MaxWidth => self.max_width = from.max_width,
            P::MaxHeight => self.max_height = from.max_height,
            P::MarginTop => self.margin.top = from.margin.top,
            P::MarginRight => self.margin.right = from.margin.right,
            P::MarginBottom => self.margin.bottom = from.margin.bottom,
            P::MarginLeft => self.margin.left = from.margin.left,
            P::PaddingTop => self.padding.top = from.padding.top,
            P::PaddingRight => self.padding.right = from.padding.right,
            P::PaddingBottom => self.padding.bottom = from.padding.bottom,
            P::PaddingLeft => self.padding.left = from.padding.left,
            P::BorderTopWidth => self.border.top.width = from.border.top.width,
            P::BorderRightWidth => self.border.right.width = from.border.right.width,
            P::BorderBottomWidth => self.border.bottom.width = from.border.bottom.width,
            P::BorderLeftWidth => self.border.left.width = from.border.left.width,
            P::BorderTopStyle => self.border.top.style = from.border.top.style,
            P::BorderRightStyle => self.border.right.style = from.border.right.style,
            P::BorderBottomStyle => self.border.bottom.style = from.border.bottom.style,
            P::BorderLeftStyle => self.border.left.style = from.border.left.style,
            P::BorderTopColor => self.border.top.color = from.border.top.color,
            P::BorderRightColor => self.border.right.color = from.border.right.color,
            P::BorderBottomColor => self.border.bottom.color = from.border.bottom.color,
            P::BorderLeftColor => self.border.left.color = from.border.left.color,
            P::FontFamily => self.font_family.clone_from(&from.font_family),
            P::FontSize => self.font_size = from.font_size,
            P::FontWeight => self.font_weight = from.font_weight,
            P::FontStyle => self.font_style = from.font_style,
            P::FontVariant => self.font_variant = from.font_variant,
            P::LineHeight => self.line_height = from.line_height,
            P::LetterSpacing => self.letter_spacing = from.letter_spacing,
            P::WordSpacing => self.word_spacing = from.word_spacing,
            P::Color => self.color = from.color,
            P::BackgroundColor => self.background_color = from.background_color,
            P::BackgroundImage => self.background_image.clone_from(&from.background_image),
            P::BackgroundRepeat => self.background_repeat = from.background_repeat,
            P::BackgroundPosition => self.background_position = from.background_position,
            P::TextAlign => self.text_align = from.text_align,
            P::TextIndent => self.text_indent = from.text_indent,
            P::TextDecoration => self.text_decoration = from.text_decoration,
            P::TextTransform => self.text_transform = from.text_transform,
            P::WhiteSpace => self.white_space = from.white_space,
            P::VerticalAlign => self.vertical_align = from.vertical_align,
            P::ListStyleType => self.list_style_type = from.list_style_type,
            P::ListStylePosition => self.list_style_position = from.list_style_position,
            P::ListStyleImage => self.list_style_image.clone_from(&from.list_style_image),
            P::PageBreakBefore => self.page_break_before = from.page_break_before,
            P::PageBreakAfter => self.page_break_after = from.page_break_after,
            P::PageBreakInside => self.page_break_inside = from.page_break_inside,
            P::Orphans => self.orphans = from.orphans,
            P::Widows => self.widows = from.widows,
            P::BorderCollapse => self.border_collapse = from.border_collapse,
            P::BorderSpacing => self.border_spacing = from.border_spacing,
            P::TableLayout => self.table_layout = from.table_layout,
            P::Overflow => self.overflow = from.overflow,
            P::Visibility => self.visibility = from.visibility,
            P::Content => self.content.clone_from(&from.content),
            P::CounterReset => self.counter_reset.clone_from(&from.counter_reset),
            P::CounterIncrement => self.counter_increment.clone_from(&from.counter_increment),
        }
    }

    // ===== used values =====

    /// Resolved font size in points.
    #[must_use]
    pub fn font_size_pt(&self) -> f32 {
        let parent = self.parent_font_size;
        match self.font_size {
            LengthValue::Pt(v) => v,
            LengthValue::Percent(p) => parent * p / 100.0,
            LengthValue::Em(e) => parent * e,
            LengthValue::Ex(e) => parent * e / 2.0,
        }
    }

    /// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
    #[must_use]
    pub fn line_height_pt(&self) -> f32 {
        let size = self.font_size_pt();
        match self.line_height {
            LineHeight::Normal => DEFAULT_LINE_HEIGHT * size,
            LineHeight::Number(n) => n * size,
            LineHeight::Length(l) => l.to_pt(size, Some(size)),
        }
    }

    /// Face subtype requested by weight and style.
    #[must_use]
    pub const fn font_subtype(&self) -> FontSubtype {
        FontSubtype::from_style(self.font_weight, self.font_style)
    }

    /// Resolve a plain length to points. Percentages use `reference`.
    #[must_use]
    pub fn to_pt(&self, value: LengthValue, reference: Option<f32>) -> f32 {
        value.to_pt(self.font_size_pt(), reference)
    }

    /// Resolve a length that may be `auto` or `none`.
    ///
    /// [§ 4.3.2 Lengths](https://www.w3.org/TR/CSS2/syndata.html#length-units)
    #[must_use]
    pub fn length_in_pt(&self, value: AutoLength, reference: Option<f32>) -> UsedLength {
        match value {
            AutoLength::Auto => UsedLength::Auto,
            AutoLength::None => UsedLength::None,
            AutoLength::Length(l) => UsedLength::Pt(self.to_pt(l, reference)),
        }
    }

    /// Sum a list of lengths, counting `auto` and `none` as zero.
    #[must_use]
    pub fn length_sum_in_pt(&self, values: &[AutoLength], reference: Option<f32>) -> f32 {
        values
            .iter()
            .map(|v| self.length_in_pt(*v, reference).or_zero())
            .sum()
    }

    /// Used margin on one side, `auto` counting as zero.
    #[must_use]
    pub fn margin_pt(&self, side: Side, containing_width: Option<f32>) -> f32 {
        self.length_in_pt(*self.margin.get(side), containing_width).or_zero()
    }

    /// Used padding on one side.
    #[must_use]
    pub fn padding_pt(&self, side: Side, containing_width: Option<f32>) -> f32 {
        self.to_pt(*self.padding.get(side), containing_width)
    }

    /// [§ 8.5.1](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    ///
    /// Used border width; `none` and `hidden` borders are zero wide.
    #[must_use]
    pub fn border_width_pt(&self, side: Side) -> f32 {
        let border = self.border.get(side);
        if border.style.is_invisible() {
            0.0
        } else {
            self.to_pt(border.width, None).max(0.0)
        }
    }

    /// Border color with `currentColor` resolved.
    #[must_use]
    pub fn border_color(&self, side: Side) -> ColorValue {
        self.border.get(side).color.unwrap_or(self.color)
    }

    /// Horizontal and vertical border spacing in points.
    #[must_use]
    pub fn border_spacing_pt(&self) -> (f32, f32) {
        (
            self.to_pt(self.border_spacing.0, None),
            self.to_pt(self.border_spacing.1, None),
        )
    }

    /// Zero the margin, border width and padding of one side.
    pub fn clear_edges(&mut self, side: Side) {
        *self.margin.get_mut(side) = AutoLength::ZERO;
        *self.padding.get_mut(side) = LengthValue::ZERO;
        self.border.get_mut(side).width = LengthValue::ZERO;
    }
}

fn parse_border_color(value: &str) -> Option<Option<ColorValue>> {
    if value == "currentcolor" {
        return Some(None);
    }
    parse_color(value).map(Some)
}

fn parse_font_family(value: &str) -> Option<Vec<String>> {
    let families: Vec<String> = value
        .split(',')
        .map(|f| f.trim().trim_matches(['"', '\'']).trim().to_ascii_lowercase())
        .filter(|f| !f.is_empty())
        .collect();
    (!families.is_empty()).then_some(families)
}

/// `bolder` counts as bold and `lighter` as normal.
fn parse_font_weight(value: &str) -> Option<u16> {
    match value {
        "normal" | "lighter" => Some(400),
        "bold" | "bolder" => Some(700),
        other => other
            .parse::<u16>()
            .ok()
            .filter(|w| (100..=900).contains(w) && w % 100 == 0),
    }
}

fn parse_spacing(value: &str, dpi: f32) -> Option<LengthValue> {
    if value == "normal" {
        return Some(LengthValue::ZERO);
    }
    parse_length(value, dpi).filter(|l| !l.is_percent())
}

fn parse_border_spacing(value: &str, dpi: f32) -> Option<(LengthValue, LengthValue)> {
    let parts: Vec<LengthValue> = value
        .split_whitespace()
        .map(|p| parse_length(p, dpi))
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [both] => Some((*both, *both)),
        [h, v] => Some((*h, *v)),
        _ => None,
    }
}

/// [§ 12.4 Automatic counters and numbering](https://www.w3.org/TR/CSS2/generate.html#counters)
///
/// "Value: [ `<identifier>` `<integer>`? ]+ | none | inherit"
fn parse_counter_list(value: &str, default: i32) -> Option<Vec<(String, i32)>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        return Some(Vec::new());
    }
    let mut counters: Vec<(String, i32)> = Vec::new();
    for token in value.split_whitespace() {
        if let Ok(n) = token.parse::<i32>() {
            let last = counters.last_mut()?;
            last.1 = n;
        } else if token.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_' || c == '-') {
            counters.push((token.to_string(), default));
        } else {
            return None;
        }
    }
    (!counters.is_empty()).then_some(counters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_with(decls: &[(&str, &str)]) -> (Style, Warnings) {
        let mut warnings = Warnings::new();
        let mut style = Style::default();
        for (name, value) in decls {
            style.set_declaration(name, value, false, &mut warnings);
        }
        (style, warnings)
    }

    #[test]
    fn test_initial_values() {
        let style = Style::default();
        assert_eq!(style.display, DisplayValue::Inline);
        assert_eq!(style.font_size_pt(), 12.0);
        assert_eq!(style.border_width_pt(Side::Top), 0.0);
        assert_eq!(style.max_width, AutoLength::None);
        assert!((style.line_height_pt() - 14.4).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_and_invalid_become_warnings() {
        let (style, warnings) = style_with(&[("colour", "red"), ("width", "wide"), ("color", "red")]);
        assert_eq!(style.color, ColorValue::rgb(255, 0, 0));
        assert_eq!(warnings.len(), 2);
        assert!(!style.is_explicit(Property::Width));
    }

    #[test]
    fn test_border_px_converts_to_points() {
        let (style, _) = style_with(&[("border-right", "2px solid")]);
        assert_eq!(style.border_width_pt(Side::Right), 1.5);
        assert_eq!(style.border_color(Side::Right), ColorValue::BLACK);
    }

    #[test]
    fn test_inherit_respects_explicit_and_important() {
        let mut warnings = Warnings::new();
        let mut parent = Style::default();
        parent.set_declaration("color", "red", true, &mut warnings);
        parent.set_declaration("font-size", "20pt", false, &mut warnings);
        parent.set_declaration("text-align", "center", false, &mut warnings);
        parent.set_declaration("margin-left", "10pt", false, &mut warnings);

        let mut child = Style::default();
        child.set_declaration("color", "blue", false, &mut warnings);
        child.set_declaration("text-align", "right", false, &mut warnings);
        child.set_declaration("font-size", "50%", false, &mut warnings);
        child.inherit(&parent);

        // Important parent value wins over a normal child value.
        assert_eq!(child.color, ColorValue::rgb(255, 0, 0));
        assert_eq!(child.text_align, TextAlign::Right);
        assert_eq!(child.font_size_pt(), 10.0);
        // Margins do not inherit.
        assert_eq!(child.margin.left, AutoLength::ZERO);
    }

    #[test]
    fn test_inherit_resolves_em_once() {
        let mut warnings = Warnings::new();
        let mut parent = Style::default();
        parent.set_declaration("font-size", "2em", false, &mut warnings);
        parent.set_declaration("letter-spacing", "0.5em", false, &mut warnings);
        let mut child = Style::default();
        child.inherit(&parent);
        assert_eq!(child.font_size_pt(), 24.0);
        assert_eq!(child.letter_spacing, LengthValue::Pt(12.0));
    }

    #[test]
    fn test_explicit_inherit_keyword() {
        let mut warnings = Warnings::new();
        let mut parent = Style::default();
        parent.set_declaration("margin-top", "7pt", false, &mut warnings);
        let mut child = Style::default();
        child.set_declaration("margin-top", "inherit", false, &mut warnings);
        child.inherit(&parent);
        assert_eq!(child.margin.top, AutoLength::pt(7.0));
    }

    #[test]
    fn test_merge_precedence() {
        let mut warnings = Warnings::new();
        let mut base = Style::default();
        base.set_declaration("color", "red", true, &mut warnings);
        base.set_declaration("width", "10pt", false, &mut warnings);
        let mut overlay = Style::default();
        overlay.set_declaration("color", "blue", false, &mut warnings);
        overlay.set_declaration("width", "20pt", false, &mut warnings);

        base.merge(&overlay);
        assert_eq!(base.color, ColorValue::rgb(255, 0, 0));
        assert_eq!(base.width, AutoLength::pt(20.0));
    }

    #[test]
    fn test_length_sum_treats_auto_as_zero() {
        let (style, _) = style_with(&[("margin", "auto 10%"), ("padding-left", "2em")]);
        let sum = style.length_sum_in_pt(
            &[style.margin.top, style.margin.left, style.padding.left.into()],
            Some(200.0),
        );
        assert_eq!(sum, 20.0 + 24.0);
        assert_eq!(style.length_in_pt(style.margin.top, Some(200.0)), UsedLength::Auto);
    }

    #[test]
    fn test_font_size_keywords() {
        let (style, _) = style_with(&[("font-size", "x-large")]);
        assert_eq!(style.font_size_pt(), 18.0);
        let (style, _) = style_with(&[("font-size", "larger")]);
        assert!((style.font_size_pt() - 14.4).abs() < 1e-4);
    }

    #[test]
    fn test_counters_and_content() {
        let (style, _) = style_with(&[
            ("counter-reset", "item chapter 3"),
            ("counter-increment", "item"),
            ("content", "counter(item) \". \""),
        ]);
        assert_eq!(style.counter_reset, vec![("item".to_string(), 0), ("chapter".to_string(), 3)]);
        assert_eq!(style.counter_increment, vec![("item".to_string(), 1)]);
        assert_eq!(style.content.as_deref(), Some("counter(item) \". \""));
    }

    #[test]
    fn test_urls_resolve_against_context() {
        let context = StylesheetContext {
            base_url: folio_common::BaseUrl::from_location("http://example.com/css/site.css"),
            ..StylesheetContext::default()
        };
        let mut style = Style::new(Rc::new(context));
        let mut warnings = Warnings::new();
        style.set_declaration("background", "url('img/bg.png') repeat-x", false, &mut warnings);
        assert_eq!(
            style.background_image.as_deref(),
            Some("http://example.com/css/img/bg.png")
        );
        assert_eq!(style.background_repeat, BackgroundRepeat::RepeatX);
        assert!(warnings.is_empty());
    }
}
