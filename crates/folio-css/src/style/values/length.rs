//! CSS length values and parsing
//!
//! [CSS 2.1 § 4.3.2 Lengths](https://www.w3.org/TR/CSS2/syndata.html#length-units)
//!
//! Absolute units are folded into points when a declaration is parsed, so the
//! layout engine only ever sees points, percentages and font-relative units.

use serde::Serialize;

/// Points per inch.
pub const PT_PER_INCH: f32 = 72.0;

/// [§ 4.3.2 Lengths](https://www.w3.org/TR/CSS2/syndata.html#length-units)
///
/// "Lengths refer to horizontal or vertical measurements."
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthValue {
    /// Absolute length in points. `px`, `in`, `cm`, `mm`, `pc` all end up here.
    Pt(f32),
    /// "the 'font-size' of the relevant font"
    Em(f32),
    /// "the 'x-height' of the relevant font". Approximated as half an em.
    Ex(f32),
    /// [§ 4.3.3 Percentages](https://www.w3.org/TR/CSS2/syndata.html#percentage-units)
    Percent(f32),
}

impl LengthValue {
    /// Zero points.
    pub const ZERO: Self = Self::Pt(0.0);

    /// Resolve to points.
    ///
    /// Percentages resolve against `reference` and collapse to zero when no
    /// reference is known. Font-relative units use `font_size`.
    #[must_use]
    pub fn to_pt(&self, font_size: f32, reference: Option<f32>) -> f32 {
        match *self {
            Self::Pt(v) => v,
            Self::Em(v) => v * font_size,
            Self::Ex(v) => v * font_size / 2.0,
            Self::Percent(v) => reference.map_or(0.0, |r| v * r / 100.0),
        }
    }

    /// Turn font-relative units into points, keeping percentages as they are.
    #[must_use]
    pub fn absolutize(&self, font_size: f32) -> Self {
        match self {
            Self::Em(_) | Self::Ex(_) => Self::Pt(self.to_pt(font_size, None)),
            _ => *self,
        }
    }

    /// True for percentages.
    #[must_use]
    pub const fn is_percent(&self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

/// A length that may also be `auto` or `none`.
///
/// [§ 10.2 Content width](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
/// "Value: `<length>` | `<percentage>` | auto | inherit"
///
/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
/// "'max-width' Value: `<length>` | `<percentage>` | none | inherit"
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AutoLength {
    /// Computed by the layout algorithm.
    Auto,
    /// No limit (`max-width`, `max-height`).
    None,
    /// A definite or relative length.
    Length(LengthValue),
}

impl AutoLength {
    /// Zero points.
    pub const ZERO: Self = Self::Length(LengthValue::ZERO);

    /// Shorthand for a length in points.
    #[must_use]
    pub const fn pt(value: f32) -> Self {
        Self::Length(LengthValue::Pt(value))
    }

    /// Check if the value is `auto`.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Check if the value is `none`.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<LengthValue> for AutoLength {
    fn from(value: LengthValue) -> Self {
        Self::Length(value)
    }
}

/// Result of resolving an [`AutoLength`] to a used value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum UsedLength {
    /// The value was `auto`.
    Auto,
    /// The value was `none`.
    None,
    /// A resolved length in points.
    Pt(f32),
}

impl UsedLength {
    /// The length in points, or `None` for `auto`/`none`.
    #[must_use]
    pub const fn pt(self) -> Option<f32> {
        match self {
            Self::Pt(v) => Some(v),
            Self::Auto | Self::None => None,
        }
    }

    /// The length in points with `auto`/`none` treated as zero.
    #[must_use]
    pub fn or_zero(self) -> f32 {
        self.pt().unwrap_or(0.0)
    }

    /// Check if the value is `auto`.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
///
/// "The interpretation of the first three values depends on the user agent."
const BORDER_WIDTH_KEYWORDS: [(&str, f32); 3] = [("thin", 0.5), ("medium", 1.5), ("thick", 2.5)];

/// Parse a length, folding absolute units into points at `dpi` pixels per inch.
///
/// Unitless numbers are taken as points. The border width keywords
/// `thin`, `medium` and `thick` are accepted as well.
#[must_use]
pub fn parse_length(value: &str, dpi: f32) -> Option<LengthValue> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(&(_, pt)) = BORDER_WIDTH_KEYWORDS.iter().find(|(k, _)| *k == value) {
        return Some(LengthValue::Pt(pt));
    }

    let split = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map_or(value.len(), |(i, _)| i);
    let (number, unit) = value.split_at(split);
    let number: f32 = number.parse().ok()?;
    if !number.is_finite() {
        return None;
    }

    let length = match unit.trim() {
        "" | "pt" => LengthValue::Pt(number),
        "px" => LengthValue::Pt(number * PT_PER_INCH / dpi),
        "in" => LengthValue::Pt(number * PT_PER_INCH),
        "cm" => LengthValue::Pt(number * PT_PER_INCH / 2.54),
        "mm" => LengthValue::Pt(number * PT_PER_INCH / 25.4),
        "pc" => LengthValue::Pt(number * 12.0),
        "em" => LengthValue::Em(number),
        "ex" => LengthValue::Ex(number),
        "%" => LengthValue::Percent(number),
        _ => return None,
    };
    Some(length)
}

/// Parse a length that may be `auto` or `none`.
#[must_use]
pub fn parse_auto_length(value: &str, dpi: f32) -> Option<AutoLength> {
    match value.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(AutoLength::Auto),
        "none" => Some(AutoLength::None),
        other => parse_length(other, dpi).map(AutoLength::Length),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_units_fold_to_points() {
        assert_eq!(parse_length("2px", 96.0), Some(LengthValue::Pt(1.5)));
        assert_eq!(parse_length("1in", 96.0), Some(LengthValue::Pt(72.0)));
        assert_eq!(parse_length("2pc", 96.0), Some(LengthValue::Pt(24.0)));
        let cm = parse_length("2.54cm", 96.0).and_then(|l| match l {
            LengthValue::Pt(v) => Some(v),
            _ => None,
        });
        assert!((cm.unwrap() - 72.0).abs() < 1e-3);
    }

    #[test]
    fn test_relative_units_and_keywords() {
        assert_eq!(parse_length("1.5em", 96.0), Some(LengthValue::Em(1.5)));
        assert_eq!(parse_length("50%", 96.0), Some(LengthValue::Percent(50.0)));
        assert_eq!(parse_length("thick", 96.0), Some(LengthValue::Pt(2.5)));
        assert_eq!(parse_length("-3pt", 96.0), Some(LengthValue::Pt(-3.0)));
        assert_eq!(parse_length("12furlongs", 96.0), None);
        assert_eq!(parse_auto_length("AUTO", 96.0), Some(AutoLength::Auto));
        assert_eq!(parse_auto_length("none", 96.0), Some(AutoLength::None));
    }

    #[test]
    fn test_to_pt() {
        assert_eq!(LengthValue::Em(2.0).to_pt(10.0, None), 20.0);
        assert_eq!(LengthValue::Ex(2.0).to_pt(10.0, None), 10.0);
        assert_eq!(LengthValue::Percent(25.0).to_pt(10.0, Some(200.0)), 50.0);
        assert_eq!(LengthValue::Percent(25.0).to_pt(10.0, None), 0.0);
    }
}
