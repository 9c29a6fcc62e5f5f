//! CSS color values and parsing
//!
//! [CSS 2.1 § 4.3.6 Colors](https://www.w3.org/TR/CSS2/syndata.html#color-units)

use serde::Serialize;

/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorValue {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
    /// Alpha channel (0-255, 255 = fully opaque).
    pub a: u8,
}

/// The seventeen CSS 2.1 keywords plus a few common extras.
const NAMED_COLORS: [(&str, [u8; 3]); 22] = [
    ("maroon", [0x80, 0x00, 0x00]),
    ("red", [0xff, 0x00, 0x00]),
    ("orange", [0xff, 0xa5, 0x00]),
    ("yellow", [0xff, 0xff, 0x00]),
    ("olive", [0x80, 0x80, 0x00]),
    ("purple", [0x80, 0x00, 0x80]),
    ("fuchsia", [0xff, 0x00, 0xff]),
    ("white", [0xff, 0xff, 0xff]),
    ("lime", [0x00, 0xff, 0x00]),
    ("green", [0x00, 0x80, 0x00]),
    ("navy", [0x00, 0x00, 0x80]),
    ("blue", [0x00, 0x00, 0xff]),
    ("aqua", [0x00, 0xff, 0xff]),
    ("teal", [0x00, 0x80, 0x80]),
    ("black", [0x00, 0x00, 0x00]),
    ("silver", [0xc0, 0xc0, 0xc0]),
    ("gray", [0x80, 0x80, 0x80]),
    ("grey", [0x80, 0x80, 0x80]),
    ("lightgray", [0xd3, 0xd3, 0xd3]),
    ("lightgrey", [0xd3, 0xd3, 0xd3]),
    ("darkgray", [0xa9, 0xa9, 0xa9]),
    ("darkgrey", [0xa9, 0xa9, 0xa9]),
];

impl ColorValue {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    /// An opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// True when the color has no visible effect.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// `#rgb` and `#rrggbb` notations.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
                Some(Self::rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            6 => {
                let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Self::rgb(pair(0)?, pair(2)?, pair(4)?))
            }
            _ => None,
        }
    }

    /// Named color lookup (case-insensitive).
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name == "transparent" {
            return Some(Self::TRANSPARENT);
        }
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, [r, g, b])| Self::rgb(*r, *g, *b))
    }

    /// Mix the color towards white by `amount` (0..=1).
    #[must_use]
    pub fn lighten(&self, amount: f32) -> Self {
        let mix = |c: u8| (f32::from(c) + (255.0 - f32::from(c)) * amount).round().clamp(0.0, 255.0) as u8;
        Self { r: mix(self.r), g: mix(self.g), b: mix(self.b), a: self.a }
    }

    /// Mix the color towards black by `amount` (0..=1).
    #[must_use]
    pub fn darken(&self, amount: f32) -> Self {
        let mix = |c: u8| (f32::from(c) * (1.0 - amount)).round().clamp(0.0, 255.0) as u8;
        Self { r: mix(self.r), g: mix(self.g), b: mix(self.b), a: self.a }
    }
}

/// Parse `#hex`, `rgb()`, `rgba()` or a named color.
///
/// [§ 4.3.6](https://www.w3.org/TR/CSS2/syndata.html#color-units)
/// "The format of an RGB value in the functional notation is 'rgb(' followed
/// by a comma-separated list of three numerical values (either three integer
/// values or three percentage values) followed by ')'."
#[must_use]
pub fn parse_color(value: &str) -> Option<ColorValue> {
    let value = value.trim().to_ascii_lowercase();
    if value.starts_with('#') {
        return ColorValue::from_hex(&value);
    }
    if let Some(args) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_function(args);
    }
    ColorValue::from_named(&value)
}

fn parse_rgb_function(args: &str) -> Option<ColorValue> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| -> Option<u8> {
        let v = match s.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f32>().ok()? * 255.0 / 100.0,
            None => s.parse::<f32>().ok()?,
        };
        Some(v.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(a) => (a.parse::<f32>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
        None => 255,
    };
    Some(ColorValue {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a: alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_color("#f00"), Some(ColorValue::rgb(255, 0, 0)));
        assert_eq!(parse_color("#00FF7f"), Some(ColorValue::rgb(0, 255, 127)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#ggg"), None);
    }

    #[test]
    fn test_functional_and_named() {
        assert_eq!(parse_color("rgb(10, 20, 30)"), Some(ColorValue::rgb(10, 20, 30)));
        assert_eq!(parse_color("rgb(100%,0%,50%)"), Some(ColorValue::rgb(255, 0, 128)));
        assert_eq!(
            parse_color("rgba(0,0,0,0.5)"),
            Some(ColorValue { r: 0, g: 0, b: 0, a: 128 })
        );
        assert_eq!(parse_color("Navy"), Some(ColorValue::rgb(0, 0, 128)));
        assert_eq!(parse_color("transparent"), Some(ColorValue::TRANSPARENT));
        assert_eq!(parse_color("blurple"), None);
    }

    #[test]
    fn test_shading() {
        assert_eq!(ColorValue::rgb(100, 100, 100).darken(0.5), ColorValue::rgb(50, 50, 50));
        assert_eq!(ColorValue::BLACK.lighten(1.0), ColorValue::WHITE);
    }
}
