//! Shorthand property expansion.
//!
//! [§ 1.4.3 Shorthand properties](https://www.w3.org/TR/CSS2/about.html#shorthand)
//!
//! "Some properties are shorthand properties, meaning that they allow authors
//! to specify the values of several properties with a single property."
//!
//! Each shorthand is expanded into longhand `(Property, value)` pairs that are
//! then parsed one by one. Omitted sub-values reset to their initial value.

use super::property::Property;
use super::values::{
    BackgroundRepeat, BorderStyle, FontStyle, FontVariant, ListStylePosition, ListStyleType, Side,
    Sides, parse_length,
};

/// Result of looking up a declaration name in the shorthand table.
#[derive(Debug, PartialEq)]
pub(crate) enum Expansion {
    /// The name is not a shorthand.
    NotShorthand,
    /// The shorthand expanded into longhands.
    Longhands(Vec<(Property, String)>),
    /// The name is a shorthand but the value could not be split.
    Invalid,
}

const SHORTHANDS: [&str; 13] = [
    "margin",
    "padding",
    "border",
    "border-top",
    "border-right",
    "border-bottom",
    "border-left",
    "border-width",
    "border-style",
    "border-color",
    "font",
    "background",
    "list-style",
];

/// Expand `name: value` if `name` is a shorthand.
pub(crate) fn expand(name: &str, value: &str, dpi: f32) -> Expansion {
    if !SHORTHANDS.contains(&name) {
        return Expansion::NotShorthand;
    }
    let tokens = split_tokens(value);
    let longhands = match name {
        "margin" => four_sides(&tokens, [
            Property::MarginTop,
            Property::MarginRight,
            Property::MarginBottom,
            Property::MarginLeft,
        ]),
        "padding" => four_sides(&tokens, [
            Property::PaddingTop,
            Property::PaddingRight,
            Property::PaddingBottom,
            Property::PaddingLeft,
        ]),
        "border-width" => four_sides(&tokens, Side::ALL.map(|s| border_property(s, BorderPart::Width))),
        "border-style" => four_sides(&tokens, Side::ALL.map(|s| border_property(s, BorderPart::Style))),
        "border-color" => four_sides(&tokens, Side::ALL.map(|s| border_property(s, BorderPart::Color))),
        "border" => border(&tokens, &Side::ALL, dpi),
        "border-top" => border(&tokens, &[Side::Top], dpi),
        "border-right" => border(&tokens, &[Side::Right], dpi),
        "border-bottom" => border(&tokens, &[Side::Bottom], dpi),
        "border-left" => border(&tokens, &[Side::Left], dpi),
        "font" => font(value, &tokens),
        "background" => background(&tokens, dpi),
        "list-style" => list_style(&tokens),
        _ => None,
    };
    longhands.map_or(Expansion::Invalid, Expansion::Longhands)
}

/// Split a value on whitespace, keeping parenthesised groups and quoted
/// strings together.
pub(crate) fn split_tokens(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in value.trim().chars() {
        match (quote, c) {
            (Some(q), _) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), _) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '(') => {
                depth += 1;
                current.push(c);
            }
            (None, ')') => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            (None, c) if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn four_sides(tokens: &[String], properties: [Property; 4]) -> Option<Vec<(Property, String)>> {
    let sides = Sides::from_shorthand(&tokens.iter().map(String::as_str).collect::<Vec<_>>())?;
    Some(vec![
        (properties[0], sides.top.to_string()),
        (properties[1], sides.right.to_string()),
        (properties[2], sides.bottom.to_string()),
        (properties[3], sides.left.to_string()),
    ])
}

#[derive(Clone, Copy)]
enum BorderPart {
    Width,
    Style,
    Color,
}

const fn border_property(side: Side, part: BorderPart) -> Property {
    match (side, part) {
        (Side::Top, BorderPart::Width) => Property::BorderTopWidth,
        (Side::Right, BorderPart::Width) => Property::BorderRightWidth,
        (Side::Bottom, BorderPart::Width) => Property::BorderBottomWidth,
        (Side::Left, BorderPart::Width) => Property::BorderLeftWidth,
        (Side::Top, BorderPart::Style) => Property::BorderTopStyle,
        (Side::Right, BorderPart::Style) => Property::BorderRightStyle,
        (Side::Bottom, BorderPart::Style) => Property::BorderBottomStyle,
        (Side::Left, BorderPart::Style) => Property::BorderLeftStyle,
        (Side::Top, BorderPart::Color) => Property::BorderTopColor,
        (Side::Right, BorderPart::Color) => Property::BorderRightColor,
        (Side::Bottom, BorderPart::Color) => Property::BorderBottomColor,
        (Side::Left, BorderPart::Color) => Property::BorderLeftColor,
    }
}

/// [§ 8.5.4 Border shorthand properties](https://www.w3.org/TR/CSS2/box.html#border-shorthand-properties)
///
/// "Value: [ `<border-width>` || `<border-style>` || `<border-top-color>` ] | inherit"
fn border(tokens: &[String], sides: &[Side], dpi: f32) -> Option<Vec<(Property, String)>> {
    if tokens.is_empty() || tokens.len() > 3 {
        return None;
    }
    let mut width = None;
    let mut style = None;
    let mut color = None;
    for token in tokens {
        if style.is_none() && token.parse::<BorderStyle>().is_ok() {
            style = Some(token.clone());
        } else if width.is_none() && parse_length(token, dpi).is_some() {
            width = Some(token.clone());
        } else if color.is_none() {
            color = Some(token.clone());
        } else {
            return None;
        }
    }
    let width = width.unwrap_or_else(|| "medium".to_string());
    let style = style.unwrap_or_else(|| "none".to_string());
    let color = color.unwrap_or_else(|| "currentcolor".to_string());

    let mut longhands = Vec::with_capacity(sides.len() * 3);
    for &side in sides {
        longhands.push((border_property(side, BorderPart::Width), width.clone()));
        longhands.push((border_property(side, BorderPart::Style), style.clone()));
        longhands.push((border_property(side, BorderPart::Color), color.clone()));
    }
    Some(longhands)
}

/// [§ 15.8 Shorthand font property](https://www.w3.org/TR/CSS2/fonts.html#font-shorthand)
///
/// "Value: [ [ `<'font-style'>` || `<'font-variant'>` || `<'font-weight'>` ]?
/// `<'font-size'>` [ / `<'line-height'>` ]? `<'font-family'>` ]"
fn font(raw: &str, tokens: &[String]) -> Option<Vec<(Property, String)>> {
    let mut style = "normal".to_string();
    let mut variant = "normal".to_string();
    let mut weight = "normal".to_string();

    let mut index = 0;
    while let Some(token) = tokens.get(index) {
        let lower = token.to_ascii_lowercase();
        if lower == "normal" {
            index += 1;
            continue;
        }
        if lower.parse::<FontStyle>().is_ok() {
            style = lower;
        } else if lower.parse::<FontVariant>().is_ok() {
            variant = lower;
        } else if matches!(lower.as_str(), "bold" | "bolder" | "lighter")
            || (lower.len() == 3 && lower.ends_with("00") && lower.parse::<u16>().is_ok())
        {
            weight = lower;
        } else {
            break;
        }
        index += 1;
    }

    let size_token = tokens.get(index)?;
    let (size, line_height) = match size_token.split_once('/') {
        Some((size, lh)) if !lh.is_empty() => (size.to_string(), lh.to_string()),
        Some((size, _)) => {
            // "12pt / 1.5" written with spaces around the slash.
            index += 1;
            (size.to_string(), tokens.get(index)?.clone())
        }
        None if tokens.get(index + 1).is_some_and(|t| t.starts_with('/')) => {
            index += 1;
            let next = tokens.get(index)?;
            let lh = match next.strip_prefix('/') {
                Some("") => {
                    index += 1;
                    tokens.get(index)?.clone()
                }
                Some(rest) => rest.to_string(),
                None => return None,
            };
            (size_token.clone(), lh)
        }
        None => (size_token.clone(), "normal".to_string()),
    };
    index += 1;

    let family_start = tokens.get(index)?;
    let after_size = raw.find(size_token.as_str())? + size_token.len();
    let offset = after_size + raw[after_size..].find(family_start.as_str())?;
    let family = raw[offset..].trim().to_string();

    Some(vec![
        (Property::FontStyle, style),
        (Property::FontVariant, variant),
        (Property::FontWeight, weight),
        (Property::FontSize, size),
        (Property::LineHeight, line_height),
        (Property::FontFamily, family),
    ])
}

/// [§ 14.2.1 'background'](https://www.w3.org/TR/CSS2/colors.html#propdef-background)
fn background(tokens: &[String], dpi: f32) -> Option<Vec<(Property, String)>> {
    if tokens.is_empty() {
        return None;
    }
    let mut color = "transparent".to_string();
    let mut image = "none".to_string();
    let mut repeat = "repeat".to_string();
    let mut position: Vec<String> = Vec::new();

    for token in tokens {
        let lower = token.to_ascii_lowercase();
        if lower == "none" || lower.starts_with("url(") {
            image = token.clone();
        } else if lower.parse::<BackgroundRepeat>().is_ok() {
            repeat = lower;
        } else if matches!(lower.as_str(), "left" | "right" | "top" | "bottom" | "center")
            || parse_length(&lower, dpi).is_some()
        {
            position.push(lower);
        } else if matches!(lower.as_str(), "scroll" | "fixed") {
            // background-attachment has no meaning on paper.
        } else {
            color = lower;
        }
    }
    let position = if position.is_empty() {
        "0% 0%".to_string()
    } else {
        position.join(" ")
    };

    Some(vec![
        (Property::BackgroundColor, color),
        (Property::BackgroundImage, image),
        (Property::BackgroundRepeat, repeat),
        (Property::BackgroundPosition, position),
    ])
}

/// [§ 12.5.1 'list-style'](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style)
fn list_style(tokens: &[String]) -> Option<Vec<(Property, String)>> {
    if tokens.is_empty() {
        return None;
    }
    let mut kind = "disc".to_string();
    let mut position = "outside".to_string();
    let mut image = "none".to_string();

    for token in tokens {
        let lower = token.to_ascii_lowercase();
        if lower.starts_with("url(") {
            image = token.clone();
        } else if lower.parse::<ListStylePosition>().is_ok() {
            position = lower;
        } else if lower.parse::<ListStyleType>().is_ok() {
            kind = lower;
        } else {
            return None;
        }
    }

    Some(vec![
        (Property::ListStyleType, kind),
        (Property::ListStylePosition, position),
        (Property::ListStyleImage, image),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn longhands(name: &str, value: &str) -> Vec<(Property, String)> {
        match expand(name, value, 96.0) {
            Expansion::Longhands(l) => l,
            other => panic!("expected longhands for {name}: {other:?}"),
        }
    }

    #[test]
    fn test_margin_two_values() {
        let l = longhands("margin", "0 auto");
        assert_eq!(l[0], (Property::MarginTop, "0".to_string()));
        assert_eq!(l[1], (Property::MarginRight, "auto".to_string()));
        assert_eq!(l[3], (Property::MarginLeft, "auto".to_string()));
    }

    #[test]
    fn test_border_any_order_with_defaults() {
        let l = longhands("border-right", "solid 2px");
        assert_eq!(
            l,
            vec![
                (Property::BorderRightWidth, "2px".to_string()),
                (Property::BorderRightStyle, "solid".to_string()),
                (Property::BorderRightColor, "currentcolor".to_string()),
            ]
        );
        assert_eq!(longhands("border", "1pt dashed rgb(0, 0, 255)").len(), 12);
    }

    #[test]
    fn test_font_shorthand() {
        let l = longhands("font", "italic bold 12pt/1.5 \"Times New Roman\", serif");
        assert!(l.contains(&(Property::FontStyle, "italic".to_string())));
        assert!(l.contains(&(Property::FontWeight, "bold".to_string())));
        assert!(l.contains(&(Property::FontSize, "12pt".to_string())));
        assert!(l.contains(&(Property::LineHeight, "1.5".to_string())));
        assert!(l.contains(&(Property::FontFamily, "\"Times New Roman\", serif".to_string())));
        assert_eq!(expand("font", "bold", 96.0), Expansion::Invalid);
    }

    #[test]
    fn test_background_and_list_style() {
        let l = longhands("background", "#fff url(bg.png) no-repeat right top");
        assert!(l.contains(&(Property::BackgroundColor, "#fff".to_string())));
        assert!(l.contains(&(Property::BackgroundImage, "url(bg.png)".to_string())));
        assert!(l.contains(&(Property::BackgroundRepeat, "no-repeat".to_string())));
        assert!(l.contains(&(Property::BackgroundPosition, "right top".to_string())));

        let l = longhands("list-style", "square inside");
        assert!(l.contains(&(Property::ListStyleType, "square".to_string())));
        assert!(l.contains(&(Property::ListStylePosition, "inside".to_string())));
    }

    #[test]
    fn test_tokens_keep_groups() {
        assert_eq!(
            split_tokens("1px solid rgb(1, 2, 3)"),
            vec!["1px", "solid", "rgb(1, 2, 3)"]
        );
        assert_eq!(expand("color", "red", 96.0), Expansion::NotShorthand);
    }
}
