//! Font family resolution.
//!
//! [§ 15.3 Font family](https://www.w3.org/TR/CSS2/fonts.html#font-family-prop)
//!
//! "The property value is a prioritized list of font family names and/or
//! generic family names."
//!
//! The registry maps a lowercase family name to up to four faces (one per
//! [`FontSubtype`]). Metrics and glyph data live behind the
//! [`FontMetrics`](crate::layout::FontMetrics) collaborator; the registry only
//! decides which face a style asks for.

use std::collections::BTreeMap;

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

use super::values::FontStyle;
use crate::error::StyleError;

/// Weight/slant combination of a face.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, EnumString, Display, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum FontSubtype {
    /// Regular.
    Normal,
    /// Bold.
    Bold,
    /// Italic or oblique.
    Italic,
    /// Bold and italic.
    BoldItalic,
}

impl FontSubtype {
    /// Derive the subtype from a numeric weight and a font style.
    ///
    /// Weights below 600 are normal, everything else bold.
    #[must_use]
    pub const fn from_style(weight: u16, style: FontStyle) -> Self {
        let bold = weight >= 600;
        let italic = !matches!(style, FontStyle::Normal);
        match (bold, italic) {
            (false, false) => Self::Normal,
            (true, false) => Self::Bold,
            (false, true) => Self::Italic,
            (true, true) => Self::BoldItalic,
        }
    }
}

/// A resolved face.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FontFace {
    /// Lowercase family name.
    pub family: String,
    /// The subtype that was found (may differ from the one requested).
    pub subtype: FontSubtype,
    /// Font file or backend identifier.
    pub file: String,
}

/// Installed families, generic aliases and the default family.
#[derive(Debug, Clone)]
pub struct FontRegistry {
    families: BTreeMap<String, BTreeMap<FontSubtype, String>>,
    aliases: BTreeMap<String, String>,
    default_family: String,
}

impl FontRegistry {
    /// An empty registry falling back to `default_family`.
    #[must_use]
    pub fn new(default_family: &str) -> Self {
        Self {
            families: BTreeMap::new(),
            aliases: BTreeMap::new(),
            default_family: default_family.to_ascii_lowercase(),
        }
    }

    /// The fourteen standard PDF faces with the usual generic aliases.
    #[must_use]
    pub fn with_core_fonts(default_family: &str) -> Self {
        let mut registry = Self::new(default_family);
        for (family, prefix) in [("courier", "Courier"), ("helvetica", "Helvetica")] {
            registry.register(family, FontSubtype::Normal, prefix);
            registry.register(family, FontSubtype::Bold, &format!("{prefix}-Bold"));
            registry.register(family, FontSubtype::Italic, &format!("{prefix}-Oblique"));
            registry.register(family, FontSubtype::BoldItalic, &format!("{prefix}-BoldOblique"));
        }
        registry.register("times", FontSubtype::Normal, "Times-Roman");
        registry.register("times", FontSubtype::Bold, "Times-Bold");
        registry.register("times", FontSubtype::Italic, "Times-Italic");
        registry.register("times", FontSubtype::BoldItalic, "Times-BoldItalic");
        registry.register("symbol", FontSubtype::Normal, "Symbol");
        registry.register("zapfdingbats", FontSubtype::Normal, "ZapfDingbats");

        for (alias, family) in [
            ("serif", "times"),
            ("times-roman", "times"),
            ("sans-serif", "helvetica"),
            ("arial", "helvetica"),
            ("monospace", "courier"),
            ("fixed", "courier"),
        ] {
            registry.alias(alias, family);
        }
        registry
    }

    /// Register the file for one face of a family.
    pub fn register(&mut self, family: &str, subtype: FontSubtype, file: &str) {
        let _ = self
            .families
            .entry(family.to_ascii_lowercase())
            .or_default()
            .insert(subtype, file.to_string());
    }

    /// Make `alias` resolve to `family`.
    pub fn alias(&mut self, alias: &str, family: &str) {
        let _ = self
            .aliases
            .insert(alias.to_ascii_lowercase(), family.to_ascii_lowercase());
    }

    /// The configured fallback family.
    #[must_use]
    pub fn default_family(&self) -> &str {
        &self.default_family
    }

    fn canonical<'a>(&'a self, family: &'a str) -> &'a str {
        self.aliases.get(family).map_or(family, String::as_str)
    }

    fn face(&self, family: &str, subtype: FontSubtype) -> Option<FontFace> {
        let family = self.canonical(family);
        self.families
            .get(family)
            .and_then(|faces| faces.get(&subtype))
            .map(|file| FontFace {
                family: family.to_string(),
                subtype,
                file: file.clone(),
            })
    }

    /// Resolve a `font-family` list to a face.
    ///
    /// STEP 1: Each family of the list (generic names go through the alias
    /// table) with the requested subtype.
    ///
    /// STEP 2: The default family with the requested subtype, then its
    /// `normal` face, then any face it has.
    ///
    /// # Errors
    ///
    /// [`StyleError::FontNotFound`] when not even the default family has a
    /// face, which means the registry is misconfigured.
    pub fn resolve(&self, families: &[String], subtype: FontSubtype) -> Result<FontFace, StyleError> {
        // STEP 1
        for family in families {
            let family = family.trim().trim_matches(['"', '\'']).to_ascii_lowercase();
            if let Some(face) = self.face(&family, subtype) {
                return Ok(face);
            }
        }

        // STEP 2
        let default = self.default_family.as_str();
        if let Some(face) = self
            .face(default, subtype)
            .or_else(|| self.face(default, FontSubtype::Normal))
        {
            return Ok(face);
        }
        let canonical = self.canonical(default);
        self.families
            .get(canonical)
            .and_then(|faces| faces.iter().next())
            .map(|(subtype, file)| FontFace {
                family: canonical.to_string(),
                subtype: *subtype,
                file: file.clone(),
            })
            .ok_or_else(|| StyleError::FontNotFound {
                families: families.join(", "),
                subtype,
            })
    }
}
