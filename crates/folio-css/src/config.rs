//! Layout configuration.
//!
//! [§ 13.2 Page boxes](https://www.w3.org/TR/CSS2/page.html#page-box)
//!
//! "The page box is a rectangular region that contains two areas: the page
//! area and the margin area."
//!
//! Everything a conversion needs besides the document itself: paper size,
//! page margins, the DPI used for pixel units and a few typographic
//! heuristics. Deserializes from JSON with every field optional.

use std::rc::Rc;

use folio_common::BaseUrl;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::style::StylesheetContext;

/// Named paper sizes, in points.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PaperSize {
    /// 297 × 420 mm.
    A3,
    /// 210 × 297 mm.
    #[default]
    A4,
    /// 148 × 210 mm.
    A5,
    /// 8.5 × 11 in.
    Letter,
    /// 8.5 × 14 in.
    Legal,
    /// 11 × 17 in.
    Tabloid,
}

impl PaperSize {
    /// Portrait `(width, height)` in points.
    #[must_use]
    pub const fn dimensions(self) -> (f32, f32) {
        match self {
            Self::A3 => (841.89, 1190.55),
            Self::A4 => (595.28, 841.89),
            Self::A5 => (419.53, 595.28),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
            Self::Tabloid => (792.0, 1224.0),
        }
    }
}

/// Page orientation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Orientation {
    /// Taller than wide.
    #[default]
    Portrait,
    /// Wider than tall.
    Landscape,
}

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMargins {
    /// Top margin.
    pub top: f32,
    /// Right margin.
    pub right: f32,
    /// Bottom margin.
    pub bottom: f32,
    /// Left margin.
    pub left: f32,
}

impl PageMargins {
    /// The same margin on every side.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for PageMargins {
    fn default() -> Self {
        Self::uniform(36.0)
    }
}

/// Options for one document conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Named paper size.
    pub paper: PaperSize,
    /// Orientation applied to `paper`.
    pub orientation: Orientation,
    /// Explicit `(width, height)` in points, overriding `paper`.
    pub page_size: Option<(f32, f32)>,
    /// Margins of every page without an override.
    pub margins: PageMargins,
    /// `@page :first` margins.
    pub first_page_margins: Option<PageMargins>,
    /// `@page :left` margins (even page numbers).
    pub left_page_margins: Option<PageMargins>,
    /// `@page :right` margins (odd page numbers).
    pub right_page_margins: Option<PageMargins>,
    /// Pixels per inch for `px` lengths and image sizes.
    pub dpi: f32,
    /// Family used when no family of a list is installed.
    pub default_font_family: String,
    /// Initial font size in points.
    pub default_font_size: f32,
    /// Scale applied to font heights reported by the metrics provider.
    pub font_height_ratio: f32,
    /// Lines narrower than this fraction of the available width are not
    /// justified.
    pub min_justify_width: f32,
    /// Upper bound on the number of pages a document may produce.
    pub max_pages: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            paper: PaperSize::default(),
            orientation: Orientation::default(),
            page_size: None,
            margins: PageMargins::default(),
            first_page_margins: None,
            left_page_margins: None,
            right_page_margins: None,
            dpi: 96.0,
            default_font_family: "serif".to_string(),
            default_font_size: 12.0,
            font_height_ratio: 1.1,
            min_justify_width: 0.8,
            max_pages: 10_000,
        }
    }
}

impl LayoutConfig {
    /// Page `(width, height)` in points with the orientation applied.
    #[must_use]
    pub fn page_size(&self) -> (f32, f32) {
        let (w, h) = self.page_size.unwrap_or_else(|| self.paper.dimensions());
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Margins of a page, numbered from 1.
    ///
    /// [§ 13.3.3 Left, right, and first pages](https://www.w3.org/TR/CSS2/page.html#page-selectors)
    ///
    /// "the first page of a document is a right page"; after that pages
    /// alternate, so odd numbers are right pages and even numbers left pages.
    #[must_use]
    pub fn margins_for_page(&self, number: usize) -> PageMargins {
        if number == 1 {
            if let Some(first) = self.first_page_margins {
                return first;
            }
        }
        let side = if number % 2 == 1 {
            self.right_page_margins
        } else {
            self.left_page_margins
        };
        side.unwrap_or(self.margins)
    }

    /// Build the context shared by every style of a document.
    #[must_use]
    pub fn stylesheet_context(&self, base_url: BaseUrl) -> Rc<StylesheetContext> {
        Rc::new(StylesheetContext {
            base_url,
            dpi: self.dpi,
            default_font_size: self.default_font_size,
            default_font_family: self.default_font_family.clone(),
        })
    }
}
