//! Per-document layout state and the collaborators layout consumes.
//!
//! One [`LayoutContext`] is built for each conversion and threaded through
//! every reflow call. It owns the box tree, the page state and the warning
//! list; the font registry, metrics provider and image resolver are borrowed
//! from the caller.

use folio_common::{ImageInfo, Warnings};
use tempfile::TempPath;

use super::box_tree::{BoxId, BoxTree, LayoutKind};
use super::box_model::Rect;
use crate::config::LayoutConfig;
use crate::error::{ImageError, LayoutError};
use crate::style::{FontFace, FontRegistry, Style};

/// Font metrics interface for text measurement during layout.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
pub trait FontMetrics {
    /// Advance width of `text`, in points.
    ///
    /// `word_spacing` is added for every space and `char_spacing` for every
    /// character, matching how the output canvas will place the glyphs.
    fn text_width(
        &self,
        text: &str,
        font: &FontFace,
        size: f32,
        word_spacing: f32,
        char_spacing: f32,
    ) -> f32;

    /// Distance from the lowest descender to the highest ascender.
    fn font_height(&self, font: &FontFace, size: f32) -> f32;

    /// Distance from the top of the font box to the baseline.
    fn font_baseline(&self, font: &FontFace, size: f32) -> f32;
}

/// Approximate font metrics using fixed ratios.
///
/// Without font files every glyph advances by the same fraction of the font
/// size. The ratios suit the standard Times and Helvetica faces closely
/// enough for previews and tests.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateFontMetrics {
    /// Advance of one glyph as a multiple of the font size.
    pub char_width_ratio: f32,
    /// Font box height as a multiple of the font size.
    pub height_ratio: f32,
    /// Baseline position as a multiple of the font size.
    pub baseline_ratio: f32,
}

impl Default for ApproximateFontMetrics {
    fn default() -> Self {
        Self {
            char_width_ratio: 0.5,
            height_ratio: 1.0,
            baseline_ratio: 0.8,
        }
    }
}

impl FontMetrics for ApproximateFontMetrics {
    fn text_width(
        &self,
        text: &str,
        _font: &FontFace,
        size: f32,
        word_spacing: f32,
        char_spacing: f32,
    ) -> f32 {
        let chars = text.chars().count() as f32;
        let spaces = text.chars().filter(|&c| c == ' ').count() as f32;
        chars * (size * self.char_width_ratio + char_spacing) + spaces * word_spacing
    }

    fn font_height(&self, _font: &FontFace, size: f32) -> f32 {
        size * self.height_ratio
    }

    fn font_baseline(&self, _font: &FontFace, size: f32) -> f32 {
        size * self.baseline_ratio
    }
}

/// Resolves image URLs to decoded, locally readable images.
///
/// Fetching, format sniffing and decoding happen behind this trait.
pub trait ImageResolver {
    /// Look up an image by its resolved URL.
    ///
    /// # Errors
    ///
    /// Any [`ImageError`]; layout substitutes the broken-image placeholder.
    fn resolve(&self, url: &str) -> Result<ImageInfo, ImageError>;

    /// Convert an image the output backend cannot tile directly into a
    /// temporary file. The file is deleted when the returned path drops.
    ///
    /// The default implementation needs no conversion.
    fn convert_for_tiling(&self, _image: &ImageInfo) -> Option<TempPath> {
        None
    }
}

/// A resolver that knows no images; every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageResolver for NoImages {
    fn resolve(&self, url: &str) -> Result<ImageInfo, ImageError> {
        Err(ImageError::Unreadable {
            url: url.to_string(),
            reason: "no image resolver configured".to_string(),
        })
    }
}

/// Pagination state of the page being filled.
///
/// [§ 13.3 Page breaks](https://www.w3.org/TR/CSS2/page.html#page-breaks)
#[derive(Debug, Clone, Default)]
pub struct PageState {
    /// Page number, from 1.
    pub number: usize,
    /// The box holding this page's content.
    pub root: Option<BoxId>,
    /// Page area (inside the page margins).
    pub content: Rect,
    /// Set once content was pushed to the next page. Nothing else is laid
    /// out on a full page.
    pub full: bool,
    /// Depth of tables currently being reflowed.
    pub in_table: usize,
}

impl PageState {
    /// Lowest y content may reach on this page.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.content.bottom()
    }

    /// Whether a nested table is being reflowed.
    #[must_use]
    pub const fn in_nested_table(&self) -> bool {
        self.in_table > 1
    }
}

/// Everything one document conversion needs while reflowing.
pub struct LayoutContext<'a> {
    /// The box tree, including the DOM it was built from.
    pub tree: BoxTree,
    /// Conversion options.
    pub config: &'a LayoutConfig,
    /// Installed fonts.
    pub fonts: &'a FontRegistry,
    /// Text measurement.
    pub metrics: &'a dyn FontMetrics,
    /// Image lookup.
    pub images: &'a dyn ImageResolver,
    /// The page being filled.
    pub page: PageState,
    /// Non-fatal diagnostics.
    pub warnings: Warnings,
}

impl<'a> LayoutContext<'a> {
    /// Create a context around a built box tree.
    #[must_use]
    pub fn new(
        tree: BoxTree,
        config: &'a LayoutConfig,
        fonts: &'a FontRegistry,
        metrics: &'a dyn FontMetrics,
        images: &'a dyn ImageResolver,
    ) -> Self {
        Self {
            tree,
            config,
            fonts,
            metrics,
            images,
            page: PageState::default(),
            warnings: Warnings::new(),
        }
    }

    /// Face for a style.
    ///
    /// # Errors
    ///
    /// [`LayoutError::Style`] when the registry has no usable face.
    pub fn font_for(&self, style: &Style) -> Result<FontFace, LayoutError> {
        Ok(self.fonts.resolve(&style.font_family, style.font_subtype())?)
    }

    /// Width of `text` set in `style`.
    ///
    /// # Errors
    ///
    /// Font resolution failures.
    pub fn text_width(&self, style: &Style, text: &str) -> Result<f32, LayoutError> {
        if text.is_empty() {
            return Ok(0.0);
        }
        let font = self.font_for(style)?;
        let size = style.font_size_pt();
        let word_spacing = style.to_pt(style.word_spacing, None);
        let char_spacing = style.to_pt(style.letter_spacing, None);
        Ok(self
            .metrics
            .text_width(text, &font, size, word_spacing, char_spacing))
    }

    /// Font box height of `style`, scaled by the configured ratio.
    ///
    /// # Errors
    ///
    /// Font resolution failures.
    pub fn font_height(&self, style: &Style) -> Result<f32, LayoutError> {
        let font = self.font_for(style)?;
        Ok(self.metrics.font_height(&font, style.font_size_pt()) * self.config.font_height_ratio)
    }

    // ===== strategy dispatch =====

    /// Reflow a box with its own reflower. `block` is the block container
    /// whose line boxes inline content joins.
    ///
    /// # Errors
    ///
    /// Structural errors from the reflower.
    pub fn reflow(&mut self, id: BoxId, block: Option<BoxId>) -> Result<(), LayoutError> {
        let reflower = self.tree.get(id)?.reflower;
        log::trace!("reflow {id} ({:?}) with {reflower:?}", self.tree[id].kind);
        reflower.reflow(self, id, block)
    }

    /// Place a box with its own positioner.
    ///
    /// # Errors
    ///
    /// Structural errors from the positioner.
    pub fn position(&mut self, id: BoxId) -> Result<(), LayoutError> {
        let positioner = self.tree.get(id)?.positioner;
        positioner.position(self, id)
    }

    /// Minimum and maximum content widths, including the box's own edges.
    ///
    /// # Errors
    ///
    /// Structural errors from the reflower.
    pub fn min_max_width(&mut self, id: BoxId) -> Result<(f32, f32), LayoutError> {
        if let Some(cached) = self.tree.get(id)?.min_max_cache {
            return Ok(cached);
        }
        let reflower = self.tree[id].reflower;
        let result = reflower.min_max_width(self, id)?;
        self.tree[id].min_max_cache = Some(result);
        Ok(result)
    }

    // ===== geometry =====

    /// Width a box occupies on a line.
    #[must_use]
    pub fn margin_width(&self, id: BoxId) -> f32 {
        let b = &self.tree[id];
        match b.kind {
            LayoutKind::ListBullet if !b.is_inside_bullet() => 0.0,
            _ => b.margin_box().width,
        }
    }

    /// Height a box contributes to its line or parent.
    ///
    /// Text contributes its line height scaled to the font box.
    ///
    /// # Errors
    ///
    /// Font resolution failures for text.
    pub fn margin_height(&self, id: BoxId) -> Result<f32, LayoutError> {
        let b = &self.tree[id];
        if b.kind == LayoutKind::Text {
            let size = b.style.font_size_pt();
            let font_height = self.font_height(&b.style)?;
            return Ok(if size > 0.0 {
                b.style.line_height_pt() / size * font_height
            } else {
                0.0
            });
        }
        Ok(b.margin_box().height)
    }

    /// Nearest ancestor that holds line boxes.
    #[must_use]
    pub fn find_block_parent(&self, id: BoxId) -> Option<BoxId> {
        self.tree
            .ancestors(id)
            .find(|&a| self.tree[a].is_block_container())
    }

    /// Nearest ancestor table.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidTree`] when the box is not inside a table.
    pub fn find_parent_table(&self, id: BoxId) -> Result<BoxId, LayoutError> {
        self.tree
            .ancestors(id)
            .find(|&a| self.tree[a].kind == LayoutKind::Table)
            .ok_or_else(|| LayoutError::InvalidTree(format!("box {id} is not inside a table")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::FontSubtype;

    #[test]
    fn test_approximate_metrics() {
        let metrics = ApproximateFontMetrics::default();
        let face = FontFace {
            family: "times".into(),
            subtype: FontSubtype::Normal,
            file: "Times-Roman".into(),
        };
        assert_eq!(metrics.text_width("ab c", &face, 10.0, 2.0, 1.0), 4.0 * 6.0 + 2.0);
        assert_eq!(metrics.font_height(&face, 10.0), 10.0);
        assert_eq!(metrics.font_baseline(&face, 10.0), 8.0);
    }

    #[test]
    fn test_no_images_fails() {
        assert!(matches!(
            NoImages.resolve("a.png"),
            Err(ImageError::Unreadable { .. })
        ));
    }
}
