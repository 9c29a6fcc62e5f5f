//! Replaced images.
//!
//! [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
//!
//! "If 'height' and 'width' both have computed values of 'auto' and the
//! element also has an intrinsic width, then that intrinsic width is the
//! used value of 'width'." One `auto` dimension follows the other through
//! the intrinsic ratio.

use folio_common::ImageInfo;

use super::Reflower;
use crate::error::LayoutError;
use crate::layout::box_tree::BoxId;
use crate::layout::context::LayoutContext;
use crate::layout::sizing::clamp_size;
use crate::style::values::{AutoLength, PT_PER_INCH, Side};

/// Lays out images.
#[derive(Debug)]
pub struct ImageReflower;

/// Shared instance.
pub static IMAGE_REFLOWER: ImageReflower = ImageReflower;

impl Reflower for ImageReflower {
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        block: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        if ctx.check_forced_page_break(id)? {
            return Ok(());
        }
        let cb = ctx.tree[id].cb(id, "image reflow")?;
        let (width, height) = ctx.image_size(id, Some(cb.w), Some(cb.h));
        {
            let b = &mut ctx.tree[id];
            b.width = width;
            b.height = height;
            for side in Side::ALL {
                let margin = b.style.margin.get_mut(side);
                if margin.is_auto() {
                    *margin = AutoLength::ZERO;
                }
            }
        }
        match block.or_else(|| ctx.find_block_parent(id)) {
            Some(block) => ctx.add_frame_to_line(block, id),
            None => ctx.position(id),
        }
    }

    fn min_max_width(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(f32, f32), LayoutError> {
        let (width, _) = ctx.image_size(id, None, None);
        let width = width + ctx.tree[id].horizontal_edges();
        Ok((width, width))
    }
}

impl LayoutContext<'_> {
    /// Intrinsic size of an image in points.
    #[must_use]
    pub fn intrinsic_size(&self, image: &ImageInfo) -> (f32, f32) {
        let (w, h) = image.dimensions_f32();
        let scale = PT_PER_INCH / self.config.dpi;
        (w * scale, h * scale)
    }

    /// Used width and height of an image box. Percentages need the
    /// containing block; without one the intrinsic size is used.
    #[must_use]
    pub fn image_size(&self, id: BoxId, cb_width: Option<f32>, cb_height: Option<f32>) -> (f32, f32) {
        let b = &self.tree[id];
        let style = &b.style;
        let (iw, ih) = b
            .image
            .as_ref()
            .map_or_else(|| self.intrinsic_size(&ImageInfo::broken()), |i| self.intrinsic_size(i));

        let resolve = |value: AutoLength, reference: Option<f32>| match value {
            AutoLength::Length(l) if l.is_percent() && reference.is_none() => None,
            _ => style.length_in_pt(value, reference).pt(),
        };
        let width = resolve(style.width, cb_width);
        let height = resolve(style.height, cb_height);

        let (mut w, mut h) = match (width, height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, if iw > 0.0 { w * ih / iw } else { ih }),
            (None, Some(h)) => (if ih > 0.0 { h * iw / ih } else { iw }, h),
            (None, None) => (iw, ih),
        };

        let min_w = resolve(style.min_width, cb_width).unwrap_or(0.0);
        let max_w = resolve(style.max_width, cb_width);
        let min_h = resolve(style.min_height, cb_height).unwrap_or(0.0);
        let max_h = resolve(style.max_height, cb_height);
        w = clamp_size(w, min_w, max_w);
        h = clamp_size(h, min_h, max_h);
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use folio_common::ImageFormat;
    use folio_dom::DomTree;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::box_tree::{BoxTree, LayoutBox, LayoutKind};
    use crate::layout::context::{ApproximateFontMetrics, NoImages};
    use crate::style::values::LengthValue;
    use crate::style::{FontRegistry, Style};

    fn image_size_with(style: Style) -> (f32, f32) {
        let mut dom = DomTree::new();
        let img = dom.create_element("img");
        let mut tree = BoxTree::new(dom);
        let mut b = LayoutBox::new(img, LayoutKind::Image, style);
        b.image = Some(ImageInfo::new(200, 100, "a.png", ImageFormat::Png));
        let id = tree.alloc(b);
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let ctx = LayoutContext::new(tree, &config, &fonts, &metrics, &NoImages);
        ctx.image_size(id, Some(300.0), Some(400.0))
    }

    #[test]
    fn test_intrinsic_size_in_points() {
        assert_eq!(image_size_with(Style::default()), (150.0, 75.0));
    }

    #[test]
    fn test_one_auto_dimension_keeps_ratio() {
        let mut style = Style::default();
        style.width = AutoLength::pt(60.0);
        assert_eq!(image_size_with(style), (60.0, 30.0));
    }

    #[test]
    fn test_percentage_and_max() {
        let mut style = Style::default();
        style.width = AutoLength::Length(LengthValue::Percent(50.0));
        style.max_height = AutoLength::pt(50.0);
        assert_eq!(image_size_with(style), (150.0, 50.0));
    }
}
