//! Render dispatch - walks a finished layout and draws it
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! Pages are drawn one after the other. Within a page every box paints its
//! background, then its border, then its own content (text, image or
//! marker), then its children in tree order. What a box paints depends on
//! its [`LayoutKind`].

use std::collections::HashSet;

use folio_common::image::BROKEN_IMAGE_PATH;

use super::background::{image_size_pt, paint_background_image, tile_rects};
use super::border::{paint_border, paint_collapsed_segment};
use super::canvas::{Canvas, Stroke, TextRun};
use super::events::RenderEvents;
use super::overlay::PageTextOverlay;
use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::layout::box_model::{Point, Rect};
use crate::layout::box_tree::{BoxId, BoxTree, LayoutBox, LayoutKind};
use crate::layout::context::{FontMetrics, ImageResolver};
use crate::layout::document::LayoutResult;
use crate::layout::reflow::list::SHAPE_SIZE_RATIO;
use crate::layout::table::{BorderSpec, Cellmap};
use crate::style::values::{
    BorderCollapse, ColorValue, ListStyleType, Side, Sides, TextDecoration, Visibility,
};
use crate::style::{FontRegistry, Style};

/// Draws layouts onto a [`Canvas`].
pub struct Renderer<'a> {
    config: &'a LayoutConfig,
    fonts: &'a FontRegistry,
    metrics: &'a dyn FontMetrics,
    images: &'a dyn ImageResolver,
    overlay: Option<&'a PageTextOverlay>,
}

impl<'a> Renderer<'a> {
    /// A renderer using the same collaborators as the layout.
    #[must_use]
    pub fn new(
        config: &'a LayoutConfig,
        fonts: &'a FontRegistry,
        metrics: &'a dyn FontMetrics,
        images: &'a dyn ImageResolver,
    ) -> Self {
        Self {
            config,
            fonts,
            metrics,
            images,
            overlay: None,
        }
    }

    /// Stamp `overlay` on every page.
    #[must_use]
    pub const fn with_overlay(mut self, overlay: &'a PageTextOverlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Draw every page of `layout`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::Style`] when a text box's font cannot be resolved.
    pub fn render(
        &self,
        layout: &LayoutResult,
        canvas: &mut dyn Canvas,
        events: &mut dyn RenderEvents,
    ) -> Result<(), LayoutError> {
        let (width, height) = self.config.page_size();
        let mut painter = Painter {
            renderer: self,
            tree: &layout.tree,
            canvas,
            events,
            named: HashSet::new(),
        };
        for page in &layout.pages {
            log::debug!("rendering page {}", page.number);
            painter.canvas.begin_page(page.number, width, height);
            painter.events.begin_page(page, painter.canvas);

            if let Some(page_box) = layout.tree.parent(page.root) {
                if let Some(color) = visible_background(&layout.tree[page_box].style) {
                    let area = Rect {
                        x: 0.0,
                        y: 0.0,
                        width,
                        height,
                    };
                    painter.canvas.filled_rectangle(area, color);
                }
            }
            painter.paint_box(page.root)?;

            if let Some(overlay) = self.overlay {
                overlay.apply(painter.canvas, page.number, layout.page_count);
            }
            painter.events.end_page(page, painter.canvas);
            painter.canvas.end_page();
        }
        Ok(())
    }
}

fn visible_background(style: &Style) -> Option<ColorValue> {
    style.background_color.filter(|c| !c.is_transparent())
}

/// Border specs of a box from its used style.
fn style_borders(style: &Style) -> Sides<BorderSpec> {
    let spec = |side: Side| BorderSpec {
        width: style.border_width_pt(side),
        style: style.border.get(side).style,
        color: style.border_color(side),
    };
    Sides {
        top: spec(Side::Top),
        right: spec(Side::Right),
        bottom: spec(Side::Bottom),
        left: spec(Side::Left),
    }
}

struct Painter<'r, 'c> {
    renderer: &'r Renderer<'r>,
    tree: &'r BoxTree,
    canvas: &'c mut dyn Canvas,
    events: &'c mut dyn RenderEvents,
    /// Anchor names already emitted; continuations share their element.
    named: HashSet<String>,
}

impl<'r> Painter<'r, '_> {
    fn paint_box(&mut self, id: BoxId) -> Result<(), LayoutError> {
        let tree = self.tree;
        let b = &tree[id];
        if b.position.is_none() {
            return Ok(());
        }
        self.events.begin_frame(self.tree, id, self.canvas);

        let visible = b.style.visibility == Visibility::Visible;
        if visible {
            self.paint_own(id, b)?;
        }
        self.add_anchors(id, b);

        let clip = b.style.overflow.clips() && b.kind.is_block_container();
        if clip {
            self.canvas.push_clip(b.padding_box());
        }
        for child in self.tree.children(id) {
            self.paint_box(child)?;
        }
        if clip {
            self.canvas.pop_clip();
        }

        self.events.end_frame(self.tree, id, self.canvas);
        Ok(())
    }

    fn paint_own(&mut self, id: BoxId, b: &LayoutBox) -> Result<(), LayoutError> {
        match b.kind {
            LayoutKind::Page | LayoutKind::LineBreak => {}
            LayoutKind::TableRowGroup | LayoutKind::TableRow => {
                if let Some(color) = visible_background(&b.style) {
                    self.canvas.filled_rectangle(b.border_box(), color);
                }
            }
            LayoutKind::TableCell => {
                self.paint_background(&b.style, b.border_box(), b.padding_box());
                match self.collapsed_cellmap(id) {
                    Some(cellmap) => self.paint_collapsed_cell(id, cellmap),
                    None => paint_border(self.canvas, b.border_box(), &style_borders(&b.style)),
                }
            }
            LayoutKind::Block | LayoutKind::ListItem | LayoutKind::Table => {
                self.paint_background(&b.style, b.border_box(), b.padding_box());
                paint_border(self.canvas, b.border_box(), &style_borders(&b.style));
            }
            LayoutKind::Generated if b.style.display.is_block_level() => {
                self.paint_background(&b.style, b.border_box(), b.padding_box());
                paint_border(self.canvas, b.border_box(), &style_borders(&b.style));
            }
            LayoutKind::Inline | LayoutKind::Generated => self.paint_inline(b),
            LayoutKind::Text => self.paint_text(id, b)?,
            LayoutKind::Image => self.paint_image(b),
            LayoutKind::ListBullet => self.paint_bullet(b)?,
        }
        Ok(())
    }

    /// [§ 14.2](https://www.w3.org/TR/CSS2/colors.html#background)
    ///
    /// The color fills `border_area`; images tile over `padding_area`.
    fn paint_background(&mut self, style: &Style, border_area: Rect, padding_area: Rect) {
        if let Some(color) = visible_background(style) {
            self.canvas.filled_rectangle(border_area, color);
        }
        let Some(url) = &style.background_image else {
            return;
        };
        let image = match self.renderer.images.resolve(url) {
            Ok(image) if image.is_drawable() && !image.is_broken() => image,
            Ok(_) => return,
            Err(err) => {
                log::warn!("background image skipped: {err}");
                return;
            }
        };
        let tiles = tile_rects(
            padding_area,
            image_size_pt(&image, self.renderer.config.dpi),
            style.background_position,
            style.background_repeat,
            style.font_size_pt(),
        );
        paint_background_image(self.canvas, self.renderer.images, &image, padding_area, &tiles);
    }

    /// Inline boxes paint one strip per line: their children were split at
    /// every line break, so each box covers exactly one line.
    fn paint_inline(&mut self, b: &LayoutBox) {
        let Some(position) = b.position else {
            return;
        };
        let strip = Rect {
            x: position.x,
            y: position.y,
            width: b.width,
            height: b.height,
        };
        self.paint_background(&b.style, strip, strip);
        // Left and right edges travel with the first and last text runs.
        let mut specs = style_borders(&b.style);
        specs.left = BorderSpec::NONE;
        specs.right = BorderSpec::NONE;
        paint_border(self.canvas, strip, &specs);
    }

    fn paint_text(&mut self, id: BoxId, b: &LayoutBox) -> Result<(), LayoutError> {
        let text = self.tree.text(id);
        paint_border(self.canvas, b.border_box(), &style_borders(&b.style));
        if text.trim().is_empty() {
            return Ok(());
        }
        let content = b.content_box();
        let run = self.text_run(&b.style, text, content, b.word_spacing)?;
        self.canvas.text(&run);

        let decoration = self.decoration_of(id);
        if decoration != TextDecoration::None {
            let size = run.size;
            let y = match decoration {
                TextDecoration::Underline => run.baseline + 0.1 * size,
                TextDecoration::Overline => run.y,
                TextDecoration::LineThrough | TextDecoration::None => run.baseline - 0.3 * size,
            };
            let stroke = Stroke::solid(run.color, (0.05 * size).max(0.5));
            self.canvas.line(
                Point { x: content.x, y },
                Point {
                    x: content.right(),
                    y,
                },
                &stroke,
            );
        }
        Ok(())
    }

    /// [§ 16.3.1](https://www.w3.org/TR/CSS2/text.html#lining-striking-props)
    /// "When specified on an inline element, it affects all the boxes
    /// generated by that element."
    fn decoration_of(&self, id: BoxId) -> TextDecoration {
        std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .take_while(|&a| a == id || !self.tree[a].style.display.is_block_level())
            .map(|a| self.tree[a].style.text_decoration)
            .find(|&d| d != TextDecoration::None)
            .unwrap_or(TextDecoration::None)
    }

    fn text_run(&self, style: &Style, text: &str, at: Rect, justify: f32) -> Result<TextRun, LayoutError> {
        let renderer = self.renderer;
        let font = renderer.fonts.resolve(&style.font_family, style.font_subtype())?;
        let size = style.font_size_pt();
        let baseline =
            at.y + renderer.metrics.font_baseline(&font, size) * renderer.config.font_height_ratio;
        Ok(TextRun {
            x: at.x,
            y: at.y,
            baseline,
            text: text.to_string(),
            font,
            size,
            color: style.color,
            word_spacing: style.to_pt(style.word_spacing, None) + justify,
            char_spacing: style.to_pt(style.letter_spacing, None),
        })
    }

    fn paint_image(&mut self, b: &LayoutBox) {
        self.paint_background(&b.style, b.border_box(), b.padding_box());
        paint_border(self.canvas, b.border_box(), &style_borders(&b.style));
        match &b.image {
            Some(image) if image.is_drawable() => self.canvas.image(image.path(), b.content_box()),
            Some(_) => log::debug!("image format not drawable, left blank"),
            None => self.canvas.image(BROKEN_IMAGE_PATH, b.content_box()),
        }
    }

    /// [§ 12.5.1](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-type)
    fn paint_bullet(&mut self, b: &LayoutBox) -> Result<(), LayoutError> {
        let content = b.content_box();
        if let Some(image) = b.image.as_ref().filter(|i| i.is_drawable()) {
            self.canvas.image(image.path(), content);
            return Ok(());
        }
        let style = &b.style;
        let size = style.font_size_pt() * SHAPE_SIZE_RATIO;
        let center = Point {
            x: content.x + content.width / 2.0,
            y: content.y + content.height / 2.0,
        };
        match style.list_style_type {
            ListStyleType::Disc => self.canvas.circle(center, size / 2.0, style.color, true),
            ListStyleType::Circle => self.canvas.circle(center, size / 2.0, style.color, false),
            ListStyleType::Square => self.canvas.filled_rectangle(
                Rect {
                    x: center.x - size / 2.0,
                    y: center.y - size / 2.0,
                    width: size,
                    height: size,
                },
                style.color,
            ),
            _ => {
                if let Some(text) = &b.bullet_text {
                    let run = self.text_run(style, text, content, 0.0)?;
                    self.canvas.text(&run);
                }
            }
        }
        Ok(())
    }

    fn collapsed_cellmap(&self, cell: BoxId) -> Option<&'r Cellmap> {
        let tree = self.tree;
        let table = tree
            .ancestors(cell)
            .find(|&a| tree[a].kind == LayoutKind::Table)?;
        let t = &tree[table];
        if t.original_style.border_collapse != BorderCollapse::Collapse {
            return None;
        }
        t.cellmap.as_deref()
    }

    /// [§ 17.6.2](https://www.w3.org/TR/CSS2/tables.html#collapsing-borders)
    ///
    /// Every cell draws the grid edges along its top and left sides, and
    /// along its bottom and right sides where it touches the edge of the
    /// grid. Each edge is centred on its grid line.
    fn paint_collapsed_cell(&mut self, cell: BoxId, cellmap: &Cellmap) {
        let Ok(span) = cellmap.spanned(cell) else {
            return;
        };
        let (Some(&first_row), Some(&last_row)) = (span.rows.first(), span.rows.last()) else {
            return;
        };
        let (Some(&first_col), Some(&last_col)) = (span.columns.first(), span.columns.last()) else {
            return;
        };
        let columns = cellmap.columns();
        let row_count = cellmap.rows().count();
        let row_y = |r: usize| cellmap.row(r).map_or(0.0, |row| row.y);
        let row_h = |r: usize| cellmap.row(r).and_then(|row| row.height).unwrap_or(0.0);
        let col_x = |c: usize| columns.get(c).map_or(0.0, |col| col.x);
        let col_w = |c: usize| columns.get(c).map_or(0.0, |col| col.used_width);

        let mut segments: Vec<(Rect, BorderSpec, bool)> = Vec::new();
        let mut horizontal = |row: usize, y: f32, top: bool| {
            for &c in &span.columns {
                let spec = cellmap.border_properties(row, c);
                let spec = if top { spec.top } else { spec.bottom };
                let strip = Rect {
                    x: col_x(c),
                    y: y - spec.width / 2.0,
                    width: col_w(c),
                    height: spec.width,
                };
                segments.push((strip, spec, true));
            }
        };
        horizontal(first_row, row_y(first_row), true);
        if last_row + 1 == row_count {
            horizontal(last_row, row_y(last_row) + row_h(last_row), false);
        }
        for &r in &span.rows {
            let spec = cellmap.border_properties(r, first_col).left;
            segments.push((
                Rect {
                    x: col_x(first_col) - spec.width / 2.0,
                    y: row_y(r),
                    width: spec.width,
                    height: row_h(r),
                },
                spec,
                false,
            ));
            if last_col + 1 == columns.len() {
                let spec = cellmap.border_properties(r, last_col).right;
                segments.push((
                    Rect {
                        x: col_x(last_col) + col_w(last_col) - spec.width / 2.0,
                        y: row_y(r),
                        width: spec.width,
                        height: row_h(r),
                    },
                    spec,
                    false,
                ));
            }
        }
        for (strip, spec, is_horizontal) in segments {
            paint_collapsed_segment(self.canvas, strip, &spec, is_horizontal);
        }
    }

    /// Named destinations for `id` and `<a name>`, link areas for `<a href>`.
    fn add_anchors(&mut self, id: BoxId, b: &LayoutBox) {
        let dom = self.tree.dom();
        let Some(element) = dom.as_element(b.node) else {
            return;
        };
        let name = dom.get_attribute(b.node, "id").or_else(|| {
            (element.tag_name.eq_ignore_ascii_case("a"))
                .then(|| dom.get_attribute(b.node, "name"))
                .flatten()
        });
        if let (Some(name), Some(position)) = (name, b.position) {
            if self.named.insert(name.to_string()) {
                self.canvas.add_named_dest(name, position);
            }
        }
        if element.tag_name.eq_ignore_ascii_case("a") {
            if let Some(href) = dom.get_attribute(b.node, "href") {
                let url = b.style.context().base_url.resolve(href);
                let rect = if b.kind == LayoutKind::Inline {
                    b.position.map_or_else(Rect::default, |p| Rect {
                        x: p.x,
                        y: p.y,
                        width: b.width,
                        height: b.height,
                    })
                } else {
                    b.border_box()
                };
                log::trace!("link {id} -> {url}");
                self.canvas.add_link(&url, rect);
            }
        }
    }
}
