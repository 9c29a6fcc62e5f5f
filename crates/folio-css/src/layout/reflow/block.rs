//! Block containers.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! A block box resolves its width against its containing block, collapses
//! its vertical margins with its neighbours, lays out its children into
//! line boxes, takes its height from the lines unless one is given, and
//! finally aligns the inline content of each line.

use super::Reflower;
use crate::error::LayoutError;
use crate::layout::box_tree::{BoxId, ContainingBlock, LayoutKind};
use crate::layout::context::LayoutContext;
use crate::layout::line::LineBox;
use crate::layout::sizing::{
    AbsoluteInputs, clamp_size, resolve_absolute_height, resolve_absolute_width,
    resolve_block_width, shrink_to_fit,
};
use crate::style::values::{AutoLength, Position, Side, TextAlign, VerticalAlign, WhiteSpace};

/// Lays out block containers and list items.
#[derive(Debug)]
pub struct BlockReflower;

/// Shared instance.
pub static BLOCK_REFLOWER: BlockReflower = BlockReflower;

impl Reflower for BlockReflower {
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        block: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        if ctx.check_forced_page_break(id)? || ctx.page.full {
            return Ok(());
        }
        if ctx.tree[id].is_out_of_flow() {
            ctx.set_absolute_containing_block(id);
        }
        ctx.prepare_content(id)?;
        ctx.collapse_margins(id);

        let cb = ctx.tree[id].cb(id, "block reflow")?;
        ctx.resolve_width(id, cb)?;
        ctx.position(id)?;

        let content = ctx.tree[id].content_box();
        {
            let b = &mut ctx.tree[id];
            b.lines = vec![LineBox::at(content.y)];
            b.current_line = 0;
        }
        let style = &ctx.tree[id].style;
        let indent = style.to_pt(style.text_indent, Some(content.width));
        if indent != 0.0 {
            ctx.increase_line_width(id, indent);
        }

        let b = &ctx.tree[id];
        let explicit_height = b.style.length_in_pt(b.style.height, Some(cb.h)).pt();
        let bottom_edges = {
            let d = b.dimensions();
            d.margin.bottom + d.border.bottom + d.padding.bottom
        };
        let child_cb = ContainingBlock {
            x: content.x,
            y: content.y,
            w: content.width,
            h: explicit_height.unwrap_or(cb.y + cb.h - bottom_edges - content.y),
        };

        let mut child = ctx.tree[id].first_child;
        while let Some(c) = child {
            if ctx.page.full {
                break;
            }
            ctx.tree[c].containing_block = Some(child_cb);
            ctx.reflow(c, Some(id))?;
            let _ = ctx.check_page_break(c)?;
            if ctx.page.full && ctx.tree[c].position.is_none() {
                break;
            }
            child = ctx.tree[c].next_sibling;
        }

        if ctx.page.full && ctx.tree[id].position.is_none() {
            return Ok(());
        }

        ctx.resolve_height(id, cb)?;
        ctx.text_align(id)?;
        ctx.vertical_align(id)?;
        for c in ctx.tree.children(id) {
            ctx.position_relative(c);
        }

        if let Some(block) = block {
            if ctx.tree[id].is_in_flow() {
                ctx.add_frame_to_line(block, id)?;
                if ctx.tree[id].is_block_level() {
                    ctx.add_line(block, true);
                }
            }
        }
        Ok(())
    }

    fn min_max_width(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(f32, f32), LayoutError> {
        let b = &ctx.tree[id];
        let edges = b.horizontal_edges();
        if let AutoLength::Length(width) = b.style.width {
            if !width.is_percent() {
                let width = b.style.to_pt(width, None);
                return Ok((width + edges, width + edges));
            }
        }

        let mut low: Vec<f32> = Vec::new();
        let mut high: Vec<f32> = Vec::new();
        let mut inline_min = 0.0;
        let mut inline_max = 0.0;
        let flush = |low: &mut Vec<f32>, high: &mut Vec<f32>, min: &mut f32, max: &mut f32| {
            if *max > 0.0 {
                high.push(*max);
            }
            if *min > 0.0 {
                low.push(*min);
            }
            *min = 0.0;
            *max = 0.0;
        };

        for child in ctx.tree.children(id) {
            let c = &ctx.tree[child];
            if c.is_out_of_flow() || (c.kind == LayoutKind::ListBullet && !c.is_inside_bullet()) {
                continue;
            }
            let unbreakable = matches!(c.style.white_space, WhiteSpace::Pre | WhiteSpace::Nowrap);
            if c.is_block_level() {
                flush(&mut low, &mut high, &mut inline_min, &mut inline_max);
                let (min, max) = ctx.min_max_width(child)?;
                low.push(min);
                high.push(max);
            } else {
                let (min, max) = ctx.min_max_width(child)?;
                if unbreakable {
                    inline_min += min;
                } else {
                    low.push(min);
                }
                inline_max += max;
            }
        }
        flush(&mut low, &mut high, &mut inline_min, &mut inline_max);

        let min = low.into_iter().fold(0.0, f32::max);
        let max = high.into_iter().fold(0.0, f32::max).max(min);
        Ok((min + edges, max + edges))
    }
}

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "When two or more margins collapse, the resulting margin width is the
/// maximum of the collapsing margins' widths. In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins."
#[must_use]
pub fn collapsed_margin(a: f32, b: f32) -> f32 {
    if a >= 0.0 && b >= 0.0 {
        a.max(b)
    } else if a < 0.0 && b < 0.0 {
        a.min(b)
    } else {
        a + b
    }
}

impl LayoutContext<'_> {
    /// [§ 10.1](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// "If the element has 'position: absolute', the containing block is
    /// established by the nearest ancestor with a 'position' other than
    /// 'static' ... formed by the padding edge of the ancestor." Fixed boxes
    /// and boxes without such an ancestor use the page area.
    pub fn set_absolute_containing_block(&mut self, id: BoxId) {
        let page = self.page.content;
        let mut cb = ContainingBlock {
            x: page.x,
            y: page.y,
            w: page.width,
            h: page.height,
        };
        if self.tree[id].style.position == Position::Absolute {
            let anchor = self.tree.ancestors(id).find(|&a| {
                let b = &self.tree[a];
                b.is_positioned() && b.position.is_some() && b.kind != LayoutKind::Page
            });
            if let Some(anchor) = anchor {
                let padding = self.tree[anchor].padding_box();
                cb = ContainingBlock {
                    x: padding.x,
                    y: padding.y,
                    w: padding.width,
                    h: padding.height.max(page.bottom() - padding.y),
                };
            }
        }
        self.tree[id].containing_block = Some(cb);
    }

    /// Collapse the vertical margins of a block with its next sibling and
    /// its first and last children.
    pub fn collapse_margins(&mut self, id: BoxId) {
        let b = &self.tree[id];
        if b.is_out_of_flow() || !b.is_block_level() || b.kind == LayoutKind::Page {
            return;
        }
        if self.tree.parent(id).is_none_or(|p| self.tree[p].kind == LayoutKind::Page) {
            return;
        }
        let cw = b.containing_block.map(|cb| cb.w);

        let style = &mut self.tree[id].style;
        if style.margin.top.is_auto() {
            style.margin.top = AutoLength::ZERO;
        }
        if style.margin.bottom.is_auto() {
            style.margin.bottom = AutoLength::ZERO;
        }
        let mut top = style.margin_pt(Side::Top, cw);
        let mut bottom = style.margin_pt(Side::Bottom, cw);

        if let Some(next) = self.next_block_sibling(id) {
            let n_style = &mut self.tree[next].style;
            let n_top = n_style.length_in_pt(n_style.margin.top, cw).or_zero();
            bottom = collapsed_margin(bottom, n_top);
            n_style.margin.top = AutoLength::ZERO;
        }

        let style = &self.tree[id].style;
        let open_top = style.border_width_pt(Side::Top) == 0.0
            && style.padding_pt(Side::Top, cw) == 0.0;
        let open_bottom = style.border_width_pt(Side::Bottom) == 0.0
            && style.padding_pt(Side::Bottom, cw) == 0.0
            && style.height.is_auto();

        if open_top {
            if let Some(first) = self.first_block_child(id) {
                let f_style = &mut self.tree[first].style;
                let f_top = f_style.length_in_pt(f_style.margin.top, cw).or_zero();
                top = collapsed_margin(top, f_top);
                f_style.margin.top = AutoLength::ZERO;
            }
        }
        if open_bottom {
            if let Some(last) = self.last_block_child(id) {
                let l_style = &mut self.tree[last].style;
                let l_bottom = l_style.length_in_pt(l_style.margin.bottom, cw).or_zero();
                bottom = collapsed_margin(bottom, l_bottom);
                l_style.margin.bottom = AutoLength::ZERO;
            }
        }

        let style = &mut self.tree[id].style;
        style.margin.top = AutoLength::pt(top);
        style.margin.bottom = AutoLength::pt(bottom);
    }

    fn next_block_sibling(&self, id: BoxId) -> Option<BoxId> {
        std::iter::successors(self.tree[id].next_sibling, |&s| self.tree[s].next_sibling)
            .find(|&s| self.tree[s].is_in_flow())
            .filter(|&s| self.tree[s].is_block_level())
    }

    fn first_block_child(&self, id: BoxId) -> Option<BoxId> {
        std::iter::successors(self.tree[id].first_child, |&c| self.tree[c].next_sibling)
            .find(|&c| self.tree[c].is_in_flow() && !self.is_outside_bullet(c))
            .filter(|&c| self.tree[c].is_block_level())
    }

    fn last_block_child(&self, id: BoxId) -> Option<BoxId> {
        std::iter::successors(self.tree[id].last_child, |&c| self.tree[c].prev_sibling)
            .find(|&c| self.tree[c].is_in_flow())
            .filter(|&c| self.tree[c].is_block_level())
    }

    fn is_outside_bullet(&self, id: BoxId) -> bool {
        let b = &self.tree[id];
        b.kind == LayoutKind::ListBullet && !b.is_inside_bullet()
    }

    /// Resolve the used width and horizontal margins of a block container
    /// and write them into the box.
    ///
    /// # Errors
    ///
    /// Structural errors while measuring content.
    pub fn resolve_width(&mut self, id: BoxId, cb: ContainingBlock) -> Result<(), LayoutError> {
        let b = &self.tree[id];
        let style = b.style.clone();
        let cw = cb.w;
        let d = b.dimensions();
        let edges = d.border.horizontal() + d.padding.horizontal();
        let width = style.length_in_pt(style.width, Some(cw)).pt();
        let margin_left = style.length_in_pt(style.margin.left, Some(cw)).pt();
        let margin_right = style.length_in_pt(style.margin.right, Some(cw)).pt();
        let min_width = style.length_in_pt(style.min_width, Some(cw)).or_zero();
        let max_width = style.length_in_pt(style.max_width, Some(cw)).pt();
        let (min_width, max_width) = match max_width {
            Some(max) if max < min_width => (max, Some(min_width)),
            other => (min_width, other),
        };

        let needs_preferred = width.is_none()
            && (b.is_out_of_flow()
                || !b.is_block_level()
                || (margin_left.is_none() && margin_right.is_none()));
        let preferred = if needs_preferred {
            let own = self.tree[id].horizontal_edges();
            let (min, max) = self.min_max_width(id)?;
            Some(((min - own).max(0.0), (max - own).max(0.0)))
        } else {
            None
        };

        let clamp = |solve: &dyn Fn(Option<f32>) -> (f32, f32, f32)| {
            let mut used = solve(width);
            if let Some(max) = max_width {
                if used.1 > max {
                    used = solve(Some(max));
                }
            }
            if used.1 < min_width {
                used = solve(Some(min_width));
            }
            used
        };

        let (ml, w, mr) = if self.tree[id].is_out_of_flow() {
            let (static_x, _) = self.static_position(id, cb.x, cb.y);
            let left = style.length_in_pt(style.offsets.left, Some(cw)).pt();
            let right = style.length_in_pt(style.offsets.right, Some(cw)).pt();
            let inputs = AbsoluteInputs {
                containing: cw,
                start: left,
                end: right,
                size: width,
                margin_start: margin_left,
                margin_end: margin_right,
                edges,
                static_start: static_x - cb.x,
            };
            let preferred = preferred.unwrap_or_default();
            let solve = |size: Option<f32>| {
                let used = resolve_absolute_width(AbsoluteInputs { size, ..inputs }, preferred);
                (used.margin_left, used.width, used.margin_right)
            };
            let used = clamp(&solve);
            let final_inputs = AbsoluteInputs {
                size: Some(used.1),
                ..inputs
            };
            let left = resolve_absolute_width(final_inputs, preferred).left;
            self.tree[id].style.offsets.left = AutoLength::pt(left);
            used
        } else if !self.tree[id].is_block_level() {
            let ml = margin_left.unwrap_or(0.0);
            let mr = margin_right.unwrap_or(0.0);
            let (min, max) = preferred.unwrap_or_default();
            let solve = |size: Option<f32>| {
                let w = size.unwrap_or_else(|| shrink_to_fit(min, max, (cw - ml - mr - edges).max(0.0)));
                (ml, w, mr)
            };
            clamp(&solve)
        } else {
            let solve = |size: Option<f32>| {
                let preferred = if size.is_none() { preferred } else { None };
                let used = resolve_block_width(cw, size, margin_left, margin_right, edges, preferred);
                (used.margin_left, used.width, used.margin_right)
            };
            clamp(&solve)
        };

        let b = &mut self.tree[id];
        b.width = w;
        b.style.margin.left = AutoLength::pt(ml);
        b.style.margin.right = AutoLength::pt(mr);
        Ok(())
    }

    /// [§ 10.6.3 Block-level non-replaced elements in normal flow when
    /// 'overflow' computes to 'visible'](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
    ///
    /// "If 'height' is 'auto', the height depends on whether the element has
    /// any block-level children and whether it has padding or borders". Here
    /// it is the distance from the content top to the bottom of the last
    /// line box.
    ///
    /// # Errors
    ///
    /// Structural errors.
    pub fn resolve_height(&mut self, id: BoxId, cb: ContainingBlock) -> Result<(), LayoutError> {
        let b = &self.tree[id];
        let style = &b.style;
        let content = b.content_box();
        let bottom = b
            .lines
            .iter()
            .map(LineBox::bottom)
            .fold(content.y, f32::max);
        let content_height = bottom - content.y;

        let specified = style.length_in_pt(style.height, Some(cb.h)).pt();
        let min_height = style.length_in_pt(style.min_height, Some(cb.h)).or_zero();
        let max_height = style.length_in_pt(style.max_height, Some(cb.h)).pt();
        let clip_content = specified.is_none() && style.overflow.clips();
        let mut height = specified.unwrap_or(content_height);
        if !clip_content {
            height = clamp_size(height, min_height, max_height);
        }

        if b.is_out_of_flow() {
            let d = b.dimensions();
            let top = style.length_in_pt(style.offsets.top, Some(cb.h)).pt();
            let bottom_offset = style.length_in_pt(style.offsets.bottom, Some(cb.h)).pt();
            let position_y = b.position.map_or(cb.y, |p| p.y);
            let inputs = AbsoluteInputs {
                containing: cb.h,
                start: top,
                end: bottom_offset,
                size: Some(height),
                margin_start: style.length_in_pt(style.margin.top, Some(cb.w)).pt(),
                margin_end: style.length_in_pt(style.margin.bottom, Some(cb.w)).pt(),
                edges: d.border.vertical() + d.padding.vertical(),
                static_start: position_y - cb.y,
            };
            let used = resolve_absolute_height(inputs, height);
            let dy = cb.y + used.top - position_y;
            let b = &mut self.tree[id];
            b.style.margin.top = AutoLength::pt(used.margin_top);
            b.style.margin.bottom = AutoLength::pt(used.margin_bottom);
            b.height = used.height;
            if top.is_none() && dy != 0.0 {
                self.tree.move_box(id, 0.0, dy);
            }
            return Ok(());
        }

        self.tree[id].height = height;
        Ok(())
    }

    /// [§ 16.2 Alignment](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    ///
    /// Trailing spaces of every line are dropped first. `justify` leaves the
    /// last line alone unless the block continues on another page, and
    /// skips lines ended by a forced break and lines filled less than the
    /// configured fraction of the width.
    ///
    /// # Errors
    ///
    /// Font resolution failures while re-measuring trimmed text.
    pub fn text_align(&mut self, id: BoxId) -> Result<(), LayoutError> {
        let b = &self.tree[id];
        let align = b.style.text_align;
        let width = b.width;
        let continued = b.is_split;
        let last_line = b.lines.iter().rposition(|l| !l.is_empty());
        let min_fill = self.config.min_justify_width * width;

        for i in 0..self.tree[id].lines.len() {
            let frames = self.tree[id].lines[i].frames.clone();
            self.trim_line_end(id, i, &frames)?;

            let line = &self.tree[id].lines[i];
            let used = line.left + line.w + line.right;
            let slack = width - used;
            match align {
                TextAlign::Left => {}
                TextAlign::Right | TextAlign::Center => {
                    let dx = if align == TextAlign::Right { slack } else { slack / 2.0 };
                    if dx != 0.0 {
                        for &frame in &frames {
                            self.tree.move_box(frame, dx, 0.0);
                        }
                    }
                }
                TextAlign::Justify => {
                    if line.br || (Some(i) == last_line && !continued) || used < min_fill || slack <= 0.0 {
                        continue;
                    }
                    self.justify_line(id, i, &frames, slack);
                }
            }
        }
        Ok(())
    }

    fn trim_line_end(&mut self, id: BoxId, line: usize, frames: &[BoxId]) -> Result<(), LayoutError> {
        let Some(&last) = frames.last() else {
            return Ok(());
        };
        let b = &self.tree[last];
        if b.kind != LayoutKind::Text || b.style.white_space.preserves_spaces() {
            return Ok(());
        }
        let text = self.tree.text(last);
        let trimmed = text.trim_end();
        if trimmed.len() == text.len() {
            return Ok(());
        }
        let trimmed = trimmed.to_string();
        let before = b.width;
        self.tree.set_text(last, &trimmed)?;
        let after = super::text::recalculate_width(self, last)?;
        self.tree[id].lines[line].w -= before - after;
        Ok(())
    }

    /// Spread `slack` over the gaps between the words of a line. Each space
    /// of a text frame widens by `slack / (wc - 1)`.
    fn justify_line(&mut self, id: BoxId, line: usize, frames: &[BoxId], slack: f32) {
        let spaces_of = |ctx: &Self, frame: BoxId| -> usize {
            if ctx.tree[frame].kind == LayoutKind::Text {
                ctx.tree.text(frame).chars().filter(|&c| c == ' ').count()
            } else {
                0
            }
        };
        let gaps = self.tree[id].lines[line].wc.saturating_sub(1);
        if gaps == 0 {
            return;
        }
        let spacing = slack / gaps as f32;
        let mut dx = 0.0;
        for &frame in frames {
            self.tree.move_box(frame, dx, 0.0);
            let n = spaces_of(self, frame) as f32;
            if n > 0.0 {
                let b = &mut self.tree[frame];
                b.word_spacing += spacing;
                b.width += n * spacing;
                dx += n * spacing;
            }
        }
        self.tree[id].lines[line].w += dx;
    }

    /// [§ 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
    ///
    /// Text is shifted against its line using the font baseline. Images and
    /// inline blocks are aligned by their height against the line height.
    ///
    /// # Errors
    ///
    /// Font resolution failures.
    pub fn vertical_align(&mut self, id: BoxId) -> Result<(), LayoutError> {
        for i in 0..self.tree[id].lines.len() {
            let line = &self.tree[id].lines[i];
            let frames = line.frames.clone();
            let h = line.h;
            for &frame in &frames {
                let f = &self.tree[frame];
                let replaced = f.kind == LayoutKind::Image
                    || (matches!(f.kind, LayoutKind::Block | LayoutKind::Table) && !f.is_block_level());
                let dy = if replaced {
                    if frames.len() == 1 {
                        continue;
                    }
                    let diff = h * 0.8 - f.margin_box().height;
                    match f.style.vertical_align {
                        VerticalAlign::Middle => diff / 2.0,
                        VerticalAlign::Sub | VerticalAlign::Bottom | VerticalAlign::TextBottom => {
                            0.3 * h + diff
                        }
                        VerticalAlign::Super => -0.2 * h + diff,
                        VerticalAlign::Top | VerticalAlign::TextTop => 0.0,
                        VerticalAlign::Baseline => diff.max(0.0),
                        VerticalAlign::Length(l) => diff - f.style.to_pt(l, Some(h)),
                    }
                } else if f.kind == LayoutKind::Text {
                    let align = match f.parent.map(|p| &self.tree[p]) {
                        Some(p) if p.kind == LayoutKind::TableCell => VerticalAlign::Baseline,
                        Some(p) if p.kind == LayoutKind::Inline => p.style.vertical_align,
                        _ => f.style.vertical_align,
                    };
                    let font = self.font_for(&f.style)?;
                    let baseline = self.metrics.font_baseline(&font, f.style.font_size_pt());
                    match align {
                        VerticalAlign::Middle => (h * 0.8 - baseline) / 2.0,
                        VerticalAlign::Sub => h * 0.8 - baseline * 0.5,
                        VerticalAlign::Super => h * 0.8 - baseline * 1.4,
                        VerticalAlign::Top | VerticalAlign::TextTop => 0.0,
                        VerticalAlign::Baseline | VerticalAlign::Bottom | VerticalAlign::TextBottom => {
                            h * 0.8 - baseline
                        }
                        VerticalAlign::Length(l) => h * 0.8 - baseline - f.style.to_pt(l, Some(h)),
                    }
                } else {
                    continue;
                };
                if dy != 0.0 {
                    self.tree.move_box(frame, 0.0, dy);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testing::{TestDocument, text_box};

    #[test]
    fn test_collapsed_margin() {
        assert_eq!(collapsed_margin(10.0, 20.0), 20.0);
        assert_eq!(collapsed_margin(-10.0, -20.0), -20.0);
        assert_eq!(collapsed_margin(30.0, -10.0), 20.0);
        assert_eq!(collapsed_margin(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_text_align_moves_inline_content() {
        // "ab " is 15pt and "cd" 10pt wide: 75pt of slack in 100pt.
        for (align, expected) in [("left", 50.0), ("right", 125.0), ("center", 87.5)] {
            let mut doc = TestDocument::empty();
            let body = doc.body;
            let div = doc.element(
                body,
                "div",
                &[("width", "100pt"), ("font-size", "10pt"), ("text-align", align)],
            );
            doc.text(div, "ab ");
            let span = doc.element(div, "span", &[]);
            doc.text(span, "cd");
            let result = doc.layout();

            let x = |text: &str| result.tree[text_box(&result, text)].position.map(|p| p.x);
            assert_eq!(x("ab "), Some(expected), "{align}");
            assert_eq!(x("cd"), Some(expected + 15.0), "{align}");
        }
    }

    #[test]
    fn test_vertical_align_shifts_text_within_its_line() {
        let mut doc = TestDocument::empty();
        let body = doc.body;
        let div = doc.element(body, "div", &[("font-size", "10pt")]);
        doc.text(div, "a ");
        let sup = doc.element(div, "span", &[("vertical-align", "super")]);
        doc.text(sup, "b");
        doc.text(div, " c ");
        let sub = doc.element(div, "span", &[("vertical-align", "sub")]);
        doc.text(sub, "d");
        let result = doc.layout();

        let y = |text: &str| {
            result.tree[text_box(&result, text)]
                .position
                .map_or(f32::NAN, |p| p.y)
        };
        let block = crate::layout::testing::box_of(&result, div);
        assert_eq!(result.tree[block].lines.len(), 1);
        assert_eq!(y("a "), y(" c "));
        assert!(y("b") < y("a "));
        assert!(y("a ") < y("d"));
    }
}
