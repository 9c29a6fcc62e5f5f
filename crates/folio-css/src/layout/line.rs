//! Line boxes.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "The rectangular area that contains the boxes that form a line is called
//! a line box."
//!
//! A block container owns a list of [`LineBox`]es. Inline-level boxes are
//! appended to the current line by [`LayoutContext::add_frame_to_line`],
//! which starts a new line when the next box does not fit.

use serde::Serialize;

use super::box_tree::{BoxId, LayoutKind};
use super::context::LayoutContext;
use super::reflow::text;
use crate::error::LayoutError;

/// One line of a block container.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineBox {
    /// Boxes on the line, left to right.
    pub frames: Vec<BoxId>,
    /// Top of the line.
    pub y: f32,
    /// Width taken by the frames.
    pub w: f32,
    /// Height of the tallest frame.
    pub h: f32,
    /// Space reserved at the left edge.
    pub left: f32,
    /// Space reserved at the right edge.
    pub right: f32,
    /// Word count, for justification.
    pub wc: usize,
    /// The line ended with a forced break.
    pub br: bool,
}

impl LineBox {
    /// An empty line at `y`.
    #[must_use]
    pub fn at(y: f32) -> Self {
        Self {
            y,
            ..Self::default()
        }
    }

    /// Bottom of the line.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Whether no box was placed on the line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LayoutContext<'_> {
    /// Close the current line of `block` and open a new one below it.
    ///
    /// A line without frames and without height is reused instead.
    pub fn add_line(&mut self, block: BoxId, br: bool) {
        let b = &mut self.tree[block];
        let line = b.line_mut();
        line.br = br;
        if line.is_empty() && line.h == 0.0 {
            return;
        }
        let y = line.bottom();
        b.lines.push(LineBox::at(y));
        b.current_line = b.lines.len() - 1;
    }

    /// Reserve width at the start of the current line (`text-indent`).
    pub fn increase_line_width(&mut self, block: BoxId, width: f32) {
        self.tree[block].line_mut().w += width;
    }

    /// Grow the current line to at least `height`.
    pub fn maximize_line_height(&mut self, block: BoxId, height: f32) {
        let line = self.tree[block].line_mut();
        line.h = line.h.max(height);
    }

    /// Place `frame` on the current line of `block`, opening a new line first
    /// when it does not fit.
    ///
    /// # Errors
    ///
    /// Font resolution failures while measuring text.
    pub fn add_frame_to_line(&mut self, block: BoxId, frame: BoxId) -> Result<(), LayoutError> {
        let f = &self.tree[frame];
        if f.is_out_of_flow() {
            return Ok(());
        }
        match f.kind {
            // Inline boxes are represented on the line by their children.
            LayoutKind::Inline | LayoutKind::Generated if !f.is_block_container() => {
                return Ok(());
            }
            LayoutKind::ListBullet if !f.is_inside_bullet() => return Ok(()),
            LayoutKind::LineBreak => {
                let line_height = f.style.line_height_pt();
                self.position(frame)?;
                self.maximize_line_height(block, line_height);
                self.tree[block].line_mut().frames.push(frame);
                self.add_line(block, true);
                return Ok(());
            }
            _ => {}
        }

        // [§ 16.6.1](https://www.w3.org/TR/CSS2/text.html#white-space-model)
        // "A sequence of collapsible spaces at the beginning of a line is removed."
        if f.kind == LayoutKind::Text
            && !f.style.white_space.preserves_spaces()
            && self.tree[block].line().w == 0.0
        {
            let trimmed = self.tree.text(frame).trim_start().to_string();
            if trimmed.len() != self.tree.text(frame).len() {
                self.tree.set_text(frame, &trimmed)?;
                text::recalculate_width(self, frame)?;
            }
        }

        let width = self.margin_width(frame);
        if width == 0.0 && self.tree[frame].kind == LayoutKind::Text {
            self.position(frame)?;
            return Ok(());
        }

        let available = self.tree[block].width;
        let line = self.tree[block].line();
        if !line.is_empty() && line.left + line.w + line.right + width > available + 0.01 {
            self.add_line(block, false);
        }

        self.reposition(frame)?;

        let words = self.word_count(frame);
        let height = self.margin_height(frame)?;
        let line = self.tree[block].line_mut();
        line.frames.push(frame);
        line.wc += words;
        line.w += width;
        line.h = line.h.max(height);
        Ok(())
    }

    /// Position `frame` again and carry anything already laid out inside it
    /// along.
    fn reposition(&mut self, frame: BoxId) -> Result<(), LayoutError> {
        let before = self.tree[frame].position;
        self.position(frame)?;
        if let (Some(old), Some(new)) = (before, self.tree[frame].position) {
            let (dx, dy) = (new.x - old.x, new.y - old.y);
            self.tree[frame].position = Some(old);
            self.tree.move_box(frame, dx, dy);
        }
        Ok(())
    }

    /// Take `frame`, and everything placed after it, off the lines of
    /// `block`. Frames laid out inside `frame` count as `frame`.
    ///
    /// # Errors
    ///
    /// Font resolution failures while re-measuring the remaining line.
    pub fn remove_frames_from_line(&mut self, block: BoxId, frame: BoxId) -> Result<(), LayoutError> {
        let found = {
            let b = &self.tree[block];
            (0..=b.current_line).rev().find_map(|i| {
                b.lines[i]
                    .frames
                    .iter()
                    .position(|&f| f == frame || self.tree.is_ancestor(frame, f))
                    .map(|j| (i, j))
            })
        };
        let Some((i, j)) = found else {
            return Ok(());
        };

        let b = &mut self.tree[block];
        b.lines.truncate(i + 1);
        if j == 0 && i > 0 {
            let _ = b.lines.pop();
        } else {
            b.lines[i].frames.truncate(j);
        }
        b.current_line = b.lines.len() - 1;
        b.lines[b.current_line].br = false;

        let remaining = b.lines[b.current_line].frames.clone();
        let mut w = 0.0;
        let mut h: f32 = 0.0;
        let mut wc = 0;
        for f in remaining {
            w += self.margin_width(f);
            h = h.max(self.margin_height(f)?);
            wc += self.word_count(f);
        }
        let line = self.tree[block].line_mut();
        line.w = w;
        line.h = h;
        line.wc = wc;
        Ok(())
    }

    /// Words a frame contributes to its line.
    #[must_use]
    pub fn word_count(&self, frame: BoxId) -> usize {
        if self.tree[frame].kind == LayoutKind::Text {
            self.tree.text(frame).split_whitespace().count()
        } else {
            0
        }
    }

    /// Index of the line holding `frame`, or a box laid out inside it.
    #[must_use]
    pub fn line_index_of(&self, block: BoxId, frame: BoxId) -> Option<usize> {
        self.tree[block].lines.iter().position(|line| {
            line.frames
                .iter()
                .any(|&f| f == frame || self.tree.is_ancestor(frame, f))
        })
    }
}
