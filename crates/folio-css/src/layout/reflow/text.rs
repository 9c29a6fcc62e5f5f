//! Text runs.
//!
//! [§ 16.6 White space](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
//!
//! A text box fills the current line of its block container. When the text
//! does not fit, it is split at the last break opportunity that does, the
//! tail becomes a new text box right after it, and layout continues on the
//! next line with the tail.

use super::Reflower;
use crate::error::LayoutError;
use crate::layout::box_tree::{BoxId, LayoutBox, LayoutKind};
use crate::layout::context::LayoutContext;
use crate::style::Style;
use crate::style::values::{TextTransform, WhiteSpace};

/// Lays out text runs.
#[derive(Debug)]
pub struct TextReflower;

/// Shared instance.
pub static TEXT_REFLOWER: TextReflower = TextReflower;

impl Reflower for TextReflower {
    fn reflow(
        &self,
        ctx: &mut LayoutContext<'_>,
        id: BoxId,
        block: Option<BoxId>,
    ) -> Result<(), LayoutError> {
        let style = ctx.tree[id].style.clone();
        let processed = collapse_white_space(
            &transform_text(ctx.tree.text(id), style.text_transform),
            style.white_space,
        );
        if processed != ctx.tree.text(id) {
            ctx.tree.set_text(id, &processed)?;
        }
        ctx.tree[id].height = ctx.font_height(&style)?;

        let Some(block) = block.or_else(|| ctx.find_block_parent(id)) else {
            recalculate_width(ctx, id)?;
            return ctx.position(id);
        };

        let mut forced_break = false;
        let mut split = false;
        loop {
            if !style.white_space.preserves_spaces() && ctx.tree[block].line().w == 0.0 {
                let text = ctx.tree.text(id);
                let trimmed = text.trim_start();
                if trimmed.len() != text.len() {
                    let trimmed = trimmed.to_string();
                    ctx.tree.set_text(id, &trimmed)?;
                }
            }
            if ctx.tree.text(id).is_empty() {
                break;
            }

            let Some(offset) = find_break(ctx, id, block, style.white_space)? else {
                break;
            };
            let length = ctx.tree.text(id).chars().count();
            if offset == 0 {
                if ctx.tree.text(id) == " " {
                    ctx.tree.set_text(id, "")?;
                    break;
                }
                ctx.add_line(block, false);
                continue;
            }
            if offset < length {
                let tail = split_text(ctx, id, offset)?;
                if let Some(parent) = ctx.tree.parent(id) {
                    if ctx.tree[parent].kind == LayoutKind::Inline {
                        ctx.split_inline(parent, tail, false, false)?;
                    }
                }
                split = true;
            }
            let text = ctx.tree.text(id);
            if let Some(stripped) = text.strip_suffix('\n') {
                let stripped = stripped.to_string();
                ctx.tree.set_text(id, &stripped)?;
                forced_break = true;
            }
            break;
        }

        if !split && !style.white_space.preserves_spaces() {
            trim_at_block_edges(ctx, id)?;
        }

        recalculate_width(ctx, id)?;
        ctx.add_frame_to_line(block, id)?;
        if forced_break || split {
            ctx.add_line(block, forced_break);
        }
        Ok(())
    }

    fn min_max_width(&self, ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(f32, f32), LayoutError> {
        let b = &ctx.tree[id];
        let style = b.style.clone();
        let edges = b.horizontal_edges();
        let text = collapse_white_space(
            &transform_text(ctx.tree.text(id), style.text_transform),
            style.white_space,
        );

        let widest = |pieces: Vec<&str>| -> Result<f32, LayoutError> {
            pieces
                .into_iter()
                .map(|piece| ctx.text_width(&style, piece))
                .try_fold(0.0_f32, |acc, w: Result<f32, LayoutError>| w.map(|w| acc.max(w)))
        };
        let lines: Vec<&str> = text.split('\n').collect();
        let words: Vec<&str> = segments(&text).into_iter().map(|(word, _)| word).collect();

        let min = match style.white_space {
            WhiteSpace::Pre => widest(lines.clone())?,
            WhiteSpace::Nowrap => ctx.text_width(&style, &text)?,
            WhiteSpace::Normal | WhiteSpace::PreWrap | WhiteSpace::PreLine => widest(words)?,
        };
        let max = match style.white_space {
            WhiteSpace::Pre | WhiteSpace::PreWrap | WhiteSpace::PreLine => widest(lines)?,
            WhiteSpace::Normal | WhiteSpace::Nowrap => ctx.text_width(&style, &text)?,
        };
        Ok((min + edges, max + edges))
    }
}

/// Re-measure a text box after its text changed.
///
/// # Errors
///
/// Font resolution failures.
pub fn recalculate_width(ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<f32, LayoutError> {
    let b = &ctx.tree[id];
    let text = ctx.tree.text(id);
    let spaces = text.chars().filter(|&c| c == ' ').count() as f32;
    let width = ctx.text_width(&b.style, text)? + spaces * b.word_spacing;
    ctx.tree[id].width = width;
    Ok(width)
}

/// [§ 16.5 Capitalization](https://www.w3.org/TR/CSS2/text.html#caps-prop)
#[must_use]
pub fn transform_text(text: &str, transform: TextTransform) -> String {
    match transform {
        TextTransform::None => text.to_string(),
        TextTransform::Uppercase => text.to_uppercase(),
        TextTransform::Lowercase => text.to_lowercase(),
        TextTransform::Capitalize => {
            let mut out = String::with_capacity(text.len());
            let mut at_word_start = true;
            for c in text.chars() {
                if at_word_start && c.is_alphabetic() {
                    out.extend(c.to_uppercase());
                } else {
                    out.push(c);
                }
                at_word_start = c.is_whitespace();
            }
            out
        }
    }
}

/// [§ 16.6.1 The 'white-space' processing model](https://www.w3.org/TR/CSS2/text.html#white-space-model)
///
/// `normal` and `nowrap` collapse every run of white space, newlines
/// included, into one space. `pre-line` collapses spaces and tabs but keeps
/// newlines. The `pre` modes keep the text as is.
#[must_use]
pub fn collapse_white_space(text: &str, white_space: WhiteSpace) -> String {
    let collapsible: fn(char) -> bool = match white_space {
        WhiteSpace::Normal | WhiteSpace::Nowrap => {
            |c| matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{c}')
        }
        WhiteSpace::PreLine => |c| matches!(c, ' ' | '\t'),
        WhiteSpace::Pre | WhiteSpace::PreWrap => return text.to_string(),
    };
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if collapsible(c) {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Split text into `(word, separator)` pairs. Separators are runs of white
/// space and hyphens; the hyphen stays with the word before it when the
/// line is broken.
#[must_use]
pub fn segments(text: &str) -> Vec<(&str, &str)> {
    let is_separator = |c: char| c.is_whitespace() || c == '-';
    let mut result = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let word_end = rest.find(is_separator).unwrap_or(rest.len());
        let after_word = &rest[word_end..];
        let sep_len = after_word
            .find(|c: char| !is_separator(c))
            .unwrap_or(after_word.len());
        result.push((&rest[..word_end], &after_word[..sep_len]));
        rest = &after_word[sep_len..];
    }
    result
}

/// Char offset to split the text of `id` at, or `None` when it fits.
fn find_break(
    ctx: &LayoutContext<'_>,
    id: BoxId,
    block: BoxId,
    white_space: WhiteSpace,
) -> Result<Option<usize>, LayoutError> {
    Ok(match white_space {
        WhiteSpace::Normal => line_break(ctx, id, block)?,
        WhiteSpace::Nowrap => None,
        WhiteSpace::Pre => newline_break(ctx.tree.text(id)),
        WhiteSpace::PreWrap | WhiteSpace::PreLine => {
            match (newline_break(ctx.tree.text(id)), line_break(ctx, id, block)?) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            }
        }
    })
}

fn newline_break(text: &str) -> Option<usize> {
    text.chars().position(|c| c == '\n').map(|i| i + 1)
}

/// [§ 5.2 Breaking Rules](https://www.w3.org/TR/css-text-3/#line-break-details)
///
/// Greedy fill: take words while they fit on what is left of the current
/// line. Trailing spaces do not count against the fit. A line with nothing
/// on it always takes at least one word.
fn line_break(
    ctx: &LayoutContext<'_>,
    id: BoxId,
    block: BoxId,
) -> Result<Option<usize>, LayoutError> {
    let b = &ctx.tree[id];
    let style = &b.style;
    let text = ctx.tree.text(id);
    let edges = b.horizontal_edges();
    let cb_width = b.containing_block.map_or(ctx.tree[block].width, |cb| cb.w);
    let line = ctx.tree[block].line();
    let available = cb_width - line.left - line.w - line.right;

    if ctx.text_width(style, text)? + edges <= available + 0.01 {
        return Ok(None);
    }

    let mut width = 0.0;
    let mut offset = 0;
    let pieces = segments(text);
    for &(word, sep) in &pieces {
        let whole = format!("{word}{sep}");
        let fit_width = if sep.chars().all(char::is_whitespace) {
            ctx.text_width(style, word)?
        } else {
            ctx.text_width(style, &whole)?
        };
        if width + fit_width + edges > available + 0.01 {
            break;
        }
        width += ctx.text_width(style, &whole)?;
        offset += word.chars().count() + sep.chars().count();
    }

    if offset == 0 && line.is_empty() {
        if let Some(&(word, sep)) = pieces.first() {
            offset = word.chars().count() + sep.chars().count();
        }
    }
    let length = text.chars().count();
    Ok(if offset >= length { None } else { Some(offset) })
}

/// Split a text box at a char offset. The tail becomes a new text box right
/// after `id`, with the style `id` was built with.
fn split_text(ctx: &mut LayoutContext<'_>, id: BoxId, offset: usize) -> Result<BoxId, LayoutError> {
    let node = ctx.tree[id].node;
    let tail_node = ctx.tree.dom_mut().split_text(node, offset)?;
    let style: Style = ctx.tree[id].original_style.clone();
    let mut tail = LayoutBox::new(tail_node, LayoutKind::Text, style);
    tail.containing_block = ctx.tree[id].containing_block;
    let tail = ctx.tree.alloc(tail);
    if let Some(parent) = ctx.tree.parent(id) {
        ctx.tree.insert_after(parent, tail, id, false)?;
    }
    Ok(tail)
}

/// "A sequence of collapsible spaces at the end of a line is removed." Text
/// that starts or ends a block container loses its outer spaces.
fn trim_at_block_edges(ctx: &mut LayoutContext<'_>, id: BoxId) -> Result<(), LayoutError> {
    let parent_is_inline = ctx
        .tree
        .parent(id)
        .is_some_and(|p| !ctx.tree[p].is_block_container());
    if parent_is_inline {
        return Ok(());
    }
    let b = &ctx.tree[id];
    let (first, last) = (b.prev_sibling.is_none(), b.next_sibling.is_none());
    let text = ctx.tree.text(id);
    let mut trimmed = text;
    if last {
        trimmed = trimmed.trim_end();
    }
    if first {
        trimmed = trimmed.trim_start();
    }
    if trimmed.len() != text.len() {
        let trimmed = trimmed.to_string();
        ctx.tree.set_text(id, &trimmed)?;
    }
    Ok(())
}
