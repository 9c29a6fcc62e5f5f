//! Generated content.
//!
//! [§ 12.2 The 'content' property](https://www.w3.org/TR/CSS2/generate.html#content)
//!
//! "This property is used with the :before and :after pseudo-elements to
//! generate content in a document."
//!
//! `::before` and `::after` boxes are built empty. The first time one is
//! reflowed on a page, its `content` value is resolved against the counters
//! in scope and appended as a synthetic text box. The same pass applies
//! `counter-reset` and `counter-increment` for every box.

use folio_dom::NodeId;

use super::box_tree::{BoxId, LayoutBox, LayoutKind};
use super::context::LayoutContext;
use super::counters::{LIST_ITEM_COUNTER, format_counter, parse_counter_style};
use crate::error::LayoutError;
use crate::style::Style;
use crate::style::values::ListStyleType;

/// One item of a `content` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    /// A quoted string, escapes decoded.
    Text(String),
    /// `counter(name[, style])`.
    Counter {
        /// Counter name.
        name: String,
        /// Counter style.
        style: ListStyleType,
    },
    /// `counters(name, separator[, style])`.
    Counters {
        /// Counter name.
        name: String,
        /// String placed between levels.
        separator: String,
        /// Counter style.
        style: ListStyleType,
    },
    /// `attr(name)`.
    Attr(String),
    /// `open-quote` and friends. Quote characters are not substituted.
    Quote,
}

/// Parse a `content` value. Unknown tokens are dropped.
#[must_use]
pub fn parse_content(value: &str) -> Vec<ContentItem> {
    let chars: Vec<char> = value.chars().collect();
    let mut items = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '"' || c == '\'' {
            let (text, next) = read_string(&chars, i);
            items.push(ContentItem::Text(text));
            i = next;
            continue;
        }

        let start = i;
        while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '-' || chars[i] == '_') {
            i += 1;
        }
        if start == i {
            i += 1;
            continue;
        }
        let ident: String = chars[start..i].iter().collect::<String>().to_ascii_lowercase();

        if chars.get(i) == Some(&'(') {
            let (args, next) = read_arguments(&chars, i + 1);
            i = next;
            let arg = |n: usize| args.get(n).map(String::as_str);
            match ident.as_str() {
                "counter" => {
                    if let Some(name) = arg(0).filter(|n| !n.is_empty()) {
                        items.push(ContentItem::Counter {
                            name: name.to_string(),
                            style: arg(1).map_or(ListStyleType::Decimal, parse_counter_style),
                        });
                    }
                }
                "counters" => {
                    if let Some(name) = arg(0).filter(|n| !n.is_empty()) {
                        items.push(ContentItem::Counters {
                            name: name.to_string(),
                            separator: arg(1).unwrap_or_default().to_string(),
                            style: arg(2).map_or(ListStyleType::Decimal, parse_counter_style),
                        });
                    }
                }
                "attr" => {
                    if let Some(name) = arg(0).filter(|n| !n.is_empty()) {
                        items.push(ContentItem::Attr(name.to_ascii_lowercase()));
                    }
                }
                other => log::debug!("ignoring content function {other}()"),
            }
        } else if matches!(
            ident.as_str(),
            "open-quote" | "close-quote" | "no-open-quote" | "no-close-quote"
        ) {
            items.push(ContentItem::Quote);
        }
    }
    items
}

/// Read a quoted string starting at `start`; returns the decoded text and
/// the index after the closing quote.
///
/// [§ 4.1.3 Characters and case](https://www.w3.org/TR/CSS2/syndata.html#characters)
fn read_string(chars: &[char], start: usize) -> (String, usize) {
    let quote = chars[start];
    let mut out = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        if c == quote {
            return (out, i + 1);
        }
        if c == '\\' {
            i += 1;
            let Some(&next) = chars.get(i) else {
                break;
            };
            if next.is_ascii_hexdigit() {
                // "Only six hexadecimal digits are allowed after the
                // backslash ... followed by an optional white space"
                let hex_start = i;
                while i < chars.len() && i - hex_start < 6 && chars[i].is_ascii_hexdigit() {
                    i += 1;
                }
                let hex: String = chars[hex_start..i].iter().collect();
                if let Some(decoded) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    out.push(decoded);
                }
                if chars.get(i).is_some_and(|c| c.is_whitespace()) {
                    i += 1;
                }
                continue;
            }
            if next != '\n' {
                out.push(next);
            }
            i += 1;
            continue;
        }
        out.push(c);
        i += 1;
    }
    (out, i)
}

/// Read comma separated arguments up to the closing parenthesis.
fn read_arguments(chars: &[char], start: usize) -> (Vec<String>, usize) {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '"' | '\'' => {
                let (text, next) = read_string(chars, i);
                current.push_str(&text);
                i = next;
                continue;
            }
            ',' => args.push(std::mem::take(&mut current).trim().to_string()),
            ')' => {
                args.push(current.trim().to_string());
                return (args, i + 1);
            }
            c => current.push(c),
        }
        i += 1;
    }
    args.push(current.trim().to_string());
    (args, i)
}

impl LayoutContext<'_> {
    /// Apply counters and generated content of a box, once per layout.
    ///
    /// [§ 12.4](https://www.w3.org/TR/CSS2/generate.html#counters) "the
    /// 'counter-reset' ... is applied before the 'counter-increment'".
    ///
    /// # Errors
    ///
    /// Structural errors while inserting the generated text box.
    pub fn prepare_content(&mut self, id: BoxId) -> Result<(), LayoutError> {
        if self.tree[id].content_set {
            return Ok(());
        }
        self.tree[id].content_set = true;

        let b = &self.tree[id];
        let resets: Vec<(String, i32)> = b
            .style
            .counter_reset
            .iter()
            .map(|(name, value)| {
                let value = b.saved_resets.get(name).copied().unwrap_or(*value);
                (name.clone(), value)
            })
            .collect();
        let increments = b.style.counter_increment.clone();
        let is_list_item = b.kind == LayoutKind::ListItem;
        let node = b.node;

        for (name, value) in resets {
            self.reset_counter(id, &name, value);
        }

        // [CSS Lists 3 § 4.5](https://www.w3.org/TR/css-lists-3/#list-item-counter)
        // "list items automatically increment the special list-item counter"
        // unless an explicit increment names it. `<li value>` sets it instead.
        if is_list_item && !increments.iter().any(|(name, _)| name == LIST_ITEM_COUNTER) {
            let ordinal = self
                .tree
                .dom()
                .get_attribute(node, "value")
                .and_then(|v| v.trim().parse::<i32>().ok());
            match ordinal {
                Some(value) => self.set_counter(id, LIST_ITEM_COUNTER, value),
                None => self.increment_counter(id, LIST_ITEM_COUNTER, 1),
            }
        }
        for (name, amount) in increments {
            self.increment_counter(id, &name, amount);
        }

        let b = &self.tree[id];
        if b.kind == LayoutKind::Generated && b.first_child.is_none() {
            if let Some(content) = b.style.content.clone() {
                let text = self.resolve_content(id, &parse_content(&content));
                self.append_generated_text(id, &text)?;
            }
        }
        Ok(())
    }

    /// Resolve parsed `content` items for the box `id`.
    #[must_use]
    pub fn resolve_content(&self, id: BoxId, items: &[ContentItem]) -> String {
        let owner: Option<NodeId> = self.tree.parent(id).map(|p| self.tree[p].node);
        let mut out = String::new();
        for item in items {
            match item {
                ContentItem::Text(text) => out.push_str(text),
                ContentItem::Counter { name, style } => {
                    out.push_str(&format_counter(self.counter_value(id, name), *style));
                }
                ContentItem::Counters { name, separator, style } => {
                    let levels: Vec<String> = self
                        .counter_values(id, name)
                        .into_iter()
                        .map(|v| format_counter(v, *style))
                        .collect();
                    out.push_str(&levels.join(separator));
                }
                ContentItem::Attr(attribute) => {
                    if let Some(value) = owner.and_then(|n| self.tree.dom().get_attribute(n, attribute)) {
                        out.push_str(value);
                    }
                }
                ContentItem::Quote => {}
            }
        }
        out
    }

    /// Append a synthetic text box to `parent`; it is removed on reset.
    ///
    /// # Errors
    ///
    /// Structural errors from the tree.
    pub fn append_generated_text(&mut self, parent: BoxId, text: &str) -> Result<BoxId, LayoutError> {
        let node = self.tree.dom_mut().create_text(text);
        let style = Style::anonymous(&self.tree[parent].style);
        let mut text_box = LayoutBox::new(node, LayoutKind::Text, style);
        text_box.generated = true;
        let id = self.tree.alloc(text_box);
        self.tree.append_child(parent, id, true)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_counter_and_string() {
        let items = parse_content(r#"counter(item) ". ""#);
        assert_eq!(
            items,
            vec![
                ContentItem::Counter {
                    name: "item".into(),
                    style: ListStyleType::Decimal
                },
                ContentItem::Text(". ".into()),
            ]
        );
    }

    #[test]
    fn test_parse_counters_with_style() {
        let items = parse_content(r#"counters(section, ".", upper-roman) " ""#);
        assert_eq!(
            items[0],
            ContentItem::Counters {
                name: "section".into(),
                separator: ".".into(),
                style: ListStyleType::UpperRoman
            }
        );
    }

    #[test]
    fn test_string_escapes() {
        let items = parse_content(r#""\201C quoted\"" attr(title) open-quote"#);
        assert_eq!(items[0], ContentItem::Text("\u{201c}quoted\"".into()));
        assert_eq!(items[1], ContentItem::Attr("title".into()));
        assert_eq!(items[2], ContentItem::Quote);
    }

    #[test]
    fn test_unknown_functions_are_dropped() {
        assert_eq!(parse_content("url(x.png) 'a'"), vec![ContentItem::Text("a".into())]);
    }
}
