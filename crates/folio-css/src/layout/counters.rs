//! Counters and counter styles.
//!
//! [§ 12.4 Automatic counters and numbering](https://www.w3.org/TR/CSS2/generate.html#counters)
//!
//! "Counters are 'self-nesting', in the sense that resetting a counter in a
//! descendant element or pseudo-element automatically creates a new instance
//! of the counter."
//!
//! A `counter-reset` on a box creates the counter on the box's parent, so
//! that siblings and their descendants see it. Lookups start at the parent
//! of the asking box and walk up; a counter nobody reset is created on the
//! top-most box.

use std::str::FromStr;

use super::box_tree::BoxId;
use super::context::LayoutContext;
use crate::style::values::ListStyleType;

/// Name of the counter `list-item` boxes increment.
pub const LIST_ITEM_COUNTER: &str = "list-item";

impl LayoutContext<'_> {
    /// Box holding the nearest instance of `name` visible from `id`.
    #[must_use]
    pub fn counter_holder(&self, id: BoxId, name: &str) -> BoxId {
        let mut holder = self.tree.parent(id).unwrap_or(id);
        loop {
            if self.tree[holder].counters.contains_key(name) {
                return holder;
            }
            match self.tree.parent(holder) {
                Some(parent) => holder = parent,
                None => return holder,
            }
        }
    }

    /// Create counter `name` with `value` in the scope of `id`.
    pub fn reset_counter(&mut self, id: BoxId, name: &str, value: i32) {
        let holder = self.tree.parent(id).unwrap_or(id);
        let _ = self.tree[holder].counters.insert(name.to_string(), value);
    }

    /// Set the nearest instance of `name` without creating a new scope.
    pub fn set_counter(&mut self, id: BoxId, name: &str, value: i32) {
        let holder = self.counter_holder(id, name);
        let _ = self.tree[holder].counters.insert(name.to_string(), value);
    }

    /// Add `amount` to the nearest instance of `name`. The increment is
    /// remembered on `id` so a reset can take it back.
    pub fn increment_counter(&mut self, id: BoxId, name: &str, amount: i32) {
        let holder = self.counter_holder(id, name);
        let value = self.tree[holder]
            .counters
            .entry(name.to_string())
            .or_insert(0);
        *value = value.saturating_add(amount);
        self.tree[id]
            .applied_increments
            .push((holder, name.to_string(), amount));
    }

    /// Take back every increment `id` applied.
    pub fn revert_counter_increments(&mut self, id: BoxId) {
        let applied = std::mem::take(&mut self.tree[id].applied_increments);
        for (holder, name, amount) in applied {
            if let Some(value) = self.tree[holder].counters.get_mut(&name) {
                *value = value.saturating_sub(amount);
            }
        }
    }

    /// Value of the innermost instance of `name`.
    #[must_use]
    pub fn counter_value(&self, id: BoxId, name: &str) -> i32 {
        let holder = self.counter_holder(id, name);
        self.tree[holder].counters.get(name).copied().unwrap_or(0)
    }

    /// Values of every nested instance of `name`, outermost first.
    ///
    /// [§ 12.4.1 Nested counters and scope](https://www.w3.org/TR/CSS2/generate.html#scope)
    #[must_use]
    pub fn counter_values(&self, id: BoxId, name: &str) -> Vec<i32> {
        let start = self.tree.parent(id).unwrap_or(id);
        let mut values: Vec<i32> = std::iter::once(start)
            .chain(self.tree.ancestors(start))
            .filter_map(|b| self.tree[b].counters.get(name).copied())
            .collect();
        if values.is_empty() {
            values.push(0);
        }
        values.reverse();
        values
    }
}

/// Parse a counter style name; unknown names fall back to `decimal`.
#[must_use]
pub fn parse_counter_style(name: &str) -> ListStyleType {
    ListStyleType::from_str(name.trim()).unwrap_or(ListStyleType::Decimal)
}

/// Render a counter value in a counter style.
///
/// [§ 12.6.2 Lists: the 'list-style-type' property](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-type)
///
/// Values the alphabetic and roman systems cannot express fall back to
/// decimal.
#[must_use]
pub fn format_counter(value: i32, style: ListStyleType) -> String {
    match style {
        ListStyleType::None => String::new(),
        ListStyleType::Disc => "\u{2022}".to_string(),
        ListStyleType::Circle => "\u{25e6}".to_string(),
        ListStyleType::Square => "\u{25aa}".to_string(),
        ListStyleType::DecimalLeadingZero => {
            if (0..10).contains(&value) {
                format!("0{value}")
            } else {
                value.to_string()
            }
        }
        ListStyleType::LowerRoman => roman(value).unwrap_or_else(|| value.to_string()),
        ListStyleType::UpperRoman => roman(value)
            .map(|r| r.to_ascii_uppercase())
            .unwrap_or_else(|| value.to_string()),
        ListStyleType::LowerAlpha => alphabetic(value, &LATIN).unwrap_or_else(|| value.to_string()),
        ListStyleType::UpperAlpha => alphabetic(value, &LATIN)
            .map(|a| a.to_ascii_uppercase())
            .unwrap_or_else(|| value.to_string()),
        ListStyleType::LowerGreek => alphabetic(value, &GREEK).unwrap_or_else(|| value.to_string()),
        ListStyleType::UpperGreek => alphabetic(value, &GREEK)
            .map(|a| a.to_uppercase())
            .unwrap_or_else(|| value.to_string()),
        ListStyleType::Decimal => value.to_string(),
    }
}

const LATIN: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

const GREEK: [char; 24] = [
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ', 'τ',
    'υ', 'φ', 'χ', 'ψ', 'ω',
];

/// Bijective base-n numbering: a, b, ..., z, aa, ab, ...
fn alphabetic(value: i32, digits: &[char]) -> Option<String> {
    if value < 1 {
        return None;
    }
    let base = digits.len();
    let mut n = value as usize;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(digits[n % base]);
        n /= base;
    }
    Some(out.iter().rev().collect())
}

fn roman(value: i32) -> Option<String> {
    const TABLE: [(i32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    if !(1..4000).contains(&value) {
        return None;
    }
    let mut n = value;
    let mut out = String::new();
    for (amount, digits) in TABLE {
        while n >= amount {
            out.push_str(digits);
            n -= amount;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use folio_dom::DomTree;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::box_tree::{BoxTree, LayoutBox, LayoutKind};
    use crate::layout::context::{ApproximateFontMetrics, NoImages};
    use crate::style::{FontRegistry, Style};

    /// A `div` holding one `p`.
    fn parent_and_child() -> (BoxTree, BoxId) {
        let mut dom = DomTree::new();
        let div = dom.create_element("div");
        let p = dom.create_element("p");
        let mut tree = BoxTree::new(dom);
        let parent = tree.alloc(LayoutBox::new(div, LayoutKind::Block, Style::default()));
        let child = tree.alloc(LayoutBox::new(p, LayoutKind::Block, Style::default()));
        tree.append_child(parent, child, true).unwrap();
        (tree, child)
    }

    #[test]
    fn test_increment_saturates_at_the_limits() {
        let (tree, child) = parent_and_child();
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = LayoutContext::new(tree, &config, &fonts, &metrics, &NoImages);

        ctx.reset_counter(child, "c", i32::MAX);
        ctx.increment_counter(child, "c", 5);
        assert_eq!(ctx.counter_value(child, "c"), i32::MAX);
        ctx.revert_counter_increments(child);
        assert_eq!(ctx.counter_value(child, "c"), i32::MAX - 5);

        ctx.reset_counter(child, "c", i32::MIN);
        ctx.increment_counter(child, "c", i32::MIN);
        assert_eq!(ctx.counter_value(child, "c"), i32::MIN);
        ctx.revert_counter_increments(child);
        assert_eq!(ctx.counter_value(child, "c"), 0);
    }

    #[test]
    fn test_revert_restores_the_value() {
        let (tree, child) = parent_and_child();
        let config = LayoutConfig::default();
        let fonts = FontRegistry::with_core_fonts("times");
        let metrics = ApproximateFontMetrics::default();
        let mut ctx = LayoutContext::new(tree, &config, &fonts, &metrics, &NoImages);

        ctx.reset_counter(child, "item", 0);
        ctx.increment_counter(child, "item", 2);
        assert_eq!(ctx.counter_value(child, "item"), 2);
        ctx.revert_counter_increments(child);
        assert_eq!(ctx.counter_value(child, "item"), 0);
    }

    #[test]
    fn test_roman() {
        assert_eq!(format_counter(1994, ListStyleType::UpperRoman), "MCMXCIV");
        assert_eq!(format_counter(4, ListStyleType::LowerRoman), "iv");
        assert_eq!(format_counter(0, ListStyleType::LowerRoman), "0");
    }

    #[test]
    fn test_alphabetic_is_bijective() {
        assert_eq!(format_counter(1, ListStyleType::LowerAlpha), "a");
        assert_eq!(format_counter(26, ListStyleType::LowerAlpha), "z");
        assert_eq!(format_counter(27, ListStyleType::UpperAlpha), "AA");
        assert_eq!(format_counter(2, ListStyleType::LowerGreek), "β");
    }

    #[test]
    fn test_leading_zero_and_fallback() {
        assert_eq!(format_counter(7, ListStyleType::DecimalLeadingZero), "07");
        assert_eq!(format_counter(12, ListStyleType::DecimalLeadingZero), "12");
        assert_eq!(parse_counter_style("klingon"), ListStyleType::Decimal);
        assert_eq!(parse_counter_style("upper-latin"), ListStyleType::UpperAlpha);
    }
}
