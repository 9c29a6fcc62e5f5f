//! Width and height equations.
//!
//! [§ 10.3 Calculating widths and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins)
//! [§ 10.6 Calculating heights and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_heights_and_margins)
//!
//! Pure functions over already resolved lengths. `None` stands for `auto`.
//! `edges` is the sum of borders and paddings on the axis.

/// Used width and horizontal margins of a block-level box in normal flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockWidth {
    /// Used `margin-left`.
    pub margin_left: f32,
    /// Used `width`.
    pub width: f32,
    /// Used `margin-right`.
    pub margin_right: f32,
}

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
/// 'padding-right' + 'border-right-width' + 'margin-right' = width of
/// containing block"
///
/// `preferred` is the `(min, max)` content width. When it is given, an
/// `auto` width between two `auto` margins shrinks to fit the content and the
/// margins share what is left, which centres the box.
#[must_use]
pub fn resolve_block_width(
    containing_width: f32,
    width: Option<f32>,
    margin_left: Option<f32>,
    margin_right: Option<f32>,
    edges: f32,
    preferred: Option<(f32, f32)>,
) -> BlockWidth {
    match (width, margin_left, margin_right) {
        // "If all of the above have a computed value other than 'auto', the
        // values are said to be "over-constrained" and ... the specified
        // value of 'margin-right' is ignored"
        (Some(w), Some(ml), Some(_)) => BlockWidth {
            margin_left: ml,
            width: w,
            margin_right: containing_width - ml - w - edges,
        },
        // "If there is exactly one value specified as 'auto', its used value
        // follows from the equality."
        (Some(w), None, Some(mr)) => BlockWidth {
            margin_left: containing_width - w - mr - edges,
            width: w,
            margin_right: mr,
        },
        (Some(w), Some(ml), None) => BlockWidth {
            margin_left: ml,
            width: w,
            margin_right: containing_width - ml - w - edges,
        },
        // "If both 'margin-left' and 'margin-right' are 'auto', their used
        // values are equal."
        (Some(w), None, None) => {
            let slack = containing_width - w - edges;
            if slack < 0.0 {
                BlockWidth {
                    margin_left: 0.0,
                    width: w,
                    margin_right: slack,
                }
            } else {
                BlockWidth {
                    margin_left: slack / 2.0,
                    width: w,
                    margin_right: slack / 2.0,
                }
            }
        }
        (None, None, None) if preferred.is_some() => {
            let (min, max) = preferred.unwrap_or_default();
            let available = (containing_width - edges).max(0.0);
            let w = shrink_to_fit(min, max, available);
            let slack = containing_width - w - edges;
            BlockWidth {
                margin_left: slack / 2.0,
                width: w,
                margin_right: slack / 2.0,
            }
        }
        // "If 'width' is set to 'auto', any other 'auto' values become '0'
        // and 'width' follows from the resulting equality."
        (None, ml, mr) => {
            let ml = ml.unwrap_or(0.0);
            let mr = mr.unwrap_or(0.0);
            let w = (containing_width - ml - mr - edges).max(0.0);
            BlockWidth {
                margin_left: ml,
                width: w,
                margin_right: containing_width - ml - w - edges,
            }
        }
    }
}

/// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
///
/// "the shrink-to-fit width is: min(max(preferred minimum width, available
/// width), preferred width)."
#[must_use]
pub fn shrink_to_fit(min: f32, max: f32, available: f32) -> f32 {
    min.max(available).min(max)
}

/// Used horizontal values of an absolutely positioned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteWidth {
    /// Used `left`.
    pub left: f32,
    /// Used `margin-left`.
    pub margin_left: f32,
    /// Used `width`.
    pub width: f32,
    /// Used `margin-right`.
    pub margin_right: f32,
    /// Used `right`.
    pub right: f32,
}

/// Inputs of the absolute width equation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AbsoluteInputs {
    /// Containing block width.
    pub containing: f32,
    /// `left`.
    pub start: Option<f32>,
    /// `right`.
    pub end: Option<f32>,
    /// `width`.
    pub size: Option<f32>,
    /// `margin-left`.
    pub margin_start: Option<f32>,
    /// `margin-right`.
    pub margin_end: Option<f32>,
    /// Borders and paddings.
    pub edges: f32,
    /// Offset the box would have in normal flow.
    pub static_start: f32,
}

/// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
///
/// "'left' + 'margin-left' + 'border-left-width' + 'padding-left' + 'width'
/// + 'padding-right' + 'border-right-width' + 'margin-right' + 'right' =
/// width of containing block"
///
/// `preferred` is the `(min, max)` content width used for shrink-to-fit.
#[must_use]
pub fn resolve_absolute_width(input: AbsoluteInputs, preferred: (f32, f32)) -> AbsoluteWidth {
    let (min, max) = preferred;
    let solved = solve_absolute(input, |available| shrink_to_fit(min, max, available));
    AbsoluteWidth {
        left: solved.start,
        margin_left: solved.margin_start,
        width: solved.size,
        margin_right: solved.margin_end,
        right: solved.end,
    }
}

/// Used vertical values of an absolutely positioned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteHeight {
    /// Used `top`.
    pub top: f32,
    /// Used `margin-top`.
    pub margin_top: f32,
    /// Used `height`.
    pub height: f32,
    /// Used `margin-bottom`.
    pub margin_bottom: f32,
    /// Used `bottom`.
    pub bottom: f32,
}

/// [§ 10.6.4 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-height)
///
/// The vertical counterpart of [`resolve_absolute_width`]; an `auto` height
/// takes the content height.
#[must_use]
pub fn resolve_absolute_height(input: AbsoluteInputs, content_height: f32) -> AbsoluteHeight {
    let solved = solve_absolute(input, |_| content_height);
    AbsoluteHeight {
        top: solved.start,
        margin_top: solved.margin_start,
        height: solved.size,
        margin_bottom: solved.margin_end,
        bottom: solved.end,
    }
}

struct Solved {
    start: f32,
    margin_start: f32,
    size: f32,
    margin_end: f32,
    end: f32,
}

fn solve_absolute(input: AbsoluteInputs, intrinsic: impl Fn(f32) -> f32) -> Solved {
    let AbsoluteInputs {
        containing: cb,
        start,
        end,
        size,
        margin_start,
        margin_end,
        edges,
        static_start,
    } = input;

    match (start, size, end) {
        // "If none of the three is 'auto'"
        (Some(s), Some(w), Some(e)) => {
            let slack = cb - s - w - e - edges;
            match (margin_start, margin_end) {
                // "If both 'margin-left' and 'margin-right' are 'auto', solve
                // the equation under the extra constraint that the two margins
                // get equal values, unless this would make them negative"
                (None, None) => {
                    if slack < 0.0 {
                        Solved { start: s, margin_start: 0.0, size: w, margin_end: slack, end: e }
                    } else {
                        Solved { start: s, margin_start: slack / 2.0, size: w, margin_end: slack / 2.0, end: e }
                    }
                }
                (None, Some(me)) => Solved { start: s, margin_start: slack - me, size: w, margin_end: me, end: e },
                (Some(ms), None) => Solved { start: s, margin_start: ms, size: w, margin_end: slack - ms, end: e },
                // "If the values are over-constrained, ignore the value for
                // 'right'"
                (Some(ms), Some(me)) => Solved {
                    start: s,
                    margin_start: ms,
                    size: w,
                    margin_end: me,
                    end: cb - s - ms - w - me - edges,
                },
            }
        }
        _ => {
            // "Otherwise, set 'auto' values for 'margin-left' and
            // 'margin-right' to 0"
            let ms = margin_start.unwrap_or(0.0);
            let me = margin_end.unwrap_or(0.0);
            let fixed = ms + me + edges;
            match (start, size, end) {
                // "If all three of 'left', 'width', and 'right' are 'auto':
                // ... set 'left' to the static position and apply rule
                // number three"
                (None, None, None) => {
                    let s = static_start;
                    let w = intrinsic(cb - s - fixed);
                    Solved { start: s, margin_start: ms, size: w, margin_end: me, end: cb - s - w - fixed }
                }
                // 1. "'left' and 'width' are 'auto' and 'right' is not 'auto',
                // then the width is shrink-to-fit. Then solve for 'left'"
                (None, None, Some(e)) => {
                    let w = intrinsic(cb - e - fixed);
                    Solved { start: cb - e - w - fixed, margin_start: ms, size: w, margin_end: me, end: e }
                }
                // 2. "'left' and 'right' are 'auto' and 'width' is not 'auto',
                // then ... set 'left' to the static position. Then solve for
                // 'right'"
                (None, Some(w), None) => {
                    let s = static_start;
                    Solved { start: s, margin_start: ms, size: w, margin_end: me, end: cb - s - w - fixed }
                }
                // 3. "'width' and 'right' are 'auto' and 'left' is not 'auto',
                // then the width is shrink-to-fit. Then solve for 'right'"
                (Some(s), None, None) => {
                    let w = intrinsic(cb - s - fixed);
                    Solved { start: s, margin_start: ms, size: w, margin_end: me, end: cb - s - w - fixed }
                }
                // 4. "'left' is 'auto', 'width' and 'right' are not 'auto',
                // then solve for 'left'"
                (None, Some(w), Some(e)) => {
                    Solved { start: cb - e - w - fixed, margin_start: ms, size: w, margin_end: me, end: e }
                }
                // 5. "'width' is 'auto', 'left' and 'right' are not 'auto',
                // then solve for 'width'"
                (Some(s), None, Some(e)) => {
                    let w = (cb - s - e - fixed).max(0.0);
                    Solved { start: s, margin_start: ms, size: w, margin_end: me, end: cb - s - w - fixed }
                }
                // 6. "'right' is 'auto', 'left' and 'width' are not 'auto',
                // then solve for 'right'"
                (Some(s), Some(w), None) | (Some(s), Some(w), Some(_)) => {
                    Solved { start: s, margin_start: ms, size: w, margin_end: me, end: cb - s - w - fixed }
                }
            }
        }
    }
}

/// Clamp a used size between `min` and `max`.
///
/// [§ 10.4](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths): when
/// `min` exceeds `max`, `min` wins.
#[must_use]
pub fn clamp_size(value: f32, min: f32, max: Option<f32>) -> f32 {
    let capped = max.map_or(value, |m| value.min(m));
    capped.max(min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn total(w: &BlockWidth) -> f32 {
        w.margin_left + w.width + w.margin_right
    }

    #[test]
    fn test_auto_width_fills_containing_block() {
        let w = resolve_block_width(600.0, None, Some(10.0), Some(20.0), 0.0, None);
        assert_eq!(w.width, 570.0);
        assert_eq!(total(&w), 600.0);
    }

    #[test]
    fn test_auto_margins_center_fixed_width() {
        let w = resolve_block_width(600.0, Some(400.0), None, None, 0.0, None);
        assert_eq!((w.margin_left, w.margin_right), (100.0, 100.0));
    }

    #[test]
    fn test_auto_width_with_auto_margins_shrinks_to_content() {
        let w = resolve_block_width(600.0, None, None, None, 0.0, Some((120.0, 400.0)));
        assert_eq!(w.width, 400.0);
        assert_eq!((w.margin_left, w.margin_right), (100.0, 100.0));
    }

    #[test]
    fn test_over_constrained_ignores_margin_right() {
        let w = resolve_block_width(300.0, Some(400.0), Some(10.0), Some(10.0), 4.0, None);
        assert_eq!(w.margin_right, 300.0 - 10.0 - 400.0 - 4.0);
    }

    #[test]
    fn test_absolute_rule_one_solves_left() {
        let w = resolve_absolute_width(
            AbsoluteInputs {
                containing: 500.0,
                end: Some(20.0),
                ..AbsoluteInputs::default()
            },
            (50.0, 100.0),
        );
        assert_eq!(w.width, 100.0);
        assert_eq!(w.left, 380.0);
    }

    #[test]
    fn test_absolute_all_auto_uses_static_position() {
        let w = resolve_absolute_width(
            AbsoluteInputs {
                containing: 500.0,
                static_start: 30.0,
                ..AbsoluteInputs::default()
            },
            (50.0, 1000.0),
        );
        assert_eq!(w.left, 30.0);
        assert_eq!(w.width, 470.0);
        assert_eq!(w.right, 0.0);
    }

    #[test]
    fn test_absolute_height_from_bottom() {
        let h = resolve_absolute_height(
            AbsoluteInputs {
                containing: 800.0,
                end: Some(100.0),
                ..AbsoluteInputs::default()
            },
            40.0,
        );
        assert_eq!(h.height, 40.0);
        assert_eq!(h.top, 660.0);
    }

    #[test]
    fn test_clamp_min_wins() {
        assert_eq!(clamp_size(50.0, 80.0, Some(60.0)), 80.0);
        assert_eq!(clamp_size(90.0, 0.0, Some(60.0)), 60.0);
        assert_eq!(clamp_size(90.0, 0.0, None), 90.0);
    }

    #[quickcheck]
    fn prop_width_equation_always_holds(
        containing: u16,
        width: Option<u16>,
        margins: (Option<u8>, Option<u8>),
        edges: u8,
        preferred: Option<(u16, u16)>,
    ) -> bool {
        let containing = f32::from(containing);
        let edges = f32::from(edges);
        let w = resolve_block_width(
            containing,
            width.map(f32::from),
            margins.0.map(f32::from),
            margins.1.map(f32::from),
            edges,
            preferred.map(|(a, b)| (f32::from(a.min(b)), f32::from(a.max(b)))),
        );
        (total(&w) + edges - containing).abs() < 0.01
    }
}
