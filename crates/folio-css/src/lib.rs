//! Style model, paginated layout engine and canvas painter for Folio.
//!
//! # Scope
//!
//! This crate implements:
//! - **Style model** ([CSS 2.1 § 6 Assigning property values](https://www.w3.org/TR/CSS2/cascade.html))
//!   - Typed per-element styles built from `name: value` declarations
//!   - Shorthand expansion, inheritance and length resolution
//!   - Font family resolution
//!
//! - **Layout** ([CSS 2.1 § 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html))
//!   - Box tree construction from the DOM
//!   - Block, inline, list, image and table reflow
//!   - Line breaking and justification
//!   - Counters and generated content
//!   - Pagination with forced and automatic page breaks
//!
//! - **Painting** ([CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html))
//!   - Backgrounds, borders, text, images and list markers onto a [`paint::Canvas`]
//!   - A recording canvas for inspection and tests
//!
//! # Not Implemented
//!
//! - Selector matching and the cascade (callers supply declarations)
//! - Floats (laid out as `float: none` with a warning)
//! - `border-collapse: groups`
//! - Quote substitution for `open-quote`/`close-quote`

/// Conversion options.
pub mod config;
/// Error types.
pub mod error;
/// Box tree, reflow and pagination per [CSS 2.1 § 9](https://www.w3.org/TR/CSS2/visuren.html).
pub mod layout;
/// Render dispatch per [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html).
pub mod paint;
/// Typed styles per [CSS 2.1 § 6](https://www.w3.org/TR/CSS2/cascade.html).
pub mod style;

// Re-exports for convenience
pub use config::{LayoutConfig, Orientation, PageMargins, PaperSize};
pub use error::{ImageError, LayoutError, StyleError};
pub use layout::{
    ApproximateFontMetrics, BoxId, BoxTree, FontMetrics, ImageResolver, LayoutKind, LayoutResult,
    NoImages, PageLayout, layout_document, layout_with_declarations,
};
pub use paint::{Canvas, DisplayListCanvas, PageTextOverlay, RenderEvents, Renderer};
pub use style::{ElementDeclarations, FontRegistry, Style, StyleMap, StylesheetContext};
