//! Paginated layout engine.
//!
//! This module turns a styled document into positioned boxes spread over
//! pages.
//!
//! # Relevant Specifications
//!
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS 2.1 Visual Formatting Model Details](https://www.w3.org/TR/CSS2/visudet.html)
//! - [CSS 2.1 Generated Content, Automatic Numbering, and Lists](https://www.w3.org/TR/CSS2/generate.html)
//! - [CSS 2.1 Paged Media](https://www.w3.org/TR/CSS2/page.html)
//! - [CSS 2.1 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! # Module Structure
//!
//! - [`box_model`] - Rectangles, points and edge sizes
//! - [`box_tree`] - The box arena and its structural edits
//! - [`builder`] - DOM to box tree
//! - [`context`] - Per-conversion state and the font and image collaborators
//! - [`reflow`] - Positioners and reflowers, one per box kind
//! - [`line`] - Line boxes
//! - [`sizing`] - Used widths, heights and margin collapsing
//! - [`table`] - Table structure and the cellmap
//! - [`counters`] - CSS counters and counter styles
//! - [`generated`] - `content` and list markers
//! - [`pagination`] - Page-break decisions
//! - [`split`] - Moving content onto continuation pages
//! - [`document`] - The entry point

pub mod box_model;
pub mod box_tree;
pub mod builder;
pub mod context;
pub mod counters;
pub mod document;
pub mod generated;
pub mod line;
pub mod pagination;
pub mod reflow;
pub mod sizing;
pub mod split;
pub mod table;
#[cfg(test)]
pub(crate) mod testing;

pub use box_model::{BoxDimensions, EdgeSizes, Point, Rect};
pub use box_tree::{BoxId, BoxTree, ContainingBlock, LayoutBox, LayoutKind};
pub use builder::build_box_tree;
pub use context::{ApproximateFontMetrics, FontMetrics, ImageResolver, LayoutContext, NoImages};
pub use document::{BoxReport, LayoutResult, PageLayout, layout_document, layout_with_declarations};
pub use line::LineBox;
