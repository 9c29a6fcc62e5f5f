//! Style model: typed property records, value parsing and font selection.
//!
//! [§ 6 Assigning property values, Cascading, and Inheritance](https://www.w3.org/TR/CSS2/cascade.html)
//!
//! Selector matching and the cascade happen upstream; this module receives
//! `name: value` declarations per element and turns them into [`Style`]
//! records layout can read without string lookups.

/// The typed style record and its used-value helpers.
pub mod computed;
/// Family list to face resolution.
pub mod font;
/// Longhand property names and the inheritable set.
pub mod property;
/// Per-element style map and the document context.
pub mod stylesheet;
/// Default declarations per HTML tag.
pub mod ua;
/// CSS value types.
pub mod values;

mod shorthand;

pub use computed::{DEFAULT_LINE_HEIGHT, Style};
pub use font::{FontFace, FontRegistry, FontSubtype};
pub use property::{INHERITED_PROPERTIES, Property};
pub use stylesheet::{Declarations, ElementDeclarations, ElementStyles, StyleMap, StylesheetContext};
