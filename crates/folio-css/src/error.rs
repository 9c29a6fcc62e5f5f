//! Error types for style resolution and layout.
//!
//! Only structural problems are errors. Malformed CSS, unreadable images and
//! unsupported constructs are recorded as warnings and layout carries on.

use folio_dom::DomError;
use thiserror::Error;

use crate::layout::BoxId;
use crate::style::FontSubtype;

/// Fatal style resolution failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StyleError {
    /// Not even the default family has a usable face.
    #[error("no font found for [{families}] ({subtype}) and no usable default family")]
    FontNotFound {
        /// The requested family list, comma separated.
        families: String,
        /// The requested subtype.
        subtype: FontSubtype,
    },
}

/// Fatal layout failures. Any of these aborts the conversion.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A mirrored DOM edit failed.
    #[error(transparent)]
    Dom(#[from] DomError),

    /// A font could not be resolved.
    #[error(transparent)]
    Style(#[from] StyleError),

    /// A box was reflowed before its containing block was known.
    #[error("box {0} has no containing block {1}")]
    MissingContainingBlock(BoxId, &'static str),

    /// A table cell, row or group was not registered in its table's cellmap.
    #[error("box {0} is not registered in the cellmap")]
    NotInCellmap(BoxId),

    /// A box id that does not belong to the tree.
    #[error("box {0} does not exist")]
    UnknownBox(BoxId),

    /// A structural edit referenced a box that is not a child of the target.
    #[error("box {child} is not a child of box {parent}")]
    NotAChild {
        /// The box being mutated.
        parent: BoxId,
        /// The reference child.
        child: BoxId,
    },

    /// The box tree could not be built or violates an invariant.
    #[error("invalid box tree: {0}")]
    InvalidTree(String),

    /// Pagination produced more pages than the configured limit.
    #[error("document exceeds the page limit of {0}")]
    PageLimit(usize),
}

/// Failures an image resolver reports. Layout substitutes the broken-image
/// placeholder for all of them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The resource could not be fetched or read.
    #[error("unable to read image '{url}': {reason}")]
    Unreadable {
        /// Resolved URL.
        url: String,
        /// Resolver specific description.
        reason: String,
    },

    /// The data could not be decoded.
    #[error("corrupt image '{0}'")]
    Corrupt(String),
}
