//! Common utilities for the Folio layout engine.
//!
//! This crate provides shared infrastructure used by all layout components:
//! - **Warning System** - an ordered, de-duplicated list of non-fatal diagnostics
//! - **URL Resolution** - protocol/host/base-path joining for stylesheet-relative URLs
//! - **Image Metadata** - intrinsic sizes handed over by an image resolver, and the
//!   broken-image placeholder used when a resource cannot be read

pub mod image;
pub mod url;
pub mod warning;

pub use image::{ImageFormat, ImageInfo};
pub use url::BaseUrl;
pub use warning::{Warning, Warnings};
