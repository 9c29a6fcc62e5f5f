//! Image metadata shared across layout components.
//!
//! [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)
//!
//! Decoding is done by an external resolver; layout only needs the intrinsic
//! pixel size, a readable local path and whether the output backend can place
//! the format at all.

use serde::Serialize;

/// Image formats an image resolver can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageFormat {
    /// Portable Network Graphics.
    Png,
    /// JPEG.
    Jpeg,
    /// GIF (placed as its first frame).
    Gif,
    /// Windows bitmap.
    Bmp,
    /// Anything the output backend cannot place. Layout still reserves space.
    Unsupported,
}

/// Intrinsic information about a resolved image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    /// Intrinsic width in pixels.
    width: u32,
    /// Intrinsic height in pixels.
    height: u32,
    /// Local readable path of the decoded resource.
    path: String,
    /// Detected format.
    format: ImageFormat,
    /// True for the built-in broken-image placeholder.
    broken: bool,
}

/// Path under which the built-in placeholder is registered.
pub const BROKEN_IMAGE_PATH: &str = "folio:broken-image";

impl ImageInfo {
    /// Describe a decoded image.
    #[must_use]
    pub fn new(width: u32, height: u32, path: impl Into<String>, format: ImageFormat) -> Self {
        Self {
            width,
            height,
            path: path.into(),
            format,
            broken: false,
        }
    }

    /// The placeholder substituted for unreadable or corrupt images.
    #[must_use]
    pub fn broken() -> Self {
        Self {
            width: 16,
            height: 16,
            path: BROKEN_IMAGE_PATH.to_string(),
            format: ImageFormat::Png,
            broken: true,
        }
    }

    /// Intrinsic width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Intrinsic height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Intrinsic dimensions as `(width, height)` in `f32`, for layout.
    #[must_use]
    pub fn dimensions_f32(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    /// Local path of the decoded resource.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Detected format.
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    /// Whether this is the broken-image placeholder.
    #[must_use]
    pub const fn is_broken(&self) -> bool {
        self.broken
    }

    /// Whether an output backend can draw the image.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.format != ImageFormat::Unsupported
    }
}
