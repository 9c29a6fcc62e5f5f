//! Painting
//!
//! [CSS 2.1 Appendix E - Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! This module draws a finished layout onto an output [`Canvas`]. Layout
//! only computes geometry; everything the backend sees goes through here.
//!
//! # Architecture
//!
//! ```text
//! Style → Layout → Paint → Canvas
//!                    ↓
//!          DisplayListCanvas (recording)
//! ```

pub mod background;
pub mod border;
mod canvas;
mod display_list;
mod events;
mod overlay;
mod renderer;

pub use canvas::{Canvas, Stroke, TextRun};
pub use display_list::{DisplayCommand, DisplayListCanvas, PageCommands};
pub use events::{EventLog, NoEvents, RenderEvents};
pub use overlay::{OverlayText, PAGE_COUNT, PAGE_NUM, PageTextOverlay, substitute};
pub use renderer::Renderer;
