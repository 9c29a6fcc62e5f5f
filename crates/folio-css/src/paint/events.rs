//! Hooks around the render walk.

use super::canvas::Canvas;
use crate::layout::box_tree::{BoxId, BoxTree};
use crate::layout::document::PageLayout;

/// Notifications fired while a layout is rendered.
///
/// Every method defaults to doing nothing. Callers can draw extra content
/// through the canvas, e.g. page headers in `begin_page`.
pub trait RenderEvents {
    /// A page was started; nothing of it is drawn yet.
    fn begin_page(&mut self, _page: &PageLayout, _canvas: &mut dyn Canvas) {}

    /// Everything of a page was drawn.
    fn end_page(&mut self, _page: &PageLayout, _canvas: &mut dyn Canvas) {}

    /// A box is about to be drawn.
    fn begin_frame(&mut self, _tree: &BoxTree, _id: BoxId, _canvas: &mut dyn Canvas) {}

    /// A box and its descendants were drawn.
    fn end_frame(&mut self, _tree: &BoxTree, _id: BoxId, _canvas: &mut dyn Canvas) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl RenderEvents for NoEvents {}

/// Counts events; useful for checking walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    /// `"begin_page 1"`, `"begin_frame #3"`... in firing order.
    pub entries: Vec<String>,
}

impl RenderEvents for EventLog {
    fn begin_page(&mut self, page: &PageLayout, _canvas: &mut dyn Canvas) {
        self.entries.push(format!("begin_page {}", page.number));
    }

    fn end_page(&mut self, page: &PageLayout, _canvas: &mut dyn Canvas) {
        self.entries.push(format!("end_page {}", page.number));
    }

    fn begin_frame(&mut self, _tree: &BoxTree, id: BoxId, _canvas: &mut dyn Canvas) {
        self.entries.push(format!("begin_frame {id}"));
    }

    fn end_frame(&mut self, _tree: &BoxTree, id: BoxId, _canvas: &mut dyn Canvas) {
        self.entries.push(format!("end_frame {id}"));
    }
}
