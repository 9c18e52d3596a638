//! Rendering surfaces
//!
//! - `ascii`: terminal line chart
//! - `json`: one JSON frame per redraw, for an external plotter

pub mod ascii;
pub mod json;

use crate::error::RenderError;
use crate::stream::VisibleWindow;

pub use ascii::AsciiChartRenderer;
pub use json::JsonLinesRenderer;

/// Draws the stream's visible window. Owns all axis and styling concerns.
pub trait Renderer {
    fn draw(&mut self, window: &VisibleWindow) -> Result<(), RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn draw(&mut self, window: &VisibleWindow) -> Result<(), RenderError> {
        (**self).draw(window)
    }
}
