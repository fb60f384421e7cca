//! Rendering: backend-agnostic canvas interface and layered compositing.
//!
//! # Invariants
//! - Components only ever see `&mut dyn Canvas2d`; the concrete backend is
//!   chosen by the host (CPU raster natively, HTML canvas in the browser).
//! - Layers composite back-to-front by ascending z-index; equal z-indices keep
//!   insertion order.
//! - Layer canvases always match the stack size.

mod canvas;
mod font;
mod layer;
mod raster;
mod texture;

pub use canvas::{Canvas2d, CanvasError, CompositeCanvas};
pub use font::{GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH, glyph_rows, text_width};
pub use layer::{Layer, LayerError, LayerStack, LayerTarget};
pub use raster::RasterCanvas;
pub use texture::{ImageData, ImageDataError, Texture};

pub fn crate_info() -> &'static str {
    "ribbit-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
