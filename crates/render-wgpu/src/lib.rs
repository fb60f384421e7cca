//! wgpu presenter for natively rendered canvases.
//!
//! The engine composites on the CPU; this crate uploads the finished RGBA
//! frame to a texture and draws it as a letterboxed quad.
//!
//! # Invariants
//! - The presenter never changes the canvas; it only displays it.
//! - Aspect ratio is preserved; unused window area is cleared to black.
//! - Sampling is nearest-neighbour so canvas pixels stay sharp.

mod gpu;
mod shaders;

pub use gpu::{CanvasPresenter, letterbox};
