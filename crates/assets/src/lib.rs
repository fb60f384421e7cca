//! Texture loading and lookup.
//!
//! Textures are referenced by name. Color textures are ready immediately;
//! image textures are requested from a [`TextureLoader`] and become ready
//! when the loader reports back through the registry's completion channel.
//!
//! # Invariants
//! - A name is registered at most once.
//! - `get` only ever returns ready textures; pending or failed names yield `None`.
//! - Identical decoded pixels share one [`ImageData`](ribbit_render::ImageData).

mod loader;
mod manifest;
mod registry;

pub use loader::{
    FileTextureLoader, MemoryTextureLoader, TextureLoaded, TextureLoader, TextureRequest,
    TextureSender, decode_image,
};
pub use manifest::{TextureManifest, TextureSpec};
pub use registry::{TextureRegistry, TextureState};

/// Errors from texture operations.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("texture {0:?} is already registered")]
    Duplicate(String),
    #[error("no image data for source {0:?}")]
    MissingSource(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn crate_info() -> &'static str {
    "ribbit-assets v0.1.0"
}
