use crate::TextureError;
use ribbit_render::ImageData;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

/// A request for one named image texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRequest {
    pub name: String,
    /// Loader-specific location, such as a path or a URL.
    pub source: String,
}

/// Completion message a loader sends back for one request.
#[derive(Debug)]
pub struct TextureLoaded {
    pub name: String,
    /// Request generation the sender was issued for, if any.
    pub generation: Option<u64>,
    pub result: Result<ImageData, TextureError>,
}

/// Channel end handed to loaders. Cloneable and `Send`, so loaders may
/// complete on another thread or from a browser callback.
#[derive(Debug, Clone)]
pub struct TextureSender {
    tx: Sender<TextureLoaded>,
    generation: Option<u64>,
}

impl TextureSender {
    pub(crate) fn new(tx: Sender<TextureLoaded>) -> Self {
        Self {
            tx,
            generation: None,
        }
    }

    /// Sender bound to one request, so the registry can drop completions
    /// that outlive the request.
    pub(crate) fn for_generation(tx: Sender<TextureLoaded>, generation: u64) -> Self {
        Self {
            tx,
            generation: Some(generation),
        }
    }

    /// Report the outcome of a request. A dropped registry is not an error
    /// for the loader; the result is discarded.
    pub fn complete(&self, name: impl Into<String>, result: Result<ImageData, TextureError>) {
        let loaded = TextureLoaded {
            name: name.into(),
            generation: self.generation,
            result,
        };
        if self.tx.send(loaded).is_err() {
            tracing::debug!("texture registry dropped before load completed");
        }
    }
}

/// Something that can turn a [`TextureRequest`] into pixels, eventually.
///
/// `load` must not block on the result; it starts the work and reports back
/// through `done`.
pub trait TextureLoader {
    fn load(&self, request: TextureRequest, done: TextureSender);
}

/// Decode PNG/JPEG/BMP bytes into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> Result<ImageData, TextureError> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| TextureError::Decode(e.to_string()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    ImageData::new(width, height, rgba.into_raw()).map_err(|e| TextureError::Decode(e.to_string()))
}

/// Loads image files relative to a root directory on a background thread.
#[derive(Debug, Clone)]
pub struct FileTextureLoader {
    root: PathBuf,
}

impl FileTextureLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TextureLoader for FileTextureLoader {
    fn load(&self, request: TextureRequest, done: TextureSender) {
        let path = self.root.join(&request.source);
        tracing::debug!(texture = %request.name, path = %path.display(), "loading texture file");
        std::thread::spawn(move || {
            let result = std::fs::read(&path)
                .map_err(TextureError::from)
                .and_then(|bytes| decode_image(&bytes));
            done.complete(request.name, result);
        });
    }
}

/// Decodes images from in-memory blobs, synchronously. The request source is
/// the blob key.
#[derive(Debug, Default, Clone)]
pub struct MemoryTextureLoader {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryTextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.blobs.insert(key.into(), bytes);
    }

    pub fn with_blob(mut self, key: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(key, bytes);
        self
    }
}

impl TextureLoader for MemoryTextureLoader {
    fn load(&self, request: TextureRequest, done: TextureSender) {
        let result = match self.blobs.get(&request.source) {
            Some(bytes) => decode_image(bytes),
            None => Err(TextureError::MissingSource(request.source.clone())),
        };
        done.complete(request.name, result);
    }
}
