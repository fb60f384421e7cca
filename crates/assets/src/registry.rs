use crate::TextureError;
use crate::loader::{TextureLoaded, TextureLoader, TextureRequest, TextureSender};
use ribbit_common::Color;
use ribbit_render::{ImageData, Texture};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::{self, Receiver, Sender};

/// Load state of a registered texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureState {
    Pending,
    Ready,
    Failed(String),
}

#[derive(Debug)]
struct Entry {
    state: TextureState,
    texture: Option<Texture>,
    source: Option<String>,
    generation: u64,
    /// Content hash of the image, when the texture holds one.
    digest: Option<Vec<u8>>,
}

/// Named textures plus the channel loaders report completions on.
#[derive(Debug)]
pub struct TextureRegistry {
    entries: BTreeMap<String, Entry>,
    /// Decoded images by content hash, so identical pixels are shared.
    by_content: HashMap<Vec<u8>, ImageData>,
    next_generation: u64,
    tx: Sender<TextureLoaded>,
    rx: Receiver<TextureLoaded>,
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureRegistry {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            entries: BTreeMap::new(),
            by_content: HashMap::new(),
            next_generation: 0,
            tx,
            rx,
        }
    }

    /// Register a flat color texture. Ready immediately.
    pub fn add_color(&mut self, name: impl Into<String>, color: Color) -> Result<(), TextureError> {
        self.insert_ready(name.into(), Texture::Color(color), None)
    }

    /// Register already-decoded pixels. Ready immediately.
    pub fn add_image(&mut self, name: impl Into<String>, image: ImageData) -> Result<(), TextureError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let (image, digest) = self.dedup(image);
        self.insert_ready(name, Texture::Image(image), Some(digest))
    }

    /// Register `name` as pending and hand the request to `loader`.
    pub fn request(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        loader: &dyn TextureLoader,
    ) -> Result<(), TextureError> {
        let name = name.into();
        let source = source.into();
        if self.entries.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        tracing::debug!(texture = %name, %source, generation, "texture requested");
        self.entries.insert(
            name.clone(),
            Entry {
                state: TextureState::Pending,
                texture: None,
                source: Some(source.clone()),
                generation,
                digest: None,
            },
        );
        let done = TextureSender::for_generation(self.tx.clone(), generation);
        loader.load(TextureRequest { name, source }, done);
        Ok(())
    }

    /// A completion channel for loaders. Completions sent through it are
    /// applied to whichever request for the name is pending.
    pub fn sender(&self) -> TextureSender {
        TextureSender::new(self.tx.clone())
    }

    /// Apply every completion that has arrived. Returns how many textures
    /// settled. Completions for unknown or already-settled names, or for an
    /// earlier request of a re-registered name, are ignored.
    pub fn poll(&mut self) -> usize {
        let mut settled = 0;
        while let Ok(TextureLoaded {
            name,
            generation,
            result,
        }) = self.rx.try_recv()
        {
            let current = match self.entries.get(&name) {
                Some(e) if e.state == TextureState::Pending => {
                    generation.is_none_or(|g| g == e.generation)
                }
                _ => false,
            };
            if !current {
                tracing::debug!(texture = %name, ?generation, "ignoring stale texture completion");
                continue;
            }
            let result = result.map(|image| self.dedup(image));
            let Some(entry) = self.entries.get_mut(&name) else {
                continue;
            };
            match result {
                Ok((image, digest)) => {
                    tracing::info!(
                        texture = %name,
                        width = image.width(),
                        height = image.height(),
                        "texture ready"
                    );
                    entry.state = TextureState::Ready;
                    entry.texture = Some(Texture::Image(image));
                    entry.digest = Some(digest);
                }
                Err(e) => {
                    tracing::warn!(texture = %name, error = %e, "texture failed to load");
                    entry.state = TextureState::Failed(e.to_string());
                }
            }
            settled += 1;
        }
        settled
    }

    pub fn state(&self, name: &str) -> Option<&TextureState> {
        self.entries.get(name).map(|e| &e.state)
    }

    /// The texture, if it is registered and ready.
    pub fn get(&self, name: &str) -> Option<&Texture> {
        self.entries.get(name).and_then(|e| e.texture.as_ref())
    }

    pub fn source(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(|e| e.source.as_deref())
    }

    pub fn is_ready(&self, name: &str) -> bool {
        matches!(self.state(name), Some(TextureState::Ready))
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.state == TextureState::Pending)
            .count()
    }

    /// True when nothing is pending (failures count as settled).
    pub fn all_settled(&self) -> bool {
        self.pending_count() == 0
    }

    /// Failed textures with their error messages.
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(name, e)| match &e.state {
                TextureState::Failed(msg) => Some((name.as_str(), msg.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Unregister a texture. A late completion for it is ignored, and its
    /// pixels are released once no other texture shares them.
    pub fn remove(&mut self, name: &str) -> Option<Texture> {
        let entry = self.entries.remove(name)?;
        if let Some(digest) = &entry.digest {
            let shared = self
                .entries
                .values()
                .any(|e| e.digest.as_ref() == Some(digest));
            if !shared {
                self.by_content.remove(digest);
            }
        }
        entry.texture
    }

    /// Number of distinct decoded images held.
    pub fn image_count(&self) -> usize {
        self.by_content.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_ready(
        &mut self,
        name: String,
        texture: Texture,
        digest: Option<Vec<u8>>,
    ) -> Result<(), TextureError> {
        if self.entries.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        tracing::debug!(texture = %name, "texture registered");
        let generation = self.next_generation;
        self.next_generation += 1;
        self.entries.insert(
            name,
            Entry {
                state: TextureState::Ready,
                texture: Some(texture),
                source: None,
                generation,
                digest,
            },
        );
        Ok(())
    }

    fn dedup(&mut self, image: ImageData) -> (ImageData, Vec<u8>) {
        let mut hasher = Sha256::new();
        hasher.update(image.width().to_le_bytes());
        hasher.update(image.height().to_le_bytes());
        hasher.update(image.pixels());
        let digest = hasher.finalize().to_vec();
        let shared = self.by_content.entry(digest.clone()).or_insert(image).clone();
        (shared, digest)
    }
}
