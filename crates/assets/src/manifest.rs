use crate::{TextureError, TextureLoader, TextureRegistry};
use ribbit_common::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One texture declaration in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextureSpec {
    Color { name: String, color: Color },
    Image { name: String, source: String },
}

impl TextureSpec {
    pub fn name(&self) -> &str {
        match self {
            Self::Color { name, .. } | Self::Image { name, .. } => name,
        }
    }
}

/// A list of textures to register up front, stored as JSON.
///
/// ```json
/// { "textures": [
///     { "kind": "color", "name": "sky", "color": "#87ceeb" },
///     { "kind": "image", "name": "frog", "source": "sprites/frog.png" }
/// ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureManifest {
    #[serde(default)]
    pub textures: Vec<TextureSpec>,
}

impl TextureManifest {
    pub fn from_json_str(s: &str) -> Result<Self, TextureError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TextureError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Register every texture: colors directly, images through `loader`.
    /// Stops at the first error. Returns the number registered.
    pub fn apply(
        &self,
        registry: &mut TextureRegistry,
        loader: &dyn TextureLoader,
    ) -> Result<usize, TextureError> {
        for spec in &self.textures {
            match spec {
                TextureSpec::Color { name, color } => registry.add_color(name.clone(), *color)?,
                TextureSpec::Image { name, source } => {
                    registry.request(name.clone(), source.clone(), loader)?
                }
            }
        }
        Ok(self.textures.len())
    }
}
