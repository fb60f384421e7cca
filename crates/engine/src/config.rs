use ribbit_assets::TextureSpec;
use ribbit_common::Color;
use ribbit_ecs::DEFAULT_LAYER;
use ribbit_tools::{DebugSettings, FrameTimer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0} (expected .yaml, .yml or .json)")]
    UnknownFormat(PathBuf),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One layer created at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub name: String,
    #[serde(default)]
    pub z_index: i32,
}

impl LayerConfig {
    pub fn new(name: impl Into<String>, z_index: i32) -> Self {
        Self {
            name: name.into(),
            z_index,
        }
    }
}

/// Engine configuration. Every field has a default, so a config file only
/// needs the values it changes.
///
/// ```yaml
/// width: 640
/// height: 360
/// background: "#203040"
/// layers:
///   - { name: background, z_index: 0 }
///   - { name: main, z_index: 10 }
/// debug:
///   enabled: true
///   toggle_key: F3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: u32,
    pub height: u32,
    /// Painted on the main canvas before the layers are composited.
    pub background: Color,
    pub layers: Vec<LayerConfig>,
    /// Upper bound for a frame delta, in seconds.
    pub max_frame_delta: f32,
    /// Skip update and render while any texture is still loading.
    pub wait_for_textures: bool,
    /// Textures registered by `Ribbit::load_textures`.
    pub textures: Vec<TextureSpec>,
    pub debug: DebugSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Color::BLACK,
            layers: vec![
                LayerConfig::new("background", 0),
                LayerConfig::new(DEFAULT_LAYER, 10),
                LayerConfig::new("ui", 100),
            ],
            max_frame_delta: 0.1,
            wait_for_textures: true,
            textures: Vec::new(),
            debug: DebugSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults at the given canvas size.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Load from a `.yaml`/`.yml` or `.json` file and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let text = std::fs::read_to_string(path)?;
        let config = match ext.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&text)?,
            Some("json") => Self::from_json_str(&text)?,
            _ => return Err(ConfigError::UnknownFormat(path.to_path_buf())),
        };
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_frame_delta must be positive, got {}",
                self.max_frame_delta
            )));
        }
        let mut seen = HashSet::new();
        for layer in &self.layers {
            if layer.name.is_empty() {
                return Err(ConfigError::Invalid("layer name must not be empty".into()));
            }
            if !seen.insert(layer.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate layer name {:?}",
                    layer.name
                )));
            }
        }
        let text_size = self.debug.text_size;
        if !(text_size.is_finite() && text_size > 0.0 && text_size <= DebugSettings::MAX_TEXT_SIZE) {
            return Err(ConfigError::Invalid(format!(
                "debug.text_size must be in (0, {}], got {text_size}",
                DebugSettings::MAX_TEXT_SIZE
            )));
        }
        if !(1..=FrameTimer::MAX_CAPACITY).contains(&self.debug.timer_window) {
            return Err(ConfigError::Invalid(format!(
                "debug.timer_window must be in 1..={}, got {}",
                FrameTimer::MAX_CAPACITY,
                self.debug.timer_window
            )));
        }
        if self.debug.layer.is_empty() {
            return Err(ConfigError::Invalid("debug layer name must not be empty".into()));
        }
        let mut names = HashSet::new();
        for texture in &self.textures {
            if !names.insert(texture.name()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate texture name {:?}",
                    texture.name()
                )));
            }
        }
        Ok(())
    }
}
