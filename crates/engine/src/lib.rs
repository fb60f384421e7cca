//! Ribbit engine: owns the layers, scenes, textures and keyboard, and drives
//! them one frame at a time.
//!
//! # Invariants
//! - A frame is update then render; nothing renders a half-updated scene.
//! - At most one scene is active. Scenes initialize on first activation and
//!   keep their state when another scene becomes active.
//! - Layers composite back to front by ascending z-index, ties in insertion
//!   order.
//! - The main canvas is repainted from scratch every frame.

pub mod clock;
pub mod components;
pub mod config;
pub mod demo;
pub mod engine;

pub use clock::FrameClock;
pub use components::{
    Bounded, KeyboardMover, Label, Shape, ShapeRenderer, SpriteRenderer, SwitchOnKey, Velocity,
};
pub use config::{ConfigError, EngineConfig, LayerConfig};
pub use engine::{EngineError, EngineStats, Ribbit};

pub fn crate_info() -> &'static str {
    "ribbit-engine v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("engine"));
    }
}
