//! Developer tooling: debug overlay, frame timing, scene inspection.
//!
//! # Invariants
//! - Tools only read engine state; the overlay draws on its own layer.

pub mod inspector;
pub mod overlay;
pub mod timer;

pub use inspector::{ObjectInfo, SceneInspector, SceneSummary};
pub use overlay::{DebugOverlay, DebugSettings};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "ribbit-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
