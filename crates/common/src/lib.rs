//! Shared value types for the ribbit engine.
//!
//! Everything here is plain data: no engine state, no rendering backend.

pub mod id;
pub mod types;
pub mod vec2d;

pub use id::{IdRegistry, ObjectId};
pub use types::{Color, ColorParseError, Rect};
pub use vec2d::Vec2d;

pub fn crate_info() -> &'static str {
    "ribbit-common v0.1.0"
}
