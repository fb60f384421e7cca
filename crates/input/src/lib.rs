//! Keyboard input.
//!
//! # Invariants
//! - Hosts translate their native events into [`Key`]s; components only see
//!   [`Keyboard`], never DOM or window events.
//! - Press/release edges are visible for exactly one frame.

pub mod key;
pub mod keyboard;

pub use key::Key;
pub use keyboard::Keyboard;

pub fn crate_info() -> &'static str {
    "ribbit-input v0.1.0"
}
