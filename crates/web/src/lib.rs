//! Browser backend: runs a [`Ribbit`](ribbit_engine::Ribbit) engine on an
//! HTML canvas.
//!
//! Everything touching the DOM is compiled only for `wasm32`; the URL and
//! key helpers are plain Rust and build everywhere.
//!
//! # Invariants
//! - Layers are detached canvases; only the main canvas is in the page.
//! - Each distinct image is uploaded to a scratch canvas once and reused.
//! - The animation loop stops re-arming once the engine is stopped and
//!   releases its callback; restarting takes a new [`run`] call.

mod keys;
mod schedule;
mod source;

pub use keys::captures_key;
pub use schedule::{NextFrame, next_frame};
pub use source::resolve_source;

#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod entry;
#[cfg(target_arch = "wasm32")]
mod keyboard;
#[cfg(target_arch = "wasm32")]
mod loader;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod runner;

#[cfg(target_arch = "wasm32")]
pub use canvas::{HtmlCanvas, clear_image_cache};
#[cfg(target_arch = "wasm32")]
pub use entry::start_demo;
#[cfg(target_arch = "wasm32")]
pub use keyboard::{KeyboardListeners, attach_keyboard};
#[cfg(target_arch = "wasm32")]
pub use loader::HtmlImageLoader;
#[cfg(target_arch = "wasm32")]
pub use logging::init_logging;
#[cfg(target_arch = "wasm32")]
pub use runner::run;

pub fn crate_info() -> &'static str {
    "ribbit-web v0.1.0"
}
