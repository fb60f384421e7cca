//! Entity hierarchy: Component -> GameObject -> Scene.
//!
//! Every entity is a [`RibbitObject`] with a namespaced id and a logging span.
//! Children live in [`Collection`]s, which keep insertion order and index
//! items both by id and by concrete type.
//!
//! # Invariants
//! - Lifecycle order per frame: `before_update`, `update`, `after_update` on
//!   every component of an object, then the next object; rendering likewise.
//! - Each phase runs across all of an object's components before the next
//!   phase starts.
//! - `init` runs exactly once before a component first updates or renders;
//!   `destroy` runs at most once, and only after `init`.
//! - Structural changes requested during update (spawn, destroy) are applied
//!   after the update pass, never mid-iteration.

mod collection;
mod commands;
mod component;
mod context;
mod game_object;
mod object;
mod scene;

pub use collection::{Collection, CollectionError, Identified};
pub use commands::SceneCommands;
pub use component::{AsAny, Component};
pub use context::{FrameTime, LifecycleContext, RenderContext, RenderFrame, UpdateContext, UpdateFrame};
pub use game_object::{DEFAULT_LAYER, GameObject, GameObjectState};
pub use object::RibbitObject;
pub use scene::{Scene, SceneHooks};

pub fn crate_info() -> &'static str {
    "ribbit-ecs v0.1.0"
}
