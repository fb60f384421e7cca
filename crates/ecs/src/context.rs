use crate::{GameObjectState, SceneCommands};
use ribbit_assets::TextureRegistry;
use ribbit_common::Vec2d;
use ribbit_input::Keyboard;
use ribbit_render::{Canvas2d, LayerTarget};

/// Timing for the frame being processed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame, already clamped by the engine.
    pub dt: f32,
    /// Seconds of simulated time since the engine started.
    pub elapsed: f64,
    /// Frame counter, starting at 0.
    pub frame: u64,
}

/// Read-only engine state shared by every update call in a frame.
#[derive(Debug, Clone, Copy)]
pub struct UpdateFrame<'a> {
    pub keyboard: &'a Keyboard,
    pub textures: &'a TextureRegistry,
    pub time: FrameTime,
    pub canvas_size: Vec2d,
}

/// Engine state shared by every render call in a frame.
pub struct RenderFrame<'a> {
    pub layers: &'a mut dyn LayerTarget,
    pub textures: &'a TextureRegistry,
    pub time: FrameTime,
}

impl RenderFrame<'_> {
    pub fn layer(&mut self, name: &str) -> Option<&mut dyn Canvas2d> {
        self.layers.layer_canvas(name)
    }
}

/// What a component sees during `before_update`, `update` and `after_update`.
pub struct UpdateContext<'a> {
    pub owner: &'a mut GameObjectState,
    pub keyboard: &'a Keyboard,
    pub textures: &'a TextureRegistry,
    pub commands: &'a mut SceneCommands,
    pub time: FrameTime,
    pub canvas_size: Vec2d,
}

impl UpdateContext<'_> {
    pub fn dt(&self) -> f32 {
        self.time.dt
    }
}

/// What a component sees during the render phases.
pub struct RenderContext<'a> {
    pub owner: &'a GameObjectState,
    pub layers: &'a mut dyn LayerTarget,
    pub textures: &'a TextureRegistry,
    pub time: FrameTime,
}

impl RenderContext<'_> {
    /// Canvas of the named layer, if it exists.
    pub fn layer(&mut self, name: &str) -> Option<&mut dyn Canvas2d> {
        self.layers.layer_canvas(name)
    }

    /// Canvas of the layer the owning object draws on.
    pub fn owner_layer(&mut self) -> Option<&mut dyn Canvas2d> {
        self.layers.layer_canvas(&self.owner.layer)
    }
}

/// What a component sees in `init` and `destroy`.
pub struct LifecycleContext<'a> {
    pub owner: &'a mut GameObjectState,
    pub textures: &'a TextureRegistry,
}
