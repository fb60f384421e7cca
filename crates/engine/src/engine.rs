use crate::{ConfigError, EngineConfig, FrameClock};
use ribbit_assets::{TextureError, TextureLoader, TextureManifest, TextureRegistry};
use ribbit_common::{ObjectId, Vec2d};
use ribbit_ecs::{
    Collection, CollectionError, FrameTime, RenderFrame, Scene, SceneCommands, UpdateFrame,
};
use ribbit_input::{Key, Keyboard};
use ribbit_render::{CanvasError, CompositeCanvas, Layer, LayerError, LayerStack};
use ribbit_tools::DebugOverlay;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("canvas error: {0}")]
    Canvas(#[from] CanvasError),
    #[error("layer error: {0}")]
    Layer(#[from] LayerError),
    #[error("texture error: {0}")]
    Texture(#[from] TextureError),
    #[error("collection error: {0}")]
    Collection(#[from] CollectionError),
    #[error("a scene named {0:?} already exists")]
    DuplicateScene(String),
    #[error("no scene named {0:?}")]
    UnknownScene(String),
}

/// Counters from the most recent frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineStats {
    /// Completed update passes.
    pub frames: u64,
    /// Frames skipped while waiting for textures.
    pub skipped: u64,
    pub last_dt: f32,
    /// Averaged over the debug overlay's timing window.
    pub fps: f32,
    /// Objects in the active scene after the last update.
    pub objects: usize,
    /// Simulated seconds since start.
    pub elapsed: f64,
}

/// The engine: one main canvas, a stack of layers, and a set of scenes of
/// which at most one is active.
///
/// Generic over the canvas backend so the same engine drives an HTML canvas
/// in the browser and a [`RasterCanvas`](ribbit_render::RasterCanvas)
/// natively.
pub struct Ribbit<C: CompositeCanvas> {
    config: EngineConfig,
    canvas: C,
    layers: LayerStack<C>,
    scenes: Collection<Scene>,
    active: Option<ObjectId>,
    textures: TextureRegistry,
    keyboard: Keyboard,
    debug: DebugOverlay,
    clock: FrameClock,
    commands: SceneCommands,
    running: bool,
    time: FrameTime,
    stats: EngineStats,
}

impl<C: CompositeCanvas> Ribbit<C> {
    /// Build an engine around an existing main canvas. Layers are sized to
    /// the canvas; the config's size is only used by [`from_config`](Self::from_config).
    pub fn new(config: EngineConfig, canvas: C) -> Result<Self, EngineError> {
        config.validate()?;
        let (width, height) = (canvas.width(), canvas.height());
        if (width, height) != (config.width, config.height) {
            tracing::debug!(
                canvas = ?(width, height),
                config = ?(config.width, config.height),
                "canvas size differs from config; using canvas size"
            );
        }
        let mut layers = LayerStack::new(width, height);
        for layer in &config.layers {
            layers.add(layer.name.clone(), layer.z_index)?;
        }
        if !layers.contains(&config.debug.layer) {
            layers.add(config.debug.layer.clone(), config.debug.z_index)?;
        }
        tracing::info!(width, height, layers = layers.len(), "engine created");
        Ok(Self {
            clock: FrameClock::new(config.max_frame_delta),
            debug: DebugOverlay::new(config.debug.clone()),
            config,
            canvas,
            layers,
            scenes: Collection::new(),
            active: None,
            textures: TextureRegistry::new(),
            keyboard: Keyboard::new(),
            commands: SceneCommands::new(),
            running: false,
            time: FrameTime::default(),
            stats: EngineStats::default(),
        })
    }

    /// Create the main canvas from the config's size.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let canvas = C::create(config.width, config.height)?;
        Self::new(config, canvas)
    }

    /// Default config at the given size.
    pub fn with_defaults(width: u32, height: u32) -> Result<Self, EngineError> {
        Self::from_config(EngineConfig::with_size(width, height))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The composited output.
    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Resize the main canvas and every layer. Contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), EngineError> {
        self.canvas.resize(width, height)?;
        self.layers.resize(width, height)?;
        tracing::info!(width, height, "engine resized");
        Ok(())
    }

    // ---- layers ----

    pub fn add_layer(&mut self, name: impl Into<String>, z_index: i32) -> Result<(), EngineError> {
        self.layers.add(name, z_index)?;
        Ok(())
    }

    pub fn remove_layer(&mut self, name: &str) -> Option<Layer<C>> {
        self.layers.remove(name)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer<C>> {
        self.layers.get_mut(name)
    }

    pub fn layers(&self) -> &LayerStack<C> {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerStack<C> {
        &mut self.layers
    }

    // ---- scenes ----

    /// Register a scene. Names must be unique. The scene is not initialized
    /// until it first becomes active.
    pub fn add_scene(&mut self, scene: Scene) -> Result<ObjectId, EngineError> {
        if self.scene(scene.name()).is_some() {
            return Err(EngineError::DuplicateScene(scene.name().to_string()));
        }
        let name = scene.name().to_string();
        let id = self.scenes.add(scene)?;
        tracing::debug!(scene = %name, id = %id, "scene added");
        Ok(id)
    }

    /// Unregister and destroy a scene. Removing the active scene leaves the
    /// engine with none.
    pub fn remove_scene(&mut self, name: &str) -> Option<Scene> {
        let id = self.scene(name)?.id();
        let mut scene = self.scenes.remove(id)?;
        scene.destroy(&self.textures);
        if self.active == Some(id) {
            self.active = None;
        }
        tracing::info!(scene = %name, "scene removed");
        Some(scene)
    }

    /// Make `name` the active scene, initializing it on first activation.
    /// The previously active scene keeps its state.
    pub fn set_active_scene(&mut self, name: &str) -> Result<(), EngineError> {
        let id = self
            .scene(name)
            .map(Scene::id)
            .ok_or_else(|| EngineError::UnknownScene(name.to_string()))?;
        if self.active == Some(id) {
            return Ok(());
        }
        if let Some(scene) = self.scenes.get_mut(id) {
            scene.init(&self.textures);
        }
        self.active = Some(id);
        tracing::info!(scene = %name, "active scene changed");
        Ok(())
    }

    pub fn active_scene(&self) -> Option<&Scene> {
        self.active.and_then(|id| self.scenes.get(id))
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.active.and_then(|id| self.scenes.get_mut(id))
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.find(|s| s.name() == name)
    }

    pub fn scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.find_mut(|s| s.name() == name)
    }

    pub fn scene_names(&self) -> Vec<&str> {
        self.scenes.iter().map(Scene::name).collect()
    }

    // ---- textures and input ----

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureRegistry {
        &mut self.textures
    }

    /// Register the config's textures: colors directly, images through
    /// `loader`.
    pub fn load_textures(&mut self, loader: &dyn TextureLoader) -> Result<usize, EngineError> {
        let manifest = TextureManifest {
            textures: self.config.textures.clone(),
        };
        Ok(manifest.apply(&mut self.textures, loader)?)
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn key_down(&mut self, key: Key) {
        self.keyboard.press(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.keyboard.release(key);
    }

    pub fn debug(&self) -> &DebugOverlay {
        &self.debug
    }

    pub fn debug_mut(&mut self) -> &mut DebugOverlay {
        &mut self.debug
    }

    // ---- loop ----

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.clock.reset();
            tracing::info!("engine started");
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            tracing::info!(frames = self.stats.frames, "engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// One animation frame at host time `timestamp_ms`. Returns whether the
    /// frame was updated and rendered.
    pub fn frame(&mut self, timestamp_ms: f64) -> bool {
        if !self.running {
            return false;
        }
        let dt = self.clock.tick(timestamp_ms);
        self.textures.poll();
        if self.config.wait_for_textures && !self.textures.all_settled() {
            self.stats.skipped += 1;
            tracing::trace!(pending = self.textures.pending_count(), "waiting for textures");
            return false;
        }
        let _span = tracing::debug_span!("frame", n = self.stats.frames).entered();
        self.update(dt);
        self.render();
        true
    }

    /// Advance the active scene by `dt` seconds (clamped to
    /// `max_frame_delta`), apply scene switches, handle the debug toggle and
    /// close the keyboard frame.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };
        self.time = FrameTime {
            dt,
            elapsed: self.time.elapsed + f64::from(dt),
            frame: self.stats.frames,
        };

        let canvas_size = Vec2d::new(self.canvas.width() as f32, self.canvas.height() as f32);
        if let Some(scene) = self.active.and_then(|id| self.scenes.get_mut(id)) {
            let frame = UpdateFrame {
                keyboard: &self.keyboard,
                textures: &self.textures,
                time: self.time,
                canvas_size,
            };
            scene.update(&frame, &mut self.commands);
        }
        let leftover = self.commands.take_spawns().len() + self.commands.take_destroys().len();
        if leftover > 0 {
            tracing::warn!(leftover, "scene commands dropped: no active scene");
        }
        if let Some(name) = self.commands.take_switch() {
            if let Err(e) = self.set_active_scene(&name) {
                tracing::warn!(scene = %name, error = %e, "scene switch failed");
            }
        }

        self.debug.handle_input(&self.keyboard);
        self.debug.record_frame(dt);
        self.keyboard.end_frame();

        self.stats.frames += 1;
        self.stats.last_dt = dt;
        self.stats.fps = self.debug.timer().fps();
        self.stats.elapsed = self.time.elapsed;
        self.stats.objects = self.active_scene().map_or(0, Scene::len);
    }

    /// Redraw everything: clear layers, render the active scene and the
    /// debug overlay into them, then paint the background and composite
    /// the layers onto the main canvas.
    pub fn render(&mut self) {
        self.layers.clear_all();
        if let Some(scene) = self.active.and_then(|id| self.scenes.get_mut(id)) {
            let mut frame = RenderFrame {
                layers: &mut self.layers,
                textures: &self.textures,
                time: self.time,
            };
            scene.render(&mut frame);
        }
        if self.debug.is_enabled() {
            let scene = self.active.and_then(|id| self.scenes.get(id));
            match self.layers.get_mut(self.debug.layer()) {
                Some(layer) => self.debug.draw(&mut layer.canvas, self.time.frame, scene),
                None => tracing::warn!(layer = %self.debug.layer(), "debug layer missing"),
            }
        }
        self.canvas.clear();
        self.canvas.fill(self.config.background);
        self.layers.composite_onto(&mut self.canvas);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ShapeRenderer, Velocity};
    use ribbit_assets::MemoryTextureLoader;
    use ribbit_common::Color;
    use ribbit_ecs::{Component, GameObject, RibbitObject, UpdateContext};
    use ribbit_render::RasterCanvas;

    fn engine(width: u32, height: u32) -> Ribbit<RasterCanvas> {
        let mut e = Ribbit::with_defaults(width, height).unwrap();
        e.start();
        e
    }

    #[test]
    fn creates_config_layers_and_debug_layer() {
        let e = engine(16, 16);
        let names: Vec<&str> = e.layers().names().collect();
        assert_eq!(names, vec!["background", "main", "ui", "debug"]);
        assert_eq!((e.width(), e.height()), (16, 16));
    }

    #[test]
    fn stopped_engine_ignores_frames() {
        let mut e = Ribbit::<RasterCanvas>::with_defaults(4, 4).unwrap();
        assert!(!e.frame(0.0));
        e.start();
        assert!(e.frame(0.0));
        e.stop();
        assert!(!e.frame(16.0));
        assert_eq!(e.stats().frames, 1);
    }

    #[test]
    fn first_frame_has_zero_dt_and_later_frames_are_clamped() {
        let mut e = engine(4, 4);
        e.frame(1000.0);
        assert_eq!(e.stats().last_dt, 0.0);
        e.frame(1016.0);
        assert!((e.stats().last_dt - 0.016).abs() < 1e-6);
        e.frame(9000.0);
        assert_eq!(e.stats().last_dt, 0.1);
    }

    #[test]
    fn background_and_layers_composite_in_z_order() {
        let mut e = engine(4, 4);
        e.add_scene(
            Scene::new("s")
                .with_object(
                    GameObject::new("back")
                        .with_size(4.0, 4.0)
                        .on_layer("background")
                        .with_component(ShapeRenderer::rect(Color::RED)),
                )
                .with_object(
                    GameObject::new("front")
                        .with_size(2.0, 2.0)
                        .with_component(ShapeRenderer::rect(Color::BLUE)),
                ),
        )
        .unwrap();
        e.set_active_scene("s").unwrap();
        e.frame(0.0);
        assert_eq!(e.canvas().pixel(0, 0), Some(Color::BLUE));
        assert_eq!(e.canvas().pixel(3, 3), Some(Color::RED));

        e.layers_mut().set_z_index("background", 50).unwrap();
        e.frame(16.0);
        assert_eq!(e.canvas().pixel(0, 0), Some(Color::RED));
    }

    #[test]
    fn empty_engine_shows_background() {
        let mut config = EngineConfig::with_size(2, 2);
        config.background = Color::GREEN;
        let mut e = Ribbit::<RasterCanvas>::from_config(config).unwrap();
        e.start();
        e.frame(0.0);
        assert_eq!(e.canvas().pixel(1, 1), Some(Color::GREEN));
    }

    #[test]
    fn hidden_layers_are_not_composited() {
        let mut e = engine(2, 2);
        e.add_scene(Scene::new("s").with_object(
            GameObject::new("o")
                .with_size(2.0, 2.0)
                .with_component(ShapeRenderer::rect(Color::WHITE)),
        ))
        .unwrap();
        e.set_active_scene("s").unwrap();
        e.layers_mut().set_visible("main", false).unwrap();
        e.frame(0.0);
        assert_eq!(e.canvas().pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn duplicate_and_unknown_scenes() {
        let mut e = engine(2, 2);
        e.add_scene(Scene::new("a")).unwrap();
        assert!(matches!(
            e.add_scene(Scene::new("a")),
            Err(EngineError::DuplicateScene(_))
        ));
        assert!(matches!(
            e.set_active_scene("nope"),
            Err(EngineError::UnknownScene(_))
        ));
    }

    #[test]
    fn activation_is_lazy_and_switching_keeps_state() {
        let mut e = engine(8, 8);
        e.add_scene(Scene::new("a").with_object(
            GameObject::new("mover").with_component(Velocity::new(Vec2d::new(10.0, 0.0))),
        ))
        .unwrap();
        e.add_scene(Scene::new("b")).unwrap();
        assert!(!e.scene("a").unwrap().is_initialized());

        e.set_active_scene("a").unwrap();
        assert!(e.scene("a").unwrap().is_initialized());
        e.update(0.1);
        e.set_active_scene("b").unwrap();
        e.update(0.1);
        e.set_active_scene("a").unwrap();
        let x = e.scene("a").unwrap().find("mover").unwrap().state().position.x;
        assert!((x - 1.0).abs() < 1e-6);
        assert_eq!(e.active_scene().map(Scene::name), Some("a"));
    }

    #[test]
    fn remove_scene_destroys_and_deactivates() {
        let mut e = engine(2, 2);
        e.add_scene(Scene::new("a").with_object(GameObject::new("o"))).unwrap();
        e.set_active_scene("a").unwrap();
        let scene = e.remove_scene("a").unwrap();
        assert!(!scene.is_initialized());
        assert!(e.active_scene().is_none());
        assert!(e.remove_scene("a").is_none());
    }

    #[test]
    fn components_can_switch_scenes() {
        struct GoToMenu(RibbitObject);
        impl Component for GoToMenu {
            fn object(&self) -> &RibbitObject {
                &self.0
            }
            fn update(&mut self, ctx: &mut UpdateContext<'_>) {
                if ctx.keyboard.was_pressed(&Key::Escape) {
                    ctx.commands.switch_scene("menu");
                }
            }
        }
        let mut e = engine(2, 2);
        e.add_scene(
            Scene::new("game")
                .with_object(GameObject::new("o").with_component(GoToMenu(RibbitObject::new("Component")))),
        )
        .unwrap();
        e.add_scene(Scene::new("menu")).unwrap();
        e.set_active_scene("game").unwrap();
        e.frame(0.0);
        assert_eq!(e.active_scene().map(Scene::name), Some("game"));
        e.key_down(Key::Escape);
        e.frame(16.0);
        assert_eq!(e.active_scene().map(Scene::name), Some("menu"));
        assert!(e.scene("menu").unwrap().is_initialized());
    }

    #[test]
    fn keyboard_edges_last_one_frame() {
        let mut e = engine(2, 2);
        e.key_down(Key::Space);
        assert!(e.keyboard().was_pressed(&Key::Space));
        e.frame(0.0);
        assert!(!e.keyboard().was_pressed(&Key::Space));
        assert!(e.keyboard().is_down(&Key::Space));
        e.key_up(Key::Space);
        assert!(!e.keyboard().is_down(&Key::Space));
    }

    #[test]
    fn debug_overlay_toggles_and_draws() {
        let mut e = engine(64, 64);
        e.add_scene(Scene::new("s")).unwrap();
        e.set_active_scene("s").unwrap();
        e.frame(0.0);
        assert_eq!(e.canvas().pixel(4, 4), Some(Color::BLACK));
        e.key_down(Key::F3);
        e.frame(16.0);
        assert!(e.debug().is_enabled());
        // top-left of the "F" in the fps line
        assert_eq!(e.canvas().pixel(4, 4), Some(Color::WHITE));
        e.key_up(Key::F3);
        e.key_down(Key::F3);
        e.frame(32.0);
        assert!(!e.debug().is_enabled());
        assert_eq!(e.canvas().pixel(4, 4), Some(Color::BLACK));
    }

    #[test]
    fn waits_for_textures_when_configured() {
        let mut config = EngineConfig::with_size(2, 2);
        config.textures = vec![ribbit_assets::TextureSpec::Image {
            name: "frog".into(),
            source: "frog.png".into(),
        }];
        let mut e = Ribbit::<RasterCanvas>::from_config(config).unwrap();
        e.start();
        // a loader that never completes
        struct Never;
        impl TextureLoader for Never {
            fn load(&self, _: ribbit_assets::TextureRequest, _: ribbit_assets::TextureSender) {}
        }
        assert_eq!(e.load_textures(&Never).unwrap(), 1);
        assert!(!e.frame(0.0));
        assert_eq!(e.stats().skipped, 1);
        assert_eq!(e.stats().frames, 0);
    }

    #[test]
    fn failed_textures_do_not_block() {
        let mut config = EngineConfig::with_size(2, 2);
        config.textures = vec![ribbit_assets::TextureSpec::Image {
            name: "frog".into(),
            source: "missing.png".into(),
        }];
        let mut e = Ribbit::<RasterCanvas>::from_config(config).unwrap();
        e.start();
        e.load_textures(&MemoryTextureLoader::new()).unwrap();
        assert!(e.frame(0.0));
        assert_eq!(e.textures().failures().len(), 1);
    }

    #[test]
    fn resize_resizes_layers() {
        let mut e = engine(4, 4);
        e.resize(8, 6).unwrap();
        assert_eq!((e.width(), e.height()), (8, 6));
        assert_eq!(e.layers().width(), 8);
        assert!(e.resize(0, 6).is_err());
    }

    #[test]
    fn stats_track_objects_and_time() {
        let mut e = engine(2, 2);
        e.add_scene(
            Scene::new("s")
                .with_object(GameObject::new("a"))
                .with_object(GameObject::new("b")),
        )
        .unwrap();
        e.set_active_scene("s").unwrap();
        e.frame(0.0);
        e.frame(50.0);
        let stats = e.stats();
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.objects, 2);
        assert!((stats.elapsed - 0.05).abs() < 1e-6);
    }
}
