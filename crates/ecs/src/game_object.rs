use crate::{
    Collection, CollectionError, Component, Identified, LifecycleContext, RenderContext,
    RenderFrame, RibbitObject, SceneCommands, UpdateContext, UpdateFrame,
};
use ribbit_assets::TextureRegistry;
use ribbit_common::{ObjectId, Rect, Vec2d};
use std::any::Any;
use std::collections::BTreeSet;

/// Layer objects draw on unless told otherwise.
pub const DEFAULT_LAYER: &str = "main";

/// The data components read and write: where the object is and how it is
/// drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct GameObjectState {
    pub name: String,
    /// Top-left corner in canvas pixels.
    pub position: Vec2d,
    pub size: Vec2d,
    pub layer: String,
    /// Hidden objects still update but are not rendered.
    pub visible: bool,
    /// Inactive objects neither update nor render.
    pub active: bool,
    pub tags: BTreeSet<String>,
}

impl GameObjectState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec2d::ZERO,
            size: Vec2d::ZERO,
            layer: DEFAULT_LAYER.to_string(),
            visible: true,
            active: true,
            tags: BTreeSet::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            origin: self.position,
            size: self.size,
        }
    }

    pub fn center(&self) -> Vec2d {
        self.position + self.size / 2.0
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

#[derive(Debug, Clone, Copy)]
enum UpdatePhase {
    Before,
    Update,
    After,
}

#[derive(Debug, Clone, Copy)]
enum RenderPhase {
    Before,
    Render,
    After,
}

/// An entity in a scene: shared state plus an ordered set of components.
pub struct GameObject {
    object: RibbitObject,
    state: GameObjectState,
    components: Collection<Box<dyn Component>>,
    initialized: bool,
    /// Components added after `init` that still need their own `init`.
    uninitialized: Vec<ObjectId>,
}

impl std::fmt::Debug for GameObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.object.id())
            .field("state", &self.state)
            .field("components", &self.component_names())
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            object: RibbitObject::new("GameObject"),
            state: GameObjectState::new(name),
            components: Collection::new(),
            initialized: false,
            uninitialized: Vec::new(),
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.state.position = Vec2d::new(x, y);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.state.size = Vec2d::new(width, height);
        self
    }

    pub fn on_layer(mut self, layer: impl Into<String>) -> Self {
        self.state.layer = layer.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.state.tags.insert(tag.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.state.visible = false;
        self
    }

    /// Builder form of [`add_component`](Self::add_component). A duplicate
    /// component id is logged and the component dropped.
    pub fn with_component(mut self, component: impl Component) -> Self {
        if let Err(e) = self.add_component(component) {
            tracing::warn!(object = %self.id(), error = %e, "component not added");
        }
        self
    }

    pub fn id(&self) -> ObjectId {
        self.object.id()
    }

    pub fn object(&self) -> &RibbitObject {
        &self.object
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn state(&self) -> &GameObjectState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameObjectState {
        &mut self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Attach a component. If this object is already initialized the
    /// component is initialized before its first update or render.
    pub fn add_component(&mut self, component: impl Component) -> Result<ObjectId, CollectionError> {
        self.add_boxed(Box::new(component))
    }

    pub fn add_boxed(&mut self, component: Box<dyn Component>) -> Result<ObjectId, CollectionError> {
        let name = component.name();
        let id = self.components.add(component)?;
        if self.initialized {
            self.uninitialized.push(id);
        }
        tracing::debug!(object = %self.id(), component = %id, name, "component added");
        Ok(id)
    }

    /// Detach a component, running its `destroy` hook if it was initialized.
    pub fn remove_component(
        &mut self,
        id: ObjectId,
        textures: &TextureRegistry,
    ) -> Option<Box<dyn Component>> {
        let mut component = self.components.remove(id)?;
        let was_pending = self.uninitialized.contains(&id);
        self.uninitialized.retain(|pending| *pending != id);
        if self.initialized && !was_pending {
            let mut ctx = LifecycleContext {
                owner: &mut self.state,
                textures,
            };
            component.destroy(&mut ctx);
        }
        Some(component)
    }

    pub fn component<C: Component>(&self) -> Option<&C> {
        self.components.first_of::<C>()
    }

    pub fn component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components.first_of_mut::<C>()
    }

    pub fn components_of<C: Component>(&self) -> impl Iterator<Item = &C> {
        self.components.all_of::<C>()
    }

    pub fn has_component<C: Component>(&self) -> bool {
        self.components.has_type::<C>()
    }

    pub fn components(&self) -> &Collection<Box<dyn Component>> {
        &self.components
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn component_names(&self) -> Vec<&'static str> {
        self.components.map(|c| c.name())
    }

    /// Initialize every component once. Later calls are no-ops.
    pub fn init(&mut self, textures: &TextureRegistry) {
        if self.initialized {
            return;
        }
        let _span = self.object.logger().enter();
        for component in self.components.iter_mut() {
            let mut ctx = LifecycleContext {
                owner: &mut self.state,
                textures,
            };
            component.init(&mut ctx);
        }
        self.initialized = true;
        self.uninitialized.clear();
        tracing::debug!(name = %self.state.name, components = self.components.len(), "game object initialized");
    }

    /// Destroy every component in insertion order. Only initialized
    /// components see `destroy`. The object may be initialized again.
    pub fn destroy(&mut self, textures: &TextureRegistry) {
        if !self.initialized {
            return;
        }
        let _span = self.object.logger().enter();
        for component in self.components.iter_mut() {
            if self.uninitialized.contains(&component.id()) {
                continue;
            }
            let mut ctx = LifecycleContext {
                owner: &mut self.state,
                textures,
            };
            component.destroy(&mut ctx);
        }
        self.initialized = false;
        self.uninitialized.clear();
        tracing::debug!(name = %self.state.name, "game object destroyed");
    }

    /// Run the three update phases across all components.
    pub fn update(&mut self, frame: &UpdateFrame<'_>, commands: &mut SceneCommands) {
        if !self.state.active {
            return;
        }
        self.init_pending(frame.textures);
        let _span = self.object.logger().enter();
        for phase in [UpdatePhase::Before, UpdatePhase::Update, UpdatePhase::After] {
            for component in self.components.iter_mut() {
                let mut ctx = UpdateContext {
                    owner: &mut self.state,
                    keyboard: frame.keyboard,
                    textures: frame.textures,
                    commands: &mut *commands,
                    time: frame.time,
                    canvas_size: frame.canvas_size,
                };
                match phase {
                    UpdatePhase::Before => component.before_update(&mut ctx),
                    UpdatePhase::Update => component.update(&mut ctx),
                    UpdatePhase::After => component.after_update(&mut ctx),
                }
            }
        }
    }

    /// Run the three render phases across all components. Hidden or
    /// inactive objects are skipped.
    pub fn render(&mut self, frame: &mut RenderFrame<'_>) {
        if !self.state.active || !self.state.visible {
            return;
        }
        self.init_pending(frame.textures);
        let _span = self.object.logger().enter();
        for phase in [RenderPhase::Before, RenderPhase::Render, RenderPhase::After] {
            for component in self.components.iter_mut() {
                let mut ctx = RenderContext {
                    owner: &self.state,
                    layers: &mut *frame.layers,
                    textures: frame.textures,
                    time: frame.time,
                };
                match phase {
                    RenderPhase::Before => component.before_render(&mut ctx),
                    RenderPhase::Render => component.render(&mut ctx),
                    RenderPhase::After => component.after_render(&mut ctx),
                }
            }
        }
    }

    fn init_pending(&mut self, textures: &TextureRegistry) {
        if !self.initialized {
            self.init(textures);
            return;
        }
        for id in std::mem::take(&mut self.uninitialized) {
            if let Some(component) = self.components.get_mut(id) {
                let mut ctx = LifecycleContext {
                    owner: &mut self.state,
                    textures,
                };
                component.init(&mut ctx);
            }
        }
    }
}

impl Identified for GameObject {
    fn id(&self) -> ObjectId {
        self.object.id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ribbit_input::Keyboard;
    use ribbit_render::{Canvas2d, LayerStack, RasterCanvas};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        object: RibbitObject,
        tag: &'static str,
        log: Log,
    }

    impl Recorder {
        fn new(tag: &'static str, log: &Log) -> Self {
            Self {
                object: RibbitObject::new("Component"),
                tag,
                log: log.clone(),
            }
        }

        fn push(&self, hook: &str) {
            self.log.lock().unwrap().push(format!("{}.{hook}", self.tag));
        }
    }

    impl Component for Recorder {
        fn object(&self) -> &RibbitObject {
            &self.object
        }
        fn init(&mut self, _ctx: &mut LifecycleContext<'_>) {
            self.push("init");
        }
        fn destroy(&mut self, _ctx: &mut LifecycleContext<'_>) {
            self.push("destroy");
        }
        fn before_update(&mut self, _ctx: &mut UpdateContext<'_>) {
            self.push("before_update");
        }
        fn update(&mut self, _ctx: &mut UpdateContext<'_>) {
            self.push("update");
        }
        fn after_update(&mut self, _ctx: &mut UpdateContext<'_>) {
            self.push("after_update");
        }
        fn before_render(&mut self, _ctx: &mut RenderContext<'_>) {
            self.push("before_render");
        }
        fn render(&mut self, _ctx: &mut RenderContext<'_>) {
            self.push("render");
        }
        fn after_render(&mut self, _ctx: &mut RenderContext<'_>) {
            self.push("after_render");
        }
    }

    struct Mover {
        object: RibbitObject,
    }

    impl Component for Mover {
        fn object(&self) -> &RibbitObject {
            &self.object
        }
        fn update(&mut self, ctx: &mut UpdateContext<'_>) {
            ctx.owner.position = ctx.owner.position + Vec2d::new(10.0, 0.0) * ctx.dt();
        }
    }

    struct Painter {
        object: RibbitObject,
    }

    impl Component for Painter {
        fn object(&self) -> &RibbitObject {
            &self.object
        }
        fn render(&mut self, ctx: &mut RenderContext<'_>) {
            let bounds = ctx.owner.bounds();
            if let Some(canvas) = ctx.owner_layer() {
                canvas.fill_rect(bounds, ribbit_common::Color::RED);
            }
        }
    }

    fn run_update(obj: &mut GameObject, dt: f32) -> SceneCommands {
        let keyboard = Keyboard::new();
        let textures = TextureRegistry::new();
        let frame = UpdateFrame {
            keyboard: &keyboard,
            textures: &textures,
            time: crate::FrameTime {
                dt,
                elapsed: 0.0,
                frame: 0,
            },
            canvas_size: Vec2d::new(100.0, 100.0),
        };
        let mut commands = SceneCommands::new();
        obj.update(&frame, &mut commands);
        commands
    }

    fn run_render(obj: &mut GameObject, layers: &mut LayerStack<RasterCanvas>) {
        let textures = TextureRegistry::new();
        let mut frame = RenderFrame {
            layers,
            textures: &textures,
            time: crate::FrameTime::default(),
        };
        obj.render(&mut frame);
    }

    #[test]
    fn phases_run_across_all_components_in_order() {
        let log = Log::default();
        let mut obj = GameObject::new("frog")
            .with_component(Recorder::new("a", &log))
            .with_component(Recorder::new("b", &log));
        run_update(&mut obj, 0.016);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "a.init",
                "b.init",
                "a.before_update",
                "b.before_update",
                "a.update",
                "b.update",
                "a.after_update",
                "b.after_update",
            ]
        );
    }

    #[test]
    fn render_phases_and_hidden_objects() {
        let log = Log::default();
        let mut obj = GameObject::new("frog").with_component(Recorder::new("a", &log));
        let mut layers = LayerStack::<RasterCanvas>::new(8, 8);
        layers.add(DEFAULT_LAYER, 0).unwrap();
        run_render(&mut obj, &mut layers);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a.init", "a.before_render", "a.render", "a.after_render"]
        );

        log.lock().unwrap().clear();
        obj.state_mut().visible = false;
        run_render(&mut obj, &mut layers);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn inactive_objects_do_not_update() {
        let log = Log::default();
        let mut obj = GameObject::new("frog").with_component(Recorder::new("a", &log));
        obj.state_mut().active = false;
        run_update(&mut obj, 0.016);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn init_runs_once_and_late_components_are_initialized_lazily() {
        let log = Log::default();
        let textures = TextureRegistry::new();
        let mut obj = GameObject::new("frog").with_component(Recorder::new("a", &log));
        obj.init(&textures);
        obj.init(&textures);
        obj.add_component(Recorder::new("late", &log)).unwrap();
        run_update(&mut obj, 0.0);
        let log = log.lock().unwrap();
        assert_eq!(log.iter().filter(|l| l.ends_with(".init")).count(), 2);
        assert_eq!(log[1], "late.init");
    }

    #[test]
    fn destroy_skips_uninitialized_components() {
        let log = Log::default();
        let textures = TextureRegistry::new();
        let mut obj = GameObject::new("frog").with_component(Recorder::new("a", &log));
        obj.init(&textures);
        obj.add_component(Recorder::new("late", &log)).unwrap();
        obj.destroy(&textures);
        assert_eq!(*log.lock().unwrap(), vec!["a.init", "a.destroy"]);
        assert!(!obj.is_initialized());
    }

    #[test]
    fn remove_component_destroys_it() {
        let log = Log::default();
        let textures = TextureRegistry::new();
        let rec = Recorder::new("a", &log);
        let id = rec.id();
        let mut obj = GameObject::new("frog").with_component(rec);
        obj.init(&textures);
        let removed = obj.remove_component(id, &textures).unwrap();
        assert_eq!(removed.name(), "Recorder");
        assert_eq!(*log.lock().unwrap(), vec!["a.init", "a.destroy"]);
        assert_eq!(obj.component_count(), 0);
    }

    #[test]
    fn components_mutate_owner_state() {
        let mut obj = GameObject::new("frog").at(5.0, 5.0).with_component(Mover {
            object: RibbitObject::new("Component"),
        });
        run_update(&mut obj, 0.5);
        assert_eq!(obj.state().position, Vec2d::new(10.0, 5.0));
    }

    #[test]
    fn render_draws_on_owner_layer() {
        let mut obj = GameObject::new("box")
            .at(1.0, 1.0)
            .with_size(2.0, 2.0)
            .on_layer("sprites")
            .with_component(Painter {
                object: RibbitObject::new("Component"),
            });
        let mut layers = LayerStack::<RasterCanvas>::new(4, 4);
        layers.add("sprites", 1).unwrap();
        run_render(&mut obj, &mut layers);
        let canvas = &layers.get("sprites").unwrap().canvas;
        assert_eq!(canvas.pixel(1, 1), Some(ribbit_common::Color::RED));
        assert_eq!(canvas.pixel(0, 0), Some(ribbit_common::Color::TRANSPARENT));
        assert_eq!(canvas.width(), 4);
    }

    #[test]
    fn typed_component_lookup() {
        let obj = GameObject::new("frog")
            .with_component(Mover {
                object: RibbitObject::new("Component"),
            })
            .with_tag("player");
        assert!(obj.has_component::<Mover>());
        assert!(obj.component::<Painter>().is_none());
        assert_eq!(obj.component_names(), vec!["Mover"]);
        assert!(obj.state().has_tag("player"));
    }
}
