use crate::{
    Collection, CollectionError, GameObject, Identified, RenderFrame, RibbitObject, SceneCommands,
    UpdateFrame,
};
use ribbit_assets::TextureRegistry;
use ribbit_common::ObjectId;
use std::any::Any;

/// Scene-level behaviour that runs around the object passes.
pub trait SceneHooks {
    /// Called once when the scene is first activated, before its objects
    /// are initialized. Spawns queued here are added right after.
    fn on_init(&mut self, _commands: &mut SceneCommands) {}

    fn on_destroy(&mut self) {}

    fn before_update(&mut self, _frame: &UpdateFrame<'_>, _commands: &mut SceneCommands) {}

    fn after_update(&mut self, _frame: &UpdateFrame<'_>, _commands: &mut SceneCommands) {}

    fn before_render(&mut self, _frame: &mut RenderFrame<'_>) {}

    fn after_render(&mut self, _frame: &mut RenderFrame<'_>) {}
}

/// A named set of game objects that update and render together.
pub struct Scene {
    object: RibbitObject,
    name: String,
    objects: Collection<GameObject>,
    hooks: Option<Box<dyn SceneHooks>>,
    initialized: bool,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.object.id())
            .field("name", &self.name)
            .field("objects", &self.objects.len())
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            object: RibbitObject::new("Scene"),
            name: name.into(),
            objects: Collection::new(),
            hooks: None,
            initialized: false,
        }
    }

    pub fn with_hooks(mut self, hooks: impl SceneHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Builder form of [`add`](Self::add). A duplicate id is logged and the
    /// object dropped.
    pub fn with_object(mut self, object: GameObject) -> Self {
        if let Err(e) = self.add(object) {
            tracing::warn!(scene = %self.name, error = %e, "game object not added");
        }
        self
    }

    pub fn id(&self) -> ObjectId {
        self.object.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Add a game object. Objects added to a running scene are initialized
    /// before their first update.
    pub fn add(&mut self, object: GameObject) -> Result<ObjectId, CollectionError> {
        let id = self.objects.add(object)?;
        tracing::debug!(scene = %self.name, object = %id, "game object added");
        Ok(id)
    }

    /// Remove a game object, destroying it if it was initialized.
    pub fn remove(&mut self, id: ObjectId, textures: &TextureRegistry) -> Option<GameObject> {
        let mut object = self.objects.remove(id)?;
        object.destroy(textures);
        tracing::debug!(scene = %self.name, object = %id, "game object removed");
        Some(object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// First object with the given name.
    pub fn find(&self, name: &str) -> Option<&GameObject> {
        self.objects.find(|o| o.name() == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut GameObject> {
        self.objects.find_mut(|o| o.name() == name)
    }

    pub fn with_tag(&self, tag: &str) -> Vec<&GameObject> {
        self.objects.filter(|o| o.state().has_tag(tag))
    }

    pub fn objects(&self) -> &Collection<GameObject> {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut Collection<GameObject> {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Run `on_init` and initialize every object. Later calls are no-ops.
    pub fn init(&mut self, textures: &TextureRegistry) {
        if self.initialized {
            return;
        }
        let span = self.object.logger().clone();
        let _enter = span.enter();
        let mut commands = SceneCommands::new();
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_init(&mut commands);
        }
        for object in self.objects.iter_mut() {
            object.init(textures);
        }
        self.initialized = true;
        self.apply(&mut commands, textures);
        tracing::info!(scene = %self.name, objects = self.objects.len(), "scene initialized");
    }

    /// Destroy every object and run `on_destroy`. The objects stay in the
    /// scene, so it can be initialized again.
    pub fn destroy(&mut self, textures: &TextureRegistry) {
        if !self.initialized {
            return;
        }
        let _span = self.object.logger().enter();
        for object in self.objects.iter_mut() {
            object.destroy(textures);
        }
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_destroy();
        }
        self.initialized = false;
        tracing::info!(scene = %self.name, "scene destroyed");
    }

    /// One update pass: hooks, every object in insertion order, hooks, then
    /// the queued spawns and destroys. A scene switch request is left in
    /// `commands` for the engine.
    pub fn update(&mut self, frame: &UpdateFrame<'_>, commands: &mut SceneCommands) {
        self.init(frame.textures);
        let span = self.object.logger().clone();
        let _enter = span.enter();
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.before_update(frame, commands);
        }
        for object in self.objects.iter_mut() {
            object.update(frame, commands);
        }
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.after_update(frame, commands);
        }
        self.apply(commands, frame.textures);
    }

    pub fn render(&mut self, frame: &mut RenderFrame<'_>) {
        self.init(frame.textures);
        let _span = self.object.logger().enter();
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.before_render(frame);
        }
        for object in self.objects.iter_mut() {
            object.render(frame);
        }
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.after_render(frame);
        }
    }

    /// Add queued spawns, then remove queued destroys. Spawned objects are
    /// initialized immediately so a destroy queued in the same frame still
    /// sees `destroy`.
    fn apply(&mut self, commands: &mut SceneCommands, textures: &TextureRegistry) {
        for mut object in commands.take_spawns() {
            object.init(textures);
            if let Err(e) = self.add(object) {
                tracing::warn!(scene = %self.name, error = %e, "spawned object not added");
            }
        }
        for id in commands.take_destroys() {
            if self.remove(id, textures).is_none() {
                tracing::debug!(scene = %self.name, object = %id, "destroy for unknown object");
            }
        }
    }
}

impl Identified for Scene {
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
