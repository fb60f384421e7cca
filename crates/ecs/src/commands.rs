use crate::GameObject;
use ribbit_common::ObjectId;

/// Structural changes queued during an update pass and applied after it.
#[derive(Debug, Default)]
pub struct SceneCommands {
    spawns: Vec<GameObject>,
    destroys: Vec<ObjectId>,
    switch_to: Option<String>,
}

impl SceneCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `object` to the current scene after this update.
    pub fn spawn(&mut self, object: GameObject) -> ObjectId {
        let id = object.id();
        self.spawns.push(object);
        id
    }

    /// Remove and destroy the object with `id` after this update.
    pub fn destroy(&mut self, id: ObjectId) {
        if !self.destroys.contains(&id) {
            self.destroys.push(id);
        }
    }

    /// Ask the engine to activate another scene. The last request wins.
    pub fn switch_scene(&mut self, name: impl Into<String>) {
        self.switch_to = Some(name.into());
    }

    pub fn take_spawns(&mut self) -> Vec<GameObject> {
        std::mem::take(&mut self.spawns)
    }

    pub fn take_destroys(&mut self) -> Vec<ObjectId> {
        std::mem::take(&mut self.destroys)
    }

    pub fn take_switch(&mut self) -> Option<String> {
        self.switch_to.take()
    }

    pub fn pending_switch(&self) -> Option<&str> {
        self.switch_to.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty() && self.destroys.is_empty() && self.switch_to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destroy_is_deduplicated() {
        let mut cmds = SceneCommands::new();
        let id = ObjectId::from_parts("GameObject", 1);
        cmds.destroy(id);
        cmds.destroy(id);
        assert_eq!(cmds.take_destroys(), vec![id]);
        assert!(cmds.is_empty());
    }

    #[test]
    fn last_switch_wins() {
        let mut cmds = SceneCommands::new();
        cmds.switch_scene("menu");
        cmds.switch_scene("level-1");
        assert_eq!(cmds.pending_switch(), Some("level-1"));
        assert_eq!(cmds.take_switch().as_deref(), Some("level-1"));
        assert!(cmds.take_switch().is_none());
    }

    #[test]
    fn spawn_returns_object_id() {
        let mut cmds = SceneCommands::new();
        let obj = GameObject::new("bullet");
        let expected = obj.id();
        assert_eq!(cmds.spawn(obj), expected);
        assert_eq!(cmds.take_spawns().len(), 1);
    }
}
