use ribbit_common::{ObjectId, Vec2d};
use ribbit_ecs::{GameObject, Scene};
use std::collections::BTreeSet;

/// Read-only queries against a scene for debugging and tooling.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &Scene) -> SceneSummary {
        let objects = scene.objects();
        SceneSummary {
            id: scene.id(),
            name: scene.name().to_string(),
            initialized: scene.is_initialized(),
            object_count: objects.len(),
            visible_count: objects.iter().filter(|o| o.state().visible).count(),
            component_count: objects.iter().map(GameObject::component_count).sum(),
            layers: objects.iter().map(|o| o.state().layer.clone()).collect(),
        }
    }

    pub fn inspect(object: &GameObject) -> ObjectInfo {
        let state = object.state();
        ObjectInfo {
            id: object.id(),
            name: state.name.clone(),
            position: state.position,
            size: state.size,
            layer: state.layer.clone(),
            visible: state.visible,
            active: state.active,
            tags: state.tags.iter().cloned().collect(),
            components: object.component_names(),
        }
    }

    pub fn inspect_id(scene: &Scene, id: ObjectId) -> Option<ObjectInfo> {
        scene.get(id).map(Self::inspect)
    }

    /// Object ids in update order.
    pub fn list_objects(scene: &Scene) -> Vec<ObjectId> {
        scene.objects().ids()
    }
}

/// Summary of one scene.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub id: ObjectId,
    pub name: String,
    pub initialized: bool,
    pub object_count: usize,
    pub visible_count: usize,
    pub component_count: usize,
    /// Layers the scene's objects draw on.
    pub layers: BTreeSet<String>,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene '{}' [{}]: objects={} visible={} components={} initialized={}",
            self.name,
            self.id,
            self.object_count,
            self.visible_count,
            self.component_count,
            self.initialized
        )?;
        if !self.layers.is_empty() {
            let layers: Vec<&str> = self.layers.iter().map(String::as_str).collect();
            write!(f, " layers={}", layers.join(","))?;
        }
        Ok(())
    }
}

/// Detailed info about a single game object.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub id: ObjectId,
    pub name: String,
    pub position: Vec2d,
    pub size: Vec2d,
    pub layer: String,
    pub visible: bool,
    pub active: bool,
    pub tags: Vec<String>,
    pub components: Vec<&'static str>,
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}' pos={} size={} layer={}",
            self.id, self.name, self.position, self.size, self.layer
        )?;
        if !self.visible {
            f.write_str(" hidden")?;
        }
        if !self.active {
            f.write_str(" inactive")?;
        }
        if !self.tags.is_empty() {
            write!(f, " tags=[{}]", self.tags.join(","))?;
        }
        write!(f, " components=[{}]", self.components.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ribbit_ecs::{Component, RibbitObject};

    struct Marker(RibbitObject);

    impl Component for Marker {
        fn object(&self) -> &RibbitObject {
            &self.0
        }
    }

    fn scene() -> Scene {
        Scene::new("pond")
            .with_object(
                GameObject::new("frog")
                    .at(1.0, 2.0)
                    .with_size(16.0, 16.0)
                    .with_tag("player")
                    .with_component(Marker(RibbitObject::new("Component"))),
            )
            .with_object(GameObject::new("lily").on_layer("background").hidden())
    }

    #[test]
    fn summary_counts() {
        let s = SceneInspector::summary(&scene());
        assert_eq!(s.name, "pond");
        assert_eq!(s.object_count, 2);
        assert_eq!(s.visible_count, 1);
        assert_eq!(s.component_count, 1);
        assert!(!s.initialized);
        assert!(s.layers.contains("background") && s.layers.contains("main"));
    }

    #[test]
    fn summary_display() {
        let text = SceneInspector::summary(&scene()).to_string();
        assert!(text.starts_with("Scene 'pond'"));
        assert!(text.contains("objects=2"));
        assert!(text.contains("layers=background,main"));
    }

    #[test]
    fn inspect_object() {
        let scene = scene();
        let frog = scene.find("frog").unwrap();
        let info = SceneInspector::inspect(frog);
        assert_eq!(info.position, Vec2d::new(1.0, 2.0));
        assert_eq!(info.components, vec!["Marker"]);
        let text = info.to_string();
        assert!(text.contains("'frog'"));
        assert!(text.contains("tags=[player]"));
        assert!(text.contains("components=[Marker]"));
    }

    #[test]
    fn inspect_hidden_object() {
        let scene = scene();
        let lily = scene.find("lily").unwrap();
        assert!(SceneInspector::inspect(lily).to_string().contains(" hidden"));
    }

    #[test]
    fn inspect_by_id() {
        let scene = scene();
        let ids = SceneInspector::list_objects(&scene);
        assert_eq!(ids.len(), 2);
        assert!(SceneInspector::inspect_id(&scene, ids[0]).is_some());
        assert!(SceneInspector::inspect_id(&scene, ObjectId::from_parts("GameObject", u64::MAX)).is_none());
    }
}
