use crate::canvas::{Canvas2d, CanvasError, CompositeCanvas};

/// Errors from layer stack operations.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("layer {0:?} already exists")]
    Duplicate(String),
    #[error("layer {0:?} not found")]
    NotFound(String),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

/// A named offscreen canvas composited into the main canvas in z-order.
#[derive(Debug)]
pub struct Layer<C> {
    name: String,
    z_index: i32,
    /// Insertion counter, breaks z-index ties.
    order: u64,
    pub visible: bool,
    pub opacity: f32,
    pub canvas: C,
}

impl<C> Layer<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }
}

/// Layers sorted back-to-front, all the same size as the main canvas.
#[derive(Debug)]
pub struct LayerStack<C> {
    width: u32,
    height: u32,
    layers: Vec<Layer<C>>,
    next_order: u64,
}

impl<C: CompositeCanvas> LayerStack<C> {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
            next_order: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Create a new transparent layer.
    pub fn add(&mut self, name: impl Into<String>, z_index: i32) -> Result<&mut Layer<C>, LayerError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(LayerError::Duplicate(name));
        }
        let canvas = C::create(self.width, self.height)?;
        let order = self.next_order;
        self.next_order += 1;
        tracing::debug!(layer = %name, z_index, "adding layer");
        self.layers.push(Layer {
            name: name.clone(),
            z_index,
            order,
            visible: true,
            opacity: 1.0,
            canvas,
        });
        self.sort();
        self.get_mut(&name).ok_or(LayerError::NotFound(name))
    }

    pub fn remove(&mut self, name: &str) -> Option<Layer<C>> {
        let idx = self.layers.iter().position(|l| l.name == name)?;
        Some(self.layers.remove(idx))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.iter().any(|l| l.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Layer<C>> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Layer<C>> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    pub fn set_z_index(&mut self, name: &str, z_index: i32) -> Result<(), LayerError> {
        let layer = self
            .get_mut(name)
            .ok_or_else(|| LayerError::NotFound(name.to_string()))?;
        layer.z_index = z_index;
        self.sort();
        Ok(())
    }

    pub fn set_visible(&mut self, name: &str, visible: bool) -> Result<(), LayerError> {
        let layer = self
            .get_mut(name)
            .ok_or_else(|| LayerError::NotFound(name.to_string()))?;
        layer.visible = visible;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer names back-to-front.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }

    /// Layers in compositing order: ascending z-index, ties by insertion.
    pub fn iter_back_to_front(&self) -> impl Iterator<Item = &Layer<C>> {
        self.layers.iter()
    }

    pub fn clear_all(&mut self) {
        for layer in &mut self.layers {
            layer.canvas.clear();
        }
    }

    /// Source-over every visible layer onto `main`, back to front.
    pub fn composite_onto(&self, main: &mut C) {
        for layer in self.layers.iter().filter(|l| l.visible) {
            main.composite(&layer.canvas, layer.opacity);
        }
    }

    /// Resize every layer canvas. Contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), LayerError> {
        for layer in &mut self.layers {
            layer.canvas.resize(width, height)?;
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn sort(&mut self) {
        self.layers.sort_by_key(|l| (l.z_index, l.order));
    }
}

/// Object-safe view of the layers handed to components while rendering.
pub trait LayerTarget {
    fn layer_canvas(&mut self, name: &str) -> Option<&mut dyn Canvas2d>;

    fn has_layer(&self, name: &str) -> bool;
}

impl<C: CompositeCanvas> LayerTarget for LayerStack<C> {
    fn layer_canvas(&mut self, name: &str) -> Option<&mut dyn Canvas2d> {
        self.get_mut(name).map(|l| &mut l.canvas as &mut dyn Canvas2d)
    }

    fn has_layer(&self, name: &str) -> bool {
        self.contains(name)
    }
}
