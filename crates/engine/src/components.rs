//! Components most games need: shapes, sprites and simple movement.

use ribbit_common::{Color, Rect, Vec2d};
use ribbit_ecs::{Component, LifecycleContext, RenderContext, RibbitObject, UpdateContext};
use ribbit_input::Key;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Rect,
    /// Circle inscribed in the owner's bounds.
    Circle,
}

/// Fills the owner's bounds with a flat shape.
#[derive(Debug)]
pub struct ShapeRenderer {
    object: RibbitObject,
    pub shape: Shape,
    pub color: Color,
    /// Optional outline color and width.
    pub outline: Option<(Color, f32)>,
}

impl ShapeRenderer {
    pub fn new(shape: Shape, color: Color) -> Self {
        Self {
            object: RibbitObject::new("ShapeRenderer"),
            shape,
            color,
            outline: None,
        }
    }

    pub fn rect(color: Color) -> Self {
        Self::new(Shape::Rect, color)
    }

    pub fn circle(color: Color) -> Self {
        Self::new(Shape::Circle, color)
    }

    pub fn with_outline(mut self, color: Color, width: f32) -> Self {
        self.outline = Some((color, width));
        self
    }
}

impl Component for ShapeRenderer {
    fn object(&self) -> &RibbitObject {
        &self.object
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        let bounds = ctx.owner.bounds();
        let center = ctx.owner.center();
        let Some(canvas) = ctx.owner_layer() else {
            return;
        };
        match self.shape {
            Shape::Rect => {
                canvas.fill_rect(bounds, self.color);
                if let Some((color, width)) = self.outline {
                    canvas.stroke_rect(bounds, color, width);
                }
            }
            Shape::Circle => {
                let radius = bounds.size.x.min(bounds.size.y) / 2.0;
                canvas.fill_circle(center, radius, self.color);
            }
        }
    }
}

/// Draws a named texture over the owner's bounds.
///
/// Until the texture is ready nothing is drawn.
#[derive(Debug)]
pub struct SpriteRenderer {
    object: RibbitObject,
    pub texture: String,
    /// Sub-rectangle of the image to draw (sprite sheets).
    pub region: Option<Rect>,
}

impl SpriteRenderer {
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            object: RibbitObject::new("SpriteRenderer"),
            texture: texture.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: Rect) -> Self {
        self.region = Some(region);
        self
    }
}

impl Component for SpriteRenderer {
    fn object(&self) -> &RibbitObject {
        &self.object
    }

    /// An owner without a size takes the region's or the image's size.
    fn init(&mut self, ctx: &mut LifecycleContext<'_>) {
        if ctx.owner.size != Vec2d::ZERO {
            return;
        }
        let size = match self.region {
            Some(region) => Some(region.size),
            None => ctx.textures.get(&self.texture).and_then(|t| t.size()),
        };
        if let Some(size) = size {
            ctx.owner.size = size;
        }
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        let textures = ctx.textures;
        let bounds = ctx.owner.bounds();
        let Some(texture) = textures.get(&self.texture) else {
            tracing::trace!(texture = %self.texture, "sprite texture not ready");
            return;
        };
        let Some(canvas) = ctx.owner_layer() else {
            return;
        };
        match self.region {
            Some(region) => canvas.draw_texture_region(texture, region, bounds),
            None => canvas.draw_texture(texture, bounds),
        }
    }
}

/// Moves the owner at a constant velocity, in pixels per second.
#[derive(Debug)]
pub struct Velocity {
    object: RibbitObject,
    pub velocity: Vec2d,
}

impl Velocity {
    pub fn new(velocity: Vec2d) -> Self {
        Self {
            object: RibbitObject::new("Velocity"),
            velocity,
        }
    }
}

impl Component for Velocity {
    fn object(&self) -> &RibbitObject {
        &self.object
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let step = self.velocity * ctx.dt();
        ctx.owner.position = ctx.owner.position + step;
    }
}

/// Moves the owner with the arrow keys or WASD.
#[derive(Debug)]
pub struct KeyboardMover {
    object: RibbitObject,
    /// Pixels per second.
    pub speed: f32,
}

impl KeyboardMover {
    pub fn new(speed: f32) -> Self {
        Self {
            object: RibbitObject::new("KeyboardMover"),
            speed,
        }
    }
}

impl Component for KeyboardMover {
    fn object(&self) -> &RibbitObject {
        &self.object
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let step = ctx.keyboard.direction() * (self.speed * ctx.dt());
        ctx.owner.position = ctx.owner.position + step;
    }
}

/// Keeps the owner fully inside the canvas. Runs after movement.
#[derive(Debug)]
pub struct Bounded {
    object: RibbitObject,
}

impl Bounded {
    pub fn new() -> Self {
        Self {
            object: RibbitObject::new("Bounded"),
        }
    }
}

impl Default for Bounded {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Bounded {
    fn object(&self) -> &RibbitObject {
        &self.object
    }

    fn after_update(&mut self, ctx: &mut UpdateContext<'_>) {
        let room = ctx.canvas_size - ctx.owner.size;
        let p = ctx.owner.position;
        ctx.owner.position = Vec2d::new(
            p.x.clamp(0.0, room.x.max(0.0)),
            p.y.clamp(0.0, room.y.max(0.0)),
        );
    }
}

/// Draws a line of text at the owner's position.
#[derive(Debug)]
pub struct Label {
    object: RibbitObject,
    pub text: String,
    pub color: Color,
    /// Glyph height in pixels.
    pub size: f32,
}

impl Label {
    pub fn new(text: impl Into<String>, color: Color, size: f32) -> Self {
        Self {
            object: RibbitObject::new("Label"),
            text: text.into(),
            color,
            size,
        }
    }
}

impl Component for Label {
    fn object(&self) -> &RibbitObject {
        &self.object
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>) {
        let position = ctx.owner.position;
        if let Some(canvas) = ctx.owner_layer() {
            canvas.fill_text(&self.text, position, self.color, self.size);
        }
    }
}

/// Requests a scene switch when a key goes down.
#[derive(Debug)]
pub struct SwitchOnKey {
    object: RibbitObject,
    pub key: Key,
    pub scene: String,
}

impl SwitchOnKey {
    pub fn new(key: Key, scene: impl Into<String>) -> Self {
        Self {
            object: RibbitObject::new("SwitchOnKey"),
            key,
            scene: scene.into(),
        }
    }
}

impl Component for SwitchOnKey {
    fn object(&self) -> &RibbitObject {
        &self.object
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if ctx.keyboard.was_pressed(&self.key) {
            ctx.commands.switch_scene(self.scene.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ribbit_assets::TextureRegistry;
    use ribbit_ecs::{FrameTime, GameObject, RenderFrame, SceneCommands, UpdateFrame};
    use ribbit_input::Keyboard;
    use ribbit_render::{ImageData, LayerStack, RasterCanvas};

    fn update(obj: &mut GameObject, keyboard: &Keyboard, dt: f32) {
        let textures = TextureRegistry::new();
        let frame = UpdateFrame {
            keyboard,
            textures: &textures,
            time: FrameTime {
                dt,
                ..FrameTime::default()
            },
            canvas_size: Vec2d::new(100.0, 100.0),
        };
        obj.update(&frame, &mut SceneCommands::new());
    }

    fn render(obj: &mut GameObject, textures: &TextureRegistry) -> LayerStack<RasterCanvas> {
        let mut layers = LayerStack::new(8, 8);
        layers.add("main", 0).unwrap();
        let mut frame = RenderFrame {
            layers: &mut layers,
            textures,
            time: FrameTime::default(),
        };
        obj.render(&mut frame);
        layers
    }

    #[test]
    fn velocity_integrates_dt() {
        let mut obj = GameObject::new("ball").with_component(Velocity::new(Vec2d::new(20.0, -10.0)));
        update(&mut obj, &Keyboard::new(), 0.5);
        assert_eq!(obj.state().position, Vec2d::new(10.0, -5.0));
    }

    #[test]
    fn keyboard_mover_follows_arrows() {
        let mut kb = Keyboard::new();
        kb.press(Key::ArrowRight);
        let mut obj = GameObject::new("frog").at(10.0, 10.0).with_component(KeyboardMover::new(100.0));
        update(&mut obj, &kb, 0.1);
        assert_eq!(obj.state().position, Vec2d::new(20.0, 10.0));
    }

    #[test]
    fn bounded_clamps_after_movement() {
        let mut obj = GameObject::new("frog")
            .at(95.0, -3.0)
            .with_size(10.0, 10.0)
            .with_component(Velocity::new(Vec2d::new(100.0, 0.0)))
            .with_component(Bounded::new());
        update(&mut obj, &Keyboard::new(), 0.1);
        assert_eq!(obj.state().position, Vec2d::new(90.0, 0.0));
    }

    #[test]
    fn shape_renderer_fills_bounds() {
        let mut obj = GameObject::new("box")
            .at(2.0, 2.0)
            .with_size(4.0, 4.0)
            .with_component(ShapeRenderer::rect(Color::GREEN));
        let layers = render(&mut obj, &TextureRegistry::new());
        let canvas = &layers.get("main").unwrap().canvas;
        assert_eq!(canvas.pixel(3, 3), Some(Color::GREEN));
        assert_eq!(canvas.pixel(6, 6), Some(Color::TRANSPARENT));
    }

    #[test]
    fn circle_is_inscribed() {
        let mut obj = GameObject::new("ball")
            .with_size(8.0, 8.0)
            .with_component(ShapeRenderer::circle(Color::RED));
        let layers = render(&mut obj, &TextureRegistry::new());
        let canvas = &layers.get("main").unwrap().canvas;
        assert_eq!(canvas.pixel(4, 4), Some(Color::RED));
        assert_eq!(canvas.pixel(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn sprite_waits_for_texture() {
        let mut obj = GameObject::new("frog")
            .with_size(4.0, 4.0)
            .with_component(SpriteRenderer::new("frog"));
        let layers = render(&mut obj, &TextureRegistry::new());
        let canvas = &layers.get("main").unwrap().canvas;
        assert!(canvas.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn sprite_takes_image_size_and_draws() {
        let mut textures = TextureRegistry::new();
        textures
            .add_image("frog", ImageData::solid(3, 2, Color::BLUE).unwrap())
            .unwrap();
        let mut obj = GameObject::new("frog").with_component(SpriteRenderer::new("frog"));
        let layers = render(&mut obj, &textures);
        assert_eq!(obj.state().size, Vec2d::new(3.0, 2.0));
        let canvas = &layers.get("main").unwrap().canvas;
        assert_eq!(canvas.pixel(2, 1), Some(Color::BLUE));
        assert_eq!(canvas.pixel(3, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn label_draws_at_position() {
        let mut obj = GameObject::new("title")
            .at(1.0, 1.0)
            .with_component(Label::new("I", Color::YELLOW, 5.0));
        let layers = render(&mut obj, &TextureRegistry::new());
        let canvas = &layers.get("main").unwrap().canvas;
        assert_eq!(canvas.pixel(2, 1), Some(Color::YELLOW));
        assert_eq!(canvas.pixel(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn switch_on_key_queues_scene() {
        let textures = TextureRegistry::new();
        let mut kb = Keyboard::new();
        let mut obj = GameObject::new("menu").with_component(SwitchOnKey::new(Key::Enter, "pond"));
        let mut commands = SceneCommands::new();
        let idle = UpdateFrame {
            keyboard: &kb,
            textures: &textures,
            time: FrameTime::default(),
            canvas_size: Vec2d::new(10.0, 10.0),
        };
        obj.update(&idle, &mut commands);
        assert_eq!(commands.pending_switch(), None);

        kb.press(Key::Enter);
        let pressed = UpdateFrame {
            keyboard: &kb,
            textures: &textures,
            time: FrameTime::default(),
            canvas_size: Vec2d::new(10.0, 10.0),
        };
        obj.update(&pressed, &mut commands);
        assert_eq!(commands.pending_switch(), Some("pond"));
    }
}
