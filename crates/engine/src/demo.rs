//! Small two-scene game used by the hosts: a title screen and a pond with a
//! keyboard-driven frog and bouncing flies.

use crate::components::{Bounded, KeyboardMover, Label, ShapeRenderer, SwitchOnKey};
use crate::{EngineError, Ribbit};
use ribbit_common::{Color, Vec2d};
use ribbit_ecs::{
    Component, GameObject, RibbitObject, Scene, SceneCommands, SceneHooks, UpdateContext,
    UpdateFrame,
};
use ribbit_input::Key;
use ribbit_render::CompositeCanvas;

pub const TITLE: &str = "title";
pub const POND: &str = "pond";

const WATER: Color = Color::rgb(0x1d, 0x4e, 0x6b);
const LILY: Color = Color::rgb(0x3c, 0x8d, 0x2f);
const FROG: Color = Color::rgb(0x7c, 0xd6, 0x4a);
const FLY: Color = Color::rgb(0x20, 0x20, 0x20);

const MAX_FLIES: usize = 6;
const FLY_INTERVAL: f32 = 1.5;

/// Constant velocity that reflects off the canvas edges.
#[derive(Debug)]
pub struct Bounce {
    object: RibbitObject,
    pub velocity: Vec2d,
}

impl Bounce {
    pub fn new(velocity: Vec2d) -> Self {
        Self {
            object: RibbitObject::new("Bounce"),
            velocity,
        }
    }
}

impl Component for Bounce {
    fn object(&self) -> &RibbitObject {
        &self.object
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let mut p = ctx.owner.position + self.velocity * ctx.dt();
        let room = ctx.canvas_size - ctx.owner.size;
        if p.x < 0.0 || p.x > room.x {
            self.velocity.x = -self.velocity.x;
            p.x = p.x.clamp(0.0, room.x.max(0.0));
        }
        if p.y < 0.0 || p.y > room.y {
            self.velocity.y = -self.velocity.y;
            p.y = p.y.clamp(0.0, room.y.max(0.0));
        }
        ctx.owner.position = p;
    }
}

/// Spawns a fly every few seconds until the pond is busy enough.
struct PondHooks {
    size: Vec2d,
    spawned: usize,
    timer: f32,
}

impl PondHooks {
    fn fly(&self, n: usize) -> GameObject {
        // spread spawns over the pond without a random source
        let fx = ((n * 37) % 100) as f32 / 100.0;
        let fy = ((n * 61 + 20) % 100) as f32 / 100.0;
        let angle = n as f32 * 2.4;
        let speed = 40.0 + (n % 3) as f32 * 15.0;
        GameObject::new(format!("fly-{n}"))
            .at(fx * (self.size.x - 4.0), fy * (self.size.y - 4.0))
            .with_size(4.0, 4.0)
            .with_tag("fly")
            .with_component(ShapeRenderer::circle(FLY))
            .with_component(Bounce::new(Vec2d::new(angle.cos(), angle.sin()) * speed))
    }
}

impl SceneHooks for PondHooks {
    fn on_init(&mut self, commands: &mut SceneCommands) {
        commands.spawn(self.fly(0));
        self.spawned = 1;
    }

    fn after_update(&mut self, frame: &UpdateFrame<'_>, commands: &mut SceneCommands) {
        if self.spawned >= MAX_FLIES {
            return;
        }
        self.timer += frame.time.dt;
        if self.timer >= FLY_INTERVAL {
            self.timer -= FLY_INTERVAL;
            commands.spawn(self.fly(self.spawned));
            self.spawned += 1;
            tracing::debug!(flies = self.spawned, "fly spawned");
        }
    }
}

pub fn title_scene(width: u32, height: u32) -> Scene {
    let (w, h) = (width as f32, height as f32);
    Scene::new(TITLE)
        .with_object(
            GameObject::new("backdrop")
                .with_size(w, h)
                .on_layer("background")
                .with_component(ShapeRenderer::rect(WATER)),
        )
        .with_object(
            GameObject::new("title")
                .at(w * 0.1, h * 0.3)
                .on_layer("ui")
                .with_component(Label::new("RIBBIT", Color::WHITE, 20.0)),
        )
        .with_object(
            GameObject::new("prompt")
                .at(w * 0.1, h * 0.6)
                .on_layer("ui")
                .with_component(Label::new("PRESS ENTER", Color::YELLOW, 10.0))
                .with_component(SwitchOnKey::new(Key::Enter, POND)),
        )
}

pub fn pond_scene(width: u32, height: u32) -> Scene {
    let (w, h) = (width as f32, height as f32);
    let pad = (w.min(h) * 0.2).max(4.0);
    let mut scene = Scene::new(POND)
        .with_hooks(PondHooks {
            size: Vec2d::new(w, h),
            spawned: 0,
            timer: 0.0,
        })
        .with_object(
            GameObject::new("water")
                .with_size(w, h)
                .on_layer("background")
                .with_component(ShapeRenderer::rect(WATER)),
        );
    for (i, (fx, fy)) in [(0.2, 0.3), (0.7, 0.2), (0.5, 0.7)].into_iter().enumerate() {
        scene = scene.with_object(
            GameObject::new(format!("lily-{i}"))
                .at(fx * w, fy * h)
                .with_size(pad, pad)
                .on_layer("background")
                .with_tag("lily")
                .with_component(ShapeRenderer::circle(LILY)),
        );
    }
    let frog = (pad * 0.5).max(2.0);
    scene
        .with_object(
            GameObject::new("frog")
                .at((w - frog) / 2.0, (h - frog) / 2.0)
                .with_size(frog, frog)
                .with_tag("player")
                .with_component(ShapeRenderer::rect(FROG).with_outline(Color::BLACK, 1.0))
                .with_component(KeyboardMover::new(120.0))
                .with_component(Bounded::new())
                .with_component(SwitchOnKey::new(Key::Escape, TITLE)),
        )
        .with_object(
            GameObject::new("hint")
                .at(2.0, h - 8.0)
                .on_layer("ui")
                .with_component(Label::new("ARROWS MOVE", Color::WHITE, 5.0)),
        )
}

/// Add both scenes to `engine` and activate `start`.
pub fn install<C: CompositeCanvas>(engine: &mut Ribbit<C>, start: &str) -> Result<(), EngineError> {
    let (width, height) = (engine.width(), engine.height());
    engine.add_scene(title_scene(width, height))?;
    engine.add_scene(pond_scene(width, height))?;
    engine.set_active_scene(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ribbit_render::RasterCanvas;

    fn engine(start: &str) -> Ribbit<RasterCanvas> {
        let mut e = Ribbit::with_defaults(160, 120).unwrap();
        install(&mut e, start).unwrap();
        e.start();
        e
    }

    #[test]
    fn installs_both_scenes() {
        let e = engine(TITLE);
        assert_eq!(e.scene_names(), vec![TITLE, POND]);
        assert_eq!(e.active_scene().unwrap().name(), TITLE);
    }

    #[test]
    fn enter_switches_to_pond_and_escape_back() {
        let mut e = engine(TITLE);
        e.key_down(Key::Enter);
        e.update(0.016);
        assert_eq!(e.active_scene().unwrap().name(), POND);
        e.key_up(Key::Enter);
        e.key_down(Key::Escape);
        e.update(0.016);
        assert_eq!(e.active_scene().unwrap().name(), TITLE);
    }

    #[test]
    fn pond_spawns_flies_over_time() {
        let mut e = engine(POND);
        e.update(0.0);
        let flies = |e: &Ribbit<RasterCanvas>| e.active_scene().unwrap().with_tag("fly").len();
        assert_eq!(flies(&e), 1);
        for _ in 0..200 {
            e.update(0.1);
        }
        assert_eq!(flies(&e), MAX_FLIES);
    }

    #[test]
    fn flies_stay_inside_canvas() {
        let mut e = engine(POND);
        for _ in 0..100 {
            e.update(0.1);
        }
        for fly in e.active_scene().unwrap().with_tag("fly") {
            let b = fly.state().bounds();
            assert!(b.left() >= 0.0 && b.top() >= 0.0);
            assert!(b.right() <= 160.0 && b.bottom() <= 120.0);
        }
    }

    #[test]
    fn pond_renders_water_and_frog() {
        let mut e = engine(POND);
        e.update(0.0);
        e.render();
        let frog = e.active_scene().unwrap().find("frog").unwrap().state().center();
        assert_eq!(e.canvas().pixel(frog.x as u32, frog.y as u32), Some(FROG));
        assert_eq!(e.canvas().pixel(1, 1), Some(WATER));
    }
}
