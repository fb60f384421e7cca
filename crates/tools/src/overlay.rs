use crate::FrameTimer;
use ribbit_common::{Color, Rect, Vec2d};
use ribbit_ecs::Scene;
use ribbit_input::{Key, Keyboard};
use ribbit_render::{Canvas2d, GLYPH_HEIGHT, text_width};
use serde::{Deserialize, Serialize};

/// Debug overlay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    /// Whether the overlay starts visible.
    pub enabled: bool,
    pub toggle_key: Key,
    /// Layer the overlay draws on; created by the engine if missing.
    pub layer: String,
    pub z_index: i32,
    pub box_color: Color,
    pub text_color: Color,
    pub panel_color: Color,
    /// Glyph height in pixels.
    pub text_size: f32,
    /// Frames averaged for the fps readout.
    pub timer_window: usize,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            toggle_key: Key::F3,
            layer: "debug".to_string(),
            z_index: 1000,
            box_color: Color::MAGENTA,
            text_color: Color::WHITE,
            panel_color: Color::BLACK.with_alpha(160),
            text_size: 10.0,
            timer_window: 120,
        }
    }
}

impl DebugSettings {
    /// Largest glyph height the overlay draws.
    pub const MAX_TEXT_SIZE: f32 = 200.0;
}

const PADDING: f32 = 4.0;

/// Frame stats panel plus object bounding boxes.
#[derive(Debug, Clone)]
pub struct DebugOverlay {
    settings: DebugSettings,
    enabled: bool,
    timer: FrameTimer,
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new(DebugSettings::default())
    }
}

impl DebugOverlay {
    pub fn new(settings: DebugSettings) -> Self {
        Self {
            enabled: settings.enabled,
            timer: FrameTimer::new(settings.timer_window),
            settings,
        }
    }

    pub fn settings(&self) -> &DebugSettings {
        &self.settings
    }

    pub fn layer(&self) -> &str {
        &self.settings.layer
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            tracing::info!(enabled, "debug overlay toggled");
        }
        self.enabled = enabled;
    }

    /// Flip visibility; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Toggle if the configured key went down this frame.
    pub fn handle_input(&mut self, keyboard: &Keyboard) -> bool {
        if keyboard.was_pressed(&self.settings.toggle_key) {
            self.toggle();
            return true;
        }
        false
    }

    pub fn record_frame(&mut self, dt: f32) {
        self.timer.record_secs(dt);
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// Text shown in the stats panel.
    pub fn lines(&self, frame: u64, scene: Option<&Scene>) -> Vec<String> {
        vec![
            format!("FPS {:.1}", self.timer.fps()),
            format!("FRAME {frame}"),
            format!("SCENE {}", scene.map_or("-", Scene::name)),
            format!("OBJECTS {}", scene.map_or(0, Scene::len)),
        ]
    }

    /// Draw onto `canvas` if enabled. The caller clears the canvas.
    pub fn draw(&self, canvas: &mut dyn Canvas2d, frame: u64, scene: Option<&Scene>) {
        if !self.enabled {
            return;
        }
        if let Some(scene) = scene {
            for object in scene.objects().iter() {
                let state = object.state();
                if !state.visible || !state.active || state.size == Vec2d::ZERO {
                    continue;
                }
                canvas.stroke_rect(state.bounds(), self.settings.box_color, 1.0);
            }
        }

        let lines = self.lines(frame, scene);
        let size = self.settings.text_size.min(DebugSettings::MAX_TEXT_SIZE);
        let scale = (size / GLYPH_HEIGHT as f32).round().max(1.0);
        let line_height = (GLYPH_HEIGHT + 2) as f32 * scale;
        let widest = lines
            .iter()
            .map(|l| text_width(l, scale as u32))
            .max()
            .unwrap_or(0) as f32;
        let panel = Rect::new(
            0.0,
            0.0,
            widest + PADDING * 2.0,
            line_height * lines.len() as f32 + PADDING * 2.0 - 2.0 * scale,
        );
        canvas.fill_rect(panel, self.settings.panel_color);
        for (i, line) in lines.iter().enumerate() {
            let pos = Vec2d::new(PADDING, PADDING + i as f32 * line_height);
            canvas.fill_text(line, pos, self.settings.text_color, scale * GLYPH_HEIGHT as f32);
        }
    }
}
