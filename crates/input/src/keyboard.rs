use crate::Key;
use ribbit_common::Vec2d;
use std::collections::HashSet;

/// Keyboard state for the current frame.
///
/// Hosts call [`press`](Self::press) and [`release`](Self::release) as events
/// arrive; the engine calls [`end_frame`](Self::end_frame) once per frame to
/// drop the one-frame edges.
#[derive(Debug, Default, Clone)]
pub struct Keyboard {
    down: HashSet<Key>,
    pressed: HashSet<Key>,
    released: HashSet<Key>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key going down. Auto-repeat presses of a held key do not
    /// produce a new edge.
    pub fn press(&mut self, key: Key) {
        if self.down.insert(key.clone()) {
            tracing::trace!(%key, "key pressed");
            self.pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        if self.down.remove(&key) {
            tracing::trace!(%key, "key released");
            self.released.insert(key);
        }
    }

    pub fn is_down(&self, key: &Key) -> bool {
        self.down.contains(key)
    }

    /// True only during the frame in which `key` went down.
    pub fn was_pressed(&self, key: &Key) -> bool {
        self.pressed.contains(key)
    }

    /// True only during the frame in which `key` went up.
    pub fn was_released(&self, key: &Key) -> bool {
        self.released.contains(key)
    }

    pub fn any_down(&self) -> bool {
        !self.down.is_empty()
    }

    /// -1, 0 or 1 depending on which of the two keys is held.
    pub fn axis(&self, negative: &Key, positive: &Key) -> f32 {
        let mut v = 0.0;
        if self.is_down(negative) {
            v -= 1.0;
        }
        if self.is_down(positive) {
            v += 1.0;
        }
        v
    }

    /// Unit direction from the arrow keys or WASD; zero when idle or when
    /// opposite keys cancel out.
    pub fn direction(&self) -> Vec2d {
        let x = (self.axis(&Key::ArrowLeft, &Key::ArrowRight) + self.axis(&Key::KeyA, &Key::KeyD))
            .clamp(-1.0, 1.0);
        let y = (self.axis(&Key::ArrowUp, &Key::ArrowDown) + self.axis(&Key::KeyW, &Key::KeyS))
            .clamp(-1.0, 1.0);
        Vec2d::new(x, y).normalize()
    }

    /// Drop this frame's press/release edges. Held keys stay held.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    /// Forget everything, e.g. when the canvas loses focus.
    pub fn reset(&mut self) {
        self.down.clear();
        self.pressed.clear();
        self.released.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_sets_down_and_edge() {
        let mut kb = Keyboard::new();
        kb.press(Key::Space);
        assert!(kb.is_down(&Key::Space));
        assert!(kb.was_pressed(&Key::Space));
        kb.end_frame();
        assert!(kb.is_down(&Key::Space));
        assert!(!kb.was_pressed(&Key::Space));
    }

    #[test]
    fn repeat_press_has_no_new_edge() {
        let mut kb = Keyboard::new();
        kb.press(Key::KeyA);
        kb.end_frame();
        kb.press(Key::KeyA);
        assert!(!kb.was_pressed(&Key::KeyA));
    }

    #[test]
    fn release_edge_lasts_one_frame() {
        let mut kb = Keyboard::new();
        kb.press(Key::Enter);
        kb.release(Key::Enter);
        assert!(!kb.is_down(&Key::Enter));
        assert!(kb.was_released(&Key::Enter));
        kb.end_frame();
        assert!(!kb.was_released(&Key::Enter));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut kb = Keyboard::new();
        kb.release(Key::Tab);
        assert!(!kb.was_released(&Key::Tab));
    }

    #[test]
    fn axis_cancels_out() {
        let mut kb = Keyboard::new();
        kb.press(Key::ArrowLeft);
        assert_eq!(kb.axis(&Key::ArrowLeft, &Key::ArrowRight), -1.0);
        kb.press(Key::ArrowRight);
        assert_eq!(kb.axis(&Key::ArrowLeft, &Key::ArrowRight), 0.0);
    }

    #[test]
    fn direction_is_normalized() {
        let mut kb = Keyboard::new();
        kb.press(Key::ArrowRight);
        kb.press(Key::KeyS);
        let d = kb.direction();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!(d.x > 0.0 && d.y > 0.0);
    }

    #[test]
    fn arrow_and_wasd_do_not_double_speed() {
        let mut kb = Keyboard::new();
        kb.press(Key::ArrowRight);
        kb.press(Key::KeyD);
        assert_eq!(kb.direction(), Vec2d::RIGHT);
    }

    #[test]
    fn reset_clears_everything() {
        let mut kb = Keyboard::new();
        kb.press(Key::KeyQ);
        kb.reset();
        assert!(!kb.any_down());
        assert!(!kb.was_pressed(&Key::KeyQ));
    }
}
