/// What the animation loop does after one frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextFrame {
    /// Request another animation frame.
    Rearm,
    /// Drop the callback; a later `run` starts a fresh loop.
    Release,
}

/// `running` is the engine's state after the frame, or `None` when the engine
/// was borrowed elsewhere and the frame was skipped.
pub fn next_frame(running: Option<bool>) -> NextFrame {
    match running {
        Some(false) => NextFrame::Release,
        Some(true) | None => NextFrame::Rearm,
    }
}
