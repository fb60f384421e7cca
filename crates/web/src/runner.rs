use crate::schedule::{NextFrame, next_frame};
use ribbit_engine::Ribbit;
use ribbit_render::CompositeCanvas;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

type FrameCallback = Closure<dyn FnMut(f64)>;

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Start `engine` and drive it from `requestAnimationFrame` until it is
/// stopped. The loop then drops its callback, so calling `start` on the
/// engine alone does not resume it; call `run` again.
pub fn run<C: CompositeCanvas + 'static>(engine: Rc<RefCell<Ribbit<C>>>) -> Result<(), JsValue> {
    engine.borrow_mut().start();
    let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let rearm = callback.clone();
    *callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        let running = match engine.try_borrow_mut() {
            Ok(mut engine) => {
                engine.frame(timestamp);
                Some(engine.is_running())
            }
            Err(_) => {
                tracing::warn!("engine busy; frame skipped");
                None
            }
        };
        let rearmed = match next_frame(running) {
            NextFrame::Rearm => match rearm.borrow().as_ref().map(request_frame) {
                Some(Ok(_)) => true,
                Some(Err(err)) => {
                    tracing::error!(error = ?err, "requestAnimationFrame failed");
                    false
                }
                None => false,
            },
            NextFrame::Release => false,
        };
        if !rearmed {
            // breaks the callback's self reference; freed once this call returns
            drop(rearm.borrow_mut().take());
            tracing::info!("animation loop stopped");
        }
    }));
    let first = callback.borrow().as_ref().map(request_frame);
    if let Some(Err(err)) = first {
        drop(callback.borrow_mut().take());
        return Err(err);
    }
    tracing::info!("animation loop started");
    Ok(())
}
