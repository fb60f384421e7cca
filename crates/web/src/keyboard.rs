use crate::captures_key;
use ribbit_engine::Ribbit;
use ribbit_input::Key;
use ribbit_render::CompositeCanvas;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{KeyboardEvent, Window};

type KeyHandler = Closure<dyn FnMut(KeyboardEvent)>;

struct Handlers {
    keydown: KeyHandler,
    keyup: KeyHandler,
    blur: Closure<dyn FnMut()>,
}

/// DOM listeners feeding an engine's keyboard. Dropping the handle removes
/// them; call [`keep_alive`](Self::keep_alive) to leave them installed for
/// the page's lifetime.
pub struct KeyboardListeners {
    window: Window,
    handlers: Option<Handlers>,
}

impl KeyboardListeners {
    pub fn keep_alive(mut self) {
        if let Some(handlers) = self.handlers.take() {
            handlers.keydown.forget();
            handlers.keyup.forget();
            handlers.blur.forget();
        }
    }
}

impl Drop for KeyboardListeners {
    fn drop(&mut self) {
        let Some(handlers) = self.handlers.as_ref() else {
            return;
        };
        let pairs: [(&str, &js_sys::Function); 3] = [
            ("keydown", handlers.keydown.as_ref().unchecked_ref()),
            ("keyup", handlers.keyup.as_ref().unchecked_ref()),
            ("blur", handlers.blur.as_ref().unchecked_ref()),
        ];
        for (event, callback) in pairs {
            if let Err(err) = self.window.remove_event_listener_with_callback(event, callback) {
                tracing::warn!(event, error = ?err, "failed to remove listener");
            }
        }
    }
}

fn key_handler<C: CompositeCanvas + 'static>(
    engine: Rc<RefCell<Ribbit<C>>>,
    down: bool,
) -> KeyHandler {
    Closure::new(move |event: KeyboardEvent| {
        let key = Key::from_code(&event.code());
        if captures_key(&key) {
            event.prevent_default();
        }
        let Ok(mut engine) = engine.try_borrow_mut() else {
            tracing::warn!(%key, "engine busy; key event dropped");
            return;
        };
        if down {
            engine.key_down(key);
        } else {
            engine.key_up(key);
        }
    })
}

/// Listen for `keydown`/`keyup` on the window and forward them to `engine`.
/// Losing focus releases every key.
pub fn attach_keyboard<C: CompositeCanvas + 'static>(
    engine: &Rc<RefCell<Ribbit<C>>>,
) -> Result<KeyboardListeners, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let keydown = key_handler(engine.clone(), true);
    let keyup = key_handler(engine.clone(), false);
    let blur = {
        let engine = engine.clone();
        Closure::<dyn FnMut()>::new(move || {
            if let Ok(mut engine) = engine.try_borrow_mut() {
                engine.keyboard_mut().reset();
            }
        })
    };
    window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
    window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
    tracing::debug!("keyboard listeners attached");
    Ok(KeyboardListeners {
        window,
        handlers: Some(Handlers {
            keydown,
            keyup,
            blur,
        }),
    })
}
