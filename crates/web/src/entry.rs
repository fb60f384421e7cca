use crate::{HtmlCanvas, HtmlImageLoader, attach_keyboard, init_logging, run};
use ribbit_engine::{EngineConfig, Ribbit, demo};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

fn js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Run the demo game on the page canvas `canvas_id`. An optional JSON
/// config overrides the defaults; its size is replaced by the canvas size.
#[wasm_bindgen(js_name = startDemo)]
pub fn start_demo(canvas_id: &str, config_json: Option<String>) -> Result<(), JsValue> {
    init_logging(false);
    let canvas = HtmlCanvas::from_element_id(canvas_id).map_err(js)?;
    let config = match config_json {
        Some(json) => EngineConfig::from_json_str(&json).map_err(js)?,
        None => EngineConfig::default(),
    };
    let mut engine = Ribbit::new(config, canvas).map_err(js)?;
    engine.load_textures(&HtmlImageLoader::default()).map_err(js)?;
    demo::install(&mut engine, demo::TITLE).map_err(js)?;

    let engine = Rc::new(RefCell::new(engine));
    attach_keyboard(&engine)?.keep_alive();
    run(engine)
}
