use crate::{HtmlCanvas, resolve_source};
use ribbit_assets::{TextureError, TextureLoader, TextureRequest, TextureSender};
use ribbit_render::ImageData;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

fn js_error(err: JsValue) -> TextureError {
    TextureError::Decode(format!("{err:?}"))
}

/// Loads textures with `HTMLImageElement`, resolving sources against a base
/// URL. Completion arrives through the image's `onload`/`onerror`.
#[derive(Debug, Clone, Default)]
pub struct HtmlImageLoader {
    base_url: String,
}

impl HtmlImageLoader {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl TextureLoader for HtmlImageLoader {
    fn load(&self, request: TextureRequest, done: TextureSender) {
        let url = resolve_source(&self.base_url, &request.source);
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                done.complete(request.name, Err(js_error(err)));
                return;
            }
        };
        let onload = {
            let image = image.clone();
            let done = done.clone();
            let name = request.name.clone();
            Closure::once_into_js(move || done.complete(name, read_pixels(&image)))
        };
        let onerror = {
            let name = request.name;
            let url = url.clone();
            Closure::once_into_js(move || {
                tracing::warn!(texture = %name, %url, "image failed to load");
                done.complete(name, Err(TextureError::MissingSource(url)));
            })
        };
        image.set_onload(Some(onload.unchecked_ref()));
        image.set_onerror(Some(onerror.unchecked_ref()));
        // pixels of cross-origin images are only readable with CORS
        image.set_cross_origin(Some("anonymous"));
        tracing::debug!(%url, "image requested");
        image.set_src(&url);
    }
}

/// Copy a loaded image's pixels out through a scratch canvas.
fn read_pixels(image: &HtmlImageElement) -> Result<ImageData, TextureError> {
    let (width, height) = (image.natural_width(), image.natural_height());
    let scratch = HtmlCanvas::detached(width, height)
        .map_err(|e| TextureError::Decode(e.to_string()))?;
    let context = scratch.context();
    context
        .draw_image_with_html_image_element(image, 0.0, 0.0)
        .map_err(js_error)?;
    let data = context
        .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
        .map_err(js_error)?;
    ImageData::new(width, height, data.data().0).map_err(|e| TextureError::Decode(e.to_string()))
}
