use ribbit_common::{Color, Rect, Vec2d};
use ribbit_render::{Canvas2d, CanvasError, CompositeCanvas, ImageData};
use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::TAU;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

thread_local! {
    // decoded images copied into scratch canvases, keyed by pixel hash
    static IMAGE_CACHE: RefCell<HashMap<u64, HtmlCanvasElement>> = RefCell::new(HashMap::new());
}

/// Drop every cached image canvas.
pub fn clear_image_cache() {
    IMAGE_CACHE.with(|cache| cache.borrow_mut().clear());
}

fn backend(err: JsValue) -> CanvasError {
    CanvasError::Backend(format!("{err:?}"))
}

/// [`Canvas2d`] over an HTML canvas element and its 2D context.
#[derive(Debug, Clone)]
pub struct HtmlCanvas {
    element: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl HtmlCanvas {
    /// Wrap an existing element, keeping its current size.
    pub fn from_element(element: HtmlCanvasElement) -> Result<Self, CanvasError> {
        let (width, height) = (element.width(), element.height());
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidSize { width, height });
        }
        let context = element
            .get_context("2d")
            .map_err(backend)?
            .ok_or_else(|| CanvasError::Backend("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| CanvasError::Backend("context is not 2d".into()))?;
        context.set_image_smoothing_enabled(false);
        Ok(Self { element, context })
    }

    /// The page canvas with the given element id.
    pub fn from_element_id(id: &str) -> Result<Self, CanvasError> {
        let element = document()?
            .get_element_by_id(id)
            .ok_or_else(|| CanvasError::Backend(format!("no element with id {id:?}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| CanvasError::Backend(format!("element {id:?} is not a canvas")))?;
        Self::from_element(element)
    }

    /// An offscreen canvas that is never attached to the page.
    pub fn detached(width: u32, height: u32) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidSize { width, height });
        }
        let element = document()?
            .create_element("canvas")
            .map_err(backend)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| CanvasError::Backend("created element is not a canvas".into()))?;
        element.set_width(width);
        element.set_height(height);
        Self::from_element(element)
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.element
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.context
    }

    fn warn(&self, op: &str, result: Result<(), JsValue>) {
        if let Err(err) = result {
            tracing::warn!(op, error = ?err, "canvas call failed");
        }
    }
}

fn document() -> Result<web_sys::Document, CanvasError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| CanvasError::Backend("no document".into()))
}

/// Scratch canvas holding `image`'s pixels, created on first use.
fn image_source(image: &ImageData) -> Result<HtmlCanvasElement, CanvasError> {
    let key = image.key();
    if let Some(element) = IMAGE_CACHE.with(|cache| cache.borrow().get(&key).cloned()) {
        return Ok(element);
    }
    let scratch = HtmlCanvas::detached(image.width(), image.height())?;
    let data = web_sys::ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(image.pixels()),
        image.width(),
        image.height(),
    )
    .map_err(backend)?;
    scratch.context.put_image_data(&data, 0.0, 0.0).map_err(backend)?;
    tracing::debug!(key, width = image.width(), height = image.height(), "image uploaded");
    IMAGE_CACHE.with(|cache| cache.borrow_mut().insert(key, scratch.element.clone()));
    Ok(scratch.element)
}

impl Canvas2d for HtmlCanvas {
    fn width(&self) -> u32 {
        self.element.width()
    }

    fn height(&self) -> u32 {
        self.element.height()
    }

    fn clear(&mut self) {
        self.context
            .clear_rect(0.0, 0.0, f64::from(self.width()), f64::from(self.height()));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.context.set_fill_style_str(&color.to_css());
        self.context.fill_rect(
            f64::from(rect.origin.x),
            f64::from(rect.origin.y),
            f64::from(rect.size.x),
            f64::from(rect.size.y),
        );
    }

    fn fill_circle(&mut self, center: Vec2d, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        self.context.set_fill_style_str(&color.to_css());
        self.context.begin_path();
        let arc = self
            .context
            .arc(f64::from(center.x), f64::from(center.y), f64::from(radius), 0.0, TAU);
        self.warn("arc", arc);
        self.context.fill();
    }

    fn draw_line(&mut self, from: Vec2d, to: Vec2d, color: Color, line_width: f32) {
        self.context.set_stroke_style_str(&color.to_css());
        self.context.set_line_width(f64::from(line_width.max(1.0)));
        self.context.begin_path();
        self.context.move_to(f64::from(from.x), f64::from(from.y));
        self.context.line_to(f64::from(to.x), f64::from(to.y));
        self.context.stroke();
    }

    fn draw_image(&mut self, image: &ImageData, src: Rect, dest: Rect) {
        let source = match image_source(image) {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(error = %err, "image upload failed");
                return;
            }
        };
        let result = self
            .context
            .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &source,
                f64::from(src.origin.x),
                f64::from(src.origin.y),
                f64::from(src.size.x),
                f64::from(src.size.y),
                f64::from(dest.origin.x),
                f64::from(dest.origin.y),
                f64::from(dest.size.x),
                f64::from(dest.size.y),
            );
        self.warn("drawImage", result);
    }

    fn fill_text(&mut self, text: &str, position: Vec2d, color: Color, size: f32) {
        self.context.set_fill_style_str(&color.to_css());
        self.context.set_font(&format!("{}px monospace", size.max(1.0)));
        self.context.set_text_baseline("top");
        let result = self
            .context
            .fill_text(text, f64::from(position.x), f64::from(position.y));
        self.warn("fillText", result);
    }
}

impl CompositeCanvas for HtmlCanvas {
    fn create(width: u32, height: u32) -> Result<Self, CanvasError> {
        Self::detached(width, height)
    }

    fn composite(&mut self, source: &Self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity == 0.0 {
            return;
        }
        self.context.set_global_alpha(f64::from(opacity));
        let result = self
            .context
            .draw_image_with_html_canvas_element(&source.element, 0.0, 0.0);
        self.context.set_global_alpha(1.0);
        self.warn("composite", result);
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidSize { width, height });
        }
        // resizing resets the element and its context state
        self.element.set_width(width);
        self.element.set_height(height);
        self.context.set_image_smoothing_enabled(false);
        Ok(())
    }
}
