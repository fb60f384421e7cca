use crate::texture::{ImageData, Texture};
use ribbit_common::{Color, Rect, Vec2d};

/// Errors from creating or resizing a backend canvas.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas size must be non-zero, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("canvas backend error: {0}")]
    Backend(String),
}

/// Immediate-mode 2D drawing surface, modelled on the HTML canvas 2D context.
///
/// Coordinates are canvas pixels with the origin at the top-left corner.
/// Colors are straight RGBA; the backend handles blending. The trait is
/// object-safe so components can draw without knowing the backend.
pub trait Canvas2d {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn size(&self) -> Vec2d {
        Vec2d::new(self.width() as f32, self.height() as f32)
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Paint the whole canvas with `color`, blending over what is there.
    fn fill(&mut self, color: Color) {
        let bounds = self.bounds();
        self.fill_rect(bounds, color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Outline drawn inside `rect`.
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        let w = line_width.max(1.0).min(rect.size.x / 2.0).min(rect.size.y / 2.0);
        let (x, y, rw, rh) = (rect.origin.x, rect.origin.y, rect.size.x, rect.size.y);
        self.fill_rect(Rect::new(x, y, rw, w), color);
        self.fill_rect(Rect::new(x, y + rh - w, rw, w), color);
        self.fill_rect(Rect::new(x, y + w, w, rh - 2.0 * w), color);
        self.fill_rect(Rect::new(x + rw - w, y + w, w, rh - 2.0 * w), color);
    }

    fn fill_circle(&mut self, center: Vec2d, radius: f32, color: Color);

    fn draw_line(&mut self, from: Vec2d, to: Vec2d, color: Color, line_width: f32);

    /// Draw the `src` region of `image` scaled into `dest`.
    fn draw_image(&mut self, image: &ImageData, src: Rect, dest: Rect);

    /// Draw a whole texture into `dest`. Color textures fill the rectangle.
    fn draw_texture(&mut self, texture: &Texture, dest: Rect) {
        match texture {
            Texture::Color(color) => self.fill_rect(dest, *color),
            Texture::Image(image) => self.draw_image(image, image.bounds(), dest),
        }
    }

    /// Draw one region of a texture (sprite sheets). Color textures ignore `src`.
    fn draw_texture_region(&mut self, texture: &Texture, src: Rect, dest: Rect) {
        match texture {
            Texture::Color(color) => self.fill_rect(dest, *color),
            Texture::Image(image) => self.draw_image(image, src, dest),
        }
    }

    /// Draw `text` with its top-left corner at `position`; `size` is the
    /// glyph height in pixels.
    fn fill_text(&mut self, text: &str, position: Vec2d, color: Color, size: f32);
}

/// A canvas the engine can allocate for layers and composite onto the main
/// canvas. Not object-safe: the engine is generic over one backend.
pub trait CompositeCanvas: Canvas2d + Sized {
    fn create(width: u32, height: u32) -> Result<Self, CanvasError>;

    /// Source-over `source` onto `self` at the given opacity (0..=1).
    /// Both canvases have the same size.
    fn composite(&mut self, source: &Self, opacity: f32);

    /// Resize and clear.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), CanvasError>;
}
