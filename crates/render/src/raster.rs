use crate::canvas::{Canvas2d, CanvasError, CompositeCanvas};
use crate::font::{GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH, glyph_rows};
use crate::texture::ImageData;
use ribbit_common::{Color, Rect, Vec2d};

type PremulRgba8 = [u8; 4];

/// CPU canvas backed by a premultiplied RGBA8 buffer.
///
/// A pixel is covered by a shape when its center lies inside the shape; there
/// is no antialiasing. Used by native hosts and by tests, which read pixels
/// back to check what was drawn.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidSize { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        })
    }

    /// Raw premultiplied RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Straight-alpha color at (x, y), or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        let p = [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ];
        Some(unpremultiply(p))
    }

    /// Copy of the canvas as straight-alpha RGBA8, ready for image encoders.
    pub fn to_rgba_image(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(4)
            .flat_map(|p| unpremultiply([p[0], p[1], p[2], p[3]]).to_array())
            .collect()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    fn blend_pixel(&mut self, x: u32, y: u32, src: PremulRgba8) {
        let i = self.index(x, y);
        let dst = [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ];
        self.pixels[i..i + 4].copy_from_slice(&over(dst, src, 1.0));
    }

    /// Pixel index range whose centers fall in `[lo, hi)`, clamped to `limit`.
    fn span(lo: f32, hi: f32, limit: u32) -> std::ops::Range<u32> {
        let start = (lo - 0.5).ceil().max(0.0);
        let end = (hi - 0.5).ceil().min(limit as f32);
        if end <= start {
            return 0..0;
        }
        start as u32..end as u32
    }

    /// Blend `color` into every pixel whose center satisfies `covered`,
    /// scanning only the clamped bounding box.
    fn fill_where(&mut self, bbox: Rect, color: Color, covered: impl Fn(Vec2d) -> bool) {
        let src = premultiply(color);
        if src[3] == 0 {
            return;
        }
        let xs = Self::span(bbox.left(), bbox.right(), self.width);
        let ys = Self::span(bbox.top(), bbox.bottom(), self.height);
        for y in ys {
            for x in xs.clone() {
                if covered(Vec2d::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    self.blend_pixel(x, y, src);
                }
            }
        }
    }
}

impl Canvas2d for RasterCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_where(rect, color, |_| true);
    }

    fn fill_circle(&mut self, center: Vec2d, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let bbox = Rect::centered(center, Vec2d::splat(radius * 2.0));
        let r2 = radius * radius;
        self.fill_where(bbox, color, |p| p.sub(center).length_squared() <= r2);
    }

    fn draw_line(&mut self, from: Vec2d, to: Vec2d, color: Color, line_width: f32) {
        let half = line_width.max(1.0) / 2.0;
        let min = Vec2d::new(from.x.min(to.x) - half, from.y.min(to.y) - half);
        let max = Vec2d::new(from.x.max(to.x) + half, from.y.max(to.y) + half);
        let bbox = Rect {
            origin: min,
            size: max - min,
        };
        self.fill_where(bbox, color, |p| distance_to_segment(p, from, to) <= half);
    }

    fn draw_image(&mut self, image: &ImageData, src: Rect, dest: Rect) {
        if dest.size.x <= 0.0 || dest.size.y <= 0.0 {
            return;
        }
        let xs = Self::span(dest.left(), dest.right(), self.width);
        let ys = Self::span(dest.top(), dest.bottom(), self.height);
        let sx = src.size.x / dest.size.x;
        let sy = src.size.y / dest.size.y;
        for y in ys {
            let v = src.top() + (y as f32 + 0.5 - dest.top()) * sy;
            if v < 0.0 {
                continue;
            }
            for x in xs.clone() {
                let u = src.left() + (x as f32 + 0.5 - dest.left()) * sx;
                if u < 0.0 {
                    continue;
                }
                if let Some(texel) = image.pixel(u as u32, v as u32) {
                    let p = premultiply(texel);
                    if p[3] != 0 {
                        self.blend_pixel(x, y, p);
                    }
                }
            }
        }
    }

    fn fill_text(&mut self, text: &str, position: Vec2d, color: Color, size: f32) {
        let scale = (size / GLYPH_HEIGHT as f32).round().max(1.0);
        for (i, c) in text.chars().enumerate() {
            let origin_x = position.x + (i as u32 * GLYPH_ADVANCE) as f32 * scale;
            for (row, bits) in glyph_rows(c).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                        let cell = Rect::new(
                            origin_x + col as f32 * scale,
                            position.y + row as f32 * scale,
                            scale,
                            scale,
                        );
                        self.fill_rect(cell, color);
                    }
                }
            }
        }
    }
}

impl CompositeCanvas for RasterCanvas {
    fn create(width: u32, height: u32) -> Result<Self, CanvasError> {
        Self::new(width, height)
    }

    fn composite(&mut self, source: &Self, opacity: f32) {
        if source.width != self.width || source.height != self.height {
            tracing::warn!(
                dst = ?(self.width, self.height),
                src = ?(source.width, source.height),
                "skipping composite of mismatched canvas"
            );
            return;
        }
        for (d, s) in self
            .pixels
            .chunks_exact_mut(4)
            .zip(source.pixels.chunks_exact(4))
        {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
            d.copy_from_slice(&out);
        }
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), CanvasError> {
        *self = Self::new(width, height)?;
        Ok(())
    }
}

fn distance_to_segment(p: Vec2d, a: Vec2d, b: Vec2d) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn premultiply(c: Color) -> PremulRgba8 {
    let a = u16::from(c.a);
    [
        mul_div255(u16::from(c.r), a),
        mul_div255(u16::from(c.g), a),
        mul_div255(u16::from(c.b), a),
        c.a,
    ]
}

fn unpremultiply(p: PremulRgba8) -> Color {
    let a = p[3];
    if a == 0 {
        return Color::TRANSPARENT;
    }
    let un = |c: u8| ((u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8;
    Color::rgba(un(p[0]), un(p[1]), un(p[2]), a)
}

/// Premultiplied source-over.
fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }
    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(w: u32, h: u32) -> RasterCanvas {
        RasterCanvas::new(w, h).unwrap()
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            RasterCanvas::new(0, 10),
            Err(CanvasError::InvalidSize { .. })
        ));
    }

    #[test]
    fn starts_transparent() {
        let c = canvas(4, 4);
        assert_eq!(c.pixel(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(c.pixel(4, 0), None);
    }

    #[test]
    fn fill_rect_covers_pixel_centers_only() {
        let mut c = canvas(10, 10);
        c.fill_rect(Rect::new(2.0, 2.0, 3.0, 3.0), Color::RED);
        assert_eq!(c.pixel(2, 2), Some(Color::RED));
        assert_eq!(c.pixel(4, 4), Some(Color::RED));
        assert_eq!(c.pixel(5, 5), Some(Color::TRANSPARENT));
        assert_eq!(c.pixel(1, 2), Some(Color::TRANSPARENT));
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut c = canvas(4, 4);
        c.fill_rect(Rect::new(-10.0, -10.0, 100.0, 100.0), Color::BLUE);
        assert!(
            c.to_rgba_image()
                .chunks_exact(4)
                .all(|p| p == [0, 0, 255, 255])
        );
    }

    #[test]
    fn clear_resets_to_transparent() {
        let mut c = canvas(2, 2);
        c.fill(Color::WHITE);
        c.clear();
        assert_eq!(c.pixel(1, 1), Some(Color::TRANSPARENT));
    }

    #[test]
    fn circle_covers_center_not_corner() {
        let mut c = canvas(20, 20);
        c.fill_circle(Vec2d::new(10.0, 10.0), 5.0, Color::GREEN);
        assert_eq!(c.pixel(10, 10), Some(Color::GREEN));
        assert_eq!(c.pixel(5, 5), Some(Color::TRANSPARENT));
    }

    #[test]
    fn line_is_drawn_between_endpoints() {
        let mut c = canvas(10, 10);
        c.draw_line(Vec2d::new(0.0, 5.5), Vec2d::new(10.0, 5.5), Color::WHITE, 1.0);
        assert_eq!(c.pixel(0, 5), Some(Color::WHITE));
        assert_eq!(c.pixel(9, 5), Some(Color::WHITE));
        assert_eq!(c.pixel(5, 2), Some(Color::TRANSPARENT));
    }

    #[test]
    fn stroke_rect_leaves_interior_empty() {
        let mut c = canvas(10, 10);
        c.stroke_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::RED, 1.0);
        assert_eq!(c.pixel(0, 0), Some(Color::RED));
        assert_eq!(c.pixel(9, 9), Some(Color::RED));
        assert_eq!(c.pixel(5, 5), Some(Color::TRANSPARENT));
    }

    #[test]
    fn half_alpha_blends_over_opaque() {
        let mut c = canvas(1, 1);
        c.fill(Color::BLACK);
        c.fill(Color::rgba(255, 255, 255, 128));
        let p = c.pixel(0, 0).unwrap();
        assert_eq!(p.a, 255);
        assert!((127..=129).contains(&p.r), "{p:?}");
    }

    #[test]
    fn draw_image_scales_nearest_neighbour() {
        let img = ImageData::new(
            2,
            1,
            vec![255, 0, 0, 255, 0, 0, 255, 255], // red, blue
        )
        .unwrap();
        let mut c = canvas(4, 2);
        c.draw_image(&img, img.bounds(), Rect::new(0.0, 0.0, 4.0, 2.0));
        assert_eq!(c.pixel(0, 0), Some(Color::RED));
        assert_eq!(c.pixel(1, 1), Some(Color::RED));
        assert_eq!(c.pixel(2, 0), Some(Color::BLUE));
        assert_eq!(c.pixel(3, 1), Some(Color::BLUE));
    }

    #[test]
    fn transparent_texels_are_skipped() {
        let img = ImageData::solid(1, 1, Color::TRANSPARENT).unwrap();
        let mut c = canvas(1, 1);
        c.fill(Color::GREEN);
        c.draw_image(&img, img.bounds(), c.bounds());
        assert_eq!(c.pixel(0, 0), Some(Color::GREEN));
    }

    #[test]
    fn text_sets_glyph_pixels() {
        let mut c = canvas(8, 5);
        c.fill_text("1", Vec2d::ZERO, Color::WHITE, 5.0);
        // '1' has its stem in the middle column on every row
        for y in 0..5 {
            assert_eq!(c.pixel(1, y), Some(Color::WHITE));
        }
        assert_eq!(c.pixel(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn composite_respects_opacity() {
        let mut dst = canvas(1, 1);
        let mut src = canvas(1, 1);
        src.fill(Color::RED);
        dst.composite(&src, 0.0);
        assert_eq!(dst.pixel(0, 0), Some(Color::TRANSPARENT));
        dst.composite(&src, 1.0);
        assert_eq!(dst.pixel(0, 0), Some(Color::RED));
    }

    #[test]
    fn composite_skips_mismatched_sizes() {
        let mut dst = canvas(2, 2);
        let mut src = canvas(1, 1);
        src.fill(Color::RED);
        dst.composite(&src, 1.0);
        assert_eq!(dst.pixel(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn resize_clears() {
        let mut c = canvas(2, 2);
        c.fill(Color::RED);
        c.resize(3, 1).unwrap();
        assert_eq!((c.width(), c.height()), (3, 1));
        assert_eq!(c.pixel(0, 0), Some(Color::TRANSPARENT));
    }
}
