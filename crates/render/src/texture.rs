use ribbit_common::{Color, Rect, Vec2d};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Decoded image pixels: straight (non-premultiplied) RGBA8, row-major.
///
/// Pixel data is shared, so cloning an `ImageData` is cheap.
#[derive(Debug, Clone)]
pub struct ImageData {
    key: u64,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImageDataError {
    #[error("image has zero width or height ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("expected {expected} bytes for {width}x{height} rgba8, got {actual}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

impl ImageData {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, ImageDataError> {
        if width == 0 || height == 0 {
            return Err(ImageDataError::Empty { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(ImageDataError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            key: next_image_key(),
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Image of one solid color.
    pub fn solid(width: u32, height: u32, color: Color) -> Result<Self, ImageDataError> {
        let pixels = color
            .to_array()
            .into_iter()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, pixels)
    }

    /// Process-unique key for this pixel buffer. Backends use it to cache
    /// uploaded copies of the image.
    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2d {
        Vec2d::new(self.width as f32, self.height as f32)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at (x, y), or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[i..i + 4];
        Some(Color::rgba(p[0], p[1], p[2], p[3]))
    }
}

fn next_image_key() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// Anything a component can paint with: a flat color or an image.
#[derive(Debug, Clone)]
pub enum Texture {
    Color(Color),
    Image(ImageData),
}

impl Texture {
    /// Natural size of the texture. Colors have no intrinsic size.
    pub fn size(&self) -> Option<Vec2d> {
        match self {
            Self::Color(_) => None,
            Self::Image(img) => Some(img.size()),
        }
    }

    pub fn as_image(&self) -> Option<&ImageData> {
        match self {
            Self::Image(img) => Some(img),
            Self::Color(_) => None,
        }
    }
}

impl From<Color> for Texture {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}

impl From<ImageData> for Texture {
    fn from(img: ImageData) -> Self {
        Self::Image(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        let err = ImageData::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            ImageDataError::SizeMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            ImageData::new(0, 4, vec![]),
            Err(ImageDataError::Empty { .. })
        ));
    }

    #[test]
    fn solid_fills_every_pixel() {
        let img = ImageData::solid(3, 2, Color::rgb(9, 8, 7)).unwrap();
        assert_eq!(img.pixels().len(), 24);
        assert_eq!(img.pixel(2, 1), Some(Color::rgb(9, 8, 7)));
        assert_eq!(img.pixel(3, 0), None);
    }

    #[test]
    fn keys_are_unique_but_clones_share() {
        let a = ImageData::solid(1, 1, Color::RED).unwrap();
        let b = ImageData::solid(1, 1, Color::RED).unwrap();
        assert_ne!(a.key(), b.key());
        assert_eq!(a.clone().key(), a.key());
    }

    #[test]
    fn texture_size() {
        assert_eq!(Texture::Color(Color::RED).size(), None);
        let img = ImageData::solid(4, 5, Color::RED).unwrap();
        assert_eq!(Texture::from(img).size(), Some(Vec2d::new(4.0, 5.0)));
    }
}
