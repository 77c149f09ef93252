//! Sprite textures.
//!
//! Each particle is drawn as a square sprite whose texture is multiplied by
//! the particle's color and opacity. Textures are loaded from image files
//! (PNG or JPEG) or generated procedurally.
//!
//! The sprite texture should be white with an alpha falloff; the particle
//! color tints it.

use std::path::Path;

use crate::error::TextureError;

/// RGBA8 image ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureConfig {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureConfig {
    /// Texture from raw RGBA data (4 bytes per pixel).
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Load a texture from an image file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| TextureError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
        })
    }

    /// Soft round spark: white, opaque in the middle, fading to transparent
    /// at the edge.
    pub fn spark(size: u32) -> Self {
        let size = size.max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        let center = (size as f32 - 1.0) * 0.5;
        let radius = (size as f32 * 0.5).max(f32::EPSILON);

        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 - center) / radius;
                let dy = (y as f32 - center) / radius;
                let d = (dx * dx + dy * dy).sqrt();
                // Quadratic falloff reads as a glow rather than a disc.
                let falloff = (1.0 - d).clamp(0.0, 1.0);
                let alpha = (falloff * falloff * 255.0).round() as u8;
                data.extend_from_slice(&[255, 255, 255, alpha]);
            }
        }

        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// Alpha of the pixel at `(x, y)`.
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.data[((y * self.width + x) * 4 + 3) as usize]
    }
}
