use image::GenericImageView;

use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    Srgb,
    Linear,
}

/// Decoded RGBA8 texture data.
#[derive(Debug, Clone)]
pub struct Texture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub data: Vec<u8>,
}

impl Texture {
    #[must_use]
    pub fn new(name: &str, width: u32, height: u32, color_space: ColorSpace, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            color_space,
            data,
        }
    }

    /// 1x1 texture of a single RGBA colour.
    #[must_use]
    pub fn solid(name: &str, rgba: [u8; 4], color_space: ColorSpace) -> Self {
        Self::new(name, 1, 1, color_space, rgba.to_vec())
    }

    /// Decodes any image format enabled on the `image` crate into RGBA8.
    pub fn decode(name: &str, bytes: &[u8], color_space: ColorSpace) -> Result<Self> {
        let img = image::load_from_memory(bytes)?;
        let (width, height) = img.dimensions();
        Ok(Self::new(
            name,
            width,
            height,
            color_space,
            img.to_rgba8().into_vec(),
        ))
    }
}
