//! Texture loading.

use std::path::Path;

use gltoolbox_core::ToolboxError;
use image::RgbaImage;

use crate::backend::{RenderBackend, TextureId};
use crate::error::RenderResult;

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureWrap {
    Repeat,
    #[default]
    Clamp,
}

impl TextureWrap {
    #[must_use]
    pub fn from_repeat(repeat: bool) -> Self {
        if repeat {
            Self::Repeat
        } else {
            Self::Clamp
        }
    }
}

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
    pub wrap: TextureWrap,
}

impl TextureImage {
    /// Decodes an image file. Any format the `image` crate reads is accepted.
    pub fn load(path: impl AsRef<Path>, repeat: bool) -> RenderResult<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)?.to_rgba8();
        log::info!(
            "loaded texture '{}' ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        Ok(Self::from_image(decoded, TextureWrap::from_repeat(repeat)))
    }

    /// Wraps an already decoded image.
    #[must_use]
    pub fn from_image(image: RgbaImage, wrap: TextureWrap) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
            wrap,
        }
    }

    /// Wraps raw RGBA8 pixels.
    pub fn from_rgba8(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        wrap: TextureWrap,
    ) -> RenderResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(ToolboxError::InvalidArgument(format!(
                "{width}x{height} texture needs {expected} bytes, got {}",
                pixels.len()
            ))
            .into());
        }
        Ok(Self {
            width,
            height,
            pixels,
            wrap,
        })
    }

    /// Returns the RGBA value at `(x, y)`, `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels
            .get(start..start + 4)
            .and_then(|p| p.try_into().ok())
    }
}

/// Loads an image file and uploads it through the backend.
pub fn load_texture(
    backend: &mut dyn RenderBackend,
    path: impl AsRef<Path>,
    repeat: bool,
) -> RenderResult<TextureId> {
    let image = TextureImage::load(path, repeat)?;
    Ok(backend.create_texture(&image))
}
