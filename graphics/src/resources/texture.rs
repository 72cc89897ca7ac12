//! Texture resource.

use crate::error::GraphicsError;
use crate::handle::Handle;
use crate::types::TextureFormat;

use super::render_target::RenderTarget;

/// 2D pixel data.
///
/// A texture is created empty and receives its image through
/// [`GraphicsDevice::set_texture_data`](crate::GraphicsDevice::set_texture_data).
/// Textures created for a render target record their owner and are
/// released together with it.
pub struct Texture {
    data: Option<Vec<u8>>,
    width: u32,
    height: u32,
    format: TextureFormat,
    owner: Option<Handle<RenderTarget>>,
}

impl Texture {
    pub(crate) fn new() -> Self {
        Self {
            data: None,
            width: 0,
            height: 0,
            format: TextureFormat::default(),
            owner: None,
        }
    }

    pub(crate) fn set_owner(&mut self, owner: Handle<RenderTarget>) {
        self.owner = Some(owner);
    }

    /// Replace the image. Empty `data` allocates a zeroed image.
    pub(crate) fn upload(
        &mut self,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: &[u8],
    ) -> Result<(), GraphicsError> {
        let expected = format.image_size(width, height);
        if !data.is_empty() && data.len() != expected {
            return Err(GraphicsError::TextureDataSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let mut pixels = vec![0u8; expected];
        if !data.is_empty() {
            pixels.copy_from_slice(data);
        }
        self.data = Some(pixels);
        self.width = width;
        self.height = height;
        self.format = format;
        Ok(())
    }

    /// Get the pixel data, if any has been uploaded.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Get the texture width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the texture height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the texture format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Get the render target owning this texture, if any.
    pub fn owner(&self) -> Option<Handle<RenderTarget>> {
        self.owner
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}
