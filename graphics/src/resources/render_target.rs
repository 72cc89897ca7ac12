//! Off-screen render target.

use crate::handle::Handle;

use super::framebuffer::FrameBuffer;
use super::texture::Texture;

/// An off-screen destination: one owned texture plus a private framebuffer.
///
/// Binding a target redirects device clears and draws to its framebuffer.
/// The texture lives in the device texture table so it can be bound like
/// any other texture, but it is created and destroyed with the target.
pub struct RenderTarget {
    texture: Handle<Texture>,
    framebuffer: FrameBuffer,
}

impl RenderTarget {
    pub(crate) fn new(texture: Handle<Texture>, framebuffer: FrameBuffer) -> Self {
        Self {
            texture,
            framebuffer,
        }
    }

    /// Get the target's color texture.
    pub fn texture(&self) -> Handle<Texture> {
        self.texture
    }

    /// Get the target's framebuffer.
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub(crate) fn framebuffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.framebuffer
    }

    /// Get the width in pixels.
    pub fn width(&self) -> u32 {
        self.framebuffer.width()
    }

    /// Get the height in pixels.
    pub fn height(&self) -> u32 {
        self.framebuffer.height()
    }
}

impl std::fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTarget")
            .field("texture", &self.texture)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
