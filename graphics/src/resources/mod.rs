//! Device-owned resources.
//!
//! This module contains the host-memory resource types stored by
//! [`GraphicsDevice`]:
//! - [`VertexBuffer`] / [`IndexBuffer`] - raw geometry bytes with map/unmap
//! - [`Texture`] - 2D pixel data
//! - [`Program`] - opaque vertex/fragment program bytes
//! - [`FrameBuffer`] - color/depth/accumulation/stencil planes
//! - [`RenderTarget`] - an off-screen texture plus private framebuffer
//!
//! Resources never leave the device; clients hold generation-checked
//! handles and read them back through device accessors.
//!
//! [`GraphicsDevice`]: crate::GraphicsDevice

mod buffer;
mod framebuffer;
mod program;
mod render_target;
mod texture;

pub use buffer::{BufferStorage, IndexBuffer, VertexBuffer};
pub use framebuffer::FrameBuffer;
pub use program::{FragmentProgram, FragmentStage, Program, ProgramStage, VertexProgram, VertexStage};
pub use render_target::RenderTarget;
pub use texture::Texture;
