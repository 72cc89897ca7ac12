//! # SoftGPU Graphics
//!
//! A graphics device implemented entirely in host memory.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsDevice`] - buffers, declarations, textures, programs, render
//!   targets, constant registers and draw calls behind one explicitly owned
//!   device value
//! - [`HandleTable`] - generation-checked arena handing out typed [`Handle`]s
//! - [`vertex`] - vertex declarations, stream bindings and the indexed
//!   vertex gather
//! - [`types`] - component/format lookup tables and state enums
//!
//! The device never rasterizes or shades. It keeps the bookkeeping and data
//! movement of a GPU API (clears, mapping, stride-based gather, register
//! uploads, render-target redirection) so rendering code can run
//! deterministically in tests and headless builds.
//!
//! ## Example
//!
//! ```ignore
//! use softgpu_graphics::{
//!     BufferUsage, ComponentType, DeviceParams, GraphicsDevice, PrimitiveType, VertexElement,
//! };
//!
//! let mut device = GraphicsDevice::new(DeviceParams::new(64, 64))?;
//! let vb = device.new_vertex_buffer(bytemuck::cast_slice(&positions), BufferUsage::StaticDraw)?;
//! let ib = device.new_index_buffer(bytemuck::cast_slice(&[0u16, 1, 2]), BufferUsage::StaticDraw)?;
//! let decl = device.new_vertex_declaration(&[VertexElement::float(0, 3)])?;
//!
//! device.enable_vertex_declaration(decl, vb)?;
//! device.draw_elements(PrimitiveType::Triangles, 3, ComponentType::UnsignedShort, ib)?;
//! let gathered = device.gathered_stream(0);
//! device.disable_vertex_declaration(decl)?;
//! ```

pub mod constants;
pub mod device;
pub mod error;
pub mod handle;
pub mod resources;
pub mod types;
pub mod vertex;

// Re-export main types for convenience
pub use constants::RegisterFile;
pub use device::{
    ColorMask, DeviceParams, DeviceStats, FragmentProgramHandle, GraphicsDevice,
    IndexBufferHandle, RenderTargetHandle, ResourceCounts, TextureHandle,
    VertexBufferHandle, VertexDeclarationHandle, VertexProgramHandle,
};
pub use error::{ErrorKind, GraphicsError};
pub use handle::{Handle, HandleTable};
pub use resources::{
    FragmentProgram, FrameBuffer, IndexBuffer, RenderTarget, Texture, VertexBuffer, VertexProgram,
};
pub use types::{
    BlendFactor, BufferAccess, BufferUsage, ClearFlags, ComponentType, FaceType, PrimitiveType,
    RenderState, RenderStates, ShaderStage, TextureFormat, WindowParam, MAX_CONSTANT_REGISTERS,
    MAX_TEXTURE_UNITS, MAX_VERTEX_STREAM_COUNT,
};
pub use vertex::{VertexDeclaration, VertexElement, VertexStream};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
