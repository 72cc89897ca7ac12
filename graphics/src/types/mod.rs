//! Common types and lookup tables for device resources.
//!
//! This module contains the component-type and texture-format tables, usage
//! enums, state enums and flag sets used throughout the device API.

mod buffer;
mod common;
mod component;
mod texture;

pub use buffer::{BufferAccess, BufferUsage};
pub use common::{
    BlendFactor, ClearFlags, FaceType, PrimitiveType, RenderState, RenderStates, ShaderStage,
    WindowParam,
};
pub use component::ComponentType;
pub use texture::TextureFormat;

/// Maximum number of simultaneously bound vertex stream slots.
pub const MAX_VERTEX_STREAM_COUNT: usize = 32;

/// Number of texture units the device can bind at once.
pub const MAX_TEXTURE_UNITS: usize = 32;

/// Size of each stage's constant register file, in 4-component vectors.
pub const MAX_CONSTANT_REGISTERS: usize = 256;
