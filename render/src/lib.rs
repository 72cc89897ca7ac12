//! # SoftGPU Render
//!
//! Render object batching on top of [`softgpu_graphics`].
//!
//! ## Overview
//!
//! - [`RenderContext`] - camera, materials, render types, a render-target
//!   directory and a bounded per-frame queue of [`RenderObject`]s
//! - [`Predicate`] - a tag set selecting which queued objects a draw runs
//! - [`debug`] - immediate-mode lines and squares flushed through the same
//!   per-object draw path
//!
//! A frame looks like:
//!
//! ```ignore
//! device.clear(ClearFlags::COLOR | ClearFlags::DEPTH, [0, 0, 0, 255], 1.0, 0)?;
//! for object in visible_objects {
//!     context.add_to_render(object)?;
//! }
//! context.draw(&mut device, Some(&opaque))?;
//! context.draw(&mut device, Some(&transparent))?;
//! context.draw_debug_3d(&mut device)?;
//! context.clear_render_objects();
//! device.flip()?;
//! ```
//!
//! ## Vertex constant layout
//!
//! | Registers | Contents |
//! |-----------|----------|
//! | 0..4 | view-projection matrix columns |
//! | 4..8 | world transform columns |
//! | 8..12 | texture transform columns |
//! | 12..20 | user vertex constants 0..8 |
//!
//! User fragment constant `i` is written to fragment register `i`.

pub mod context;
pub mod debug;
pub mod error;
pub mod material;
pub mod object;
pub mod params;
pub mod predicate;

pub use context::{
    DrawStats, RenderContext, RenderTypeHandle, TEXTURE_TRANSFORM_REGISTER,
    USER_VERTEX_CONSTANT_REGISTER, VIEW_PROJECTION_REGISTER, WORLD_TRANSFORM_REGISTER,
};
pub use debug::DebugVertex;
pub use error::RenderError;
pub use material::{Material, MaterialHandle};
pub use object::{RenderObject, MAX_CONSTANT_COUNT, MAX_TEXTURE_COUNT};
pub use params::RenderContextParams;
pub use predicate::{Predicate, MAX_TAG_COUNT};
