//! Immediate-mode debug primitives.
//!
//! Lines and squares are accumulated in bounded per-frame lists and turned
//! into ordinary render objects when flushed with
//! [`RenderContext::draw_debug_2d`](crate::RenderContext::draw_debug_2d) or
//! [`RenderContext::draw_debug_3d`](crate::RenderContext::draw_debug_3d).

mod batch;
mod draw_api;
mod vertex;

pub use vertex::DebugVertex;

use softgpu_graphics::{
    BufferUsage, GraphicsDevice, PrimitiveType, VertexBufferHandle, VertexDeclarationHandle,
};

use crate::error::RenderError;
use batch::DebugBatch;

/// One debug list and the vertex buffer it is uploaded to.
#[derive(Debug)]
pub(crate) struct DebugList {
    batch: DebugBatch,
    buffer: VertexBufferHandle,
    primitive: PrimitiveType,
}

impl DebugList {
    fn new(
        device: &mut GraphicsDevice,
        capacity: usize,
        primitive: PrimitiveType,
    ) -> Result<Self, RenderError> {
        let size = capacity * std::mem::size_of::<DebugVertex>();
        Ok(Self {
            batch: DebugBatch::new(capacity),
            buffer: device.new_vertex_buffer_with_size(size, BufferUsage::StreamDraw)?,
            primitive,
        })
    }

    fn len(&self) -> usize {
        self.batch.len()
    }
}

/// Debug declaration, buffers and the three debug lists.
#[derive(Debug)]
pub(crate) struct DebugPrimitives {
    declaration: VertexDeclarationHandle,
    lines_2d: DebugList,
    squares_2d: DebugList,
    lines_3d: DebugList,
}

impl DebugPrimitives {
    pub(crate) fn new(device: &mut GraphicsDevice, capacity: usize) -> Result<Self, RenderError> {
        let declaration = device.new_vertex_declaration(&vertex::debug_vertex_elements())?;
        Ok(Self {
            declaration,
            lines_2d: DebugList::new(device, capacity, PrimitiveType::Lines)?,
            squares_2d: DebugList::new(device, capacity, PrimitiveType::Quads)?,
            lines_3d: DebugList::new(device, capacity, PrimitiveType::Lines)?,
        })
    }

    pub(crate) fn delete(self, device: &mut GraphicsDevice) -> Result<(), RenderError> {
        for list in [&self.lines_2d, &self.squares_2d, &self.lines_3d] {
            device.delete_vertex_buffer(list.buffer)?;
        }
        device.delete_vertex_declaration(self.declaration)?;
        Ok(())
    }

    /// Vertices waiting in all three lists.
    pub(crate) fn pending_vertices(&self) -> usize {
        self.lines_2d.len() + self.squares_2d.len() + self.lines_3d.len()
    }
}
