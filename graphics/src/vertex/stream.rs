//! Vertex stream bindings and the index-driven gather.

use crate::error::GraphicsError;
use crate::handle::{Handle, HandleTable};
use crate::resources::VertexBuffer;
use crate::types::{ComponentType, MAX_VERTEX_STREAM_COUNT};

/// One bound stream slot: a byte range of a vertex buffer read with a
/// fixed per-vertex size and record stride.
///
/// The binding names its source by handle, so deleting or resizing the
/// buffer can never leave it pointing at freed memory; a stale source is
/// reported when the next draw resolves it.
#[derive(Debug, Clone)]
pub struct VertexStream {
    buffer: Handle<VertexBuffer>,
    offset: usize,
    vertex_size: usize,
    stride: usize,
    gathered: Option<Vec<u8>>,
}

impl VertexStream {
    /// Bind `count` components of `component_type` read from `buffer`.
    ///
    /// A `stride` of zero means tightly packed records.
    pub fn new(
        buffer: Handle<VertexBuffer>,
        offset: usize,
        count: u16,
        component_type: ComponentType,
        stride: usize,
    ) -> Self {
        let vertex_size = count as usize * component_type.size();
        Self {
            buffer,
            offset,
            vertex_size,
            stride: if stride == 0 { vertex_size } else { stride },
            gathered: None,
        }
    }

    /// Source vertex buffer.
    pub fn buffer(&self) -> Handle<VertexBuffer> {
        self.buffer
    }

    /// Byte offset of the first vertex within the source buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes copied per vertex.
    pub fn vertex_size(&self) -> usize {
        self.vertex_size
    }

    /// Bytes between consecutive vertex records.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Gather buffer produced by the last indexed draw, if any.
    pub fn gathered(&self) -> Option<&[u8]> {
        self.gathered.as_deref()
    }

    fn gather(&self, source: &[u8], indices: &[u32]) -> Result<Vec<u8>, GraphicsError> {
        let mut gathered = Vec::with_capacity(self.vertex_size * indices.len());
        for &index in indices {
            let start = (index as usize)
                .checked_mul(self.stride)
                .and_then(|start| start.checked_add(self.offset));
            let bytes = start
                .and_then(|start| source.get(start..start.checked_add(self.vertex_size)?))
                .ok_or(GraphicsError::OutOfBounds {
                    offset: start.unwrap_or(usize::MAX),
                    size: self.vertex_size,
                    len: source.len(),
                })?;
            gathered.extend_from_slice(bytes);
        }
        Ok(gathered)
    }
}

/// The device's stream slot table.
///
/// Slots are bound between an enable/disable bracket and must be disabled
/// before they can be bound again.
pub struct VertexStreamTable {
    streams: [Option<VertexStream>; MAX_VERTEX_STREAM_COUNT],
}

impl VertexStreamTable {
    /// Create a table with every slot unbound.
    pub fn new() -> Self {
        Self {
            streams: std::array::from_fn(|_| None),
        }
    }

    fn check_slot(stream: u16) -> Result<usize, GraphicsError> {
        let slot = stream as usize;
        if slot >= MAX_VERTEX_STREAM_COUNT {
            return Err(GraphicsError::InvalidParameter(format!(
                "vertex stream {} exceeds maximum {}",
                stream,
                MAX_VERTEX_STREAM_COUNT - 1
            )));
        }
        Ok(slot)
    }

    /// Bind a slot.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::StreamAlreadyBound`] if the slot has not been
    /// disabled since its last binding.
    pub fn bind(&mut self, stream: u16, binding: VertexStream) -> Result<(), GraphicsError> {
        let slot = Self::check_slot(stream)?;
        if self.streams[slot].is_some() {
            return Err(GraphicsError::StreamAlreadyBound(stream));
        }
        self.streams[slot] = Some(binding);
        Ok(())
    }

    /// Release a slot together with its gather buffer.
    pub fn unbind(&mut self, stream: u16) -> Result<Option<VertexStream>, GraphicsError> {
        let slot = Self::check_slot(stream)?;
        Ok(self.streams[slot].take())
    }

    /// Release every slot.
    pub fn clear(&mut self) {
        self.streams.iter_mut().for_each(|stream| *stream = None);
    }

    /// Get the binding of a slot.
    pub fn get(&self, stream: u16) -> Option<&VertexStream> {
        self.streams.get(stream as usize).and_then(Option::as_ref)
    }

    /// Returns true if the slot is bound.
    pub fn is_bound(&self, stream: u16) -> bool {
        self.get(stream).is_some()
    }

    /// Iterate over bound slots in slot order.
    pub fn active(&self) -> impl Iterator<Item = (u16, &VertexStream)> {
        self.streams
            .iter()
            .enumerate()
            .filter_map(|(slot, stream)| stream.as_ref().map(|stream| (slot as u16, stream)))
    }

    /// Number of bound slots.
    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Gather `count` vertices per bound stream in index order.
    ///
    /// Position `i` of each stream's gather buffer holds the vertex named by
    /// the `i`-th index. Every index and every source range is validated
    /// before any gather buffer is replaced, so a failed gather leaves the
    /// results of the previous draw in place. Returns the number of
    /// vertices gathered per stream.
    pub fn gather(
        &mut self,
        buffers: &HandleTable<VertexBuffer>,
        indices: &[u8],
        index_type: ComponentType,
        count: usize,
    ) -> Result<usize, GraphicsError> {
        let positions = (0..count)
            .map(|position| index_type.read_index(indices, position))
            .collect::<Result<Vec<_>, _>>()?;

        let mut staged = Vec::new();
        for (slot, stream) in self.active() {
            let source = buffers
                .get(stream.buffer)
                .ok_or(GraphicsError::InvalidHandle("vertex buffer"))?;
            if source.storage.is_mapped() {
                return Err(GraphicsError::BufferMapped);
            }
            staged.push((slot, stream.gather(source.storage.data(), &positions)?));
        }

        for (slot, gathered) in staged {
            if let Some(stream) = self.streams[slot as usize].as_mut() {
                stream.gathered = Some(gathered);
            }
        }
        Ok(count)
    }
}

impl Default for VertexStreamTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VertexStreamTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.active()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BufferUsage;

    fn floats(values: &[f32]) -> Vec<u8> {
        bytemuck::cast_slice(values).to_vec()
    }

    fn u16_indices(values: &[u16]) -> Vec<u8> {
        bytemuck::cast_slice(values).to_vec()
    }

    #[test]
    fn test_double_bind_rejected() {
        let mut buffers = HandleTable::new();
        let vb = buffers.insert(VertexBuffer::new(vec![0; 16], BufferUsage::StaticDraw));
        let mut table = VertexStreamTable::new();
        table
            .bind(0, VertexStream::new(vb, 0, 1, ComponentType::Float, 0))
            .unwrap();
        assert_eq!(
            table
                .bind(0, VertexStream::new(vb, 0, 1, ComponentType::Float, 0))
                .unwrap_err(),
            GraphicsError::StreamAlreadyBound(0)
        );
        table.unbind(0).unwrap();
        assert!(table
            .bind(0, VertexStream::new(vb, 0, 1, ComponentType::Float, 0))
            .is_ok());
    }

    #[test]
    fn test_gather_follows_index_order() {
        let mut buffers = HandleTable::new();
        let data = floats(&[0.0, 1.0, 2.0, 3.0]);
        let vb = buffers.insert(VertexBuffer::new(data, BufferUsage::StaticDraw));
        let mut table = VertexStreamTable::new();
        table
            .bind(0, VertexStream::new(vb, 0, 1, ComponentType::Float, 4))
            .unwrap();

        let indices = u16_indices(&[3, 1, 1, 0]);
        let gathered = table
            .gather(&buffers, &indices, ComponentType::UnsignedShort, 4)
            .unwrap();
        assert_eq!(gathered, 4);
        let out: &[f32] = bytemuck::cast_slice(table.get(0).unwrap().gathered().unwrap());
        assert_eq!(out, &[3.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_gather_interleaved_offset() {
        let mut buffers = HandleTable::new();
        // Two records of (a, b)
        let data = floats(&[10.0, 11.0, 20.0, 21.0]);
        let vb = buffers.insert(VertexBuffer::new(data, BufferUsage::StaticDraw));
        let mut table = VertexStreamTable::new();
        table
            .bind(1, VertexStream::new(vb, 4, 1, ComponentType::Float, 8))
            .unwrap();

        table
            .gather(&buffers, &[1, 0], ComponentType::UnsignedByte, 2)
            .unwrap();
        let out: &[f32] = bytemuck::cast_slice(table.get(1).unwrap().gathered().unwrap());
        assert_eq!(out, &[21.0, 11.0]);
    }

    #[test]
    fn test_failed_gather_keeps_previous_result() {
        let mut buffers = HandleTable::new();
        let vb = buffers.insert(VertexBuffer::new(vec![1, 2, 3, 4], BufferUsage::StaticDraw));
        let mut table = VertexStreamTable::new();
        table
            .bind(0, VertexStream::new(vb, 0, 1, ComponentType::UnsignedByte, 1))
            .unwrap();
        table
            .gather(&buffers, &[3, 2], ComponentType::UnsignedByte, 2)
            .unwrap();

        let result = table.gather(&buffers, &[0, 9], ComponentType::UnsignedByte, 2);
        assert!(matches!(result, Err(GraphicsError::OutOfBounds { .. })));
        assert_eq!(table.get(0).unwrap().gathered(), Some(&[4u8, 3][..]));
    }

    #[test]
    fn test_gather_stale_buffer() {
        let mut buffers = HandleTable::new();
        let vb = buffers.insert(VertexBuffer::new(vec![0; 4], BufferUsage::StaticDraw));
        let mut table = VertexStreamTable::new();
        table
            .bind(0, VertexStream::new(vb, 0, 1, ComponentType::Float, 0))
            .unwrap();
        buffers.remove(vb);
        assert_eq!(
            table
                .gather(&buffers, &[0], ComponentType::UnsignedByte, 1)
                .unwrap_err(),
            GraphicsError::InvalidHandle("vertex buffer")
        );
    }
}
