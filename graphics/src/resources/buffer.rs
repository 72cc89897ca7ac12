//! Vertex and index buffer storage.

use crate::error::GraphicsError;
use crate::types::{BufferAccess, BufferUsage};

/// Host-memory backing store shared by vertex and index buffers.
///
/// A buffer owns its bytes and at most one outstanding scratch copy
/// handed out by [`map`](Self::map). While mapped, the backing store can
/// only change through [`unmap`](Self::unmap).
pub struct BufferStorage {
    data: Vec<u8>,
    usage: BufferUsage,
    mapped: Option<MappedCopy>,
}

struct MappedCopy {
    access: BufferAccess,
    bytes: Vec<u8>,
}

impl BufferStorage {
    pub(crate) fn new(data: Vec<u8>, usage: BufferUsage) -> Self {
        Self {
            data,
            usage,
            mapped: None,
        }
    }

    /// Get the buffer contents.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the buffer size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Get the usage hint given at the last upload.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Returns true while a scratch copy is outstanding.
    pub fn is_mapped(&self) -> bool {
        self.mapped.is_some()
    }

    fn ensure_unmapped(&self) -> Result<(), GraphicsError> {
        if self.is_mapped() {
            return Err(GraphicsError::BufferMapped);
        }
        Ok(())
    }

    /// Replace the whole contents (and size) of the buffer.
    pub(crate) fn set_data(&mut self, data: &[u8], usage: BufferUsage) -> Result<(), GraphicsError> {
        self.ensure_unmapped()?;
        self.data.clear();
        self.data.extend_from_slice(data);
        self.usage = usage;
        Ok(())
    }

    /// Overwrite `data.len()` bytes starting at `offset`.
    pub(crate) fn set_sub_data(&mut self, offset: usize, data: &[u8]) -> Result<(), GraphicsError> {
        self.ensure_unmapped()?;
        let len = self.data.len();
        let target = offset
            .checked_add(data.len())
            .and_then(|end| self.data.get_mut(offset..end))
            .ok_or(GraphicsError::OutOfBounds {
                offset,
                size: data.len(),
                len,
            })?;
        target.copy_from_slice(data);
        Ok(())
    }

    /// Hand out a scratch copy of the full buffer.
    pub(crate) fn map(&mut self, access: BufferAccess) -> Result<&mut [u8], GraphicsError> {
        if self.mapped.is_some() {
            return Err(GraphicsError::BufferAlreadyMapped);
        }
        let mapped = self.mapped.insert(MappedCopy {
            access,
            bytes: self.data.clone(),
        });
        Ok(&mut mapped.bytes)
    }

    /// Copy the scratch bytes back into the backing store and release them.
    pub(crate) fn unmap(&mut self) -> Result<BufferAccess, GraphicsError> {
        let mapped = self.mapped.take().ok_or(GraphicsError::BufferNotMapped)?;
        self.data = mapped.bytes;
        Ok(mapped.access)
    }
}

impl std::fmt::Debug for BufferStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferStorage")
            .field("size", &self.data.len())
            .field("usage", &self.usage)
            .field("mapped", &self.is_mapped())
            .finish()
    }
}

/// A vertex buffer.
#[derive(Debug)]
pub struct VertexBuffer {
    pub(crate) storage: BufferStorage,
}

/// An index buffer.
#[derive(Debug)]
pub struct IndexBuffer {
    pub(crate) storage: BufferStorage,
}

impl VertexBuffer {
    pub(crate) fn new(data: Vec<u8>, usage: BufferUsage) -> Self {
        Self {
            storage: BufferStorage::new(data, usage),
        }
    }

    /// Get the underlying storage.
    pub fn storage(&self) -> &BufferStorage {
        &self.storage
    }
}

impl IndexBuffer {
    pub(crate) fn new(data: Vec<u8>, usage: BufferUsage) -> Self {
        Self {
            storage: BufferStorage::new(data, usage),
        }
    }

    /// Get the underlying storage.
    pub fn storage(&self) -> &BufferStorage {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_debug() {
        let buffer = BufferStorage::new(vec![0; 1024], BufferUsage::StaticDraw);
        let debug = format!("{:?}", buffer);
        assert!(debug.contains("BufferStorage"));
        assert!(debug.contains("1024"));
    }

    #[test]
    fn test_map_unmap_writes_back() {
        let mut buffer = BufferStorage::new(vec![1, 2, 3, 4], BufferUsage::DynamicDraw);
        let scratch = buffer.map(BufferAccess::ReadWrite).unwrap();
        scratch[0] = 9;
        // Backing store is untouched until unmap
        assert_eq!(buffer.data(), &[1, 2, 3, 4]);
        buffer.unmap().unwrap();
        assert_eq!(buffer.data(), &[9, 2, 3, 4]);
        assert!(!buffer.is_mapped());
    }

    #[test]
    fn test_double_map_rejected() {
        let mut buffer = BufferStorage::new(vec![0; 4], BufferUsage::StaticDraw);
        buffer.map(BufferAccess::ReadOnly).unwrap();
        assert_eq!(
            buffer.map(BufferAccess::ReadOnly).unwrap_err(),
            GraphicsError::BufferAlreadyMapped
        );
    }

    #[test]
    fn test_unmap_without_map() {
        let mut buffer = BufferStorage::new(vec![0; 4], BufferUsage::StaticDraw);
        assert_eq!(buffer.unmap().unwrap_err(), GraphicsError::BufferNotMapped);
    }

    #[test]
    fn test_sub_data_bounds() {
        let mut buffer = BufferStorage::new(vec![0; 4], BufferUsage::StaticDraw);
        buffer.set_sub_data(2, &[7, 8]).unwrap();
        assert_eq!(buffer.data(), &[0, 0, 7, 8]);
        assert_eq!(
            buffer.set_sub_data(3, &[1, 2]).unwrap_err(),
            GraphicsError::OutOfBounds {
                offset: 3,
                size: 2,
                len: 4
            }
        );
    }

    #[test]
    fn test_mutation_while_mapped_rejected() {
        let mut buffer = BufferStorage::new(vec![0; 4], BufferUsage::StaticDraw);
        buffer.map(BufferAccess::WriteOnly).unwrap();
        assert_eq!(
            buffer.set_data(&[1], BufferUsage::StaticDraw).unwrap_err(),
            GraphicsError::BufferMapped
        );
        assert_eq!(
            buffer.set_sub_data(0, &[1]).unwrap_err(),
            GraphicsError::BufferMapped
        );
    }
}
