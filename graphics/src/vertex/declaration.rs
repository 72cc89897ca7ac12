//! Vertex declarations.
//!
//! A declaration describes how stream slots pack into one interleaved
//! vertex record. Elements are stored by their stream slot number, not by
//! submission order, so the record layout is always slot order:
//!
//! ```ignore
//! // position (3 floats) in slot 0, color (4 unsigned bytes) in slot 1
//! let declaration = VertexDeclaration::new(&[
//!     VertexElement::new(1, 4, ComponentType::UnsignedByte),
//!     VertexElement::new(0, 3, ComponentType::Float),
//! ])?;
//! assert_eq!(declaration.stride(), 16);
//! assert_eq!(declaration.stream_offset(1), Some(12));
//! ```

use crate::error::GraphicsError;
use crate::types::{ComponentType, MAX_VERTEX_STREAM_COUNT};

/// Largest component count of a single element.
pub const MAX_ELEMENT_COMPONENTS: u16 = 4;

/// One stream slot of a vertex declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexElement {
    /// Stream slot this element occupies.
    pub stream: u16,
    /// Number of components (1 to 4).
    pub count: u16,
    /// Scalar type of each component.
    pub component_type: ComponentType,
}

impl VertexElement {
    /// Create a new vertex element.
    pub fn new(stream: u16, count: u16, component_type: ComponentType) -> Self {
        Self {
            stream,
            count,
            component_type,
        }
    }

    /// Create a float element (e.g. 3 for a position, 4 for a color).
    pub fn float(stream: u16, count: u16) -> Self {
        Self::new(stream, count, ComponentType::Float)
    }

    /// Size in bytes of this element within one vertex.
    pub fn size(&self) -> usize {
        self.count as usize * self.component_type.size()
    }
}

/// Layout of one vertex record across up to
/// [`MAX_VERTEX_STREAM_COUNT`] stream slots.
#[derive(Clone, PartialEq, Eq)]
pub struct VertexDeclaration {
    elements: [Option<VertexElement>; MAX_VERTEX_STREAM_COUNT],
}

impl VertexDeclaration {
    /// Build a declaration, assigning each element to its stream slot.
    ///
    /// # Errors
    ///
    /// Fails if a slot is out of range or assigned twice, or if an element
    /// has no components or more than [`MAX_ELEMENT_COMPONENTS`].
    pub fn new(elements: &[VertexElement]) -> Result<Self, GraphicsError> {
        if elements.is_empty() {
            return Err(GraphicsError::InvalidParameter(
                "vertex declaration needs at least one element".to_string(),
            ));
        }

        let mut slots = [None; MAX_VERTEX_STREAM_COUNT];
        for element in elements {
            let stream = element.stream as usize;
            if stream >= MAX_VERTEX_STREAM_COUNT {
                return Err(GraphicsError::InvalidParameter(format!(
                    "vertex stream {} exceeds maximum {}",
                    element.stream,
                    MAX_VERTEX_STREAM_COUNT - 1
                )));
            }
            if element.count == 0 || element.count > MAX_ELEMENT_COMPONENTS {
                return Err(GraphicsError::InvalidParameter(format!(
                    "vertex stream {} has {} components, expected 1..={}",
                    element.stream, element.count, MAX_ELEMENT_COMPONENTS
                )));
            }
            if slots[stream].is_some() {
                return Err(GraphicsError::StreamAlreadyDeclared(element.stream));
            }
            slots[stream] = Some(*element);
        }

        Ok(Self { elements: slots })
    }

    /// Get the element declared for a stream slot.
    pub fn element(&self, stream: u16) -> Option<&VertexElement> {
        self.elements.get(stream as usize).and_then(Option::as_ref)
    }

    /// Iterate over declared elements in slot order.
    pub fn elements(&self) -> impl Iterator<Item = &VertexElement> {
        self.elements.iter().flatten()
    }

    /// Number of declared elements.
    pub fn element_count(&self) -> usize {
        self.elements().count()
    }

    /// Size in bytes of one vertex record: the sum of all element sizes.
    pub fn stride(&self) -> usize {
        self.elements().map(VertexElement::size).sum()
    }

    /// Byte offset of a stream's element within the vertex record.
    ///
    /// This is the sum of the sizes of all declared elements in lower slots.
    pub fn stream_offset(&self, stream: u16) -> Option<usize> {
        self.element(stream)?;
        Some(
            self.elements()
                .take_while(|element| element.stream < stream)
                .map(VertexElement::size)
                .sum(),
        )
    }
}

impl std::fmt::Debug for VertexDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexDeclaration")
            .field("elements", &self.elements().collect::<Vec<_>>())
            .field("stride", &self.stride())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_addressed() {
        let declaration = VertexDeclaration::new(&[
            VertexElement::new(2, 2, ComponentType::Float),
            VertexElement::new(0, 3, ComponentType::Float),
        ])
        .unwrap();
        let streams: Vec<u16> = declaration.elements().map(|e| e.stream).collect();
        assert_eq!(streams, vec![0, 2]);
        assert!(declaration.element(1).is_none());
    }

    #[test]
    fn test_stride_and_offsets() {
        let declaration = VertexDeclaration::new(&[
            VertexElement::float(0, 3),
            VertexElement::new(1, 4, ComponentType::UnsignedByte),
            VertexElement::new(5, 2, ComponentType::Short),
        ])
        .unwrap();
        assert_eq!(declaration.stride(), 12 + 4 + 4);
        assert_eq!(declaration.stream_offset(0), Some(0));
        assert_eq!(declaration.stream_offset(1), Some(12));
        assert_eq!(declaration.stream_offset(5), Some(16));
        assert_eq!(declaration.stream_offset(3), None);
    }

    #[test]
    fn test_duplicate_stream() {
        let result =
            VertexDeclaration::new(&[VertexElement::float(1, 3), VertexElement::float(1, 2)]);
        assert_eq!(result.unwrap_err(), GraphicsError::StreamAlreadyDeclared(1));
    }

    #[test]
    fn test_invalid_elements() {
        assert!(VertexDeclaration::new(&[]).is_err());
        assert!(VertexDeclaration::new(&[VertexElement::float(32, 3)]).is_err());
        assert!(VertexDeclaration::new(&[VertexElement::float(0, 0)]).is_err());
        assert!(VertexDeclaration::new(&[VertexElement::float(0, 5)]).is_err());
    }
}
