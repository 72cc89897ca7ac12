use crate::error::RenderError;

use super::vertex::DebugVertex;

/// A bounded list of debug vertices accumulated during one frame.
///
/// Pushes are all-or-nothing: a primitive that does not fit is rejected
/// and the list is left untouched.
#[derive(Debug, Clone)]
pub(crate) struct DebugBatch {
    vertices: Vec<DebugVertex>,
    capacity: usize,
}

impl DebugBatch {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }

    pub(crate) fn len(&self) -> usize {
        self.vertices.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.vertices.clear();
    }

    fn reserve(&self, count: usize) -> Result<(), RenderError> {
        if self.capacity - self.vertices.len() < count {
            return Err(RenderError::BufferIsFull);
        }
        Ok(())
    }

    /// Push two vertices forming a line segment.
    pub(crate) fn push_line(
        &mut self,
        start: [f32; 3],
        end: [f32; 3],
        start_color: [f32; 4],
        end_color: [f32; 4],
    ) -> Result<(), RenderError> {
        self.reserve(2)?;
        self.vertices.push(DebugVertex::new(start, start_color));
        self.vertices.push(DebugVertex::new(end, end_color));
        Ok(())
    }

    /// Push several line segments sharing one color, all or none.
    pub(crate) fn push_lines(
        &mut self,
        segments: &[([f32; 3], [f32; 3])],
        color: [f32; 4],
    ) -> Result<(), RenderError> {
        self.reserve(segments.len() * 2)?;
        for &(start, end) in segments {
            self.vertices.push(DebugVertex::new(start, color));
            self.vertices.push(DebugVertex::new(end, color));
        }
        Ok(())
    }

    /// Push four vertices forming a quad, in winding order.
    pub(crate) fn push_quad(
        &mut self,
        corners: [[f32; 3]; 4],
        color: [f32; 4],
    ) -> Result<(), RenderError> {
        self.reserve(4)?;
        self.vertices
            .extend(corners.iter().map(|&corner| DebugVertex::new(corner, color)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_line() {
        let mut batch = DebugBatch::new(4);
        batch
            .push_line([0.0; 3], [1.0; 3], [1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0])
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.vertices()[1].color, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_full_batch_rejects_without_partial_write() {
        let mut batch = DebugBatch::new(5);
        batch.push_quad([[0.0; 3]; 4], [1.0; 4]).unwrap();
        assert_eq!(
            batch.push_line([0.0; 3], [1.0; 3], [1.0; 4], [1.0; 4]),
            Err(RenderError::BufferIsFull)
        );
        assert_eq!(batch.len(), 4);
    }

    #[test]
    fn test_clear() {
        let mut batch = DebugBatch::new(2);
        batch.push_line([0.0; 3], [1.0; 3], [1.0; 4], [1.0; 4]).unwrap();
        batch.clear();
        assert!(batch.is_empty());
        batch.push_line([0.0; 3], [1.0; 3], [1.0; 4], [1.0; 4]).unwrap();
    }
}
