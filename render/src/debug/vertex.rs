use softgpu_graphics::VertexElement;

/// A debug draw vertex: position + color.
///
/// Matches the debug vertex declaration: stream 0 reads the position,
/// stream 1 the color, interleaved at a 28 byte stride.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl DebugVertex {
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Elements of the debug vertex declaration.
pub(crate) fn debug_vertex_elements() -> [VertexElement; 2] {
    [VertexElement::float(0, 3), VertexElement::float(1, 4)]
}
