//! Common utilities for render integration tests.

use softgpu_graphics::{
    BufferUsage, ComponentType, DeviceParams, GraphicsDevice, IndexBufferHandle, VertexBufferHandle,
    VertexDeclarationHandle, VertexElement,
};
use softgpu_render::{MaterialHandle, RenderContext, RenderContextParams};

/// Install a test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// Default params with placeholder program code.
pub fn test_params() -> RenderContextParams {
    RenderContextParams::new(b"vertex program".to_vec(), b"fragment program".to_vec())
        .with_display_size(64, 64)
}

/// Open a 64x64 device and a context on it.
pub fn create_context(params: RenderContextParams) -> (GraphicsDevice, RenderContext) {
    init_logging();
    let mut device =
        GraphicsDevice::new(DeviceParams::new(64, 64)).expect("Failed to create device");
    let context = RenderContext::new(&mut device, params).expect("Failed to create context");
    (device, context)
}

/// Create a material with its own program pair and the given tags.
pub fn create_material(
    device: &mut GraphicsDevice,
    context: &mut RenderContext,
    tags: &[u32],
) -> MaterialHandle {
    let vertex_program = device
        .new_vertex_program(b"material vp")
        .expect("Failed to create vertex program");
    let fragment_program = device
        .new_fragment_program(b"material fp")
        .expect("Failed to create fragment program");
    context
        .new_material(vertex_program, fragment_program, tags)
        .expect("Failed to create material")
}

/// Geometry for a two-triangle quad: positions, declaration and
/// `[0, 1, 2, 2, 3, 0]` unsigned short indices.
pub struct Quad {
    pub vertex_buffer: VertexBufferHandle,
    pub declaration: VertexDeclarationHandle,
    pub index_buffer: IndexBufferHandle,
}

pub fn create_quad(device: &mut GraphicsDevice) -> Quad {
    let positions: [f32; 12] = [
        -1.0, -1.0, 0.0, //
        1.0, -1.0, 0.0, //
        1.0, 1.0, 0.0, //
        -1.0, 1.0, 0.0,
    ];
    let indices: [u16; 6] = [0, 1, 2, 2, 3, 0];
    Quad {
        vertex_buffer: device
            .new_vertex_buffer(bytemuck::cast_slice(&positions), BufferUsage::StaticDraw)
            .expect("Failed to create vertex buffer"),
        declaration: device
            .new_vertex_declaration(&[VertexElement::new(0, 3, ComponentType::Float)])
            .expect("Failed to create declaration"),
        index_buffer: device
            .new_index_buffer(bytemuck::cast_slice(&indices), BufferUsage::StaticDraw)
            .expect("Failed to create index buffer"),
    }
}
