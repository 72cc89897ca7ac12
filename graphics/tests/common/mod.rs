//! Common utilities for device integration tests.

use softgpu_graphics::{
    BufferUsage, ComponentType, DeviceParams, GraphicsDevice, IndexBufferHandle,
    VertexBufferHandle,
};

/// Display size used by the integration tests.
pub const DISPLAY_SIZE: u32 = 64;

/// Install a test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// Open a device with the test display size.
pub fn create_device() -> GraphicsDevice {
    init_logging();
    GraphicsDevice::new(DeviceParams::new(DISPLAY_SIZE, DISPLAY_SIZE))
        .expect("Failed to create device")
}

/// Four vertices of (x, y, z) positions: (i, 10 + i, 20 + i).
pub fn quad_positions() -> Vec<f32> {
    (0..4)
        .flat_map(|i| {
            let i = i as f32;
            [i, 10.0 + i, 20.0 + i]
        })
        .collect()
}

/// Create a vertex buffer from float data.
pub fn create_float_buffer(device: &mut GraphicsDevice, data: &[f32]) -> VertexBufferHandle {
    device
        .new_vertex_buffer(bytemuck::cast_slice(data), BufferUsage::StaticDraw)
        .expect("Failed to create vertex buffer")
}

/// Encode index values with the given component type, native-endian.
pub fn encode_indices(indices: &[u32], index_type: ComponentType) -> Vec<u8> {
    indices
        .iter()
        .flat_map(|&index| match index_type {
            ComponentType::Byte => (index as i8).to_ne_bytes().to_vec(),
            ComponentType::UnsignedByte => (index as u8).to_ne_bytes().to_vec(),
            ComponentType::Short => (index as i16).to_ne_bytes().to_vec(),
            ComponentType::UnsignedShort => (index as u16).to_ne_bytes().to_vec(),
            ComponentType::Int => (index as i32).to_ne_bytes().to_vec(),
            ComponentType::UnsignedInt => index.to_ne_bytes().to_vec(),
            ComponentType::Float => (index as f32).to_ne_bytes().to_vec(),
        })
        .collect()
}

/// Create an index buffer holding `indices` in the given type.
pub fn create_index_buffer(
    device: &mut GraphicsDevice,
    indices: &[u32],
    index_type: ComponentType,
) -> IndexBufferHandle {
    device
        .new_index_buffer(&encode_indices(indices, index_type), BufferUsage::StaticDraw)
        .expect("Failed to create index buffer")
}
