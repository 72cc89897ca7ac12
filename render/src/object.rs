//! Render objects: one queued draw command with its per-object state.

use glam::{Mat4, Vec4};
use softgpu_graphics::{
    BlendFactor, ComponentType, IndexBufferHandle, PrimitiveType, TextureHandle,
    VertexBufferHandle, VertexDeclarationHandle,
};

use crate::context::RenderTypeHandle;
use crate::error::RenderError;
use crate::material::MaterialHandle;

/// Number of user constant registers per stage a render object can override.
pub const MAX_CONSTANT_COUNT: usize = 8;

/// Number of texture units a render object can bind.
pub const MAX_TEXTURE_COUNT: usize = 32;

/// A fixed set of optional constant overrides with a validity mask.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct ConstantOverrides {
    values: [Vec4; MAX_CONSTANT_COUNT],
    mask: u8,
}

impl ConstantOverrides {
    fn check(register: usize) -> Result<(), RenderError> {
        if register >= MAX_CONSTANT_COUNT {
            return Err(RenderError::InvalidParameter(format!(
                "constant register {} exceeds maximum {}",
                register,
                MAX_CONSTANT_COUNT - 1
            )));
        }
        Ok(())
    }

    pub(crate) fn set(&mut self, register: usize, value: Vec4) -> Result<(), RenderError> {
        Self::check(register)?;
        self.values[register] = value;
        self.mask |= 1 << register;
        Ok(())
    }

    pub(crate) fn reset(&mut self, register: usize) -> Result<(), RenderError> {
        Self::check(register)?;
        self.mask &= !(1 << register);
        Ok(())
    }

    pub(crate) fn get(&self, register: usize) -> Option<Vec4> {
        (register < MAX_CONSTANT_COUNT && self.mask & (1 << register) != 0)
            .then(|| self.values[register])
    }

    pub(crate) fn mask(&self) -> u8 {
        self.mask
    }
}

/// One batched draw command.
///
/// A render object names its geometry, material and textures by handle and
/// carries its own transforms, constant overrides and blend factors. Objects
/// are queued with [`RenderContext::add_to_render`](crate::RenderContext::add_to_render)
/// and executed in queue order by [`RenderContext::draw`](crate::RenderContext::draw).
///
/// # Example
///
/// ```ignore
/// let object = RenderObject::new(material)
///     .with_geometry(declaration, vertex_buffer)
///     .with_indices(index_buffer, ComponentType::UnsignedShort)
///     .with_range(PrimitiveType::Triangles, 0, 6)
///     .with_world_transform(Mat4::from_translation(position));
/// context.add_to_render(object)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RenderObject {
    pub world_transform: Mat4,
    pub texture_transform: Mat4,
    pub vertex_buffer: Option<VertexBufferHandle>,
    pub vertex_declaration: Option<VertexDeclarationHandle>,
    pub index_buffer: Option<IndexBufferHandle>,
    pub material: MaterialHandle,
    pub textures: [Option<TextureHandle>; MAX_TEXTURE_COUNT],
    pub primitive_type: PrimitiveType,
    pub index_type: ComponentType,
    pub source_blend_factor: BlendFactor,
    pub destination_blend_factor: BlendFactor,
    /// Apply the blend factors (and enable blending) for this object.
    pub set_blend_factors: bool,
    /// First index (indexed) or first vertex (non-indexed).
    pub vertex_start: usize,
    /// Number of indices (indexed) or vertices (non-indexed).
    pub vertex_count: usize,
    pub render_type: Option<RenderTypeHandle>,
    vertex_constants: ConstantOverrides,
    fragment_constants: ConstantOverrides,
}

impl RenderObject {
    /// Create an object drawing nothing with `material`.
    pub fn new(material: MaterialHandle) -> Self {
        Self {
            world_transform: Mat4::IDENTITY,
            texture_transform: Mat4::IDENTITY,
            vertex_buffer: None,
            vertex_declaration: None,
            index_buffer: None,
            material,
            textures: [None; MAX_TEXTURE_COUNT],
            primitive_type: PrimitiveType::Triangles,
            index_type: ComponentType::UnsignedShort,
            source_blend_factor: BlendFactor::One,
            destination_blend_factor: BlendFactor::Zero,
            set_blend_factors: false,
            vertex_start: 0,
            vertex_count: 0,
            render_type: None,
            vertex_constants: ConstantOverrides::default(),
            fragment_constants: ConstantOverrides::default(),
        }
    }

    /// Set the vertex declaration and the buffer it reads.
    pub fn with_geometry(
        mut self,
        declaration: VertexDeclarationHandle,
        buffer: VertexBufferHandle,
    ) -> Self {
        self.vertex_declaration = Some(declaration);
        self.vertex_buffer = Some(buffer);
        self
    }

    /// Draw indexed from `buffer`.
    pub fn with_indices(mut self, buffer: IndexBufferHandle, index_type: ComponentType) -> Self {
        self.index_buffer = Some(buffer);
        self.index_type = index_type;
        self
    }

    /// Set the primitive type and the index (or vertex) range.
    pub fn with_range(mut self, primitive_type: PrimitiveType, start: usize, count: usize) -> Self {
        self.primitive_type = primitive_type;
        self.vertex_start = start;
        self.vertex_count = count;
        self
    }

    pub fn with_world_transform(mut self, transform: Mat4) -> Self {
        self.world_transform = transform;
        self
    }

    pub fn with_texture_transform(mut self, transform: Mat4) -> Self {
        self.texture_transform = transform;
        self
    }

    /// Blend with the given factors while this object draws.
    pub fn with_blend(mut self, source: BlendFactor, destination: BlendFactor) -> Self {
        self.source_blend_factor = source;
        self.destination_blend_factor = destination;
        self.set_blend_factors = true;
        self
    }

    pub fn with_render_type(mut self, render_type: RenderTypeHandle) -> Self {
        self.render_type = Some(render_type);
        self
    }

    /// Bind a texture to a unit.
    pub fn set_texture(&mut self, unit: usize, texture: TextureHandle) -> Result<(), RenderError> {
        let slot = self.textures.get_mut(unit).ok_or_else(|| {
            RenderError::InvalidParameter(format!(
                "texture unit {} exceeds maximum {}",
                unit,
                MAX_TEXTURE_COUNT - 1
            ))
        })?;
        *slot = Some(texture);
        Ok(())
    }

    /// Override a vertex constant for this object.
    pub fn set_vertex_constant(&mut self, register: usize, value: Vec4) -> Result<(), RenderError> {
        self.vertex_constants.set(register, value)
    }

    /// Remove a vertex constant override.
    pub fn reset_vertex_constant(&mut self, register: usize) -> Result<(), RenderError> {
        self.vertex_constants.reset(register)
    }

    /// Override a fragment constant for this object.
    pub fn set_fragment_constant(
        &mut self,
        register: usize,
        value: Vec4,
    ) -> Result<(), RenderError> {
        self.fragment_constants.set(register, value)
    }

    /// Remove a fragment constant override.
    pub fn reset_fragment_constant(&mut self, register: usize) -> Result<(), RenderError> {
        self.fragment_constants.reset(register)
    }

    /// Vertex constant override, if set.
    pub fn vertex_constant(&self, register: usize) -> Option<Vec4> {
        self.vertex_constants.get(register)
    }

    /// Fragment constant override, if set.
    pub fn fragment_constant(&self, register: usize) -> Option<Vec4> {
        self.fragment_constants.get(register)
    }

    /// Bit `i` is set while vertex constant `i` is overridden.
    pub fn vertex_constant_mask(&self) -> u8 {
        self.vertex_constants.mask()
    }

    /// Bit `i` is set while fragment constant `i` is overridden.
    pub fn fragment_constant_mask(&self) -> u8 {
        self.fragment_constants.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use softgpu_graphics::HandleTable;

    fn material_handle() -> MaterialHandle {
        let mut materials: HandleTable<Material> = HandleTable::new();
        let mut device =
            softgpu_graphics::GraphicsDevice::new(softgpu_graphics::DeviceParams::new(1, 1))
                .unwrap();
        let vp = device.new_vertex_program(b"vp").unwrap();
        let fp = device.new_fragment_program(b"fp").unwrap();
        materials.insert(Material::new(vp, fp, &[]).unwrap())
    }

    #[test]
    fn test_constant_mask() {
        let mut object = RenderObject::new(material_handle());
        object.set_vertex_constant(0, Vec4::ONE).unwrap();
        object.set_vertex_constant(7, Vec4::X).unwrap();
        assert_eq!(object.vertex_constant_mask(), 0b1000_0001);
        assert_eq!(object.vertex_constant(7), Some(Vec4::X));

        object.reset_vertex_constant(0).unwrap();
        assert_eq!(object.vertex_constant_mask(), 0b1000_0000);
        assert_eq!(object.vertex_constant(0), None);
        assert_eq!(object.fragment_constant_mask(), 0);
    }

    #[test]
    fn test_constant_register_bounds() {
        let mut object = RenderObject::new(material_handle());
        assert!(object.set_fragment_constant(8, Vec4::ONE).is_err());
        assert!(object.reset_fragment_constant(8).is_err());
        assert_eq!(object.fragment_constant(8), None);
    }

    #[test]
    fn test_texture_units() {
        let mut device =
            softgpu_graphics::GraphicsDevice::new(softgpu_graphics::DeviceParams::new(1, 1))
                .unwrap();
        let texture = device.new_texture().unwrap();
        let mut object = RenderObject::new(material_handle());
        object.set_texture(31, texture).unwrap();
        assert_eq!(object.textures[31], Some(texture));
        assert!(object.set_texture(32, texture).is_err());
    }

    #[test]
    fn test_builder() {
        let object = RenderObject::new(material_handle())
            .with_range(PrimitiveType::Lines, 2, 4)
            .with_blend(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);
        assert_eq!(object.primitive_type, PrimitiveType::Lines);
        assert_eq!(object.vertex_start, 2);
        assert_eq!(object.vertex_count, 4);
        assert!(object.set_blend_factors);
    }
}
