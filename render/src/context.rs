//! Render context: the object queue and the per-object draw path.

use glam::{Mat4, Vec4};
use softgpu_graphics::{
    FragmentProgramHandle, GraphicsDevice, GraphicsError, HandleTable, RenderState,
    RenderTargetHandle, VertexDeclarationHandle, VertexProgramHandle,
};

use crate::debug::DebugPrimitives;
use crate::error::RenderError;
use crate::material::{Material, MaterialHandle};
use crate::object::{RenderObject, MAX_CONSTANT_COUNT};
use crate::params::RenderContextParams;
use crate::predicate::Predicate;

/// First vertex register of the view-projection matrix.
pub const VIEW_PROJECTION_REGISTER: usize = 0;
/// First vertex register of the world transform.
pub const WORLD_TRANSFORM_REGISTER: usize = 4;
/// First vertex register of the texture transform.
pub const TEXTURE_TRANSFORM_REGISTER: usize = 8;
/// Vertex register of user constant 0.
pub const USER_VERTEX_CONSTANT_REGISTER: usize = 12;

/// Handle to a registered render type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTypeHandle(u32);

impl RenderTypeHandle {
    /// Registration index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Counters produced by one draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Objects issued to the device.
    pub drawn: usize,
    /// Objects rejected by the predicate.
    pub filtered: usize,
    per_type: Vec<usize>,
}

impl DrawStats {
    fn new(render_types: usize) -> Self {
        Self {
            per_type: vec![0; render_types],
            ..Self::default()
        }
    }

    /// Objects of a render type issued to the device.
    pub fn drawn_of_type(&self, render_type: RenderTypeHandle) -> usize {
        self.per_type.get(render_type.index()).copied().unwrap_or(0)
    }

    pub(crate) fn record(&mut self, render_type: Option<RenderTypeHandle>) {
        self.drawn += 1;
        if let Some(count) = render_type.and_then(|ty| self.per_type.get_mut(ty.index())) {
            *count += 1;
        }
    }
}

/// Device state bound for one object, undone after its draw.
#[derive(Default)]
struct BoundState {
    declaration: Option<VertexDeclarationHandle>,
    texture_units: Vec<usize>,
    blend: bool,
}

/// A render session: camera, materials, render types, the render-target
/// directory and the per-frame object queue.
///
/// The context never owns the device. Every call that touches device state
/// takes it explicitly.
///
/// # Example
///
/// ```ignore
/// let mut context = RenderContext::new(&mut device, params)?;
/// let material = context.new_material(vertex_program, fragment_program, &[OPAQUE])?;
///
/// // Each frame:
/// context.add_to_render(RenderObject::new(material).with_geometry(declaration, buffer))?;
/// context.draw(&mut device, Some(&Predicate::from_tags(&[OPAQUE])?))?;
/// context.clear_render_objects();
/// device.flip()?;
/// ```
#[derive(Debug)]
pub struct RenderContext {
    params: RenderContextParams,
    view: Mat4,
    projection: Mat4,
    vertex_program: VertexProgramHandle,
    fragment_program: FragmentProgramHandle,
    materials: HandleTable<Material>,
    pub(crate) default_material: MaterialHandle,
    render_types: Vec<u32>,
    render_targets: Vec<(u32, RenderTargetHandle)>,
    objects: Vec<RenderObject>,
    vertex_constants: [Option<Vec4>; MAX_CONSTANT_COUNT],
    fragment_constants: [Option<Vec4>; MAX_CONSTANT_COUNT],
    pub(crate) debug: DebugPrimitives,
}

static_assertions::assert_impl_all!(RenderContext: Send);

impl RenderContext {
    /// Create a context on an open device.
    ///
    /// Creates the default program pair from the params' program code, a
    /// default material using it, and the debug declaration and buffers.
    pub fn new(
        device: &mut GraphicsDevice,
        params: RenderContextParams,
    ) -> Result<Self, RenderError> {
        params.validate()?;
        if !device.is_opened() {
            return Err(RenderError::InvalidContext(
                "graphics device is closed".to_string(),
            ));
        }

        let vertex_program = device.new_vertex_program(&params.vertex_program)?;
        let fragment_program = device.new_fragment_program(&params.fragment_program)?;
        let mut materials = HandleTable::new();
        let default_material = materials.insert(Material::new(vertex_program, fragment_program, &[])?);
        let debug = DebugPrimitives::new(device, params.max_debug_vertices)?;

        log::debug!(
            "RenderContext: created, {} instances, {} render types, {} render targets, {} debug vertices",
            params.max_instances,
            params.max_render_types,
            params.max_render_targets,
            params.max_debug_vertices
        );

        Ok(Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            vertex_program,
            fragment_program,
            materials,
            default_material,
            render_types: Vec::with_capacity(params.max_render_types),
            render_targets: Vec::with_capacity(params.max_render_targets),
            objects: Vec::with_capacity(params.max_instances),
            vertex_constants: [None; MAX_CONSTANT_COUNT],
            fragment_constants: [None; MAX_CONSTANT_COUNT],
            debug,
            params,
        })
    }

    /// Release the default programs and the debug resources.
    ///
    /// Resources the client created (buffers, user programs, targets) are
    /// left alone.
    pub fn delete(self, device: &mut GraphicsDevice) -> Result<(), RenderError> {
        self.debug.delete(device)?;
        device.delete_vertex_program(self.vertex_program)?;
        device.delete_fragment_program(self.fragment_program)?;
        log::debug!("RenderContext: deleted");
        Ok(())
    }

    /// Get the creation parameters.
    pub fn params(&self) -> &RenderContextParams {
        &self.params
    }

    pub fn display_width(&self) -> u32 {
        self.params.display_width
    }

    pub fn display_height(&self) -> u32 {
        self.params.display_height
    }

    // ========================================================================
    // Camera
    // ========================================================================

    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.view = view;
    }

    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Projection × view.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view
    }

    // ========================================================================
    // Materials
    // ========================================================================

    /// Register a material.
    pub fn new_material(
        &mut self,
        vertex_program: VertexProgramHandle,
        fragment_program: FragmentProgramHandle,
        tags: &[u32],
    ) -> Result<MaterialHandle, RenderError> {
        let material = Material::new(vertex_program, fragment_program, tags)?;
        Ok(self.materials.insert(material))
    }

    /// Remove a material. Queued objects still referencing it fail to draw.
    pub fn delete_material(&mut self, material: MaterialHandle) -> Result<(), RenderError> {
        if material == self.default_material {
            return Err(RenderError::InvalidParameter(
                "the default material cannot be deleted".to_string(),
            ));
        }
        self.materials
            .remove(material)
            .map(|_| ())
            .ok_or(RenderError::InvalidHandle("material"))
    }

    pub fn material(&self, material: MaterialHandle) -> Option<&Material> {
        self.materials.get(material)
    }

    /// Material built from the default program pair, with no tags.
    pub fn default_material(&self) -> MaterialHandle {
        self.default_material
    }

    // ========================================================================
    // Render types and render targets
    // ========================================================================

    /// Register a render type by name hash. Registering a hash twice returns
    /// the same handle.
    pub fn register_render_type(&mut self, name_hash: u32) -> Result<RenderTypeHandle, RenderError> {
        if let Some(handle) = self.render_type(name_hash) {
            return Ok(handle);
        }
        if self.render_types.len() >= self.params.max_render_types {
            return Err(RenderError::OutOfResources("render types"));
        }
        self.render_types.push(name_hash);
        Ok(RenderTypeHandle(self.render_types.len() as u32 - 1))
    }

    /// Look up a registered render type.
    pub fn render_type(&self, name_hash: u32) -> Option<RenderTypeHandle> {
        self.render_types
            .iter()
            .position(|&hash| hash == name_hash)
            .map(|index| RenderTypeHandle(index as u32))
    }

    pub fn render_type_count(&self) -> usize {
        self.render_types.len()
    }

    /// Register a render target under a hash. A later registration of the
    /// same hash replaces the earlier one.
    pub fn register_render_target(
        &mut self,
        target: RenderTargetHandle,
        hash: u32,
    ) -> Result<(), RenderError> {
        if let Some(entry) = self.render_targets.iter_mut().find(|(key, _)| *key == hash) {
            log::warn!(
                "RenderContext: render target hash {:#010x} re-registered, replacing {:?}",
                hash,
                entry.1
            );
            entry.1 = target;
            return Ok(());
        }
        if self.render_targets.len() >= self.params.max_render_targets {
            return Err(RenderError::OutOfResources("render targets"));
        }
        self.render_targets.push((hash, target));
        Ok(())
    }

    /// Look up a registered render target.
    pub fn render_target(&self, hash: u32) -> Option<RenderTargetHandle> {
        self.render_targets
            .iter()
            .find(|(key, _)| *key == hash)
            .map(|(_, target)| *target)
    }

    // ========================================================================
    // Default constants
    // ========================================================================

    fn constant_slot(
        constants: &mut [Option<Vec4>; MAX_CONSTANT_COUNT],
        register: usize,
    ) -> Result<&mut Option<Vec4>, RenderError> {
        constants.get_mut(register).ok_or_else(|| {
            RenderError::InvalidParameter(format!(
                "constant register {} exceeds maximum {}",
                register,
                MAX_CONSTANT_COUNT - 1
            ))
        })
    }

    /// Set the vertex constant used by objects that do not override it.
    pub fn set_vertex_constant(&mut self, register: usize, value: Vec4) -> Result<(), RenderError> {
        *Self::constant_slot(&mut self.vertex_constants, register)? = Some(value);
        Ok(())
    }

    pub fn reset_vertex_constant(&mut self, register: usize) -> Result<(), RenderError> {
        *Self::constant_slot(&mut self.vertex_constants, register)? = None;
        Ok(())
    }

    /// Set the fragment constant used by objects that do not override it.
    pub fn set_fragment_constant(&mut self, register: usize, value: Vec4) -> Result<(), RenderError> {
        *Self::constant_slot(&mut self.fragment_constants, register)? = Some(value);
        Ok(())
    }

    pub fn reset_fragment_constant(&mut self, register: usize) -> Result<(), RenderError> {
        *Self::constant_slot(&mut self.fragment_constants, register)? = None;
        Ok(())
    }

    pub fn vertex_constant(&self, register: usize) -> Option<Vec4> {
        self.vertex_constants.get(register).copied().flatten()
    }

    pub fn fragment_constant(&self, register: usize) -> Option<Vec4> {
        self.fragment_constants.get(register).copied().flatten()
    }

    // ========================================================================
    // Object queue
    // ========================================================================

    /// Queue an object for the next draw.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::BufferIsFull`] once `max_instances` objects are
    /// queued; the queue is left unchanged.
    pub fn add_to_render(&mut self, object: RenderObject) -> Result<(), RenderError> {
        if self.objects.len() >= self.params.max_instances {
            return Err(RenderError::BufferIsFull);
        }
        self.objects.push(object);
        Ok(())
    }

    /// Empty the queue. Call once per frame.
    pub fn clear_render_objects(&mut self) {
        self.objects.clear();
    }

    /// Queued objects in submission order.
    pub fn render_objects(&self) -> &[RenderObject] {
        &self.objects
    }

    /// Draw every queued object matching `predicate`, in queue order.
    ///
    /// `None` or an empty predicate draws everything. The queue is kept;
    /// several draws with different predicates may run over one frame.
    ///
    /// # Errors
    ///
    /// Stops at the first object that cannot be drawn. Objects before it
    /// have already been issued.
    pub fn draw(
        &self,
        device: &mut GraphicsDevice,
        predicate: Option<&Predicate>,
    ) -> Result<DrawStats, RenderError> {
        self.ensure_device(device)?;
        let view_projection = self.view_projection_matrix();
        let mut stats = self.new_stats();

        for object in &self.objects {
            let material = self
                .materials
                .get(object.material)
                .ok_or(RenderError::InvalidHandle("material"))?;
            if let Some(predicate) = predicate {
                if !predicate.matches(material.tags()) {
                    stats.filtered += 1;
                    continue;
                }
            }
            self.issue(device, object, material, view_projection)?;
            stats.record(object.render_type);
        }

        log::trace!(
            "RenderContext: drew {} objects, filtered {}",
            stats.drawn,
            stats.filtered
        );
        Ok(stats)
    }

    pub(crate) fn ensure_device(&self, device: &GraphicsDevice) -> Result<(), RenderError> {
        if !device.is_opened() {
            return Err(RenderError::InvalidContext(
                "graphics device is closed".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn new_stats(&self) -> DrawStats {
        DrawStats::new(self.render_types.len())
    }

    /// Bind one object's state, draw it and restore the device.
    pub(crate) fn issue(
        &self,
        device: &mut GraphicsDevice,
        object: &RenderObject,
        material: &Material,
        view_projection: Mat4,
    ) -> Result<(), RenderError> {
        if let Some(render_type) = object.render_type {
            if render_type.index() >= self.render_types.len() {
                return Err(RenderError::InvalidHandle("render type"));
            }
        }

        let mut bound = BoundState::default();
        let result = self.bind_and_draw(device, object, material, view_projection, &mut bound);
        let restored = Self::restore(device, &bound);
        result.and(restored)
    }

    fn bind_and_draw(
        &self,
        device: &mut GraphicsDevice,
        object: &RenderObject,
        material: &Material,
        view_projection: Mat4,
        bound: &mut BoundState,
    ) -> Result<(), RenderError> {
        device.set_vertex_program(Some(material.vertex_program()))?;
        device.set_fragment_program(Some(material.fragment_program()))?;

        device.set_vertex_constant_block(&matrix_columns(view_projection), VIEW_PROJECTION_REGISTER)?;
        device.set_vertex_constant_block(
            &matrix_columns(object.world_transform),
            WORLD_TRANSFORM_REGISTER,
        )?;
        device.set_vertex_constant_block(
            &matrix_columns(object.texture_transform),
            TEXTURE_TRANSFORM_REGISTER,
        )?;
        // Registers with neither an override nor a default are zeroed.
        let vertex_constants: [Vec4; MAX_CONSTANT_COUNT] = std::array::from_fn(|register| {
            object
                .vertex_constant(register)
                .or(self.vertex_constants[register])
                .unwrap_or(Vec4::ZERO)
        });
        let fragment_constants: [Vec4; MAX_CONSTANT_COUNT] = std::array::from_fn(|register| {
            object
                .fragment_constant(register)
                .or(self.fragment_constants[register])
                .unwrap_or(Vec4::ZERO)
        });
        device.set_vertex_constant_block(&vertex_constants, USER_VERTEX_CONSTANT_REGISTER)?;
        device.set_fragment_constant_block(&fragment_constants, 0)?;

        for (unit, texture) in object.textures.iter().enumerate() {
            if let Some(texture) = texture {
                device.set_texture(unit, Some(*texture))?;
                bound.texture_units.push(unit);
            }
        }

        if object.set_blend_factors {
            device.enable_state(RenderState::Blend)?;
            bound.blend = true;
            device.set_blend_func(object.source_blend_factor, object.destination_blend_factor)?;
        }

        if let (Some(declaration), Some(buffer)) = (object.vertex_declaration, object.vertex_buffer)
        {
            device.enable_vertex_declaration(declaration, buffer)?;
            bound.declaration = Some(declaration);
        }

        match object.index_buffer {
            Some(indices) if object.vertex_start == 0 => device.draw_elements(
                object.primitive_type,
                object.vertex_count,
                object.index_type,
                indices,
            )?,
            Some(indices) => device.draw_range_elements(
                object.primitive_type,
                object.vertex_start,
                object.vertex_count,
                object.index_type,
                indices,
            )?,
            None => device.draw(object.primitive_type, object.vertex_start, object.vertex_count)?,
        }
        Ok(())
    }

    /// Undo every binding in `bound` and unbind the programs. Every step is
    /// attempted; the first failure is returned.
    fn restore(device: &mut GraphicsDevice, bound: &BoundState) -> Result<(), RenderError> {
        let mut first_error: Option<GraphicsError> = None;
        let mut record = |result: Result<(), GraphicsError>| {
            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        };

        if let Some(declaration) = bound.declaration {
            record(device.disable_vertex_declaration(declaration));
        }
        for &unit in &bound.texture_units {
            record(device.set_texture(unit, None));
        }
        if bound.blend {
            record(device.disable_state(RenderState::Blend));
        }
        record(device.set_vertex_program(None));
        record(device.set_fragment_program(None));

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

/// Columns of a matrix as consecutive constant registers.
fn matrix_columns(matrix: Mat4) -> [Vec4; 4] {
    [matrix.x_axis, matrix.y_axis, matrix.z_axis, matrix.w_axis]
}
