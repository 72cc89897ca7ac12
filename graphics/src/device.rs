//! Graphics device.
//!
//! The [`GraphicsDevice`] owns every resource table, the default
//! framebuffer, the vertex stream table and both constant register files.
//! Clients hold typed handles and pass the device explicitly to every call;
//! there is no process-wide device.

use glam::Vec4;

use crate::constants::RegisterFile;
use crate::error::GraphicsError;
use crate::handle::{Handle, HandleTable};
use crate::resources::{
    BufferStorage, FragmentProgram, FrameBuffer, IndexBuffer, RenderTarget, Texture,
    VertexBuffer, VertexProgram,
};
use crate::types::{
    BlendFactor, BufferAccess, BufferUsage, ClearFlags, ComponentType, FaceType, PrimitiveType,
    RenderState, RenderStates, ShaderStage, TextureFormat, WindowParam, MAX_CONSTANT_REGISTERS,
    MAX_TEXTURE_UNITS,
};
use crate::vertex::{
    VertexDeclaration, VertexElement, VertexStream, VertexStreamTable, MAX_ELEMENT_COMPONENTS,
};

/// Handle to a [`VertexBuffer`].
pub type VertexBufferHandle = Handle<VertexBuffer>;
/// Handle to an [`IndexBuffer`].
pub type IndexBufferHandle = Handle<IndexBuffer>;
/// Handle to a [`VertexDeclaration`].
pub type VertexDeclarationHandle = Handle<VertexDeclaration>;
/// Handle to a [`Texture`].
pub type TextureHandle = Handle<Texture>;
/// Handle to a [`RenderTarget`].
pub type RenderTargetHandle = Handle<RenderTarget>;
/// Handle to a [`VertexProgram`].
pub type VertexProgramHandle = Handle<VertexProgram>;
/// Handle to a [`FragmentProgram`].
pub type FragmentProgramHandle = Handle<FragmentProgram>;

/// Parameters for creating a [`GraphicsDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceParams {
    /// Width of the default framebuffer in pixels.
    pub display_width: u32,
    /// Height of the default framebuffer in pixels.
    pub display_height: u32,
}

impl Default for DeviceParams {
    fn default() -> Self {
        Self {
            display_width: 960,
            display_height: 640,
        }
    }
}

impl DeviceParams {
    /// Create parameters for a display of the given size.
    pub fn new(display_width: u32, display_height: u32) -> Self {
        Self {
            display_width,
            display_height,
        }
    }

    /// Set the display width.
    pub fn with_display_width(mut self, width: u32) -> Self {
        self.display_width = width;
        self
    }

    /// Set the display height.
    pub fn with_display_height(mut self, height: u32) -> Self {
        self.display_height = height;
        self
    }
}

/// Cumulative draw statistics, reset with [`GraphicsDevice::reset_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DeviceStats {
    /// Number of clear calls.
    pub clears: u64,
    /// Number of draw calls of any kind.
    pub draw_calls: u64,
    /// Number of gathering indexed draw calls.
    pub indexed_draw_calls: u64,
    /// Vertices gathered per stream, summed over indexed draws.
    pub gathered_vertices: u64,
}

/// Number of live client resources per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ResourceCounts {
    /// Live vertex buffers.
    pub vertex_buffers: usize,
    /// Live index buffers.
    pub index_buffers: usize,
    /// Live vertex declarations.
    pub vertex_declarations: usize,
    /// Live textures, including those owned by render targets.
    pub textures: usize,
    /// Live render targets.
    pub render_targets: usize,
    /// Live vertex programs.
    pub vertex_programs: usize,
    /// Live fragment programs.
    pub fragment_programs: usize,
}

impl ResourceCounts {
    /// Total number of live resources.
    pub fn total(&self) -> usize {
        self.vertex_buffers
            + self.index_buffers
            + self.vertex_declarations
            + self.textures
            + self.render_targets
            + self.vertex_programs
            + self.fragment_programs
    }

    /// Returns true if no resources are alive.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Per-channel color write mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorMask {
    /// Write the red channel.
    pub red: bool,
    /// Write the green channel.
    pub green: bool,
    /// Write the blue channel.
    pub blue: bool,
    /// Write the alpha channel.
    pub alpha: bool,
}

impl Default for ColorMask {
    fn default() -> Self {
        Self {
            red: true,
            green: true,
            blue: true,
            alpha: true,
        }
    }
}

/// A software graphics device.
///
/// The device stores resources in host memory and performs the data
/// movement a draw call implies (clears and the indexed vertex gather)
/// without rasterizing anything. Every operation fails with
/// [`GraphicsError::DeviceClosed`] once [`close`](Self::close) has been
/// called.
///
/// # Example
///
/// ```ignore
/// let mut device = GraphicsDevice::new(DeviceParams::new(64, 64))?;
/// let vb = device.new_vertex_buffer(&vertices, BufferUsage::StaticDraw)?;
/// let ib = device.new_index_buffer(&indices, BufferUsage::StaticDraw)?;
/// let decl = device.new_vertex_declaration(&[VertexElement::float(0, 3)])?;
///
/// device.enable_vertex_declaration(decl, vb)?;
/// device.draw_elements(PrimitiveType::Triangles, 6, ComponentType::UnsignedShort, ib)?;
/// device.disable_vertex_declaration(decl)?;
/// device.flip()?;
/// ```
pub struct GraphicsDevice {
    opened: bool,
    display_width: u32,
    display_height: u32,
    framebuffer: FrameBuffer,
    active_target: Option<RenderTargetHandle>,

    vertex_buffers: HandleTable<VertexBuffer>,
    index_buffers: HandleTable<IndexBuffer>,
    declarations: HandleTable<VertexDeclaration>,
    textures: HandleTable<Texture>,
    render_targets: HandleTable<RenderTarget>,
    vertex_programs: HandleTable<VertexProgram>,
    fragment_programs: HandleTable<FragmentProgram>,

    streams: VertexStreamTable,
    vertex_program: Option<VertexProgramHandle>,
    fragment_program: Option<FragmentProgramHandle>,
    vertex_registers: RegisterFile,
    fragment_registers: RegisterFile,
    texture_units: [Option<TextureHandle>; MAX_TEXTURE_UNITS],

    states: RenderStates,
    blend_func: (BlendFactor, BlendFactor),
    color_mask: ColorMask,
    depth_mask: bool,
    index_mask: u32,
    stencil_mask: u32,
    cull_face: FaceType,

    frame_index: u64,
    stats: DeviceStats,
}

impl GraphicsDevice {
    /// Open a device with a zeroed default framebuffer.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] if either display
    /// dimension is zero.
    pub fn new(params: DeviceParams) -> Result<Self, GraphicsError> {
        check_dimensions("display", params.display_width, params.display_height)?;

        log::info!(
            "GraphicsDevice: opened {}x{}",
            params.display_width,
            params.display_height
        );

        Ok(Self {
            opened: true,
            display_width: params.display_width,
            display_height: params.display_height,
            framebuffer: FrameBuffer::new(params.display_width, params.display_height),
            active_target: None,
            vertex_buffers: HandleTable::new(),
            index_buffers: HandleTable::new(),
            declarations: HandleTable::new(),
            textures: HandleTable::new(),
            render_targets: HandleTable::new(),
            vertex_programs: HandleTable::new(),
            fragment_programs: HandleTable::new(),
            streams: VertexStreamTable::new(),
            vertex_program: None,
            fragment_program: None,
            vertex_registers: RegisterFile::new(MAX_CONSTANT_REGISTERS),
            fragment_registers: RegisterFile::new(MAX_CONSTANT_REGISTERS),
            texture_units: [None; MAX_TEXTURE_UNITS],
            states: RenderStates::empty(),
            blend_func: (BlendFactor::One, BlendFactor::Zero),
            color_mask: ColorMask::default(),
            depth_mask: true,
            index_mask: u32::MAX,
            stencil_mask: u32::MAX,
            cull_face: FaceType::Back,
            frame_index: 0,
            stats: DeviceStats::default(),
        })
    }

    /// Close the device.
    ///
    /// Releases the default framebuffer and every stream binding. Client
    /// resources are not freed on the caller's behalf; any still alive are
    /// reported in a warning.
    pub fn close(&mut self) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.opened = false;
        self.framebuffer = FrameBuffer::new(0, 0);
        self.active_target = None;
        self.streams.clear();
        self.vertex_program = None;
        self.fragment_program = None;
        self.texture_units = [None; MAX_TEXTURE_UNITS];

        let counts = self.resource_counts();
        if !counts.is_empty() {
            log::warn!(
                "GraphicsDevice: closed with {} live resources: {:?}",
                counts.total(),
                counts
            );
        }
        log::debug!("GraphicsDevice: closed after {} frames", self.frame_index);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), GraphicsError> {
        if !self.opened {
            return Err(GraphicsError::DeviceClosed);
        }
        Ok(())
    }

    /// Returns true until [`close`](Self::close) is called.
    pub fn is_opened(&self) -> bool {
        self.opened
    }

    /// Count live client resources.
    pub fn resource_counts(&self) -> ResourceCounts {
        ResourceCounts {
            vertex_buffers: self.vertex_buffers.len(),
            index_buffers: self.index_buffers.len(),
            vertex_declarations: self.declarations.len(),
            textures: self.textures.len(),
            render_targets: self.render_targets.len(),
            vertex_programs: self.vertex_programs.len(),
            fragment_programs: self.fragment_programs.len(),
        }
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// Fill the requested planes of the active framebuffer.
    ///
    /// The color is packed as `r << 24 | g << 16 | b << 8 | a` and stored
    /// as one native-endian word per pixel.
    pub fn clear(
        &mut self,
        flags: ClearFlags,
        rgba: [u8; 4],
        depth: f32,
        stencil: u32,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        let framebuffer = self.active_framebuffer_mut()?;
        if flags.contains(ClearFlags::COLOR) {
            framebuffer.fill_color(u32::from_be_bytes(rgba));
        }
        if flags.contains(ClearFlags::DEPTH) {
            framebuffer.fill_depth(depth);
        }
        if flags.contains(ClearFlags::STENCIL) {
            framebuffer.fill_stencil(stencil);
        }
        self.stats.clears += 1;
        log::trace!("GraphicsDevice: clear {:?}", flags);
        Ok(())
    }

    /// Mark the end of a frame.
    pub fn flip(&mut self) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.frame_index += 1;
        Ok(())
    }

    /// Number of frames flipped so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Get the cumulative draw statistics.
    pub fn stats(&self) -> DeviceStats {
        self.stats
    }

    /// Reset the draw statistics.
    pub fn reset_stats(&mut self) {
        self.stats = DeviceStats::default();
    }

    // ========================================================================
    // Vertex and index buffers
    // ========================================================================

    /// Create a vertex buffer holding a copy of `data`.
    pub fn new_vertex_buffer(
        &mut self,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<VertexBufferHandle, GraphicsError> {
        self.ensure_open()?;
        let handle = self
            .vertex_buffers
            .insert(VertexBuffer::new(data.to_vec(), usage));
        log::trace!(
            "GraphicsDevice: created vertex buffer {:?}, size={}",
            handle,
            data.len()
        );
        Ok(handle)
    }

    /// Create a zero-filled vertex buffer of `size` bytes.
    pub fn new_vertex_buffer_with_size(
        &mut self,
        size: usize,
        usage: BufferUsage,
    ) -> Result<VertexBufferHandle, GraphicsError> {
        self.new_vertex_buffer(&vec![0; size], usage)
    }

    /// Get a vertex buffer.
    pub fn vertex_buffer(&self, buffer: VertexBufferHandle) -> Option<&VertexBuffer> {
        self.vertex_buffers.get(buffer)
    }

    fn vertex_storage_mut(
        &mut self,
        buffer: VertexBufferHandle,
    ) -> Result<&mut BufferStorage, GraphicsError> {
        self.ensure_open()?;
        self.vertex_buffers
            .get_mut(buffer)
            .map(|buffer| &mut buffer.storage)
            .ok_or(GraphicsError::InvalidHandle("vertex buffer"))
    }

    /// Replace the contents (and size) of a vertex buffer.
    pub fn set_vertex_buffer_data(
        &mut self,
        buffer: VertexBufferHandle,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), GraphicsError> {
        self.vertex_storage_mut(buffer)?.set_data(data, usage)
    }

    /// Overwrite part of a vertex buffer.
    pub fn set_vertex_buffer_sub_data(
        &mut self,
        buffer: VertexBufferHandle,
        offset: usize,
        data: &[u8],
    ) -> Result<(), GraphicsError> {
        self.vertex_storage_mut(buffer)?.set_sub_data(offset, data)
    }

    /// Map a vertex buffer, returning a scratch copy of its contents.
    ///
    /// Writes to the scratch copy reach the buffer on
    /// [`unmap_vertex_buffer`](Self::unmap_vertex_buffer).
    pub fn map_vertex_buffer(
        &mut self,
        buffer: VertexBufferHandle,
        access: BufferAccess,
    ) -> Result<&mut [u8], GraphicsError> {
        self.vertex_storage_mut(buffer)?.map(access)
    }

    /// Copy the scratch bytes back and release the mapping.
    pub fn unmap_vertex_buffer(&mut self, buffer: VertexBufferHandle) -> Result<(), GraphicsError> {
        self.vertex_storage_mut(buffer)?.unmap().map(|_| ())
    }

    /// Delete a vertex buffer. Fails while the buffer is mapped.
    pub fn delete_vertex_buffer(&mut self, buffer: VertexBufferHandle) -> Result<(), GraphicsError> {
        if self.vertex_storage_mut(buffer)?.is_mapped() {
            return Err(GraphicsError::BufferMapped);
        }
        self.vertex_buffers.remove(buffer);
        log::trace!("GraphicsDevice: deleted vertex buffer {:?}", buffer);
        Ok(())
    }

    /// Create an index buffer holding a copy of `data`.
    pub fn new_index_buffer(
        &mut self,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<IndexBufferHandle, GraphicsError> {
        self.ensure_open()?;
        let handle = self
            .index_buffers
            .insert(IndexBuffer::new(data.to_vec(), usage));
        log::trace!(
            "GraphicsDevice: created index buffer {:?}, size={}",
            handle,
            data.len()
        );
        Ok(handle)
    }

    /// Create a zero-filled index buffer of `size` bytes.
    pub fn new_index_buffer_with_size(
        &mut self,
        size: usize,
        usage: BufferUsage,
    ) -> Result<IndexBufferHandle, GraphicsError> {
        self.new_index_buffer(&vec![0; size], usage)
    }

    /// Get an index buffer.
    pub fn index_buffer(&self, buffer: IndexBufferHandle) -> Option<&IndexBuffer> {
        self.index_buffers.get(buffer)
    }

    fn index_storage_mut(
        &mut self,
        buffer: IndexBufferHandle,
    ) -> Result<&mut BufferStorage, GraphicsError> {
        self.ensure_open()?;
        self.index_buffers
            .get_mut(buffer)
            .map(|buffer| &mut buffer.storage)
            .ok_or(GraphicsError::InvalidHandle("index buffer"))
    }

    /// Replace the contents (and size) of an index buffer.
    pub fn set_index_buffer_data(
        &mut self,
        buffer: IndexBufferHandle,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), GraphicsError> {
        self.index_storage_mut(buffer)?.set_data(data, usage)
    }

    /// Overwrite part of an index buffer.
    pub fn set_index_buffer_sub_data(
        &mut self,
        buffer: IndexBufferHandle,
        offset: usize,
        data: &[u8],
    ) -> Result<(), GraphicsError> {
        self.index_storage_mut(buffer)?.set_sub_data(offset, data)
    }

    /// Map an index buffer, returning a scratch copy of its contents.
    pub fn map_index_buffer(
        &mut self,
        buffer: IndexBufferHandle,
        access: BufferAccess,
    ) -> Result<&mut [u8], GraphicsError> {
        self.index_storage_mut(buffer)?.map(access)
    }

    /// Copy the scratch bytes back and release the mapping.
    pub fn unmap_index_buffer(&mut self, buffer: IndexBufferHandle) -> Result<(), GraphicsError> {
        self.index_storage_mut(buffer)?.unmap().map(|_| ())
    }

    /// Delete an index buffer. Fails while the buffer is mapped.
    pub fn delete_index_buffer(&mut self, buffer: IndexBufferHandle) -> Result<(), GraphicsError> {
        if self.index_storage_mut(buffer)?.is_mapped() {
            return Err(GraphicsError::BufferMapped);
        }
        self.index_buffers.remove(buffer);
        log::trace!("GraphicsDevice: deleted index buffer {:?}", buffer);
        Ok(())
    }

    // ========================================================================
    // Vertex declarations and streams
    // ========================================================================

    /// Create a vertex declaration.
    pub fn new_vertex_declaration(
        &mut self,
        elements: &[VertexElement],
    ) -> Result<VertexDeclarationHandle, GraphicsError> {
        self.ensure_open()?;
        let declaration = VertexDeclaration::new(elements)?;
        log::trace!(
            "GraphicsDevice: created vertex declaration, {} elements, stride={}",
            declaration.element_count(),
            declaration.stride()
        );
        Ok(self.declarations.insert(declaration))
    }

    /// Get a vertex declaration.
    pub fn vertex_declaration(
        &self,
        declaration: VertexDeclarationHandle,
    ) -> Option<&VertexDeclaration> {
        self.declarations.get(declaration)
    }

    /// Delete a vertex declaration.
    pub fn delete_vertex_declaration(
        &mut self,
        declaration: VertexDeclarationHandle,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.declarations
            .remove(declaration)
            .ok_or(GraphicsError::InvalidHandle("vertex declaration"))?;
        Ok(())
    }

    /// Bind every declared stream to `buffer` as one interleaved record.
    ///
    /// Each stream reads at the declaration's stride, starting at the sum
    /// of the sizes of the lower declared slots. Nothing is bound if any
    /// declared slot is already bound.
    pub fn enable_vertex_declaration(
        &mut self,
        declaration: VertexDeclarationHandle,
        buffer: VertexBufferHandle,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        let declaration = self
            .declarations
            .get(declaration)
            .ok_or(GraphicsError::InvalidHandle("vertex declaration"))?;
        if !self.vertex_buffers.contains(buffer) {
            return Err(GraphicsError::InvalidHandle("vertex buffer"));
        }
        if let Some(bound) = declaration
            .elements()
            .find(|element| self.streams.is_bound(element.stream))
        {
            return Err(GraphicsError::StreamAlreadyBound(bound.stream));
        }

        let stride = declaration.stride();
        let mut offset = 0;
        for element in declaration.elements() {
            let stream = VertexStream::new(
                buffer,
                offset,
                element.count,
                element.component_type,
                stride,
            );
            self.streams.bind(element.stream, stream)?;
            offset += element.size();
        }
        Ok(())
    }

    /// Release every stream slot the declaration names.
    pub fn disable_vertex_declaration(
        &mut self,
        declaration: VertexDeclarationHandle,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        let declaration = self
            .declarations
            .get(declaration)
            .ok_or(GraphicsError::InvalidHandle("vertex declaration"))?;
        for element in declaration.elements() {
            self.streams.unbind(element.stream)?;
        }
        Ok(())
    }

    /// Bind one stream slot to a byte range of a vertex buffer.
    ///
    /// `stride` is the distance between records; zero means tightly packed.
    pub fn set_vertex_stream(
        &mut self,
        stream: u16,
        count: u16,
        component_type: ComponentType,
        stride: usize,
        buffer: VertexBufferHandle,
        offset: usize,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        if count == 0 || count > MAX_ELEMENT_COMPONENTS {
            return Err(GraphicsError::InvalidParameter(format!(
                "vertex stream {} has {} components, expected 1..={}",
                stream,
                count,
                MAX_ELEMENT_COMPONENTS
            )));
        }
        if !self.vertex_buffers.contains(buffer) {
            return Err(GraphicsError::InvalidHandle("vertex buffer"));
        }
        self.streams.bind(
            stream,
            VertexStream::new(buffer, offset, count, component_type, stride),
        )
    }

    /// Release a stream slot and its gather buffer.
    pub fn disable_vertex_stream(&mut self, stream: u16) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.streams.unbind(stream)?;
        Ok(())
    }

    /// Get the binding of a stream slot.
    pub fn vertex_stream(&self, stream: u16) -> Option<&VertexStream> {
        self.streams.get(stream)
    }

    /// Get the gather buffer the last indexed draw produced for a slot.
    pub fn gathered_stream(&self, stream: u16) -> Option<&[u8]> {
        self.streams.get(stream).and_then(VertexStream::gathered)
    }

    // ========================================================================
    // Draw calls
    // ========================================================================

    /// Draw indexed primitives, gathering every bound stream.
    ///
    /// For each bound stream, position `i` of the gather buffer receives
    /// the vertex record named by the `i`-th index of `index_buffer`.
    /// Gathering is all-or-nothing.
    pub fn draw_elements(
        &mut self,
        primitive: PrimitiveType,
        count: usize,
        index_type: ComponentType,
        index_buffer: IndexBufferHandle,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        let indices = self
            .index_buffers
            .get(index_buffer)
            .ok_or(GraphicsError::InvalidHandle("index buffer"))?;
        if indices.storage.is_mapped() {
            return Err(GraphicsError::BufferMapped);
        }
        let gathered =
            self.streams
                .gather(&self.vertex_buffers, indices.storage.data(), index_type, count)?;
        self.record_indexed_draw(primitive, gathered);
        Ok(())
    }

    /// Draw indexed primitives reading indices from client memory.
    pub fn draw_elements_from_slice(
        &mut self,
        primitive: PrimitiveType,
        count: usize,
        index_type: ComponentType,
        indices: &[u8],
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        let gathered = self
            .streams
            .gather(&self.vertex_buffers, indices, index_type, count)?;
        self.record_indexed_draw(primitive, gathered);
        Ok(())
    }

    fn record_indexed_draw(&mut self, primitive: PrimitiveType, gathered: usize) {
        self.stats.draw_calls += 1;
        self.stats.indexed_draw_calls += 1;
        self.stats.gathered_vertices += gathered as u64;
        log::trace!(
            "GraphicsDevice: draw_elements {:?}, {} indices, {} streams",
            primitive,
            gathered,
            self.streams.active_count()
        );
    }

    /// Draw an index range. Validated and counted; no vertices are gathered.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::BufferMapped`] while the index buffer is
    /// mapped, or [`GraphicsError::OutOfBounds`] if indices
    /// `start..start + count` do not fit in it.
    pub fn draw_range_elements(
        &mut self,
        primitive: PrimitiveType,
        start: usize,
        count: usize,
        index_type: ComponentType,
        index_buffer: IndexBufferHandle,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        let indices = self
            .index_buffers
            .get(index_buffer)
            .ok_or(GraphicsError::InvalidHandle("index buffer"))?;
        if indices.storage.is_mapped() {
            return Err(GraphicsError::BufferMapped);
        }
        let len = indices.storage.size();
        let offset = start.checked_mul(index_type.size());
        let size = count.checked_mul(index_type.size());
        let in_bounds = offset
            .zip(size)
            .and_then(|(offset, size)| offset.checked_add(size))
            .is_some_and(|end| end <= len);
        if !in_bounds {
            return Err(GraphicsError::OutOfBounds {
                offset: offset.unwrap_or(usize::MAX),
                size: size.unwrap_or(usize::MAX),
                len,
            });
        }
        self.stats.draw_calls += 1;
        log::trace!(
            "GraphicsDevice: draw_range_elements {:?}, start={}, count={}",
            primitive,
            start,
            count
        );
        Ok(())
    }

    /// Draw non-indexed primitives. Validated and counted; no vertices are
    /// gathered.
    pub fn draw(
        &mut self,
        primitive: PrimitiveType,
        first: usize,
        count: usize,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.stats.draw_calls += 1;
        log::trace!(
            "GraphicsDevice: draw {:?}, first={}, count={}",
            primitive,
            first,
            count
        );
        Ok(())
    }

    // ========================================================================
    // Programs and constants
    // ========================================================================

    /// Create a vertex program from opaque bytes.
    pub fn new_vertex_program(&mut self, code: &[u8]) -> Result<VertexProgramHandle, GraphicsError> {
        self.ensure_open()?;
        check_program_code(code)?;
        let handle = self.vertex_programs.insert(VertexProgram::new(code));
        log::trace!(
            "GraphicsDevice: created vertex program {:?}, size={}",
            handle,
            code.len()
        );
        Ok(handle)
    }

    /// Create a fragment program from opaque bytes.
    pub fn new_fragment_program(
        &mut self,
        code: &[u8],
    ) -> Result<FragmentProgramHandle, GraphicsError> {
        self.ensure_open()?;
        check_program_code(code)?;
        let handle = self.fragment_programs.insert(FragmentProgram::new(code));
        log::trace!(
            "GraphicsDevice: created fragment program {:?}, size={}",
            handle,
            code.len()
        );
        Ok(handle)
    }

    /// Get a vertex program.
    pub fn vertex_program(&self, program: VertexProgramHandle) -> Option<&VertexProgram> {
        self.vertex_programs.get(program)
    }

    /// Get a fragment program.
    pub fn fragment_program(&self, program: FragmentProgramHandle) -> Option<&FragmentProgram> {
        self.fragment_programs.get(program)
    }

    /// Delete a vertex program, unbinding it if bound.
    pub fn delete_vertex_program(&mut self, program: VertexProgramHandle) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.vertex_programs
            .remove(program)
            .ok_or(GraphicsError::InvalidHandle("vertex program"))?;
        if self.vertex_program == Some(program) {
            self.vertex_program = None;
        }
        Ok(())
    }

    /// Delete a fragment program, unbinding it if bound.
    pub fn delete_fragment_program(
        &mut self,
        program: FragmentProgramHandle,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.fragment_programs
            .remove(program)
            .ok_or(GraphicsError::InvalidHandle("fragment program"))?;
        if self.fragment_program == Some(program) {
            self.fragment_program = None;
        }
        Ok(())
    }

    /// Bind a vertex program, or unbind with `None`.
    pub fn set_vertex_program(
        &mut self,
        program: Option<VertexProgramHandle>,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        if let Some(program) = program {
            if !self.vertex_programs.contains(program) {
                return Err(GraphicsError::InvalidHandle("vertex program"));
            }
        }
        self.vertex_program = program;
        Ok(())
    }

    /// Bind a fragment program, or unbind with `None`.
    pub fn set_fragment_program(
        &mut self,
        program: Option<FragmentProgramHandle>,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        if let Some(program) = program {
            if !self.fragment_programs.contains(program) {
                return Err(GraphicsError::InvalidHandle("fragment program"));
            }
        }
        self.fragment_program = program;
        Ok(())
    }

    /// Currently bound vertex program.
    pub fn bound_vertex_program(&self) -> Option<VertexProgramHandle> {
        self.vertex_program
    }

    /// Currently bound fragment program.
    pub fn bound_fragment_program(&self) -> Option<FragmentProgramHandle> {
        self.fragment_program
    }

    /// Write consecutive vertex constant registers starting at `base`.
    ///
    /// # Errors
    ///
    /// Fails with [`GraphicsError::ProgramNotBound`] if no vertex program is
    /// bound, or [`GraphicsError::RegisterOutOfRange`] if the block does not
    /// fit in the register file.
    pub fn set_vertex_constant_block(
        &mut self,
        values: &[Vec4],
        base: usize,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        if self.vertex_program.is_none() {
            return Err(GraphicsError::ProgramNotBound(ShaderStage::Vertex));
        }
        self.vertex_registers.write(base, values)
    }

    /// Write one vertex constant register.
    pub fn set_vertex_constant(&mut self, value: Vec4, register: usize) -> Result<(), GraphicsError> {
        self.set_vertex_constant_block(&[value], register)
    }

    /// Write consecutive fragment constant registers starting at `base`.
    pub fn set_fragment_constant_block(
        &mut self,
        values: &[Vec4],
        base: usize,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        if self.fragment_program.is_none() {
            return Err(GraphicsError::ProgramNotBound(ShaderStage::Fragment));
        }
        self.fragment_registers.write(base, values)
    }

    /// Write one fragment constant register.
    pub fn set_fragment_constant(
        &mut self,
        value: Vec4,
        register: usize,
    ) -> Result<(), GraphicsError> {
        self.set_fragment_constant_block(&[value], register)
    }

    /// Read a vertex constant register.
    pub fn vertex_constant(&self, register: usize) -> Option<Vec4> {
        self.vertex_registers.get(register)
    }

    /// Read a fragment constant register.
    pub fn fragment_constant(&self, register: usize) -> Option<Vec4> {
        self.fragment_registers.get(register)
    }

    // ========================================================================
    // Textures
    // ========================================================================

    /// Create an empty texture.
    pub fn new_texture(&mut self) -> Result<TextureHandle, GraphicsError> {
        self.ensure_open()?;
        let handle = self.textures.insert(Texture::new());
        log::trace!("GraphicsDevice: created texture {:?}", handle);
        Ok(handle)
    }

    /// Replace a texture's image.
    ///
    /// Empty `data` allocates a zeroed image; otherwise `data` must hold
    /// exactly `format.size() * width * height` bytes. Only mip level 0 is
    /// stored.
    pub fn set_texture_data(
        &mut self,
        texture: TextureHandle,
        mip_map: u16,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: &[u8],
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        if mip_map != 0 {
            return Err(GraphicsError::FeatureNotSupported(format!(
                "texture mip level {mip_map}"
            )));
        }
        check_dimensions("texture", width, height)?;
        self.textures
            .get_mut(texture)
            .ok_or(GraphicsError::InvalidHandle("texture"))?
            .upload(width, height, format, data)?;
        log::trace!(
            "GraphicsDevice: uploaded texture {:?}, {}x{} {:?}",
            texture,
            width,
            height,
            format
        );
        Ok(())
    }

    /// Get a texture.
    pub fn texture(&self, texture: TextureHandle) -> Option<&Texture> {
        self.textures.get(texture)
    }

    /// Delete a texture. Textures owned by a render target are released
    /// with the target instead.
    pub fn delete_texture(&mut self, texture: TextureHandle) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        let owned = self
            .textures
            .get(texture)
            .ok_or(GraphicsError::InvalidHandle("texture"))?
            .owner()
            .is_some();
        if owned {
            return Err(GraphicsError::TextureOwnedByTarget);
        }
        self.release_texture(texture);
        Ok(())
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(texture);
        for unit in self.texture_units.iter_mut() {
            if *unit == Some(texture) {
                *unit = None;
            }
        }
        log::trace!("GraphicsDevice: deleted texture {:?}", texture);
    }

    /// Bind a texture to a unit, or clear the unit with `None`.
    pub fn set_texture(
        &mut self,
        unit: usize,
        texture: Option<TextureHandle>,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        if unit >= MAX_TEXTURE_UNITS {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture unit {} exceeds maximum {}",
                unit,
                MAX_TEXTURE_UNITS - 1
            )));
        }
        if let Some(texture) = texture {
            if !self.textures.contains(texture) {
                return Err(GraphicsError::InvalidHandle("texture"));
            }
        }
        self.texture_units[unit] = texture;
        Ok(())
    }

    /// Texture bound to a unit.
    pub fn bound_texture(&self, unit: usize) -> Option<TextureHandle> {
        self.texture_units.get(unit).copied().flatten()
    }

    // ========================================================================
    // Render targets
    // ========================================================================

    /// Create a render target with its own texture and framebuffer.
    pub fn new_render_target(
        &mut self,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<RenderTargetHandle, GraphicsError> {
        self.ensure_open()?;
        check_dimensions("render target", width, height)?;

        let mut texture = Texture::new();
        texture.upload(width, height, format, &[])?;
        let texture = self.textures.insert(texture);
        let target = self
            .render_targets
            .insert(RenderTarget::new(texture, FrameBuffer::new(width, height)));
        if let Some(texture) = self.textures.get_mut(texture) {
            texture.set_owner(target);
        }

        log::trace!(
            "GraphicsDevice: created render target {:?}, {}x{} {:?}",
            target,
            width,
            height,
            format
        );
        Ok(target)
    }

    /// Get a render target.
    pub fn render_target(&self, target: RenderTargetHandle) -> Option<&RenderTarget> {
        self.render_targets.get(target)
    }

    /// Delete a render target and its texture.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::RenderTargetBound`] while the target is the
    /// active framebuffer.
    pub fn delete_render_target(&mut self, target: RenderTargetHandle) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        if self.active_target == Some(target) {
            return Err(GraphicsError::RenderTargetBound);
        }
        let removed = self
            .render_targets
            .remove(target)
            .ok_or(GraphicsError::InvalidHandle("render target"))?;
        self.release_texture(removed.texture());
        log::trace!("GraphicsDevice: deleted render target {:?}", target);
        Ok(())
    }

    /// Redirect clears and draws to a render target.
    pub fn enable_render_target(&mut self, target: RenderTargetHandle) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        if !self.render_targets.contains(target) {
            return Err(GraphicsError::InvalidHandle("render target"));
        }
        self.active_target = Some(target);
        Ok(())
    }

    /// Restore the default framebuffer.
    pub fn disable_render_target(&mut self, target: RenderTargetHandle) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        if !self.render_targets.contains(target) {
            return Err(GraphicsError::InvalidHandle("render target"));
        }
        self.active_target = None;
        Ok(())
    }

    /// Render target currently receiving output, if any.
    pub fn active_render_target(&self) -> Option<RenderTargetHandle> {
        self.active_target
    }

    /// Get a render target's color texture.
    pub fn render_target_texture(&self, target: RenderTargetHandle) -> Option<TextureHandle> {
        self.render_targets.get(target).map(RenderTarget::texture)
    }

    /// Get a render target's private framebuffer.
    pub fn render_target_framebuffer(&self, target: RenderTargetHandle) -> Option<&FrameBuffer> {
        self.render_targets.get(target).map(RenderTarget::framebuffer)
    }

    /// Get the device's own framebuffer.
    pub fn default_framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// Get the framebuffer receiving output.
    pub fn active_framebuffer(&self) -> &FrameBuffer {
        self.active_target
            .and_then(|target| self.render_targets.get(target))
            .map_or(&self.framebuffer, RenderTarget::framebuffer)
    }

    fn active_framebuffer_mut(&mut self) -> Result<&mut FrameBuffer, GraphicsError> {
        match self.active_target {
            Some(target) => self
                .render_targets
                .get_mut(target)
                .map(RenderTarget::framebuffer_mut)
                .ok_or(GraphicsError::InvalidHandle("render target")),
            None => Ok(&mut self.framebuffer),
        }
    }

    // ========================================================================
    // Fixed-function state
    // ========================================================================

    /// Enable a render state.
    pub fn enable_state(&mut self, state: RenderState) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.states.insert(state.into());
        Ok(())
    }

    /// Disable a render state.
    pub fn disable_state(&mut self, state: RenderState) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.states.remove(state.into());
        Ok(())
    }

    /// Returns true if a render state is enabled.
    pub fn is_state_enabled(&self, state: RenderState) -> bool {
        self.states.contains(state.into())
    }

    /// Set of enabled render states.
    pub fn states(&self) -> RenderStates {
        self.states
    }

    /// Set the blend factors.
    pub fn set_blend_func(
        &mut self,
        source: BlendFactor,
        destination: BlendFactor,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.blend_func = (source, destination);
        Ok(())
    }

    /// Source and destination blend factors.
    pub fn blend_func(&self) -> (BlendFactor, BlendFactor) {
        self.blend_func
    }

    /// Set the color write mask.
    pub fn set_color_mask(
        &mut self,
        red: bool,
        green: bool,
        blue: bool,
        alpha: bool,
    ) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.color_mask = ColorMask {
            red,
            green,
            blue,
            alpha,
        };
        Ok(())
    }

    /// Current color write mask.
    pub fn color_mask(&self) -> ColorMask {
        self.color_mask
    }

    /// Set the depth write mask.
    pub fn set_depth_mask(&mut self, mask: bool) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.depth_mask = mask;
        Ok(())
    }

    /// Returns true if depth writes are enabled.
    pub fn depth_mask(&self) -> bool {
        self.depth_mask
    }

    /// Set the color index write mask.
    pub fn set_index_mask(&mut self, mask: u32) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.index_mask = mask;
        Ok(())
    }

    /// Current color index write mask.
    pub fn index_mask(&self) -> u32 {
        self.index_mask
    }

    /// Set the stencil write mask.
    pub fn set_stencil_mask(&mut self, mask: u32) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.stencil_mask = mask;
        Ok(())
    }

    /// Current stencil write mask.
    pub fn stencil_mask(&self) -> u32 {
        self.stencil_mask
    }

    /// Select the faces culled when culling is enabled.
    pub fn set_cull_face(&mut self, face: FaceType) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        self.cull_face = face;
        Ok(())
    }

    /// Faces culled when culling is enabled.
    pub fn cull_face(&self) -> FaceType {
        self.cull_face
    }

    // ========================================================================
    // Window
    // ========================================================================

    /// Display width in pixels.
    pub fn window_width(&self) -> u32 {
        self.display_width
    }

    /// Display height in pixels.
    pub fn window_height(&self) -> u32 {
        self.display_height
    }

    /// Query a window parameter.
    pub fn window_param(&self, param: WindowParam) -> u32 {
        match param {
            WindowParam::Opened => u32::from(self.opened),
            WindowParam::Width => self.display_width,
            WindowParam::Height => self.display_height,
        }
    }

    /// Resize the display, reallocating the default framebuffer.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), GraphicsError> {
        self.ensure_open()?;
        check_dimensions("viewport", width, height)?;
        self.display_width = width;
        self.display_height = height;
        self.framebuffer.resize(width, height);
        log::debug!("GraphicsDevice: viewport resized to {}x{}", width, height);
        Ok(())
    }
}

fn check_dimensions(what: &str, width: u32, height: u32) -> Result<(), GraphicsError> {
    if width == 0 || height == 0 {
        return Err(GraphicsError::InvalidParameter(format!(
            "{what} dimensions cannot be zero ({width}x{height})"
        )));
    }
    Ok(())
}

fn check_program_code(code: &[u8]) -> Result<(), GraphicsError> {
    if code.is_empty() {
        return Err(GraphicsError::InvalidParameter(
            "program code cannot be empty".to_string(),
        ));
    }
    Ok(())
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("opened", &self.opened)
            .field("display_width", &self.display_width)
            .field("display_height", &self.display_height)
            .field("active_target", &self.active_target)
            .field("resources", &self.resource_counts())
            .field("frame_index", &self.frame_index)
            .finish()
    }
}

// The device may be handed to a dedicated render thread
static_assertions::assert_impl_all!(GraphicsDevice: Send);
