use glam::{Mat4, Vec2, Vec3, Vec4};
use softgpu_graphics::{BufferUsage, GraphicsDevice};

use crate::context::{DrawStats, RenderContext};
use crate::error::RenderError;
use crate::object::RenderObject;

use super::DebugList;

impl RenderContext {
    /// Queue a filled screen-space square.
    ///
    /// Coordinates are normalized with (-1, -1) at the upper-left corner of
    /// the screen.
    pub fn square_2d(&mut self, min: Vec2, max: Vec2, color: Vec4) -> Result<(), RenderError> {
        let corners = [
            [min.x, min.y, 0.0],
            [max.x, min.y, 0.0],
            [max.x, max.y, 0.0],
            [min.x, max.y, 0.0],
        ];
        self.debug.squares_2d.batch.push_quad(corners, color.to_array())
    }

    /// Queue a screen-space line, blending from `start_color` to `end_color`.
    pub fn line_2d(
        &mut self,
        start: Vec2,
        end: Vec2,
        start_color: Vec4,
        end_color: Vec4,
    ) -> Result<(), RenderError> {
        self.debug.lines_2d.batch.push_line(
            start.extend(0.0).to_array(),
            end.extend(0.0).to_array(),
            start_color.to_array(),
            end_color.to_array(),
        )
    }

    /// Queue a world-space line, blending from `start_color` to `end_color`.
    pub fn line_3d(
        &mut self,
        start: Vec3,
        end: Vec3,
        start_color: Vec4,
        end_color: Vec4,
    ) -> Result<(), RenderError> {
        self.debug.lines_3d.batch.push_line(
            start.to_array(),
            end.to_array(),
            start_color.to_array(),
            end_color.to_array(),
        )
    }

    /// Queue the 12 edges of an axis-aligned box from min to max corners.
    pub fn aabb_3d(&mut self, min: Vec3, max: Vec3, color: Vec4) -> Result<(), RenderError> {
        let c = [
            [min.x, min.y, min.z],
            [max.x, min.y, min.z],
            [max.x, max.y, min.z],
            [min.x, max.y, min.z],
            [min.x, min.y, max.z],
            [max.x, min.y, max.z],
            [max.x, max.y, max.z],
            [min.x, max.y, max.z],
        ];
        let edges = [
            // Bottom face
            (c[0], c[1]),
            (c[1], c[2]),
            (c[2], c[3]),
            (c[3], c[0]),
            // Top face
            (c[4], c[5]),
            (c[5], c[6]),
            (c[6], c[7]),
            (c[7], c[4]),
            // Vertical edges
            (c[0], c[4]),
            (c[1], c[5]),
            (c[2], c[6]),
            (c[3], c[7]),
        ];
        self.debug.lines_3d.batch.push_lines(&edges, color.to_array())
    }

    /// Vertices queued by the debug helpers and not yet drawn.
    pub fn debug_vertex_count(&self) -> usize {
        self.debug.pending_vertices()
    }

    /// Draw and clear the queued 2D lines and squares.
    ///
    /// Screen coordinates are flipped vertically so (-1, -1) lands at the
    /// upper-left corner.
    pub fn draw_debug_2d(&mut self, device: &mut GraphicsDevice) -> Result<DrawStats, RenderError> {
        self.ensure_device(device)?;
        let screen = Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0));
        let mut stats = self.new_stats();
        let result = self
            .flush_debug_list(device, &self.debug.lines_2d, screen, &mut stats)
            .and_then(|_| self.flush_debug_list(device, &self.debug.squares_2d, screen, &mut stats));
        self.debug.lines_2d.batch.clear();
        self.debug.squares_2d.batch.clear();
        result.map(|_| stats)
    }

    /// Draw and clear the queued 3D lines with the context view-projection.
    pub fn draw_debug_3d(&mut self, device: &mut GraphicsDevice) -> Result<DrawStats, RenderError> {
        self.ensure_device(device)?;
        let view_projection = self.view_projection_matrix();
        let mut stats = self.new_stats();
        let result = self.flush_debug_list(device, &self.debug.lines_3d, view_projection, &mut stats);
        self.debug.lines_3d.batch.clear();
        result.map(|_| stats)
    }

    fn flush_debug_list(
        &self,
        device: &mut GraphicsDevice,
        list: &DebugList,
        view_projection: Mat4,
        stats: &mut DrawStats,
    ) -> Result<(), RenderError> {
        if list.batch.is_empty() {
            return Ok(());
        }
        device.set_vertex_buffer_data(
            list.buffer,
            bytemuck::cast_slice(list.batch.vertices()),
            BufferUsage::StreamDraw,
        )?;

        let material = self
            .material(self.default_material)
            .ok_or(RenderError::InvalidHandle("material"))?;
        let object = RenderObject::new(self.default_material)
            .with_geometry(self.debug.declaration, list.buffer)
            .with_range(list.primitive, 0, list.batch.len());
        self.issue(device, &object, material, view_projection)?;
        stats.record(None);

        log::trace!(
            "RenderContext: flushed {} debug vertices as {:?}",
            list.batch.len(),
            list.primitive
        );
        Ok(())
    }
}
