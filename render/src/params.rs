//! Render context parameters.

use crate::error::RenderError;

/// Parameters for creating a [`RenderContext`](crate::RenderContext).
///
/// Every capacity is a hard ceiling: storage is allocated once and never
/// grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContextParams {
    /// Maximum number of registered render types.
    pub max_render_types: usize,
    /// Maximum number of queued render objects per frame.
    pub max_instances: usize,
    /// Maximum number of registered render targets.
    pub max_render_targets: usize,
    /// Maximum number of vertices in each debug primitive list.
    pub max_debug_vertices: usize,
    /// Code of the default vertex program.
    pub vertex_program: Vec<u8>,
    /// Code of the default fragment program.
    pub fragment_program: Vec<u8>,
    /// Display width in pixels.
    pub display_width: u32,
    /// Display height in pixels.
    pub display_height: u32,
}

impl Default for RenderContextParams {
    fn default() -> Self {
        Self {
            max_render_types: 16,
            max_instances: 1024,
            max_render_targets: 8,
            max_debug_vertices: 4096,
            vertex_program: Vec::new(),
            fragment_program: Vec::new(),
            display_width: 960,
            display_height: 640,
        }
    }
}

impl RenderContextParams {
    /// Create default parameters with the given program code.
    pub fn new(vertex_program: impl Into<Vec<u8>>, fragment_program: impl Into<Vec<u8>>) -> Self {
        Self {
            vertex_program: vertex_program.into(),
            fragment_program: fragment_program.into(),
            ..Self::default()
        }
    }

    /// Set the maximum number of render types.
    pub fn with_max_render_types(mut self, count: usize) -> Self {
        self.max_render_types = count;
        self
    }

    /// Set the render object queue capacity.
    pub fn with_max_instances(mut self, count: usize) -> Self {
        self.max_instances = count;
        self
    }

    /// Set the maximum number of registered render targets.
    pub fn with_max_render_targets(mut self, count: usize) -> Self {
        self.max_render_targets = count;
        self
    }

    /// Set the per-list debug vertex capacity.
    pub fn with_max_debug_vertices(mut self, count: usize) -> Self {
        self.max_debug_vertices = count;
        self
    }

    /// Set the display size.
    pub fn with_display_size(mut self, width: u32, height: u32) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), RenderError> {
        let capacities = [
            ("max_render_types", self.max_render_types),
            ("max_instances", self.max_instances),
            ("max_render_targets", self.max_render_targets),
            ("max_debug_vertices", self.max_debug_vertices),
        ];
        if let Some((name, _)) = capacities.iter().find(|(_, value)| *value == 0) {
            return Err(RenderError::InvalidParameter(format!(
                "{name} cannot be zero"
            )));
        }
        if self.display_width == 0 || self.display_height == 0 {
            return Err(RenderError::InvalidParameter(format!(
                "display dimensions cannot be zero ({}x{})",
                self.display_width, self.display_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let params = RenderContextParams::new(b"vp".to_vec(), b"fp".to_vec())
            .with_max_instances(4)
            .with_display_size(320, 240);
        assert_eq!(params.max_instances, 4);
        assert_eq!(params.display_width, 320);
        assert_eq!(params.vertex_program, b"vp");
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let params = RenderContextParams::new(b"vp".to_vec(), b"fp".to_vec())
            .with_max_render_types(0);
        assert!(matches!(
            params.validate(),
            Err(RenderError::InvalidParameter(_))
        ));
    }
}
