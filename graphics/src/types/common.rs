//! State enums and flag sets shared across the device API.

use bitflags::bitflags;

// ============================================================================
// Clearing
// ============================================================================

bitflags! {
    /// Framebuffer planes affected by a clear.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Clear the color plane.
        const COLOR = 1 << 0;
        /// Clear the depth plane.
        const DEPTH = 1 << 1;
        /// Clear the stencil plane.
        const STENCIL = 1 << 2;
    }
}

impl Default for ClearFlags {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Primitives
// ============================================================================

/// Primitive assembly mode for a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveType {
    /// Independent points.
    Points,
    /// Independent line segments, two vertices each.
    Lines,
    /// Connected line segments closed back to the first vertex.
    LineLoop,
    /// Connected line segments.
    LineStrip,
    /// Independent triangles, three vertices each.
    #[default]
    Triangles,
    /// Triangle strip.
    TriangleStrip,
    /// Triangle fan around the first vertex.
    TriangleFan,
    /// Independent quads, four vertices each.
    Quads,
}

// ============================================================================
// Programs
// ============================================================================

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex program stage.
    Vertex,
    /// Fragment program stage.
    Fragment,
}

// ============================================================================
// Fixed-function state
// ============================================================================

/// Toggleable fixed-function state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderState {
    /// Depth testing.
    DepthTest,
    /// Alpha testing.
    AlphaTest,
    /// Color blending.
    Blend,
    /// Face culling.
    CullFace,
    /// Polygon offset for filled primitives.
    PolygonOffsetFill,
}

bitflags! {
    /// Set of enabled [`RenderState`]s.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderStates: u32 {
        const DEPTH_TEST = 1 << 0;
        const ALPHA_TEST = 1 << 1;
        const BLEND = 1 << 2;
        const CULL_FACE = 1 << 3;
        const POLYGON_OFFSET_FILL = 1 << 4;
    }
}

impl From<RenderState> for RenderStates {
    fn from(state: RenderState) -> Self {
        match state {
            RenderState::DepthTest => Self::DEPTH_TEST,
            RenderState::AlphaTest => Self::ALPHA_TEST,
            RenderState::Blend => Self::BLEND,
            RenderState::CullFace => Self::CULL_FACE,
            RenderState::PolygonOffsetFill => Self::POLYGON_OFFSET_FILL,
        }
    }
}

/// Blend factor for blending operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendFactor {
    /// 0.0
    Zero,
    /// 1.0
    #[default]
    One,
    /// Source color
    SrcColor,
    /// 1 - source color
    OneMinusSrcColor,
    /// Destination color
    DstColor,
    /// 1 - destination color
    OneMinusDstColor,
    /// Source alpha
    SrcAlpha,
    /// 1 - source alpha
    OneMinusSrcAlpha,
    /// Destination alpha
    DstAlpha,
    /// 1 - destination alpha
    OneMinusDstAlpha,
    /// min(source alpha, 1 - destination alpha)
    SrcAlphaSaturate,
    /// Constant color
    ConstantColor,
    /// 1 - constant color
    OneMinusConstantColor,
    /// Constant alpha
    ConstantAlpha,
    /// 1 - constant alpha
    OneMinusConstantAlpha,
}

/// Faces selected for culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceType {
    /// Front-facing polygons.
    Front,
    /// Back-facing polygons.
    #[default]
    Back,
    /// Both faces.
    FrontAndBack,
}

// ============================================================================
// Window
// ============================================================================

/// Queryable window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowParam {
    /// 1 while the device is open, 0 otherwise.
    Opened,
    /// Current display width.
    Width,
    /// Current display height.
    Height,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_state_flags() {
        let mut states = RenderStates::empty();
        states |= RenderState::Blend.into();
        states |= RenderState::DepthTest.into();
        assert!(states.contains(RenderStates::BLEND | RenderStates::DEPTH_TEST));
        states.remove(RenderState::Blend.into());
        assert_eq!(states, RenderStates::DEPTH_TEST);
    }
}
