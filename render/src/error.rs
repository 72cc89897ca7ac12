//! Render error types.

use softgpu_graphics::GraphicsError;
use thiserror::Error;

/// Errors that can occur while batching or drawing render objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The context cannot be used with the given device.
    #[error("invalid render context: {0}")]
    InvalidContext(String),
    /// A fixed-capacity registry (render types, render targets) is full.
    #[error("out of {0}")]
    OutOfResources(&'static str),
    /// A bounded per-frame buffer (render objects, debug vertices) is full.
    #[error("render buffer is full")]
    BufferIsFull,
    /// A material or render type handle was stale or never issued.
    #[error("invalid {0} handle")]
    InvalidHandle(&'static str),
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The device rejected a call made on behalf of the context.
    #[error(transparent)]
    Graphics(#[from] GraphicsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            RenderError::OutOfResources("render types").to_string(),
            "out of render types"
        );
        assert_eq!(RenderError::BufferIsFull.to_string(), "render buffer is full");
    }

    #[test]
    fn test_graphics_error_is_transparent() {
        let err = RenderError::from(GraphicsError::DeviceClosed);
        assert_eq!(err.to_string(), "graphics device is closed");
    }
}
