//! Graphics error types.

use thiserror::Error;

use crate::types::ShaderStage;

/// Broad classification of a [`GraphicsError`].
///
/// Callers that only care whether a failure was their own misuse, a
/// capacity ceiling, or a call made in the wrong state can match on this
/// instead of on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An argument was malformed, stale or out of range.
    InvalidArgument,
    /// A fixed-capacity table or register file is exhausted.
    CapacityExceeded,
    /// The call is valid in general but not in the current device state.
    PreconditionViolated,
}

/// Errors that can occur in the graphics device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphicsError {
    /// The device has been closed.
    #[error("graphics device is closed")]
    DeviceClosed,
    /// A handle was stale, already deleted, or never issued by this device.
    #[error("invalid {0} handle")]
    InvalidHandle(&'static str),
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A byte range fell outside the resource it addresses.
    #[error("{size} bytes at offset {offset} out of bounds for {len} bytes")]
    OutOfBounds {
        /// First byte of the requested range.
        offset: usize,
        /// Length of the requested range.
        size: usize,
        /// Length of the addressed resource.
        len: usize,
    },
    /// The buffer already has an outstanding mapping.
    #[error("buffer is already mapped")]
    BufferAlreadyMapped,
    /// The buffer was unmapped without a matching map.
    #[error("buffer is not mapped")]
    BufferNotMapped,
    /// The buffer has an outstanding mapping and cannot be modified or deleted.
    #[error("buffer has an outstanding mapping")]
    BufferMapped,
    /// A vertex stream slot is already bound.
    #[error("vertex stream {0} is already bound")]
    StreamAlreadyBound(u16),
    /// A vertex declaration assigns the same stream slot twice.
    #[error("vertex stream {0} declared more than once")]
    StreamAlreadyDeclared(u16),
    /// A constant upload was attempted with no program bound for the stage.
    #[error("no {0:?} program bound")]
    ProgramNotBound(ShaderStage),
    /// A constant block does not fit in the register file.
    #[error("{count} constant registers at {base} exceed register file of {capacity}")]
    RegisterOutOfRange {
        /// First register written.
        base: usize,
        /// Number of registers written.
        count: usize,
        /// Size of the register file.
        capacity: usize,
    },
    /// Uploaded texture bytes do not match format and dimensions.
    #[error("texture data is {actual} bytes, expected {expected}")]
    TextureDataSizeMismatch {
        /// Size computed from format, width and height.
        expected: usize,
        /// Size supplied by the caller.
        actual: usize,
    },
    /// The texture belongs to a render target and is released with it.
    #[error("texture is owned by a render target")]
    TextureOwnedByTarget,
    /// The render target is currently bound as the active framebuffer.
    #[error("render target is currently bound")]
    RenderTargetBound,
    /// A requested feature is not supported by the software device.
    #[error("feature not supported: {0}")]
    FeatureNotSupported(String),
}

impl GraphicsError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidHandle(_)
            | Self::InvalidParameter(_)
            | Self::OutOfBounds { .. }
            | Self::StreamAlreadyDeclared(_)
            | Self::TextureDataSizeMismatch { .. }
            | Self::FeatureNotSupported(_) => ErrorKind::InvalidArgument,
            Self::RegisterOutOfRange { .. } => ErrorKind::CapacityExceeded,
            Self::DeviceClosed
            | Self::BufferAlreadyMapped
            | Self::BufferNotMapped
            | Self::BufferMapped
            | Self::StreamAlreadyBound(_)
            | Self::ProgramNotBound(_)
            | Self::TextureOwnedByTarget
            | Self::RenderTargetBound => ErrorKind::PreconditionViolated,
        }
    }
}
