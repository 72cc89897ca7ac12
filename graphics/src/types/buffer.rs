//! Buffer usage and access hints.

/// Expected update frequency of a buffer's contents.
///
/// The software device keeps every buffer in host memory regardless, but
/// records the hint so clients can be checked against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    #[default]
    StaticDraw,
    /// Rewritten occasionally, drawn many times.
    DynamicDraw,
    /// Rewritten every frame, drawn a few times.
    StreamDraw,
}

/// Access requested when mapping a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferAccess {
    /// The client only reads the mapped bytes.
    ReadOnly,
    /// The client only writes the mapped bytes.
    WriteOnly,
    /// The client reads and writes the mapped bytes.
    #[default]
    ReadWrite,
}
