//! Opaque vertex and fragment programs.

use std::marker::PhantomData;

use crate::types::ShaderStage;

/// Marker for vertex programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexStage {}

/// Marker for fragment programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentStage {}

/// Compile-time stage tag for [`Program`].
pub trait ProgramStage {
    /// The runtime stage this tag stands for.
    const STAGE: ShaderStage;
}

impl ProgramStage for VertexStage {
    const STAGE: ShaderStage = ShaderStage::Vertex;
}

impl ProgramStage for FragmentStage {
    const STAGE: ShaderStage = ShaderStage::Fragment;
}

/// Program bytes for one pipeline stage.
///
/// The device never interprets the bytes; it stores them, binds them, and
/// requires a bound program before accepting constant uploads for the stage.
pub struct Program<S> {
    code: Vec<u8>,
    _stage: PhantomData<S>,
}

/// A vertex program.
pub type VertexProgram = Program<VertexStage>;

/// A fragment program.
pub type FragmentProgram = Program<FragmentStage>;

impl<S: ProgramStage> Program<S> {
    pub(crate) fn new(code: &[u8]) -> Self {
        Self {
            code: code.to_vec(),
            _stage: PhantomData,
        }
    }

    /// Get the program bytes.
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Get the stage this program belongs to.
    pub fn stage(&self) -> ShaderStage {
        S::STAGE
    }
}

impl<S: ProgramStage> std::fmt::Debug for Program<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("stage", &S::STAGE)
            .field("size", &self.code.len())
            .finish()
    }
}
