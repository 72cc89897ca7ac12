//! Materials: a program pair plus the tags predicates select on.

use softgpu_graphics::{FragmentProgramHandle, Handle, VertexProgramHandle};

use crate::error::RenderError;
use crate::predicate::Predicate;

/// Handle to a [`Material`] owned by a [`RenderContext`](crate::RenderContext).
pub type MaterialHandle = Handle<Material>;

/// A vertex/fragment program pair and its tag set.
///
/// Render objects reference a material; at draw time the material's
/// programs are bound and its tags are tested against the predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    vertex_program: VertexProgramHandle,
    fragment_program: FragmentProgramHandle,
    tags: Vec<u32>,
}

impl Material {
    /// Create a material. Duplicate tags are stored once.
    ///
    /// # Errors
    ///
    /// Fails if more than [`Predicate::MAX_TAG_COUNT`] distinct tags are
    /// given.
    pub fn new(
        vertex_program: VertexProgramHandle,
        fragment_program: FragmentProgramHandle,
        tags: &[u32],
    ) -> Result<Self, RenderError> {
        let mut unique: Vec<u32> = Vec::with_capacity(tags.len());
        for &tag in tags {
            if !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        if unique.len() > Predicate::MAX_TAG_COUNT {
            return Err(RenderError::InvalidParameter(format!(
                "material has {} tags, maximum is {}",
                unique.len(),
                Predicate::MAX_TAG_COUNT
            )));
        }
        Ok(Self {
            vertex_program,
            fragment_program,
            tags: unique,
        })
    }

    /// Get the vertex program.
    pub fn vertex_program(&self) -> VertexProgramHandle {
        self.vertex_program
    }

    /// Get the fragment program.
    pub fn fragment_program(&self) -> FragmentProgramHandle {
        self.fragment_program
    }

    /// Get the tag set.
    pub fn tags(&self) -> &[u32] {
        &self.tags
    }
}
