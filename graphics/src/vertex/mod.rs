//! Vertex layout and stream binding.
//!
//! - [`VertexDeclaration`] - immutable, slot-addressed description of one
//!   interleaved vertex record
//! - [`VertexStreamTable`] - the device's per-draw binding of stream slots
//!   to vertex buffer byte ranges, and the index-driven gather that reads
//!   through it

mod declaration;
mod stream;

pub use declaration::{VertexDeclaration, VertexElement, MAX_ELEMENT_COMPONENTS};
pub use stream::{VertexStream, VertexStreamTable};
