//! WebGPU rendering module
//!
//! CPU-side tessellation of world-space primitives into colored triangles,
//! uploaded as one vertex buffer per frame.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, surface_usable};
pub use shapes::build_scene;
pub use vertex::{Vertex, colors};
