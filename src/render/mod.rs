//! wgpu backends for the two demos.

mod gpu;
mod lit;
mod textured;

pub use gpu::{DrawPass, GpuContext};
pub use lit::{LitMeshRenderer, LitUniform};
pub use textured::{QuadUniform, TexturedQuadRenderer};
