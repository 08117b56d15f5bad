//! Two small shading demos built on wgpu.
//!
//! The lit demo loads a triangulated OBJ mesh, flattens it into one vertex
//! per face corner with a flat normal per face, and shades it per vertex
//! with a single point light and an adjustable material. The textured demo
//! draws a fixed quad with an image that loads in the background.
//!
//! Everything up to the uniform values handed to the GPU is plain data and
//! can be exercised headless; the `render` module and the front ends are
//! thin layers on top.

pub mod app;
pub mod config;
pub mod controller;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod lighting;
pub mod material;
pub mod obj;
pub mod quad;
pub mod render;
pub mod session;
pub mod texture;
pub mod transform;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::{DemoContent, DemoRenderer, DemoState, MeshStats, Viewport};
pub use config::DemoConfig;
pub use controller::{ControlEffect, ControlEvent, InteractionController, LabelSink, SliderBank};
pub use error::{GeometryError, ImageLoadError, ObjError};
pub use frame::{CancelHandle, FrameLoop, Tick};
pub use geometry::{face_normal, flat_normals, flatten_indexed, FlatMesh};
pub use input::{KeyCode, KeyState, MouseButton, MouseButtons, NamedKey};
pub use lighting::{LightingUniforms, PointLight};
pub use material::{Material, MaterialChannel, MaterialGroup};
pub use obj::{parse_obj, ObjModel};
pub use session::{DemoKind, Session};
pub use transform::{FrameMatrices, Pose, Projection, TransformComposer, TransformState};
