//! wgpu render backend for scene graphs.
//!
//! Draws every visible mesh with one instanced call per unit mesh (plane,
//! box, sphere), Lambert-lit by the scene's ambient light plus one key light,
//! with exponential-squared fog. Axes helpers are drawn as lines.
//!
//! # Invariants
//! - Renderer never mutates the scene graph or camera.
//! - Geometry dimensions are applied as a scale on shared unit meshes.

mod gpu;
mod mesh;
mod shaders;

pub use gpu::{SurfaceFrame, WgpuRenderer};
