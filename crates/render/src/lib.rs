//! Rendering adapter: everything a backend needs to turn a scene graph into a
//! frame, independent of the rasterizer.
//!
//! # Invariants
//! - Renderers read the scene graph and camera; they never mutate them.
//! - Backend choice is made once, from a single capability probe.

mod camera;
mod lighting;
mod renderer;
mod surface;

pub use camera::{Camera, CameraKind, Projection};
pub use lighting::LightingSummary;
pub use renderer::{DebugTextRenderer, Renderer};
pub use surface::{Backend, RenderSettings, Viewport};

pub fn crate_info() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"))
}
