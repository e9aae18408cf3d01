use scenekit_scene::{NodeKind, SceneGraph};
use std::fmt::Write;

use crate::Camera;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene graph and a camera, then produces one frame.
/// It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Draw one frame of `scene` as seen through `camera`.
    fn render(&mut self, scene: &SceneGraph, camera: &Camera) -> Self::Output;
}

/// Headless text renderer.
///
/// Produces a human-readable description of each frame. Used by the CLI and
/// by tests, where no GPU is available.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &SceneGraph, camera: &Camera) -> String {
        self.frames += 1;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({} nodes) ===",
            self.frames,
            scene.len()
        );
        let p = camera.position;
        let t = camera.target();
        let _ = writeln!(
            out,
            "Camera: {} eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1})",
            camera.kind().label(),
            p.x,
            p.y,
            p.z,
            t.x,
            t.y,
            t.z
        );

        for node in scene.iter() {
            let p = node.transform.position;
            let r = node.transform.rotation;
            let what = match &node.kind {
                NodeKind::Mesh(mesh) => format!(
                    "{} {}",
                    mesh.geometry.kind_name(),
                    mesh.material.color
                ),
                NodeKind::Light(light) => format!("{} light {}", light.kind_name(), light.color()),
                NodeKind::Axes { size } => format!("axes {size}"),
            };
            let _ = writeln!(
                out,
                "  [{}] {:<10} {} pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2}){}",
                node.id(),
                node.name().unwrap_or("-"),
                what,
                p.x,
                p.y,
                p.z,
                r.x,
                r.y,
                r.z,
                if node.visible { "" } else { " hidden" }
            );
        }

        out
    }
}
