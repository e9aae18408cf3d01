//! Scene demos: each builds a small scene, exposes a controls panel and
//! advances one animation step per frame.
//!
//! # Invariants
//! - All demo state lives in the demo value; hosts own the demo and pass it
//!   to the frame loop by reference.
//! - Nodes touched by animation are addressed by the handle returned when
//!   they were built, never by name.
//! - A step error aborts the frame before the next one is scheduled.

mod basic;
mod camera_switch;
mod frame_loop;
mod object_count;
mod object_transform;

use scenekit_common::NodeId;
use scenekit_controls::{Action, Binding};
use scenekit_render::{Camera, RenderSettings, Viewport};
use scenekit_scene::{Geometry, SceneError, SceneGraph};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use basic::{BasicControls, BasicDemo, bounce_position};
pub use camera_switch::{
    CameraSwitchControls, CameraSwitchDemo, GRID_SPACING, grid_positions, sweep_target,
};
pub use frame_loop::FrameLoop;
pub use object_count::{ObjectCountControls, ObjectCountDemo};
pub use object_transform::{ObjectTransformControls, ObjectTransformDemo};

/// Errors from demo construction, animation and actions.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("{demo} demo has no {action} action")]
    UnsupportedAction { demo: DemoKind, action: Action },
    #[error("node {0} is not a plane")]
    NotAPlane(NodeId),
    #[error("invalid controls: {0}")]
    Controls(#[from] serde_json::Error),
    #[error("unknown demo {0:?} (expected one of basic, camera, transform, objects)")]
    UnknownDemo(String),
    #[error("unknown camera {0:?} (expected Perspective or Orthographic)")]
    UnknownCamera(String),
}

/// Everything a demo draws: the scene graph, the active camera and the
/// render surface settings.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub scene: SceneGraph,
    pub camera: Camera,
    pub settings: RenderSettings,
}

impl AppContext {
    pub fn new(scene: SceneGraph, camera: Camera, settings: RenderSettings) -> Self {
        Self {
            scene,
            camera,
            settings,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.settings.viewport
    }

    /// Adopt a new surface size. The camera keeps its kind, position and
    /// target; only the projection is rebuilt.
    pub fn resize(&mut self, viewport: Viewport) {
        self.settings.viewport = viewport;
        self.camera.projection = Camera::new(self.camera.kind(), viewport).projection;
        tracing::debug!(width = viewport.width, height = viewport.height, "surface resized");
    }
}

/// A runnable demo.
pub trait Demo {
    fn kind(&self) -> DemoKind;

    fn context(&self) -> &AppContext;

    fn context_mut(&mut self) -> &mut AppContext;

    /// Advance the animation by one frame.
    fn step(&mut self) -> Result<(), DemoError>;

    /// Rows for the controls panel, borrowing the controls state.
    fn bindings(&mut self) -> Vec<Binding<'_>>;

    /// Run a panel action.
    fn invoke(&mut self, action: Action) -> Result<(), DemoError> {
        Err(DemoError::UnsupportedAction {
            demo: self.kind(),
            action,
        })
    }

    /// Current controls state as JSON.
    fn controls_json(&self) -> Result<String, DemoError>;

    /// Replace the controls state from JSON. Missing fields take defaults.
    fn load_controls(&mut self, json: &str) -> Result<(), DemoError>;

    /// Actions offered by this demo's panel.
    fn actions(&mut self) -> Vec<Action> {
        self.bindings()
            .iter()
            .filter_map(|b| match b {
                Binding::Button { action, .. } => Some(*action),
                _ => None,
            })
            .collect()
    }
}

/// The available demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemoKind {
    /// Rotating cube and bouncing sphere.
    Basic,
    /// Cube grid with a sweeping look-at target and a camera toggle.
    Camera,
    /// One box driven directly by position/rotation/scale controls.
    Transform,
    /// Add and remove random cubes; every mesh but the ground spins.
    Objects,
}

impl DemoKind {
    pub const ALL: [DemoKind; 4] = [Self::Basic, Self::Camera, Self::Transform, Self::Objects];

    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Camera => "camera",
            Self::Transform => "transform",
            Self::Objects => "objects",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Basic => "Rotating cube and bouncing sphere",
            Self::Camera => "Perspective and orthographic cameras",
            Self::Transform => "Object transform controls",
            Self::Objects => "Adding and removing objects",
        }
    }

    /// Build the demo's scene and camera for the given surface.
    pub fn build(self, settings: RenderSettings, seed: u64) -> Result<Box<dyn Demo>, DemoError> {
        tracing::info!(demo = self.name(), seed, "building demo");
        Ok(match self {
            Self::Basic => Box::new(BasicDemo::new(settings)?),
            Self::Camera => Box::new(CameraSwitchDemo::new(settings)?),
            Self::Transform => Box::new(ObjectTransformDemo::new(settings)?),
            Self::Objects => Box::new(ObjectCountDemo::new(settings, seed)?),
        })
    }
}

impl std::fmt::Display for DemoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DemoKind {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| DemoError::UnknownDemo(s.to_string()))
    }
}

/// Clamp every slider on the demo's panel to its declared range.
pub(crate) fn clamp_to_panel<D: Demo + ?Sized>(demo: &mut D) {
    for row in demo.bindings().iter_mut() {
        row.clamp_to_range();
    }
}

/// Width, height and centre of a plane node.
pub(crate) fn plane_extents(
    scene: &SceneGraph,
    id: NodeId,
) -> Result<(f32, f32, glam::Vec3), DemoError> {
    let node = scene.node(id)?;
    match node.mesh().map(|m| *m.geometry) {
        Some(Geometry::Plane { width, height }) => Ok((width, height, node.transform.position)),
        _ => Err(DemoError::NotAPlane(id)),
    }
}

pub(crate) fn to_json<T: Serialize>(controls: &T) -> Result<String, DemoError> {
    Ok(serde_json::to_string_pretty(controls)?)
}

pub(crate) fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, DemoError> {
    Ok(serde_json::from_str(json)?)
}
