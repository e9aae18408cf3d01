use glam::Vec3;
use scenekit_common::{Color, NodeId};
use scenekit_controls::{Action, Binding};
use scenekit_render::{Camera, CameraKind, RenderSettings};
use scenekit_scene::{Geometry, Light, Material, NodeBuilder, SceneGraph};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::{AppContext, Demo, DemoError, DemoKind, from_json, plane_extents, to_json};

/// Distance between neighbouring grid cubes.
pub const GRID_SPACING: f32 = 5.0;
const SWEEP_RATE: f32 = 0.02;
const CAMERA_POSITION: Vec3 = Vec3::new(120.0, 60.0, 180.0);

/// Centres of the cube grid laid over a `width` x `height` plane at the origin.
///
/// Row and column counts are truncated, so a partial cell at the far edge
/// gets no cube.
pub fn grid_positions(width: f32, height: f32) -> Vec<Vec3> {
    let columns = (width / GRID_SPACING).floor() as usize;
    let rows = (height / GRID_SPACING).floor() as usize;
    let mut positions = Vec::with_capacity(rows * columns);
    for j in 0..rows {
        for i in 0..columns {
            positions.push(Vec3::new(
                -width / 2.0 + 2.0 + i as f32 * GRID_SPACING,
                2.0,
                -height / 2.0 + 2.0 + j as f32 * GRID_SPACING,
            ));
        }
    }
    positions
}

/// Look-at point at a given sweep phase.
pub fn sweep_target(phase: f32) -> Vec3 {
    Vec3::new(10.0 + 100.0 * phase.sin(), 10.0, 0.0)
}

/// Panel state: the active projection's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSwitchControls {
    pub perspective: String,
}

impl Default for CameraSwitchControls {
    fn default() -> Self {
        Self {
            perspective: CameraKind::Perspective.label().to_string(),
        }
    }
}

/// A field of cubes watched by a camera whose target sweeps left and right.
pub struct CameraSwitchDemo {
    ctx: AppContext,
    controls: CameraSwitchControls,
    marker: NodeId,
    cubes: usize,
    phase: f32,
}

impl CameraSwitchDemo {
    pub fn new(settings: RenderSettings) -> Result<Self, DemoError> {
        let mut scene = SceneGraph::new();
        let plane = scene.add(
            NodeBuilder::mesh(
                Arc::new(Geometry::plane(180.0, 180.0)),
                Arc::new(Material::lambert(Color::WHITE)),
            )
            .named("plane0")
            .rotated(Vec3::new(-FRAC_PI_2, 0.0, 0.0))
            .receive_shadow(),
        )?;

        let (width, height, _) = plane_extents(&scene, plane)?;
        let geometry = Arc::new(Geometry::cube(4.0));
        let material = Arc::new(Material::lambert(Color(0x00ee22)));
        let positions = grid_positions(width, height);
        let cubes = positions.len();
        for position in positions {
            scene.add(NodeBuilder::mesh(geometry.clone(), material.clone()).at(position))?;
        }
        tracing::debug!(cubes, "cube grid built");

        let marker = scene.add(
            NodeBuilder::mesh(
                Arc::new(Geometry::sphere(2.0)),
                Arc::new(Material::lambert(Color(0xff0000))),
            )
            .named("lookAtMesh0"),
        )?;
        scene.add(
            NodeBuilder::light(Light::directional(Color::WHITE)).at(Vec3::new(-20.0, 40.0, 60.0)),
        )?;
        scene.add(NodeBuilder::light(Light::ambient(Color(0x0c0c0c))))?;

        let camera = Camera::perspective(settings.viewport)
            .with_position(CAMERA_POSITION)
            .looking_at(Vec3::ZERO);

        Ok(Self {
            ctx: AppContext::new(scene, camera, settings),
            controls: CameraSwitchControls::default(),
            marker,
            cubes,
            phase: 0.0,
        })
    }

    pub fn marker(&self) -> NodeId {
        self.marker
    }

    /// Number of grid cubes built.
    pub fn cube_count(&self) -> usize {
        self.cubes
    }

    pub fn controls(&self) -> &CameraSwitchControls {
        &self.controls
    }

    fn switch_camera(&mut self) {
        let viewport = self.ctx.viewport();
        self.ctx.camera = self.ctx.camera.switched(viewport);
        self.controls.perspective = self.ctx.camera.kind().label().to_string();
        tracing::info!(camera = %self.controls.perspective, "camera switched");
    }
}

impl Demo for CameraSwitchDemo {
    fn kind(&self) -> DemoKind {
        DemoKind::Camera
    }

    fn context(&self) -> &AppContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    fn step(&mut self) -> Result<(), DemoError> {
        self.phase += SWEEP_RATE;
        let target = sweep_target(self.phase);
        self.ctx.camera.look_at(target);
        self.ctx.scene.node_mut(self.marker)?.transform.position = target;
        Ok(())
    }

    fn bindings(&mut self) -> Vec<Binding<'_>> {
        vec![
            Binding::button(Action::SwitchCamera),
            Binding::readout("perspective", self.controls.perspective.clone()),
        ]
    }

    fn invoke(&mut self, action: Action) -> Result<(), DemoError> {
        match action {
            Action::SwitchCamera => {
                self.switch_camera();
                Ok(())
            }
            _ => Err(DemoError::UnsupportedAction {
                demo: self.kind(),
                action,
            }),
        }
    }

    fn controls_json(&self) -> Result<String, DemoError> {
        to_json(&self.controls)
    }

    /// The only state is the projection name; the camera switches when the
    /// preset names the other kind.
    fn load_controls(&mut self, json: &str) -> Result<(), DemoError> {
        let wanted: CameraSwitchControls = from_json(json)?;
        let kind = CameraKind::from_label(&wanted.perspective)
            .ok_or(DemoError::UnknownCamera(wanted.perspective))?;
        if kind != self.ctx.camera.kind() {
            self.switch_camera();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> CameraSwitchDemo {
        CameraSwitchDemo::new(RenderSettings::default()).unwrap()
    }

    #[test]
    fn grid_cardinality_matches_truncated_division() {
        assert_eq!(grid_positions(180.0, 180.0).len(), 36 * 36);
        assert_eq!(grid_positions(60.0, 20.0).len(), 12 * 4);
        // Partial cells are dropped.
        assert_eq!(grid_positions(62.0, 24.9).len(), 12 * 4);
        assert!(grid_positions(4.9, 100.0).is_empty());
    }

    #[test]
    fn grid_stays_inside_plane() {
        for (w, h) in [(180.0, 180.0), (60.0, 40.0), (62.0, 24.9)] {
            for p in grid_positions(w, h) {
                assert!(p.x.abs() <= w / 2.0);
                assert!(p.z.abs() <= h / 2.0);
                assert_eq!(p.y, 2.0);
            }
        }
    }

    #[test]
    fn grid_first_and_last_cells() {
        let grid = grid_positions(180.0, 180.0);
        assert_eq!(grid[0], Vec3::new(-88.0, 2.0, -88.0));
        assert_eq!(grid[1], Vec3::new(-83.0, 2.0, -88.0));
        assert_eq!(grid[grid.len() - 1], Vec3::new(87.0, 2.0, 87.0));
    }

    #[test]
    fn scene_shares_cube_geometry() {
        let demo = demo();
        let scene = &demo.context().scene;
        assert_eq!(demo.cube_count(), 1296);
        // plane + cubes + marker + two lights
        assert_eq!(scene.len(), 1 + 1296 + 1 + 2);
        let cube_geometries: Vec<_> = scene
            .meshes()
            .filter(|(n, _)| n.name().is_none())
            .map(|(_, m)| m.geometry.clone())
            .collect();
        assert!(cube_geometries.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn marker_follows_camera_target() {
        let mut demo = demo();
        for _ in 0..50 {
            demo.step().unwrap();
            let target = demo.context().camera.target();
            let marker = demo.context().scene.node(demo.marker()).unwrap();
            assert_eq!(marker.transform.position, target);
            assert_eq!(target.y, 10.0);
            assert!((-90.0..=110.0).contains(&target.x));
        }
    }

    #[test]
    fn first_step_target() {
        let mut demo = demo();
        demo.step().unwrap();
        assert_eq!(demo.context().camera.target(), sweep_target(0.02));
    }

    #[test]
    fn switching_alternates_camera_kind() {
        let mut demo = demo();
        assert_eq!(demo.context().camera.kind(), CameraKind::Perspective);
        for n in 1..=6 {
            demo.step().unwrap();
            demo.invoke(Action::SwitchCamera).unwrap();
            let expected = if n % 2 == 1 {
                CameraKind::Orthographic
            } else {
                CameraKind::Perspective
            };
            assert_eq!(demo.context().camera.kind(), expected);
            assert_eq!(demo.controls().perspective, expected.label());
            assert_eq!(
                demo.context().camera.position.to_array(),
                CAMERA_POSITION.to_array()
            );
            assert_eq!(demo.context().camera.target(), Vec3::ZERO);
        }
    }

    #[test]
    fn load_controls_can_start_orthographic() {
        let mut demo = demo();
        demo.load_controls(r#"{"perspective": "Orthographic"}"#)
            .unwrap();
        assert_eq!(demo.context().camera.kind(), CameraKind::Orthographic);
        demo.load_controls(r#"{"perspective": "Orthographic"}"#)
            .unwrap();
        assert_eq!(demo.context().camera.kind(), CameraKind::Orthographic);
        demo.load_controls(r#"{"perspective": "Perspective"}"#)
            .unwrap();
        assert_eq!(demo.context().camera.kind(), CameraKind::Perspective);
        assert_eq!(demo.controls().perspective, "Perspective");
    }

    #[test]
    fn load_controls_rejects_unknown_camera() {
        let mut demo = demo();
        for _ in 0..2 {
            let err = demo
                .load_controls(r#"{"perspective": "Bogus"}"#)
                .unwrap_err();
            assert!(matches!(err, DemoError::UnknownCamera(name) if name == "Bogus"));
            assert_eq!(demo.context().camera.kind(), CameraKind::Perspective);
            assert_eq!(demo.controls().perspective, "Perspective");
        }
    }

    #[test]
    fn other_actions_are_rejected() {
        let mut demo = demo();
        assert!(demo.invoke(Action::AddCube).is_err());
        assert_eq!(demo.actions(), vec![Action::SwitchCamera]);
    }
}
