use glam::Vec3;
use scenekit_common::{Color, NodeId};
use scenekit_controls::Binding;
use scenekit_render::{Camera, RenderSettings};
use scenekit_scene::{Geometry, Light, Material, NodeBuilder, SceneGraph};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::{AppContext, Demo, DemoError, DemoKind, clamp_to_panel, from_json, to_json};

/// Panel state for the basic demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasicControls {
    /// Radians added to each of the cube's rotation axes per frame.
    pub rotation_speed: f32,
    /// Phase advance of the bouncing sphere per frame.
    pub bouncing_speed: f32,
}

impl Default for BasicControls {
    fn default() -> Self {
        Self {
            rotation_speed: 0.02,
            bouncing_speed: 0.03,
        }
    }
}

/// Sphere x/y at a given bounce phase. The height never drops below 2.
pub fn bounce_position(phase: f32) -> (f32, f32) {
    (20.0 + 10.0 * phase.cos(), 2.0 + 10.0 * phase.sin().abs())
}

/// A plane with a spinning cube and a bouncing sphere under a spot light.
pub struct BasicDemo {
    ctx: AppContext,
    controls: BasicControls,
    cube: NodeId,
    sphere: NodeId,
    phase: f32,
}

impl BasicDemo {
    pub fn new(settings: RenderSettings) -> Result<Self, DemoError> {
        let mut scene = SceneGraph::new();
        scene.add(NodeBuilder::axes(20.0))?;
        scene.add(
            NodeBuilder::mesh(
                Arc::new(Geometry::plane(60.0, 20.0)),
                Arc::new(Material::lambert(Color::WHITE)),
            )
            .named("plane0")
            .at(Vec3::new(15.0, 0.0, 0.0))
            .rotated(Vec3::new(-FRAC_PI_2, 0.0, 0.0))
            .receive_shadow(),
        )?;
        let cube = scene.add(
            NodeBuilder::mesh(
                Arc::new(Geometry::cube(4.0)),
                Arc::new(Material::lambert(Color(0xff0000))),
            )
            .named("cube0")
            .at(Vec3::new(-4.0, 3.0, 0.0))
            .cast_shadow(),
        )?;
        let sphere = scene.add(
            NodeBuilder::mesh(
                Arc::new(Geometry::sphere_with_segments(4.0, 20, 20)),
                Arc::new(Material::lambert(Color(0x7777ff))),
            )
            .named("sphere0")
            .at(Vec3::new(20.0, 4.0, 2.0))
            .cast_shadow(),
        )?;
        scene.add(
            NodeBuilder::light(Light::spot(Color::WHITE).casting_shadow())
                .at(Vec3::new(-40.0, 60.0, -10.0)),
        )?;

        let camera = Camera::perspective(settings.viewport)
            .with_position(Vec3::new(-30.0, 40.0, 30.0))
            .looking_at(Vec3::ZERO);

        Ok(Self {
            ctx: AppContext::new(scene, camera, settings),
            controls: BasicControls::default(),
            cube,
            sphere,
            phase: 0.0,
        })
    }

    pub fn controls(&self) -> &BasicControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut BasicControls {
        &mut self.controls
    }

    pub fn cube(&self) -> NodeId {
        self.cube
    }

    pub fn sphere(&self) -> NodeId {
        self.sphere
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}

impl Demo for BasicDemo {
    fn kind(&self) -> DemoKind {
        DemoKind::Basic
    }

    fn context(&self) -> &AppContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    fn step(&mut self) -> Result<(), DemoError> {
        let cube = self.ctx.scene.node_mut(self.cube)?;
        cube.transform.rotate_uniform(self.controls.rotation_speed);

        self.phase += self.controls.bouncing_speed;
        let (x, y) = bounce_position(self.phase);
        let sphere = self.ctx.scene.node_mut(self.sphere)?;
        sphere.transform.position.x = x;
        sphere.transform.position.y = y;
        Ok(())
    }

    fn bindings(&mut self) -> Vec<Binding<'_>> {
        vec![
            Binding::slider("rotationSpeed", &mut self.controls.rotation_speed, 0.0, 0.5),
            Binding::slider("bouncingSpeed", &mut self.controls.bouncing_speed, 0.0, 0.5),
        ]
    }

    fn controls_json(&self) -> Result<String, DemoError> {
        to_json(&self.controls)
    }

    fn load_controls(&mut self, json: &str) -> Result<(), DemoError> {
        self.controls = from_json(json)?;
        clamp_to_panel(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn demo() -> BasicDemo {
        BasicDemo::new(RenderSettings::default()).unwrap()
    }

    #[test]
    fn scene_layout() {
        let demo = demo();
        let scene = &demo.context().scene;
        assert_eq!(scene.len(), 5);
        assert_eq!(scene.find_by_name("cube0"), Some(demo.cube()));
        assert_eq!(scene.find_by_name("sphere0"), Some(demo.sphere()));
        assert_eq!(scene.lights().count(), 1);
        assert!(scene.lights().all(|(_, l)| l.casts_shadow()));
        assert_eq!(demo.context().camera.position, Vec3::new(-30.0, 40.0, 30.0));
        assert_eq!(demo.context().camera.target(), Vec3::ZERO);
    }

    #[test]
    fn cube_rotation_accumulates() {
        let mut demo = demo();
        for _ in 0..10 {
            demo.step().unwrap();
        }
        let cube = demo.context().scene.node(demo.cube()).unwrap();
        let expected = 0.02 * 10.0;
        assert!((cube.transform.rotation - Vec3::splat(expected)).abs().max_element() < 1e-5);
    }

    #[test]
    fn sphere_never_goes_below_baseline() {
        let mut demo = demo();
        demo.controls_mut().bouncing_speed = 0.37;
        for _ in 0..2_000 {
            demo.step().unwrap();
            let sphere = demo.context().scene.node(demo.sphere()).unwrap();
            assert!(sphere.transform.position.y >= 2.0);
            assert!((10.0..=30.0).contains(&sphere.transform.position.x));
            assert_eq!(sphere.transform.position.z, 2.0);
        }
    }

    #[test]
    fn bounce_is_periodic() {
        for i in 0..100 {
            let phase = i as f32 * 0.173;
            let (x0, y0) = bounce_position(phase);
            let (x1, y1) = bounce_position(phase + TAU);
            assert!((x0 - x1).abs() < 1e-3);
            assert!((y0 - y1).abs() < 1e-3);
        }
    }

    #[test]
    fn zero_speed_freezes_animation() {
        let mut demo = demo();
        demo.load_controls(r#"{"rotationSpeed": 0.0, "bouncingSpeed": 0.0}"#)
            .unwrap();
        demo.step().unwrap();
        let cube = demo.context().scene.node(demo.cube()).unwrap();
        assert_eq!(cube.transform.rotation, Vec3::ZERO);
        assert_eq!(demo.phase(), 0.0);
    }

    #[test]
    fn controls_json_uses_panel_names() {
        let json = demo().controls_json().unwrap();
        assert!(json.contains("\"rotationSpeed\""));
        assert!(json.contains("\"bouncingSpeed\""));
    }

    #[test]
    fn missing_controls_take_defaults() {
        let mut demo = demo();
        demo.load_controls(r#"{"bouncingSpeed": 0.1}"#).unwrap();
        assert_eq!(demo.controls().rotation_speed, 0.02);
        assert_eq!(demo.controls().bouncing_speed, 0.1);
    }

    #[test]
    fn out_of_range_preset_is_clamped() {
        let mut demo = demo();
        demo.load_controls(r#"{"rotationSpeed": 50, "bouncingSpeed": -3}"#)
            .unwrap();
        assert_eq!(demo.controls().rotation_speed, 0.5);
        assert_eq!(demo.controls().bouncing_speed, 0.0);
        demo.step().unwrap();
        assert_eq!(demo.phase(), 0.0);
    }

    #[test]
    fn panel_has_two_sliders() {
        let mut demo = demo();
        let rows = demo.bindings();
        let labels: Vec<&str> = rows.iter().map(|b| b.label()).collect();
        assert_eq!(labels, vec!["rotationSpeed", "bouncingSpeed"]);
        drop(rows);
        assert!(demo.actions().is_empty());
    }
}
