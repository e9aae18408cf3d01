use glam::Vec3;
use scenekit_common::{Color, NodeId, SceneRng};
use scenekit_controls::{Action, Binding};
use scenekit_render::{Camera, RenderSettings};
use scenekit_scene::{Fog, Geometry, Light, Material, NodeBuilder, SceneGraph};
use scenekit_tools::SceneInspector;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::{
    AppContext, Demo, DemoError, DemoKind, clamp_to_panel, from_json, plane_extents, to_json,
};

/// Highest point a spawned cube may be placed at.
const SPAWN_HEIGHT: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectCountControls {
    pub rotation_speed: f32,
    /// Node count shown on the panel; refreshed after every add or remove.
    pub number_of_objects: usize,
}

impl Default for ObjectCountControls {
    fn default() -> Self {
        Self {
            rotation_speed: 0.02,
            number_of_objects: 0,
        }
    }
}

/// Random cubes dropped onto a plane. Every mesh except the plane spins.
pub struct ObjectCountDemo {
    ctx: AppContext,
    controls: ObjectCountControls,
    plane: NodeId,
    rng: SceneRng,
}

impl ObjectCountDemo {
    pub fn new(settings: RenderSettings, seed: u64) -> Result<Self, DemoError> {
        let mut scene = SceneGraph::new();
        let plane = scene.add(
            NodeBuilder::mesh(
                Arc::new(Geometry::plane(60.0, 40.0)),
                Arc::new(Material::lambert(Color::WHITE)),
            )
            .named("plane0")
            .at(Vec3::new(15.0, 0.0, 0.0))
            .rotated(Vec3::new(-FRAC_PI_2, 0.0, 0.0))
            .receive_shadow(),
        )?;
        scene.add(NodeBuilder::light(Light::ambient(Color(0x0c0c0c))))?;
        scene.add(
            NodeBuilder::light(Light::spot(Color::WHITE).casting_shadow())
                .at(Vec3::new(-40.0, 60.0, -10.0)),
        )?;
        scene.set_fog(Some(Fog::Exp2 {
            color: Color::WHITE,
            density: 0.015,
        }));

        let camera = Camera::perspective(settings.viewport)
            .with_position(Vec3::new(-30.0, 40.0, 30.0))
            .looking_at(Vec3::ZERO);

        let controls = ObjectCountControls {
            number_of_objects: scene.len(),
            ..ObjectCountControls::default()
        };
        Ok(Self {
            ctx: AppContext::new(scene, camera, settings),
            controls,
            plane,
            rng: SceneRng::with_seed(seed),
        })
    }

    pub fn plane(&self) -> NodeId {
        self.plane
    }

    pub fn controls(&self) -> &ObjectCountControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut ObjectCountControls {
        &mut self.controls
    }

    /// Drop a randomly sized and coloured cube somewhere over the plane.
    ///
    /// Does nothing if the plane is gone.
    pub fn add_cube(&mut self) -> Result<Option<NodeId>, DemoError> {
        let (width, height, origin) = match plane_extents(&self.ctx.scene, self.plane) {
            Ok(extents) => extents,
            Err(err) => {
                tracing::warn!(%err, "ground plane unavailable, no cube added");
                return Ok(None);
            }
        };

        let size = self.rng.range_inclusive(1, 3) as f32;
        let color = Color::from_hex(self.rng.range_inclusive(0, 0xff_ffff));
        let position = Vec3::new(
            origin.x - width / 2.0 + (self.rng.next_f32() * width).round(),
            (self.rng.next_f32() * SPAWN_HEIGHT).round(),
            origin.z - height / 2.0 + (self.rng.next_f32() * height).round(),
        );

        let name = format!("cube-{}", self.ctx.scene.len());
        let id = self.ctx.scene.add(
            NodeBuilder::mesh(
                Arc::new(Geometry::cube(size)),
                Arc::new(Material::lambert(color)),
            )
            .named(name.as_str())
            .at(position)
            .cast_shadow(),
        )?;
        self.controls.number_of_objects = self.ctx.scene.len();
        tracing::debug!(%name, size, %color, ?position, "cube added");
        Ok(Some(id))
    }

    /// Remove the newest node if it is a mesh. Lights and the camera stay.
    pub fn remove_cube(&mut self) -> Option<NodeId> {
        let removed = self.ctx.scene.remove_last_removable();
        match &removed {
            Some(node) => {
                tracing::debug!(id = %node.id(), name = ?node.name(), "cube removed");
            }
            None => tracing::debug!("newest node is not a mesh, nothing removed"),
        }
        self.controls.number_of_objects = self.ctx.scene.len();
        removed.map(|node| node.id())
    }

    fn output_objects(&self) -> Result<(), DemoError> {
        let listing = SceneInspector::to_json(&self.ctx.scene)?;
        tracing::info!(
            summary = %SceneInspector::summary(&self.ctx.scene),
            "scene objects:\n{listing}"
        );
        Ok(())
    }
}

impl Demo for ObjectCountDemo {
    fn kind(&self) -> DemoKind {
        DemoKind::Objects
    }

    fn context(&self) -> &AppContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    fn step(&mut self) -> Result<(), DemoError> {
        let speed = self.controls.rotation_speed;
        let plane = self.plane;
        for node in self.ctx.scene.iter_mut() {
            if node.is_mesh() && node.id() != plane {
                node.transform.rotate_uniform(speed);
            }
        }
        Ok(())
    }

    fn bindings(&mut self) -> Vec<Binding<'_>> {
        let count = self.controls.number_of_objects.to_string();
        vec![
            Binding::slider("rotationSpeed", &mut self.controls.rotation_speed, 0.0, 0.5),
            Binding::button(Action::AddCube),
            Binding::button(Action::RemoveCube),
            Binding::button(Action::OutputObjects),
            Binding::readout("numberOfObjects", count),
        ]
    }

    fn invoke(&mut self, action: Action) -> Result<(), DemoError> {
        match action {
            Action::AddCube => self.add_cube().map(|_| ()),
            Action::RemoveCube => {
                self.remove_cube();
                Ok(())
            }
            Action::OutputObjects => self.output_objects(),
            _ => Err(DemoError::UnsupportedAction {
                demo: self.kind(),
                action,
            }),
        }
    }

    fn controls_json(&self) -> Result<String, DemoError> {
        to_json(&self.controls)
    }

    /// Only the rotation speed is taken from the preset; the object count
    /// always reflects the scene.
    fn load_controls(&mut self, json: &str) -> Result<(), DemoError> {
        let preset: ObjectCountControls = from_json(json)?;
        self.controls.rotation_speed = preset.rotation_speed;
        clamp_to_panel(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo(seed: u64) -> ObjectCountDemo {
        ObjectCountDemo::new(RenderSettings::default(), seed).unwrap()
    }

    #[test]
    fn starts_with_plane_and_two_lights() {
        let demo = demo(1);
        assert_eq!(demo.context().scene.len(), 3);
        assert_eq!(demo.controls().number_of_objects, 3);
        assert_eq!(demo.context().scene.lights().count(), 2);
    }

    #[test]
    fn added_cubes_stay_over_the_plane() {
        let mut demo = demo(7);
        for _ in 0..200 {
            let id = demo.add_cube().unwrap().unwrap();
            let node = demo.context().scene.node(id).unwrap();
            let p = node.transform.position;
            assert!((-15.0..=45.0).contains(&p.x), "x = {}", p.x);
            assert!((0.0..=5.0).contains(&p.y), "y = {}", p.y);
            assert!((-20.0..=20.0).contains(&p.z), "z = {}", p.z);
            assert_eq!(p.round(), p);

            let mesh = node.mesh().unwrap();
            let size = mesh.geometry.extents()[0];
            assert!([1.0, 2.0, 3.0].contains(&size));
            assert!(mesh.material.color.hex() <= 0xff_ffff);
            assert!(mesh.cast_shadow);
        }
        assert_eq!(demo.controls().number_of_objects, 203);
    }

    #[test]
    fn names_follow_scene_length() {
        let mut demo = demo(3);
        demo.add_cube().unwrap();
        demo.add_cube().unwrap();
        let scene = &demo.context().scene;
        assert!(scene.find_by_name("cube-3").is_some());
        assert!(scene.find_by_name("cube-4").is_some());
    }

    #[test]
    fn same_seed_same_cubes() {
        let mut a = demo(99);
        let mut b = demo(99);
        for _ in 0..5 {
            a.add_cube().unwrap();
            b.add_cube().unwrap();
        }
        let positions = |d: &ObjectCountDemo| -> Vec<Vec3> {
            d.context().scene.iter().map(|n| n.transform.position).collect()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn remove_never_touches_lights() {
        let mut demo = demo(5);
        assert_eq!(demo.remove_cube(), None);
        assert_eq!(demo.context().scene.len(), 3);

        let id = demo.add_cube().unwrap().unwrap();
        assert_eq!(demo.remove_cube(), Some(id));
        assert_eq!(demo.remove_cube(), None);
        assert_eq!(demo.context().scene.lights().count(), 2);
        assert_eq!(demo.controls().number_of_objects, 3);
    }

    #[test]
    fn preset_speed_is_held_to_slider_range() {
        let mut demo = demo(2);
        demo.load_controls(r#"{"rotationSpeed": 9}"#).unwrap();
        assert_eq!(demo.controls().rotation_speed, 0.5);
        demo.load_controls(r#"{"rotationSpeed": -1}"#).unwrap();
        assert_eq!(demo.controls().rotation_speed, 0.0);
    }

    #[test]
    fn missing_plane_makes_add_a_no_op() {
        let mut demo = demo(5);
        let plane = demo.plane();
        demo.context_mut().scene.remove(plane).unwrap();
        assert_eq!(demo.add_cube().unwrap(), None);
        assert_eq!(demo.context().scene.len(), 2);
        assert_eq!(demo.controls().number_of_objects, 3);
    }

    #[test]
    fn step_spins_everything_but_the_plane() {
        let mut demo = demo(11);
        let cube = demo.add_cube().unwrap().unwrap();
        for _ in 0..5 {
            demo.step().unwrap();
        }
        let scene = &demo.context().scene;
        let plane = scene.node(demo.plane()).unwrap();
        assert_eq!(plane.transform.rotation, Vec3::new(-FRAC_PI_2, 0.0, 0.0));
        let spun = scene.node(cube).unwrap().transform.rotation;
        assert!((spun - Vec3::splat(0.1)).abs().max_element() < 1e-5);
        for (node, _) in scene.lights() {
            assert_eq!(node.transform.rotation, Vec3::ZERO);
        }
    }

    #[test]
    fn output_objects_leaves_scene_alone() {
        let mut demo = demo(2);
        demo.add_cube().unwrap();
        demo.invoke(Action::OutputObjects).unwrap();
        assert_eq!(demo.context().scene.len(), 4);
    }

    #[test]
    fn preset_cannot_fake_the_count() {
        let mut demo = demo(2);
        demo.load_controls(r#"{"rotationSpeed": 0.3, "numberOfObjects": 40}"#)
            .unwrap();
        assert_eq!(demo.controls().rotation_speed, 0.3);
        assert_eq!(demo.controls().number_of_objects, 3);
    }

    #[test]
    fn panel_lists_three_actions() {
        let mut demo = demo(0);
        assert_eq!(
            demo.actions(),
            vec![Action::AddCube, Action::RemoveCube, Action::OutputObjects]
        );
        let rows = demo.bindings();
        assert!(matches!(&rows[4], Binding::Readout { text, .. } if text == "3"));
    }
}
