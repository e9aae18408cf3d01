use glam::Vec3;
use scenekit_common::{Color, NodeId};
use scenekit_controls::{Action, Binding};
use scenekit_render::{Camera, RenderSettings};
use scenekit_scene::{Fog, Geometry, Light, Material, NodeBuilder, SceneGraph};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::{AppContext, Demo, DemoError, DemoKind, clamp_to_panel, from_json, to_json};

/// Panel state. Every field but the translate amounts is copied onto the box
/// each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectTransformControls {
    pub scale_x: f32,
    pub scale_y: f32,
    pub scale_z: f32,
    pub position_x: f32,
    pub position_y: f32,
    pub position_z: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub rotation_z: f32,
    pub translate_x: f32,
    pub translate_y: f32,
    pub translate_z: f32,
    pub visible: bool,
}

impl Default for ObjectTransformControls {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            scale_z: 1.0,
            position_x: 0.0,
            position_y: 4.0,
            position_z: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            rotation_z: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
            translate_z: 0.0,
            visible: true,
        }
    }
}

impl ObjectTransformControls {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position_x, self.position_y, self.position_z)
    }

    pub fn rotation(&self) -> Vec3 {
        Vec3::new(self.rotation_x, self.rotation_y, self.rotation_z)
    }

    pub fn scale(&self) -> Vec3 {
        Vec3::new(self.scale_x, self.scale_y, self.scale_z)
    }

    fn set_position(&mut self, position: Vec3) {
        self.position_x = position.x;
        self.position_y = position.y;
        self.position_z = position.z;
    }
}

/// A single box whose transform is bound directly to the panel.
pub struct ObjectTransformDemo {
    ctx: AppContext,
    controls: ObjectTransformControls,
    cube: NodeId,
}

impl ObjectTransformDemo {
    pub fn new(settings: RenderSettings) -> Result<Self, DemoError> {
        let controls = ObjectTransformControls::default();
        let mut scene = SceneGraph::new();
        scene.add(
            NodeBuilder::mesh(
                Arc::new(Geometry::plane(60.0, 40.0)),
                Arc::new(Material::lambert(Color::WHITE)),
            )
            .named("plane0")
            .at(Vec3::new(15.0, 0.0, 0.0))
            .rotated(Vec3::new(-FRAC_PI_2, 0.0, 0.0))
            .receive_shadow(),
        )?;
        let cube = scene.add(
            NodeBuilder::mesh(
                Arc::new(Geometry::cuboid(5.0, 8.0, 3.0)),
                Arc::new(Material::lambert(Color(0x44ff44))),
            )
            .named("cube0")
            .at(controls.position())
            .cast_shadow(),
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

        Ok(Self {
            ctx: AppContext::new(scene, camera, settings),
            controls,
            cube,
        })
    }

    pub fn cube(&self) -> NodeId {
        self.cube
    }

    pub fn controls(&self) -> &ObjectTransformControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut ObjectTransformControls {
        &mut self.controls
    }

    /// Move the box along its own axes by the translate amounts, then write
    /// the resulting position back into the panel.
    fn translate(&mut self) -> Result<(), DemoError> {
        let node = self.ctx.scene.node_mut(self.cube)?;
        node.transform.translate_x(self.controls.translate_x);
        node.transform.translate_y(self.controls.translate_y);
        node.transform.translate_z(self.controls.translate_z);
        let position = node.transform.position;
        self.controls.set_position(position);
        tracing::debug!(?position, "box translated");
        Ok(())
    }
}

impl Demo for ObjectTransformDemo {
    fn kind(&self) -> DemoKind {
        DemoKind::Transform
    }

    fn context(&self) -> &AppContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    fn step(&mut self) -> Result<(), DemoError> {
        let node = self.ctx.scene.node_mut(self.cube)?;
        node.visible = self.controls.visible;
        node.transform.position = self.controls.position();
        node.transform.rotation = self.controls.rotation();
        node.transform.scale = self.controls.scale();
        Ok(())
    }

    fn bindings(&mut self) -> Vec<Binding<'_>> {
        let c = &mut self.controls;
        vec![
            Binding::slider("scaleX", &mut c.scale_x, 0.0, 5.0).in_folder("scale"),
            Binding::slider("scaleY", &mut c.scale_y, 0.0, 5.0).in_folder("scale"),
            Binding::slider("scaleZ", &mut c.scale_z, 0.0, 5.0).in_folder("scale"),
            Binding::slider("positionX", &mut c.position_x, -10.0, 10.0).in_folder("position"),
            Binding::slider("positionY", &mut c.position_y, -4.0, 20.0).in_folder("position"),
            Binding::slider("positionZ", &mut c.position_z, -10.0, 10.0).in_folder("position"),
            Binding::slider("rotationX", &mut c.rotation_x, -4.0, 4.0).in_folder("rotation"),
            Binding::slider("rotationY", &mut c.rotation_y, -4.0, 4.0).in_folder("rotation"),
            Binding::slider("rotationZ", &mut c.rotation_z, -4.0, 4.0).in_folder("rotation"),
            Binding::slider("translateX", &mut c.translate_x, -10.0, 10.0).in_folder("translate"),
            Binding::slider("translateY", &mut c.translate_y, -10.0, 10.0).in_folder("translate"),
            Binding::slider("translateZ", &mut c.translate_z, -10.0, 10.0).in_folder("translate"),
            Binding::button(Action::Translate).in_folder("translate"),
            Binding::toggle("visible", &mut c.visible),
        ]
    }

    fn invoke(&mut self, action: Action) -> Result<(), DemoError> {
        match action {
            Action::Translate => self.translate(),
            _ => Err(DemoError::UnsupportedAction {
                demo: self.kind(),
                action,
            }),
        }
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

    fn demo() -> ObjectTransformDemo {
        ObjectTransformDemo::new(RenderSettings::default()).unwrap()
    }

    fn cube(demo: &ObjectTransformDemo) -> &scenekit_scene::Node {
        demo.context().scene.node(demo.cube()).unwrap()
    }

    #[test]
    fn initial_scene() {
        let demo = demo();
        let scene = &demo.context().scene;
        assert_eq!(scene.len(), 4);
        assert!(scene.fog().is_some());
        assert_eq!(cube(&demo).transform.position, Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(
            *cube(&demo).mesh().unwrap().geometry,
            Geometry::cuboid(5.0, 8.0, 3.0)
        );
    }

    #[test]
    fn step_copies_every_field() {
        let mut demo = demo();
        {
            let c = demo.controls_mut();
            c.scale_x = 2.5;
            c.position_z = -7.25;
            c.rotation_y = 1.3;
            c.visible = false;
        }
        demo.step().unwrap();
        let node = cube(&demo);
        assert_eq!(node.transform.scale, Vec3::new(2.5, 1.0, 1.0));
        assert_eq!(node.transform.position, Vec3::new(0.0, 4.0, -7.25));
        assert_eq!(node.transform.rotation, Vec3::new(0.0, 1.3, 0.0));
        assert!(!node.visible);

        let before = node.transform;
        demo.step().unwrap();
        assert_eq!(cube(&demo).transform, before);
    }

    #[test]
    fn translate_mirrors_position_into_controls() {
        let mut demo = demo();
        demo.controls_mut().translate_x = 3.0;
        demo.controls_mut().translate_z = -2.0;
        demo.invoke(Action::Translate).unwrap();
        assert_eq!(cube(&demo).transform.position, Vec3::new(3.0, 4.0, -2.0));
        assert_eq!(demo.controls().position(), Vec3::new(3.0, 4.0, -2.0));

        // The next step keeps the translated position.
        demo.step().unwrap();
        assert_eq!(cube(&demo).transform.position, Vec3::new(3.0, 4.0, -2.0));
    }

    #[test]
    fn translate_follows_local_axes() {
        let mut demo = demo();
        demo.controls_mut().rotation_y = FRAC_PI_2;
        demo.step().unwrap();
        demo.controls_mut().translate_x = 2.0;
        demo.invoke(Action::Translate).unwrap();
        let p = demo.controls().position();
        // Local +X points along world -Z after a quarter turn about Y.
        assert!((p - Vec3::new(0.0, 4.0, -2.0)).abs().max_element() < 1e-5);
    }

    #[test]
    fn panel_groups_sliders_into_folders() {
        let mut demo = demo();
        let rows = demo.bindings();
        assert_eq!(rows.len(), 14);
        let folders: Vec<Option<&str>> = rows.iter().map(|b| b.folder()).collect();
        assert_eq!(folders.iter().filter(|f| **f == Some("scale")).count(), 3);
        assert_eq!(folders.iter().filter(|f| **f == Some("translate")).count(), 4);
        assert_eq!(folders[13], None);
        drop(rows);
        assert_eq!(demo.actions(), vec![Action::Translate]);
    }

    #[test]
    fn slider_clamps_to_declared_range() {
        let mut demo = demo();
        let mut rows = demo.bindings();
        assert!(rows[4].set_clamped(50.0));
        drop(rows);
        assert_eq!(demo.controls().position_y, 20.0);
    }

    #[test]
    fn preset_values_land_inside_slider_ranges() {
        let mut demo = demo();
        demo.load_controls(
            r#"{"scaleX": 12, "positionY": -30, "rotationZ": 4.5, "translateX": 2, "visible": false}"#,
        )
        .unwrap();
        let c = demo.controls();
        assert_eq!(c.scale_x, 5.0);
        assert_eq!(c.position_y, -4.0);
        assert_eq!(c.rotation_z, 4.0);
        assert_eq!(c.translate_x, 2.0);
        assert!(!c.visible);

        demo.step().unwrap();
        assert_eq!(cube(&demo).transform.position, Vec3::new(0.0, -4.0, 0.0));
    }
}
