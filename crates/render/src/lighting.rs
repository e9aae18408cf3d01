use glam::Vec3;
use scenekit_scene::{Fog, Light, SceneGraph};

/// Flattened lighting inputs for a simple forward shader: summed ambient
/// light plus one key light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingSummary {
    pub ambient: Vec3,
    /// Unit vector from the surface towards the key light.
    pub key_direction: Vec3,
    pub key_color: Vec3,
    pub fog: Option<Fog>,
}

impl Default for LightingSummary {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            key_direction: Vec3::Y,
            key_color: Vec3::ZERO,
            fog: None,
        }
    }
}

impl LightingSummary {
    /// Directional and spot lights aim at the origin; the first visible one
    /// becomes the key light.
    pub fn from_scene(scene: &SceneGraph) -> Self {
        let mut summary = Self {
            fog: scene.fog(),
            ..Self::default()
        };
        let mut key_found = false;
        for (node, light) in scene.lights() {
            if !node.visible {
                continue;
            }
            match *light {
                Light::Ambient { color } => {
                    summary.ambient += Vec3::from(color.rgb());
                }
                Light::Directional {
                    color, intensity, ..
                }
                | Light::Spot {
                    color, intensity, ..
                } => {
                    if key_found {
                        continue;
                    }
                    key_found = true;
                    summary.key_direction = node.transform.position.normalize_or(Vec3::Y);
                    summary.key_color = Vec3::from(color.rgb()) * intensity;
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenekit_common::Color;
    use scenekit_scene::NodeBuilder;

    #[test]
    fn empty_scene_is_dark() {
        let summary = LightingSummary::from_scene(&SceneGraph::new());
        assert_eq!(summary.ambient, Vec3::ZERO);
        assert_eq!(summary.key_color, Vec3::ZERO);
    }

    #[test]
    fn first_directional_is_key() {
        let mut scene = SceneGraph::new();
        scene
            .add(NodeBuilder::light(Light::ambient(Color(0x0c0c0c))))
            .unwrap();
        scene
            .add(NodeBuilder::light(Light::spot(Color::WHITE)).at(Vec3::new(0.0, 10.0, 0.0)))
            .unwrap();
        scene
            .add(
                NodeBuilder::light(Light::directional(Color(0xff0000)))
                    .at(Vec3::new(10.0, 0.0, 0.0)),
            )
            .unwrap();

        let summary = LightingSummary::from_scene(&scene);
        assert_eq!(summary.key_direction, Vec3::Y);
        assert_eq!(summary.key_color, Vec3::ONE);
        assert!((summary.ambient.x - 12.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn hidden_lights_are_ignored() {
        let mut scene = SceneGraph::new();
        scene
            .add(NodeBuilder::light(Light::ambient(Color::WHITE)).hidden())
            .unwrap();
        assert_eq!(LightingSummary::from_scene(&scene).ambient, Vec3::ZERO);
    }
}
