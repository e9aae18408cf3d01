use scenekit_scene::{NodeKind, SceneGraph};
use serde::Serialize;

/// Scene graph inspector for developer tooling.
///
/// Provides read-only queries for diagnostics output and development UI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene graph.
    pub fn summary(scene: &SceneGraph) -> SceneSummary {
        SceneSummary {
            node_count: scene.len(),
            mesh_count: scene.meshes().count(),
            light_count: scene.lights().count(),
            has_fog: scene.fog().is_some(),
        }
    }

    /// Describe every node, in graph order.
    pub fn nodes(scene: &SceneGraph) -> Vec<NodeInfo> {
        scene
            .iter()
            .map(|node| {
                let (detail, color) = match &node.kind {
                    NodeKind::Mesh(mesh) => (
                        mesh.geometry.kind_name().to_string(),
                        Some(mesh.material.color.to_string()),
                    ),
                    NodeKind::Light(light) => {
                        (light.kind_name().to_string(), Some(light.color().to_string()))
                    }
                    NodeKind::Axes { size } => (format!("axes({size})"), None),
                };
                NodeInfo {
                    id: node.id().0,
                    name: node.name().map(str::to_string),
                    kind: node.kind.kind_name(),
                    detail,
                    color,
                    visible: node.visible,
                    position: node.transform.position.to_array(),
                    rotation: node.transform.rotation.to_array(),
                    scale: node.transform.scale.to_array(),
                }
            })
            .collect()
    }

    /// The node listing as pretty-printed JSON.
    pub fn to_json(scene: &SceneGraph) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::nodes(scene))
    }
}

/// Summary of a scene graph for the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    pub node_count: usize,
    pub mesh_count: usize,
    pub light_count: usize,
    pub has_fog: bool,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: nodes={} meshes={} lights={} fog={}",
            self.node_count,
            self.mesh_count,
            self.light_count,
            if self.has_fog { "on" } else { "off" }
        )
    }
}

/// Serialisable description of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub id: u64,
    pub name: Option<String>,
    pub kind: &'static str,
    pub detail: String,
    pub color: Option<String>,
    pub visible: bool,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}
