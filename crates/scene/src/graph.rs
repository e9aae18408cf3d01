use glam::Vec3;
use scenekit_common::{Color, NodeId, Transform};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{Geometry, Light, Material};

/// Errors from scene graph operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),
    #[error("a node named {0:?} already exists")]
    DuplicateName(String),
}

/// Drawable geometry with its surface. Geometry and material are shared, so
/// one descriptor can back any number of nodes.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: Arc<Material>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(geometry: Arc<Geometry>, material: Arc<Material>) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// What a node is. Capability checks go through this tag.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Mesh(Mesh),
    Light(Light),
    /// Axis lines of the given length along +X, +Y and +Z.
    Axes { size: f32 },
}

impl NodeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Mesh(_) => "mesh",
            Self::Light(light) => light.kind_name(),
            Self::Axes { .. } => "axes",
        }
    }
}

/// Exponential-squared distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Fog {
    Exp2 { color: Color, density: f32 },
}

impl Fog {
    /// Fraction of the fog colour blended in at `distance`.
    pub fn factor(&self, distance: f32) -> f32 {
        match *self {
            Self::Exp2 { density, .. } => {
                let d = density * distance;
                1.0 - (-d * d).exp()
            }
        }
    }

    pub fn color(&self) -> Color {
        match *self {
            Self::Exp2 { color, .. } => color,
        }
    }
}

/// A node stored in the graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: Option<String>,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    pub fn is_light(&self) -> bool {
        matches!(self.kind, NodeKind::Light(_))
    }

    /// Whether user actions may delete this node. Lights and helpers never are.
    pub fn is_removable(&self) -> bool {
        self.is_mesh()
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }
}

/// Describes a node before it is inserted.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    name: Option<String>,
    transform: Transform,
    visible: bool,
    kind: NodeKind,
}

impl NodeBuilder {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            transform: Transform::default(),
            visible: true,
            kind,
        }
    }

    pub fn mesh(geometry: Arc<Geometry>, material: Arc<Material>) -> Self {
        Self::new(NodeKind::Mesh(Mesh::new(geometry, material)))
    }

    pub fn light(light: Light) -> Self {
        Self::new(NodeKind::Light(light))
    }

    pub fn axes(size: f32) -> Self {
        Self::new(NodeKind::Axes { size })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Only meaningful for meshes.
    pub fn cast_shadow(mut self) -> Self {
        if let NodeKind::Mesh(mesh) = &mut self.kind {
            mesh.cast_shadow = true;
        }
        self
    }

    /// Only meaningful for meshes.
    pub fn receive_shadow(mut self) -> Self {
        if let NodeKind::Mesh(mesh) = &mut self.kind {
            mesh.receive_shadow = true;
        }
        self
    }
}

/// Insertion-ordered collection of nodes plus scene-wide state.
///
/// The graph is the only owner of node data; everything else refers to nodes
/// by the `NodeId` returned from `add`.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    next_id: u64,
    fog: Option<Fog>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a node at the end of the graph and return its handle.
    pub fn add(&mut self, builder: NodeBuilder) -> Result<NodeId, SceneError> {
        if let Some(name) = &builder.name {
            if self.find_by_name(name).is_some() {
                return Err(SceneError::DuplicateName(name.clone()));
            }
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        tracing::debug!(%id, name = ?builder.name, kind = builder.kind.kind_name(), "node added");
        self.nodes.push(Node {
            id,
            name: builder.name,
            transform: builder.transform,
            visible: builder.visible,
            kind: builder.kind,
        });
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.name.as_deref() == Some(name))
            .map(|n| n.id)
    }

    /// Remove a node by handle, keeping the order of the others.
    pub fn remove(&mut self, id: NodeId) -> Result<Node, SceneError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or(SceneError::NodeNotFound(id))?;
        let node = self.nodes.remove(index);
        tracing::debug!(%id, "node removed");
        Ok(node)
    }

    /// Remove the most recently added node if it is removable.
    ///
    /// Returns `None` without touching the graph when the last node is a
    /// light or helper, or the graph is empty.
    pub fn remove_last_removable(&mut self) -> Option<Node> {
        if !self.nodes.last()?.is_removable() {
            return None;
        }
        let node = self.nodes.pop()?;
        tracing::debug!(id = %node.id, "last node removed");
        Some(node)
    }

    pub fn last(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn meshes(&self) -> impl Iterator<Item = (&Node, &Mesh)> {
        self.nodes.iter().filter_map(|n| n.mesh().map(|m| (n, m)))
    }

    pub fn lights(&self) -> impl Iterator<Item = (&Node, &Light)> {
        self.nodes.iter().filter_map(|n| n.light().map(|l| (n, l)))
    }

    pub fn fog(&self) -> Option<Fog> {
        self.fog
    }

    pub fn set_fog(&mut self, fog: Option<Fog>) {
        self.fog = fog;
    }
}
