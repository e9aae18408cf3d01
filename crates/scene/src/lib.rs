//! Scene graph: the retained set of meshes and lights handed to a renderer
//! every frame.
//!
//! # Invariants
//! - Nodes keep insertion order; removal preserves the order of the rest.
//! - Node names are unique within a graph.
//! - Only mesh nodes can be removed through `remove_last_removable`.

mod geometry;
pub mod graph;
mod light;

pub use geometry::{Geometry, Material};
pub use graph::{Fog, Mesh, Node, NodeBuilder, NodeKind, SceneError, SceneGraph};
pub use light::Light;
