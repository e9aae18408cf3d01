//! Shared types used by every scenekit crate.

mod color;
mod rng;
mod types;

pub use color::Color;
pub use rng::SceneRng;
pub use types::{Axis, NodeId, Transform};
