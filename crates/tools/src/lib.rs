//! Developer tooling: frame statistics and scene graph inspection.
//!
//! # Invariants
//! - Tools only read the scene graph.

mod inspector;
mod stats;

pub use inspector::{NodeInfo, SceneInspector, SceneSummary};
pub use stats::{FrameStats, FrameTimer, StatsMode};

pub fn crate_info() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"))
}
