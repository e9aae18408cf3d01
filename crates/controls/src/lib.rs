//! Controls panel: the parameters and actions a demo exposes to its operator.
//!
//! # Invariants
//! - Hosts (egui window, CLI) render the same bindings and dispatch the same
//!   actions; demos never see raw input events.
//! - Slider values stay within their declared range.

pub mod action;
mod binding;

pub use action::Action;
pub use binding::Binding;
