use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Handle to a node in a scene graph.
///
/// Handles are issued by the graph on insertion and never reused, so a handle
/// to a removed node simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A local coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// Spatial transform: position, Euler rotation (XYZ order, radians), scale.
///
/// Rotation is stored as Euler angles so that per-axis increments and direct
/// per-axis assignment round-trip exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Orientation as a quaternion (intrinsic X, then Y, then Z).
    pub fn quaternion(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Model matrix: translation * rotation * scale.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quaternion(), self.position)
    }

    /// Move along one of the transform's own axes.
    pub fn translate_local(&mut self, axis: Axis, distance: f32) {
        self.position += self.quaternion() * axis.unit() * distance;
    }

    pub fn translate_x(&mut self, distance: f32) {
        self.translate_local(Axis::X, distance);
    }

    pub fn translate_y(&mut self, distance: f32) {
        self.translate_local(Axis::Y, distance);
    }

    pub fn translate_z(&mut self, distance: f32) {
        self.translate_local(Axis::Z, distance);
    }

    /// Add the same angle to each rotation axis.
    pub fn rotate_uniform(&mut self, angle: f32) {
        self.rotation += Vec3::splat(angle);
    }
}
