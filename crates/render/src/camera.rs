use glam::{Mat4, Vec3};

use crate::Viewport;

/// Vertical field of view used by every perspective camera, in degrees.
const PERSPECTIVE_FOV_DEGREES: f32 = 45.0;
const PERSPECTIVE_NEAR: f32 = 0.1;
const PERSPECTIVE_FAR: f32 = 1000.0;
/// Pixels per world unit for orthographic cameras.
const ORTHO_PIXELS_PER_UNIT: f32 = 16.0;
const ORTHO_NEAR: f32 = -200.0;
const ORTHO_FAR: f32 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    },
}

/// Which projection a camera uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    Perspective,
    Orthographic,
}

impl CameraKind {
    pub fn toggled(self) -> Self {
        match self {
            Self::Perspective => Self::Orthographic,
            Self::Orthographic => Self::Perspective,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Perspective => "Perspective",
            Self::Orthographic => "Orthographic",
        }
    }

    /// Inverse of `label`.
    pub fn from_label(label: &str) -> Option<Self> {
        [Self::Perspective, Self::Orthographic]
            .into_iter()
            .find(|k| k.label() == label)
    }
}

/// A camera: projection, position and the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    target: Vec3,
    pub projection: Projection,
}

impl Camera {
    /// 45° perspective camera at the origin looking down -Z.
    pub fn perspective(viewport: Viewport) -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            projection: Projection::Perspective {
                fov_y: PERSPECTIVE_FOV_DEGREES.to_radians(),
                aspect: viewport.aspect(),
                near: PERSPECTIVE_NEAR,
                far: PERSPECTIVE_FAR,
            },
        }
    }

    /// Orthographic camera mapping 16 viewport pixels to one world unit.
    pub fn orthographic(viewport: Viewport) -> Self {
        let half_w = viewport.width as f32 / ORTHO_PIXELS_PER_UNIT;
        let half_h = viewport.height as f32 / ORTHO_PIXELS_PER_UNIT;
        Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            projection: Projection::Orthographic {
                left: -half_w,
                right: half_w,
                top: half_h,
                bottom: -half_h,
                near: ORTHO_NEAR,
                far: ORTHO_FAR,
            },
        }
    }

    pub fn new(kind: CameraKind, viewport: Viewport) -> Self {
        match kind {
            CameraKind::Perspective => Self::perspective(viewport),
            CameraKind::Orthographic => Self::orthographic(viewport),
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Aim the camera at a world-space point.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn looking_at(mut self, target: Vec3) -> Self {
        self.look_at(target);
        self
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn kind(&self) -> CameraKind {
        match self.projection {
            Projection::Perspective { .. } => CameraKind::Perspective,
            Projection::Orthographic { .. } => CameraKind::Orthographic,
        }
    }

    /// A camera of the other kind at the same position, aimed at the origin.
    pub fn switched(&self, viewport: Viewport) -> Self {
        Self::new(self.kind().toggled(), viewport)
            .with_position(self.position)
            .looking_at(Vec3::ZERO)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(fov_y, aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
            } => Mat4::orthographic_rh(left, right, bottom, top, near, far),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
