use scenekit_common::Color;
use serde::{Deserialize, Serialize};

/// Shape and dimensions of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Flat rectangle in the local XY plane, facing +Z.
    Plane { width: f32, height: f32 },
    Box { width: f32, height: f32, depth: f32 },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
}

impl Geometry {
    pub fn plane(width: f32, height: f32) -> Self {
        Self::Plane { width, height }
    }

    pub fn cube(size: f32) -> Self {
        Self::Box {
            width: size,
            height: size,
            depth: size,
        }
    }

    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::Box {
            width,
            height,
            depth,
        }
    }

    /// Sphere with the default 8x6 tessellation.
    pub fn sphere(radius: f32) -> Self {
        Self::sphere_with_segments(radius, 8, 6)
    }

    pub fn sphere_with_segments(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self::Sphere {
            radius,
            width_segments,
            height_segments,
        }
    }

    /// Bounding size along the local axes.
    pub fn extents(&self) -> [f32; 3] {
        match *self {
            Self::Plane { width, height } => [width, height, 0.0],
            Self::Box {
                width,
                height,
                depth,
            } => [width, height, depth],
            Self::Sphere { radius, .. } => [radius * 2.0; 3],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Plane { .. } => "plane",
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
        }
    }
}

/// Diffuse (Lambert) surface description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    pub wireframe: bool,
}

impl Material {
    pub fn lambert(color: Color) -> Self {
        Self {
            color,
            wireframe: false,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::lambert(Color::WHITE)
    }
}
