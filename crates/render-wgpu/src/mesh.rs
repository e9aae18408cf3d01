use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use scenekit_common::Transform;
use scenekit_scene::{Geometry, Mesh, NodeKind, SceneGraph};
use std::f32::consts::{PI, TAU};

/// Sphere tessellation is capped so vertex indices fit in `u16`.
const MAX_SEGMENTS: u32 = 128;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Which unit mesh a geometry is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum MeshKey {
    Plane,
    Box,
    Sphere { width: u32, height: u32 },
}

impl MeshKey {
    pub fn of(geometry: &Geometry) -> Self {
        match *geometry {
            Geometry::Plane { .. } => Self::Plane,
            Geometry::Box { .. } => Self::Box,
            Geometry::Sphere {
                width_segments,
                height_segments,
                ..
            } => Self::Sphere {
                width: width_segments.clamp(3, MAX_SEGMENTS),
                height: height_segments.clamp(2, MAX_SEGMENTS),
            },
        }
    }

    pub fn build(self) -> MeshData {
        match self {
            Self::Plane => unit_plane(),
            Self::Box => unit_box(),
            Self::Sphere { width, height } => unit_sphere(width, height),
        }
    }
}

pub(crate) struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

/// Scale taking a unit mesh to the geometry's dimensions.
pub(crate) fn geometry_scale(geometry: &Geometry) -> Vec3 {
    match *geometry {
        Geometry::Plane { width, height } => Vec3::new(width, height, 1.0),
        Geometry::Box {
            width,
            height,
            depth,
        } => Vec3::new(width, height, depth),
        Geometry::Sphere { radius, .. } => Vec3::splat(radius),
    }
}

pub(crate) fn model_matrix(transform: &Transform, geometry: &Geometry) -> Mat4 {
    transform.matrix() * Mat4::from_scale(geometry_scale(geometry))
}

/// 1x1 square in the XY plane facing +Z.
fn unit_plane() -> MeshData {
    let p = 0.5_f32;
    let n = [0.0, 0.0, 1.0];
    MeshData {
        vertices: vec![
            Vertex { position: [-p, -p, 0.0], normal: n },
            Vertex { position: [p, -p, 0.0], normal: n },
            Vertex { position: [p, p, 0.0], normal: n },
            Vertex { position: [-p, p, 0.0], normal: n },
        ],
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

/// Unit cube centred on the origin, one quad per face.
fn unit_box() -> MeshData {
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // normal, u axis, v axis
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in FACES {
        let (n, u, v) = (Vec3::from(normal), Vec3::from(u), Vec3::from(v));
        let base = vertices.len() as u16;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            vertices.push(Vertex {
                position: (n * 0.5 + u * su + v * sv).to_array(),
                normal,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    MeshData { vertices, indices }
}

/// Unit-radius UV sphere with poles on the Y axis.
fn unit_sphere(width_segments: u32, height_segments: u32) -> MeshData {
    let mut vertices = Vec::new();
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let (sin_v, cos_v) = (v * PI).sin_cos();
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let (sin_u, cos_u) = (u * TAU).sin_cos();
            let p = [-cos_u * sin_v, cos_v, sin_u * sin_v];
            vertices.push(Vertex {
                position: p,
                normal: p,
            });
        }
    }

    let row = width_segments + 1;
    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = (iy * row + ix + 1) as u16;
            let b = (iy * row + ix) as u16;
            let c = ((iy + 1) * row + ix) as u16;
            let d = ((iy + 1) * row + ix + 1) as u16;
            // Triangles that collapse onto a pole are skipped.
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    MeshData { vertices, indices }
}

/// World-space line segments for an axes helper: X red, Y green, Z blue.
pub(crate) fn axes_lines(transform: &Transform, size: f32) -> [LineVertex; 6] {
    let m = transform.matrix();
    let origin = m.transform_point3(Vec3::ZERO).to_array();
    let axis = |dir: Vec3, color: [f32; 4]| {
        [
            LineVertex { position: origin, color },
            LineVertex {
                position: m.transform_point3(dir * size).to_array(),
                color,
            },
        ]
    };
    let [x0, x1] = axis(Vec3::X, [1.0, 0.0, 0.0, 1.0]);
    let [y0, y1] = axis(Vec3::Y, [0.0, 1.0, 0.0, 1.0]);
    let [z0, z1] = axis(Vec3::Z, [0.0, 0.0, 1.0, 1.0]);
    [x0, x1, y0, y1, z0, z1]
}

/// One instanced draw: every visible mesh sharing a unit mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Batch {
    pub key: MeshKey,
    /// Range into the frame's instance list.
    pub first: u32,
    pub count: u32,
}

/// Per-frame draw lists gathered from the scene graph.
#[derive(Default)]
pub(crate) struct FrameGeometry {
    pub instances: Vec<InstanceData>,
    pub batches: Vec<Batch>,
    pub lines: Vec<LineVertex>,
}

impl FrameGeometry {
    /// Collect visible meshes grouped by unit mesh, plus axes helper lines.
    /// Hidden nodes are skipped. At most `max_instances` meshes are kept.
    pub fn gather(scene: &SceneGraph, max_instances: usize) -> Self {
        let mut meshes: Vec<(MeshKey, &Transform, &Mesh)> = Vec::new();
        let mut lines = Vec::new();
        for node in scene.iter().filter(|n| n.visible) {
            match &node.kind {
                NodeKind::Mesh(mesh) => {
                    meshes.push((MeshKey::of(&mesh.geometry), &node.transform, mesh));
                }
                NodeKind::Axes { size } => lines.extend(axes_lines(&node.transform, *size)),
                NodeKind::Light(_) => {}
            }
        }
        if meshes.len() > max_instances {
            tracing::warn!(
                meshes = meshes.len(),
                max_instances,
                "instance buffer full, extra meshes not drawn"
            );
            meshes.truncate(max_instances);
        }
        // Stable sort keeps graph order inside each batch.
        meshes.sort_by_key(|(key, _, _)| *key);

        let mut frame = Self {
            lines,
            ..Self::default()
        };
        for (key, transform, mesh) in meshes {
            let cols = model_matrix(transform, &mesh.geometry).to_cols_array_2d();
            let index = frame.instances.len() as u32;
            frame.instances.push(InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color: mesh.material.color.rgba(1.0),
            });
            match frame.batches.last_mut() {
                Some(batch) if batch.key == key => batch.count += 1,
                _ => frame.batches.push(Batch {
                    key,
                    first: index,
                    count: 1,
                }),
            }
        }
        frame
    }
}
