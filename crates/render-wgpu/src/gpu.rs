use crate::mesh::{FrameGeometry, InstanceData, LineVertex, MeshKey, Vertex};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use scenekit_render::{Camera, LightingSummary, RenderSettings, Renderer};
use scenekit_scene::SceneGraph;
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;

const MAX_INSTANCES: u32 = 10_000;
const MAX_LINE_VERTICES: u32 = 6 * 64;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Uniforms {
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    fog: [f32; 4],
    camera_pos: [f32; 4],
}

impl Uniforms {
    pub(crate) fn new(camera: &Camera, lighting: &LightingSummary) -> Self {
        let fog = match lighting.fog {
            Some(fog) => {
                let [r, g, b] = fog.color().rgb();
                let scenekit_scene::Fog::Exp2 { density, .. } = fog;
                [r, g, b, density]
            }
            None => [0.0; 4],
        };
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            ambient: lighting.ambient.extend(1.0).to_array(),
            light_dir: lighting.key_direction.extend(0.0).to_array(),
            light_color: lighting.key_color.extend(1.0).to_array(),
            fog,
            camera_pos: camera.position.extend(1.0).to_array(),
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, key: MeshKey) -> Self {
        let data = key.build();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        tracing::debug!(?key, vertices = data.vertices.len(), "mesh uploaded");
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

/// wgpu scene renderer: Lambert-lit instanced meshes, fog and axes lines.
///
/// Shadow flags are carried on the scene but no shadow maps are rendered.
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: BTreeMap<MeshKey, GpuMesh>,
    instance_buffer: wgpu::Buffer,
    line_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    settings: RenderSettings,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        settings: RenderSettings,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                ..Uniforms::zeroed()
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let depth_stencil = Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        });
        let targets = [Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &mesh_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &mesh_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
            // Planes are single-sided quads seen from both sides.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: depth_stencil.clone(),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let mut meshes = BTreeMap::new();
        for key in [MeshKey::Plane, MeshKey::Box] {
            meshes.insert(key, GpuMesh::upload(device, key));
        }

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: u64::from(MAX_INSTANCES) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("line_buffer"),
            size: u64::from(MAX_LINE_VERTICES) * std::mem::size_of::<LineVertex>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport = settings.viewport;
        let depth_texture = Self::create_depth_texture(device, viewport.width, viewport.height);
        if settings.shadows {
            tracing::debug!("shadow flags set; shading without shadow maps");
        }

        Self {
            mesh_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            meshes,
            instance_buffer,
            line_buffer,
            depth_texture,
            settings,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.settings.viewport.width = width;
        self.settings.viewport.height = height;
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame of `scene` through `camera` into `view`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &SceneGraph,
        camera: &Camera,
    ) {
        let lighting = LightingSummary::from_scene(scene);
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(camera, &lighting)),
        );

        let mut frame = FrameGeometry::gather(scene, MAX_INSTANCES as usize);
        frame.lines.truncate(MAX_LINE_VERTICES as usize);
        for batch in &frame.batches {
            self.meshes
                .entry(batch.key)
                .or_insert_with(|| GpuMesh::upload(device, batch.key));
        }
        if !frame.instances.is_empty() {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&frame.instances),
            );
        }
        if !frame.lines.is_empty() {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&frame.lines));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(&self.settings)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if !frame.batches.is_empty() {
                pass.set_pipeline(&self.mesh_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                for batch in &frame.batches {
                    let Some(mesh) = self.meshes.get(&batch.key) else {
                        continue;
                    };
                    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(
                        0..mesh.index_count,
                        0,
                        batch.first..batch.first + batch.count,
                    );
                }
            }

            if !frame.lines.is_empty() {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                pass.draw(0..frame.lines.len() as u32, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// One acquired surface texture, ready to receive a frame through the
/// [`Renderer`] trait.
pub struct SurfaceFrame<'a> {
    pub renderer: &'a mut WgpuRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub view: &'a wgpu::TextureView,
}

impl Renderer for SurfaceFrame<'_> {
    type Output = ();

    fn render(&mut self, scene: &SceneGraph, camera: &Camera) {
        self.renderer
            .render(self.device, self.queue, self.view, scene, camera);
    }
}

/// Background the frame is cleared to.
fn clear_color(settings: &RenderSettings) -> wgpu::Color {
    let [r, g, b] = settings.clear_color.rgb();
    wgpu::Color {
        r: f64::from(r),
        g: f64::from(g),
        b: f64::from(b),
        a: f64::from(settings.clear_alpha),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use scenekit_common::Color;
    use scenekit_render::Viewport;
    use scenekit_scene::Fog;

    #[test]
    fn frame_clears_to_settings_background() {
        let settings = RenderSettings::default();
        let clear = clear_color(&settings);
        let grey = f64::from(0xee as f32 / 255.0);
        assert_eq!((clear.r, clear.g, clear.b, clear.a), (grey, grey, grey, 1.0));

        let dark = RenderSettings {
            clear_color: Color(0x000022),
            clear_alpha: 0.5,
            ..RenderSettings::default()
        };
        let clear = clear_color(&dark);
        assert_eq!((clear.r, clear.g, clear.a), (0.0, 0.0, 0.5));
        assert!(clear.b > 0.0);
    }

    #[test]
    fn uniforms_layout_is_std140_friendly() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 144);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }

    #[test]
    fn uniforms_carry_fog_and_camera() {
        let camera = Camera::perspective(Viewport::default())
            .with_position(Vec3::new(-30.0, 40.0, 30.0))
            .looking_at(Vec3::ZERO);
        let lighting = LightingSummary {
            ambient: Vec3::splat(0.05),
            key_direction: Vec3::Y,
            key_color: Vec3::ONE,
            fog: Some(Fog::Exp2 {
                color: Color::WHITE,
                density: 0.015,
            }),
        };
        let u = Uniforms::new(&camera, &lighting);
        assert_eq!(u.fog, [1.0, 1.0, 1.0, 0.015]);
        assert_eq!(u.camera_pos, [-30.0, 40.0, 30.0, 1.0]);
        assert_eq!(u.light_dir, [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn no_fog_means_zero_density() {
        let u = Uniforms::new(
            &Camera::perspective(Viewport::default()),
            &LightingSummary::default(),
        );
        assert_eq!(u.fog[3], 0.0);
    }
}
