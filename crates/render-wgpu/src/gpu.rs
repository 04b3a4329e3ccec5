use crate::shaders::{FRAGMENT_ENTRY, LinkError, ShaderError, ShaderProgram, VERTEX_ENTRY};
use bytemuck::{Pod, Zeroable};
use menger_render::ShaderParams;
use std::mem::{offset_of, size_of};
use wgpu::util::DeviceExt;

/// Uniform block layout shared with the fragment shader's `Params` struct.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct GpuParams {
    direction: [f32; 3],
    time: f32,
    up: [f32; 3],
    current_fov: f32,
    right: [f32; 3],
    _pad0: f32,
    position: [f32; 3],
    _pad1: f32,
    resolution: [f32; 2],
    _pad2: [f32; 2],
}

const F32: naga::TypeInner = naga::TypeInner::Scalar(naga::Scalar::F32);
const VEC2: naga::TypeInner = naga::TypeInner::Vector {
    size: naga::VectorSize::Bi,
    scalar: naga::Scalar::F32,
};
const VEC3: naga::TypeInner = naga::TypeInner::Vector {
    size: naga::VectorSize::Tri,
    scalar: naga::Scalar::F32,
};

/// Byte offset and type the shader's block must use for each uploaded member.
pub(crate) const PARAMS_LAYOUT: [(&str, u32, naga::TypeInner); 7] = [
    ("direction", offset_of!(GpuParams, direction) as u32, VEC3),
    ("time", offset_of!(GpuParams, time) as u32, F32),
    ("up", offset_of!(GpuParams, up) as u32, VEC3),
    ("current_fov", offset_of!(GpuParams, current_fov) as u32, F32),
    ("right", offset_of!(GpuParams, right) as u32, VEC3),
    ("position", offset_of!(GpuParams, position) as u32, VEC3),
    ("resolution", offset_of!(GpuParams, resolution) as u32, VEC2),
];

/// Size of the uploaded uniform buffer.
pub(crate) const PARAMS_SIZE: u32 = size_of::<GpuParams>() as u32;

impl From<&ShaderParams> for GpuParams {
    fn from(p: &ShaderParams) -> Self {
        Self {
            direction: p.direction.to_array(),
            time: p.time,
            up: p.up.to_array(),
            current_fov: p.current_fov,
            right: p.right.to_array(),
            _pad0: 0.0,
            position: p.position.to_array(),
            _pad1: 0.0,
            resolution: p.resolution.to_array(),
            _pad2: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
}

/// Two triangles covering clip space.
#[rustfmt::skip]
const QUAD: [Vertex; 6] = [
    // Lower triangle
    Vertex { position: [-1.0, -1.0, 0.0] },
    Vertex { position: [ 1.0, -1.0, 0.0] },
    Vertex { position: [-1.0,  1.0, 0.0] },
    // Upper triangle
    Vertex { position: [-1.0,  1.0, 0.0] },
    Vertex { position: [ 1.0,  1.0, 0.0] },
    Vertex { position: [ 1.0, -1.0, 0.0] },
];

pub const QUAD_VERTEX_COUNT: u32 = QUAD.len() as u32;

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Draws the fullscreen quad with the validated shader program.
pub struct QuadRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    msaa_target: Option<wgpu::TextureView>,
    surface_format: wgpu::TextureFormat,
    sample_count: u32,
}

impl QuadRenderer {
    /// Build the pipeline. wgpu validation errors raised while creating the
    /// modules and pipeline are returned as `LinkError::Pipeline`.
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Result<Self, ShaderError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("params_buffer"),
            size: PARAMS_SIZE as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("params_bind_group_layout"),
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
            label: Some("params_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("quad_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vertex_shader"),
            source: wgpu::ShaderSource::Wgsl(program.vertex.source.as_str().into()),
        });
        let fragment_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fragment_shader"),
            source: wgpu::ShaderSource::Wgsl(program.fragment.source.as_str().into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("quad_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_shader,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_shader,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let msaa_target =
            Self::create_msaa_target(device, surface_format, width, height, sample_count);

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(LinkError::Pipeline(err.to_string()).into());
        }

        tracing::debug!(sample_count, ?surface_format, "quad pipeline created");

        Ok(Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            msaa_target,
            surface_format,
            sample_count,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.msaa_target = Self::create_msaa_target(
            device,
            self.surface_format,
            width,
            height,
            self.sample_count,
        );
    }

    /// Upload parameters, clear the colour target and draw the quad once.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        params: &ShaderParams,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&GpuParams::from(params)),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            // With MSAA the quad is drawn into the multisampled texture and
            // resolved into the surface.
            let (view, resolve_target, store) = match &self.msaa_target {
                Some(msaa) => (msaa, Some(target), wgpu::StoreOp::Discard),
                None => (target, None, wgpu::StoreOp::Store),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_msaa_target(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count <= 1 {
            return None;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa_target"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&Default::default()))
    }
}
