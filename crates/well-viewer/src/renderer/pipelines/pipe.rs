//! Pipe surface pipelines: one per shading technique, sharing the material
//! bind group so a technique swap never touches the texture binding.

use crate::data::types::{MaterialUniform, MeshGpu, TextureGpu};
use std::sync::Arc;
use wellpath::{AnimatedMaterial, PipeVertex, Technique};
use wgpu::util::DeviceExt;

pub struct PipePipeline {
    basic: wgpu::RenderPipeline,
    standard: wgpu::RenderPipeline,
    material_layout: wgpu::BindGroupLayout,
    material_ubo: wgpu::Buffer,
    material_bind: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    // Bound while no data texture is loaded; never sampled into the output.
    _placeholder_tex: wgpu::Texture,
    placeholder: wgpu::TextureView,
}

impl PipePipeline {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Pipe Material Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<MaterialUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let material_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Pipe Material UBO"),
            contents: bytemuck::bytes_of(&MaterialUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // Texels are data cells: no blending between neighbours.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Pipe Data Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let placeholder_tex = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("Pipe Placeholder Texture"),
                size: wgpu::Extent3d {
                    width: 1,
                    height: 1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &[0, 0, 0, 255],
        );
        let placeholder = placeholder_tex.create_view(&wgpu::TextureViewDescriptor::default());

        let material_bind = Self::make_bind(
            device,
            &material_layout,
            &material_ubo,
            &placeholder,
            &sampler,
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/pipe.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/pipe.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pipe PipelineLayout"),
            bind_group_layouts: &[frame_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PipeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position (vec3)
                wgpu::VertexAttribute {
                    shader_location: 0,
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal (vec3)
                wgpu::VertexAttribute {
                    shader_location: 1,
                    offset: 12,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Depth row (f32)
                wgpu::VertexAttribute {
                    shader_location: 2,
                    offset: 24,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        };

        let make_pipeline = |label: &str, fs_entry: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[vertex_layout.clone()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: depth_fmt,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: fs_entry,
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_fmt,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            })
        };

        let basic = make_pipeline("Pipe Basic Pipeline", "fs_basic");
        let standard = make_pipeline("Pipe Standard Pipeline", "fs_standard");

        Self {
            basic,
            standard,
            material_layout,
            material_ubo,
            material_bind,
            sampler,
            _placeholder_tex: placeholder_tex,
            placeholder,
        }
    }

    fn make_bind(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        ubo: &wgpu::Buffer,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Pipe Material Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Rebinds the material's current texture. Geometry is untouched.
    pub fn bind_material(
        &mut self,
        device: &wgpu::Device,
        material: &AnimatedMaterial<Arc<TextureGpu>>,
    ) {
        let view = material
            .texture()
            .map_or(&self.placeholder, |t| &t.view);
        self.material_bind = Self::make_bind(
            device,
            &self.material_layout,
            &self.material_ubo,
            view,
            &self.sampler,
        );
    }

    pub fn write_material(&self, queue: &wgpu::Queue, material: &AnimatedMaterial<Arc<TextureGpu>>) {
        let uniform = MaterialUniform {
            time: material.time(),
            has_texture: material.texture().is_some() as u32,
            _pad: [0; 2],
        };
        queue.write_buffer(&self.material_ubo, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn draw<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        frame_bind: &'a wgpu::BindGroup,
        technique: Technique,
        mesh: &'a MeshGpu,
    ) {
        let pipeline = match technique {
            Technique::Basic => &self.basic,
            Technique::Standard => &self.standard,
        };
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, frame_bind, &[]);
        rpass.set_bind_group(1, &self.material_bind, &[]);
        rpass.set_vertex_buffer(0, mesh.vtx.slice(..));
        rpass.set_index_buffer(mesh.idx.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}
