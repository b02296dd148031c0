//! The rendering orchestrator. Owns the GPU context, the depth target, the
//! scene pipelines and the egui renderer.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{
    context::GfxContext,
    pipelines::{pipe::PipePipeline, shoe::ShoePipeline},
    targets::Targets,
};
use crate::{
    camera::Camera,
    data::{FrameUniform, SceneGpu, TextureGpu},
};
use std::sync::Arc;
use wellpath::AnimatedMaterial;
use wgpu::util::DeviceExt;
use winit::window::Window;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.03,
    a: 1.0,
};

pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    frame_ubo: wgpu::Buffer,
    frame_bind: wgpu::BindGroup,
    pub pipe: PipePipeline,
    pub shoe: ShoePipeline,
    pub egui_renderer: egui_wgpu::Renderer,
    /// Meshes of the current well; swapped whole on reload.
    pub scene: SceneGpu,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;
        let targets = Targets::new(&gfx.device, gfx.size);
        let color_fmt = gfx.config.format;

        let frame_layout = gfx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame UBO Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<FrameUniform>() as u64,
                        ),
                    },
                    count: None,
                }],
            });
        let frame_ubo = gfx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Frame UBO"),
                contents: bytemuck::bytes_of(&FrameUniform {
                    view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
                    eye: [0.0; 4],
                }),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let frame_bind = gfx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_ubo.as_entire_binding(),
            }],
        });

        let pipe = PipePipeline::new(
            &gfx.device,
            &gfx.queue,
            color_fmt,
            targets.depth_fmt,
            &frame_layout,
        );
        let shoe = ShoePipeline::new(&gfx.device, color_fmt, targets.depth_fmt, &frame_layout);
        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, color_fmt, None, 1);

        Ok(Self {
            gfx,
            targets,
            frame_ubo,
            frame_bind,
            pipe,
            shoe,
            egui_renderer,
            scene: SceneGpu::default(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.targets.resize(&self.gfx.device, new_size);
        }
    }

    /// Draws the pipe, then the shoe rings when enabled.
    pub fn render_scene(
        &mut self,
        swap_view: &wgpu::TextureView,
        camera: &Camera,
        material: &AnimatedMaterial<Arc<TextureGpu>>,
        show_markers: bool,
    ) {
        let eye = camera.eye();
        let frame = FrameUniform {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, 1.0],
        };
        self.gfx
            .queue
            .write_buffer(&self.frame_ubo, 0, bytemuck::bytes_of(&frame));
        self.pipe.write_material(&self.gfx.queue, material);

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(mesh) = &self.scene.pipe {
                self.pipe
                    .draw(&mut pass, &self.frame_bind, material.technique(), mesh);
            }
            if show_markers {
                if let Some(mesh) = &self.scene.shoes {
                    self.shoe.draw(&mut pass, &self.frame_bind, mesh);
                }
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}
