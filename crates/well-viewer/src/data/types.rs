//! Core data types for the viewer, focused on GPU data representation.

/// Per-frame camera data. Must match `FrameUniform` in `pipe.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Camera position; w unused.
    pub eye: [f32; 4],
}

/// Live material inputs. Must match `MaterialUniform` in `pipe.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Texture column of the current time.
    pub time: f32,
    /// 0 while no data texture is bound; fragments then use the fallback.
    pub has_texture: u32,
    pub _pad: [u32; 2],
}

const _: [(); 80] = [(); core::mem::size_of::<FrameUniform>()];
const _: [(); 16] = [(); core::mem::size_of::<MaterialUniform>()];

/// Indexed triangle mesh on the GPU.
#[derive(Debug)]
pub struct MeshGpu {
    pub vtx: wgpu::Buffer,
    pub idx: wgpu::Buffer,
    pub index_count: u32,
}

/// Simulation data texture on the GPU.
#[derive(Debug)]
pub struct TextureGpu {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Everything drawn for the current well. Replaced as a whole.
#[derive(Debug, Default)]
pub struct SceneGpu {
    pub pipe: Option<MeshGpu>,
    pub shoes: Option<MeshGpu>,
}
