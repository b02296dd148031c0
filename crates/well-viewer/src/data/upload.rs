use crate::data::types::{MeshGpu, SceneGpu, TextureGpu};
use anyhow::{bail, Result};
use wellpath::{DataTexture, MergedMesh, WellModel};

use wgpu::util::DeviceExt;

/// Uploads an indexed mesh. Empty meshes give `None`; wgpu rejects
/// zero-sized vertex buffers.
pub fn upload_mesh<V: bytemuck::Pod>(
    device: &wgpu::Device,
    label: &str,
    mesh: &MergedMesh<V>,
) -> Option<MeshGpu> {
    if mesh.is_empty() {
        return None;
    }
    let vtx = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} VB")),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let idx = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} IB")),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    Some(MeshGpu {
        vtx,
        idx,
        index_count: mesh.indices.len() as u32,
    })
}

pub fn upload_scene(device: &wgpu::Device, model: &WellModel) -> SceneGpu {
    SceneGpu {
        pipe: upload_mesh(device, "Pipe", &model.pipe),
        shoes: upload_mesh(device, "Shoes", &model.shoe_mesh),
    }
}

/// Uploads the data texture as sRGB RGBA8; the colormaps are sRGB values.
pub fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &DataTexture,
) -> Result<TextureGpu> {
    let (width, height) = (texture.width(), texture.height());
    let max = device.limits().max_texture_dimension_2d;
    if width > max || height > max {
        bail!("data texture {width}x{height} exceeds the device limit of {max}");
    }

    let gpu = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("Simulation Data Texture"),
            size: wgpu::Extent3d {
                width,
                height,
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
        texture.pixels(),
    );
    let view = gpu.create_view(&wgpu::TextureViewDescriptor::default());
    Ok(TextureGpu {
        texture: gpu,
        view,
        width,
        height,
    })
}
