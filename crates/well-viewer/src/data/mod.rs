//! GPU-side representations of the well model and data textures.
//!
//! - `types`: uniform layouts and buffer/texture handles.
//! - `upload`: turning `wellpath` meshes and textures into those handles.

pub mod types;
pub mod upload;

pub use self::types::{FrameUniform, MaterialUniform, MeshGpu, SceneGpu, TextureGpu};
