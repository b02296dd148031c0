//! Texture-animated pipe material.
//!
//! The material owns two live inputs: a time cursor (normalized texture
//! column) and an optional data texture handle. The vertex depth row comes
//! from the mesh. [`AnimatedMaterial::shade`] is the reference the GPU
//! shader implements.

use crate::texture::TextureSampler;
use std::fmt;
use std::str::FromStr;

/// Colour used where there is no simulation data.
pub const FALLBACK_COLOR: [f32; 3] = [0.3, 0.3, 0.3];

/// Shading variant of the pipe surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Technique {
    /// Unlit: the sampled colour as-is.
    Basic,
    /// Lit by the scene's directional lights.
    #[default]
    Standard,
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Technique::Basic => "basic",
            Technique::Standard => "standard",
        })
    }
}

impl FromStr for Technique {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Technique::Basic),
            "standard" => Ok(Technique::Standard),
            other => Err(format!("unknown technique '{}'", other)),
        }
    }
}

/// The live values shared by every technique.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialUniforms<T> {
    pub time: f32,
    pub data_texture: Option<T>,
}

impl<T> Default for MaterialUniforms<T> {
    fn default() -> Self {
        Self {
            time: 0.0,
            data_texture: None,
        }
    }
}

/// A technique plus its uniforms. `T` is the texture handle type: a GPU
/// binding in the viewer, a [`DataTexture`](crate::texture::DataTexture)
/// reference in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedMaterial<T> {
    technique: Technique,
    uniforms: MaterialUniforms<T>,
}

impl<T> AnimatedMaterial<T> {
    pub fn new(technique: Technique) -> Self {
        Self {
            technique,
            uniforms: MaterialUniforms::default(),
        }
    }

    pub fn technique(&self) -> Technique {
        self.technique
    }

    pub fn uniforms(&self) -> &MaterialUniforms<T> {
        &self.uniforms
    }

    pub fn time(&self) -> f32 {
        self.uniforms.time
    }

    pub fn set_time(&mut self, time: f32) {
        self.uniforms.time = time;
    }

    pub fn texture(&self) -> Option<&T> {
        self.uniforms.data_texture.as_ref()
    }

    /// Swaps the bound texture. Geometry is untouched.
    pub fn set_texture(&mut self, texture: T) -> Option<T> {
        self.uniforms.data_texture.replace(texture)
    }

    pub fn clear_texture(&mut self) -> Option<T> {
        self.uniforms.data_texture.take()
    }
}

impl<T: Clone> AnimatedMaterial<T> {
    /// Builds a fresh material of `technique`, copying over the current time
    /// cursor and bound texture.
    pub fn with_technique(&self, technique: Technique) -> Self {
        Self {
            technique,
            uniforms: MaterialUniforms {
                time: self.uniforms.time,
                data_texture: self.uniforms.data_texture.clone(),
            },
        }
    }
}

impl<T: TextureSampler> AnimatedMaterial<T> {
    /// Base colour of a vertex with the given depth row: the texture at
    /// `(time, depth_row)` when a texture is bound and the row lies in
    /// `[0, 1]`, the fallback gray otherwise.
    pub fn shade(&self, depth_row: f32) -> [f32; 3] {
        match &self.uniforms.data_texture {
            Some(tex) if (0.0..=1.0).contains(&depth_row) => {
                tex.sample(self.uniforms.time, depth_row)
            }
            _ => FALLBACK_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::DataTexture;
    use std::sync::Arc;

    fn solid(r: u8, g: u8, b: u8) -> Arc<DataTexture> {
        let px = [r, g, b, 255].repeat(4 * 4);
        Arc::new(DataTexture::from_rgba(4, 4, px).unwrap())
    }

    #[test]
    fn out_of_range_rows_use_fallback() {
        let mut m = AnimatedMaterial::new(Technique::Standard);
        m.set_texture(solid(255, 0, 0));
        assert_eq!(m.shade(1.5), FALLBACK_COLOR);
        assert_eq!(m.shade(-0.01), FALLBACK_COLOR);
        assert_eq!(m.shade(f32::NAN), FALLBACK_COLOR);
        assert_eq!(m.shade(0.5), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn no_texture_uses_fallback() {
        let m: AnimatedMaterial<Arc<DataTexture>> = AnimatedMaterial::new(Technique::Basic);
        assert_eq!(m.shade(0.5), FALLBACK_COLOR);
    }

    #[test]
    fn time_selects_column() {
        // Left half red, right half blue.
        let mut px = Vec::new();
        for _row in 0..2 {
            px.extend_from_slice(&[255, 0, 0, 255]);
            px.extend_from_slice(&[0, 0, 255, 255]);
        }
        let tex = Arc::new(DataTexture::from_rgba(2, 2, px).unwrap());
        let mut m = AnimatedMaterial::new(Technique::Basic);
        m.set_texture(tex);
        m.set_time(0.2);
        assert_eq!(m.shade(0.5), [1.0, 0.0, 0.0]);
        m.set_time(0.8);
        assert_eq!(m.shade(0.5), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn technique_swap_keeps_time_and_texture() {
        let tex = solid(0, 255, 0);
        let mut basic = AnimatedMaterial::new(Technique::Basic);
        basic.set_texture(tex.clone());
        basic.set_time(0.42);

        let standard = basic.with_technique(Technique::Standard);
        assert_eq!(standard.technique(), Technique::Standard);
        assert_eq!(standard.time(), 0.42);
        assert!(Arc::ptr_eq(standard.texture().unwrap(), &tex));
        assert_eq!(standard.shade(0.3), basic.shade(0.3));
    }

    #[test]
    fn texture_swap_returns_previous() {
        let mut m = AnimatedMaterial::new(Technique::Basic);
        assert!(m.set_texture(solid(1, 1, 1)).is_none());
        let old = m.set_texture(solid(2, 2, 2)).unwrap();
        assert_eq!(old.pixel(0, 0).unwrap(), [1, 1, 1, 255]);
    }

    #[test]
    fn technique_names_round_trip() {
        for t in [Technique::Basic, Technique::Standard] {
            assert_eq!(t.to_string().parse::<Technique>().unwrap(), t);
        }
        assert!("phong".parse::<Technique>().is_err());
    }
}
