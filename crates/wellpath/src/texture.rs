//! CPU-side simulation data texture.
//!
//! Columns index normalized time (u), rows index normalized depth (v).
//! A texture is only ever replaced as a whole.

use crate::error::{Result, WellError};
use std::sync::Arc;

/// Anything a material can look colours up in.
pub trait TextureSampler {
    /// RGB in [0, 1] at normalized coordinates; coordinates are clamped.
    fn sample(&self, u: f32, v: f32) -> [f32; 3];
}

impl<T: TextureSampler + ?Sized> TextureSampler for Arc<T> {
    fn sample(&self, u: f32, v: f32) -> [f32; 3] {
        (**self).sample(u, v)
    }
}

impl<T: TextureSampler + ?Sized> TextureSampler for &T {
    fn sample(&self, u: f32, v: f32) -> [f32; 3] {
        (**self).sample(u, v)
    }
}

/// RGBA8 pixel grid, row-major, row 0 = shallowest sampled depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTexture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DataTexture {
    /// Wraps an RGBA8 buffer, checking it holds exactly `width * height` pixels.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = 4 * width as usize * height as usize;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(WellError::TextureDimensions {
                width,
                height,
                len: pixels.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of the texel at column `x`, row `y`; `None` outside the texture.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = 4 * (y as usize * self.width as usize + x as usize);
        self.pixels[i..i + 4].try_into().ok()
    }

    /// Texel under a normalized coordinate, clamped to the edge.
    fn texel(coord: f32, size: u32) -> u32 {
        let c = if coord.is_nan() { 0.0 } else { coord.clamp(0.0, 1.0) };
        ((c * size as f32) as u32).min(size - 1)
    }
}

impl TextureSampler for DataTexture {
    fn sample(&self, u: f32, v: f32) -> [f32; 3] {
        let [r, g, b, _] = self
            .pixel(Self::texel(u, self.width), Self::texel(v, self.height))
            .unwrap_or_default();
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> DataTexture {
        #[rustfmt::skip]
        let px = vec![
            255, 0, 0, 255,    0, 255, 0, 255,
            0, 0, 255, 255,    255, 255, 255, 255,
        ];
        DataTexture::from_rgba(2, 2, px).unwrap()
    }

    #[test]
    fn rejects_mismatched_buffers() {
        let err = DataTexture::from_rgba(3, 2, vec![0; 20]).unwrap_err();
        assert!(matches!(err, WellError::TextureDimensions { expected: 24, len: 20, .. }));
        assert!(DataTexture::from_rgba(0, 0, Vec::new()).is_err());
    }

    #[test]
    fn samples_nearest_texel() {
        let t = two_by_two();
        assert_eq!(t.sample(0.1, 0.1), [1.0, 0.0, 0.0]);
        assert_eq!(t.sample(0.9, 0.1), [0.0, 1.0, 0.0]);
        assert_eq!(t.sample(0.1, 0.9), [0.0, 0.0, 1.0]);
        assert_eq!(t.sample(1.0, 1.0), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn pixel_lookup_is_bounds_checked() {
        let t = two_by_two();
        assert_eq!(t.pixel(1, 0), Some([0, 255, 0, 255]));
        assert_eq!(t.pixel(2, 0), None);
        assert_eq!(t.pixel(0, 2), None);
    }

    #[test]
    fn clamps_out_of_range_coordinates() {
        let t = two_by_two();
        assert_eq!(t.sample(-3.0, -1.0), t.sample(0.0, 0.0));
        assert_eq!(t.sample(7.0, 0.0), t.sample(1.0, 0.0));
    }
}
