//! World placement of pipe segments along a resolved well path.
//!
//! Each path sample becomes a cylinder whose axis is the local -Y direction
//! rotated by azimuth about Y and inclination about Z. Consecutive cylinders
//! share end points, so the centre of segment `i` is the centre of segment
//! `i - 1` advanced by both half vectors.

use crate::geometry::{classify, GeometryBoundary};
use crate::survey::PathSample;
use glam::{DMat3, DVec3};
use std::f64::consts::FRAC_PI_2;

/// Rotation of a segment's local frame into world space.
#[inline]
pub fn segment_rotation(inclination: f64, azimuth: f64) -> DMat3 {
    DMat3::from_rotation_y(azimuth) * DMat3::from_rotation_z(inclination)
}

/// Half of the segment vector: from a segment's centre to its deep end.
#[inline]
pub fn half_vector(inclination: f64, azimuth: f64, length: f64) -> DVec3 {
    segment_rotation(inclination, azimuth) * DVec3::new(0.0, -0.5 * length, 0.0)
}

/// Half vectors of every sample, lengths multiplied by `length_scaling`.
pub fn half_vectors(samples: &[PathSample], length_scaling: f64) -> Vec<DVec3> {
    samples
        .iter()
        .map(|s| half_vector(s.inclination, s.azimuth, s.segment_length * length_scaling))
        .collect()
}

/// Segment centres from half vectors:
/// `p[0] = h[0]`, `p[i] = p[i - 1] + h[i - 1] + h[i]`.
pub fn segment_positions(half: &[DVec3]) -> Vec<DVec3> {
    half.iter()
        .enumerate()
        .fold(Vec::with_capacity(half.len()), |mut acc, (i, h)| {
            let p = match i {
                0 => *h,
                _ => acc[i - 1] + half[i - 1] + *h,
            };
            acc.push(p);
            acc
        })
}

/// A renderable cylinder of the well. Immutable once built; a new well load
/// produces a new list.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeSegment {
    /// Centre of the cylinder in world units.
    pub position: DVec3,
    pub inclination: f64,
    pub azimuth: f64,
    /// Scaled length in world units.
    pub length: f64,
    /// Scaled radius in world units.
    pub radius: f64,
    pub measured_depth: f64,
    pub true_vertical_depth: f64,
    pub pipe_type: String,
}

impl PipeSegment {
    pub fn rotation(&self) -> DMat3 {
        segment_rotation(self.inclination, self.azimuth)
    }

    pub fn half_vector(&self) -> DVec3 {
        half_vector(self.inclination, self.azimuth, self.length)
    }

    /// Deep end of the segment.
    pub fn end(&self) -> DVec3 {
        self.position + self.half_vector()
    }

    /// Shallow end of the segment.
    pub fn start(&self) -> DVec3 {
        self.position - self.half_vector()
    }
}

/// Places one segment per sample and keeps those with a positive radius and
/// length. Positions are computed over the whole path before filtering, so
/// dropped samples still advance the path.
pub fn build_segments(
    samples: &[PathSample],
    boundaries: &[GeometryBoundary],
    length_scaling: f64,
    radius_scaling: f64,
) -> Vec<PipeSegment> {
    let positions = segment_positions(&half_vectors(samples, length_scaling));

    samples
        .iter()
        .zip(positions)
        .filter_map(|(sample, position)| {
            let class = classify(sample.measured_depth, boundaries);
            let segment = PipeSegment {
                position,
                inclination: sample.inclination,
                azimuth: sample.azimuth,
                length: sample.segment_length * length_scaling,
                radius: class.radius * radius_scaling,
                measured_depth: sample.measured_depth,
                true_vertical_depth: sample.true_vertical_depth,
                pipe_type: class.label.to_owned(),
            };
            (segment.radius > 0.0 && segment.length > 0.0).then_some(segment)
        })
        .collect()
}

/// Ring marking where a pipe type ends ("shoe"), with its label anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct ShoeMarker {
    pub pipe_type: String,
    pub position: DVec3,
    /// Maps the ring's local XY plane onto the plane across the pipe.
    pub rotation: DMat3,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub measured_depth: f64,
}

impl ShoeMarker {
    fn at_end_of(segment: &PipeSegment) -> Self {
        Self {
            pipe_type: segment.pipe_type.clone(),
            position: segment.end(),
            rotation: segment.rotation() * DMat3::from_rotation_x(FRAC_PI_2),
            inner_radius: segment.radius * 3.5,
            outer_radius: segment.radius * 4.5,
            measured_depth: segment.measured_depth,
        }
    }

    pub fn label(&self) -> String {
        format!("end of {}", self.pipe_type)
    }
}

/// One marker wherever the pipe type changes between consecutive segments,
/// plus one at the end of the last segment.
pub fn shoe_markers(segments: &[PipeSegment]) -> Vec<ShoeMarker> {
    segments
        .iter()
        .enumerate()
        .filter(|(i, seg)| {
            segments
                .get(i + 1)
                .map_or(true, |next| next.pipe_type != seg.pipe_type)
        })
        .map(|(_, seg)| ShoeMarker::at_end_of(seg))
        .collect()
}

/// Centre of the bounding box around all segment end points.
pub fn well_centre(segments: &[PipeSegment]) -> DVec3 {
    let (min, max) = segments
        .iter()
        .flat_map(|s| [s.start(), s.end()])
        .fold(
            (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(p), hi.max(p)),
        );
    if segments.is_empty() {
        DVec3::ZERO
    } else {
        0.5 * (min + max)
    }
}
