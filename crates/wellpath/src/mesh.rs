//! Triangle meshes for the pipe and its shoe markers.
//!
//! Every pipe segment becomes a capped cylinder; all cylinders are merged
//! into one vertex/index buffer pair so the whole well draws in one call.
//! Each vertex carries the normalized texture row of its segment.

use crate::error::Result;
use crate::geometry::{validate_boundaries, GeometryBoundary};
use crate::normalize::DepthToRow;
use crate::segments::{build_segments, shoe_markers, well_centre, PipeSegment, ShoeMarker};
use crate::survey::PathSample;
use glam::{DMat3, DVec3};
use rayon::prelude::*;
use std::f64::consts::TAU;

/// Per-vertex data of the merged pipe mesh.
/// Must match the vertex inputs of `pipe.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PipeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Normalized texture row of the owning segment; outside [0, 1] when the
    /// segment lies outside the simulated depths.
    pub depth_row: f32,
}

/// Per-vertex data of the shoe marker mesh.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerVertex {
    pub position: [f32; 3],
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedMesh<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

impl<V> MergedMesh<V> {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Concatenates parts in order, rebasing each part's indices.
    pub fn merge(parts: impl IntoIterator<Item = MergedMesh<V>>) -> Self {
        let mut out = MergedMesh {
            vertices: Vec::new(),
            indices: Vec::new(),
        };
        for part in parts {
            let base = out.vertices.len() as u32;
            out.indices.extend(part.indices.iter().map(|i| i + base));
            out.vertices.extend(part.vertices);
        }
        out
    }
}

/// Tunables for turning a path into meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
    /// World units per meter of measured depth.
    pub length_scaling: f64,
    /// Exaggeration applied to pipe radii so they are visible at well scale.
    pub radius_scaling: f64,
    pub radial_segments: u32,
    pub height_segments: u32,
    pub ring_segments: u32,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            length_scaling: 0.01,
            radius_scaling: 1.0,
            radial_segments: 20,
            height_segments: 5,
            ring_segments: 32,
        }
    }
}

/// Local-space geometry before placement.
struct Shape {
    positions: Vec<DVec3>,
    normals: Vec<DVec3>,
    indices: Vec<u32>,
}

impl Shape {
    fn with_capacity(vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            indices: Vec::new(),
        }
    }

    fn push(&mut self, position: DVec3, normal: DVec3) -> u32 {
        self.positions.push(position);
        self.normals.push(normal);
        (self.positions.len() - 1) as u32
    }
}

/// Capped cylinder centred on the origin with its axis along Y.
fn cylinder(radius: f64, height: f64, radial: u32, rows: u32) -> Shape {
    let radial = radial.max(3);
    let rows = rows.max(1);
    let ring = radial + 1;
    let mut shape = Shape::with_capacity((ring * (rows + 1) + 2 * (ring + radial)) as usize);

    // Torso
    for y in 0..=rows {
        let py = 0.5 * height - height * y as f64 / rows as f64;
        for x in 0..=radial {
            let theta = TAU * x as f64 / radial as f64;
            let (s, c) = theta.sin_cos();
            shape.push(DVec3::new(radius * s, py, radius * c), DVec3::new(s, 0.0, c));
        }
    }
    for y in 0..rows {
        for x in 0..radial {
            let a = y * ring + x;
            let b = (y + 1) * ring + x;
            let c = (y + 1) * ring + x + 1;
            let d = y * ring + x + 1;
            shape.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    // Caps
    for top in [true, false] {
        let sign = if top { 1.0 } else { -1.0 };
        let normal = DVec3::new(0.0, sign, 0.0);
        let py = 0.5 * height * sign;

        let first_centre = shape.positions.len() as u32;
        for _ in 0..radial {
            shape.push(DVec3::new(0.0, py, 0.0), normal);
        }
        let first_rim = shape.positions.len() as u32;
        for x in 0..=radial {
            let theta = TAU * x as f64 / radial as f64;
            let (s, c) = theta.sin_cos();
            shape.push(DVec3::new(radius * s, py, radius * c), normal);
        }
        for x in 0..radial {
            let centre = first_centre + x;
            let (r0, r1) = (first_rim + x, first_rim + x + 1);
            if top {
                shape.indices.extend_from_slice(&[r0, r1, centre]);
            } else {
                shape.indices.extend_from_slice(&[r1, r0, centre]);
            }
        }
    }
    shape
}

/// Flat annulus in the XY plane facing +Z.
fn ring(inner: f64, outer: f64, segments: u32) -> Shape {
    let segments = segments.max(3);
    let mut shape = Shape::with_capacity(2 * (segments + 1) as usize);
    for r in [inner, outer] {
        for i in 0..=segments {
            let theta = TAU * i as f64 / segments as f64;
            let (s, c) = theta.sin_cos();
            shape.push(DVec3::new(r * c, r * s, 0.0), DVec3::Z);
        }
    }
    let stride = segments + 1;
    for i in 0..segments {
        let (a, b, c, d) = (i, i + stride, i + stride + 1, i + 1);
        shape.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }
    shape
}

fn place(shape: &Shape, rotation: DMat3, translation: DVec3) -> impl Iterator<Item = (DVec3, DVec3)> + '_ {
    shape
        .positions
        .iter()
        .zip(&shape.normals)
        .map(move |(p, n)| (rotation * *p + translation, rotation * *n))
}

/// Cylinder of one segment, placed in world space and stamped with `depth_row`.
pub fn segment_mesh(segment: &PipeSegment, depth_row: f32, options: &MeshOptions) -> MergedMesh<PipeVertex> {
    let shape = cylinder(
        segment.radius,
        segment.length,
        options.radial_segments,
        options.height_segments,
    );
    let vertices = place(&shape, segment.rotation(), segment.position)
        .map(|(p, n)| PipeVertex {
            position: p.as_vec3().to_array(),
            normal: n.normalize_or_zero().as_vec3().to_array(),
            depth_row,
        })
        .collect();
    MergedMesh {
        vertices,
        indices: shape.indices,
    }
}

/// Merges all segment cylinders into one mesh. Segments are meshed in
/// parallel; the merge keeps path order so rebuilding is deterministic.
pub fn pipe_mesh(
    segments: &[PipeSegment],
    depth_to_row: &DepthToRow,
    options: &MeshOptions,
) -> MergedMesh<PipeVertex> {
    let parts: Vec<_> = segments
        .par_iter()
        .map(|seg| segment_mesh(seg, depth_to_row.map(seg.measured_depth) as f32, options))
        .collect();
    MergedMesh::merge(parts)
}

/// Merges all shoe rings into one mesh.
pub fn marker_mesh(markers: &[ShoeMarker], options: &MeshOptions) -> MergedMesh<MarkerVertex> {
    MergedMesh::merge(markers.iter().map(|m| {
        let shape = ring(m.inner_radius, m.outer_radius, options.ring_segments);
        MergedMesh {
            vertices: place(&shape, m.rotation, m.position)
                .map(|(p, _)| MarkerVertex {
                    position: p.as_vec3().to_array(),
                })
                .collect(),
            indices: shape.indices,
        }
    }))
}

/// Everything derived from one well load. Replaced as a whole on reload.
#[derive(Debug, Clone)]
pub struct WellModel {
    pub segments: Vec<PipeSegment>,
    pub pipe: MergedMesh<PipeVertex>,
    pub shoes: Vec<ShoeMarker>,
    pub shoe_mesh: MergedMesh<MarkerVertex>,
    /// Centre of the visible pipe's bounding box.
    pub centre: DVec3,
}

impl WellModel {
    /// Runs the full path → segments → meshes pipeline.
    pub fn build(
        samples: &[PathSample],
        boundaries: &[GeometryBoundary],
        depth_to_row: &DepthToRow,
        options: &MeshOptions,
    ) -> Result<Self> {
        validate_boundaries(boundaries)?;

        let segments = build_segments(
            samples,
            boundaries,
            options.length_scaling,
            options.radius_scaling,
        );
        let shoes = shoe_markers(&segments);
        let pipe = pipe_mesh(&segments, depth_to_row, options);
        let shoe_mesh = marker_mesh(&shoes, options);
        let centre = well_centre(&segments);

        log::debug!(
            "Built well: {} of {} samples visible, {} vertices, {} shoes",
            segments.len(),
            samples.len(),
            pipe.vertices.len(),
            shoes.len()
        );

        Ok(Self {
            segments,
            pipe,
            shoes,
            shoe_mesh,
            centre,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<PathSample> {
        [
            (500.0, 500.0, 0.0, 0.0),
            (1000.0, 500.0, 0.2, 0.5),
            (2000.0, 1000.0, 0.8, 1.0),
            (3000.0, 1000.0, 1.4, 1.2),
        ]
        .iter()
        .map(|&(md, len, inc, azi)| PathSample {
            measured_depth: md,
            true_vertical_depth: md,
            inclination: inc,
            azimuth: azi,
            segment_length: len,
        })
        .collect()
    }

    fn bounds() -> Vec<GeometryBoundary> {
        vec![
            GeometryBoundary::new("casing", 1.0, 1500.0),
            GeometryBoundary::new("open hole", 0.5, 2500.0),
        ]
    }

    #[test]
    fn merge_rebases_indices() {
        let a = MergedMesh {
            vertices: vec![MarkerVertex { position: [0.0; 3] }; 3],
            indices: vec![0, 1, 2],
        };
        let merged = MergedMesh::merge([a.clone(), a]);
        assert_eq!(merged.vertices.len(), 6);
        assert_eq!(merged.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn cylinder_vertices_lie_on_radius() {
        let shape = cylinder(2.0, 10.0, 8, 2);
        for p in &shape.positions {
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!(r < 2.0 + 1e-9);
            assert!(p.y.abs() <= 5.0 + 1e-9);
        }
        let max_index = *shape.indices.iter().max().unwrap() as usize;
        assert!(max_index < shape.positions.len());
        assert_eq!(shape.indices.len() % 3, 0);
    }

    #[test]
    fn every_vertex_carries_its_segment_row() {
        let depth = DepthToRow::new(&[0.0, 1000.0, 2000.0]).unwrap();
        let opts = MeshOptions::default();
        let model = WellModel::build(&samples(), &bounds(), &depth, &opts).unwrap();

        assert_eq!(model.segments.len(), 3);
        let per_segment = model.pipe.vertices.len() / model.segments.len();
        let rows: Vec<f32> = model
            .pipe
            .vertices
            .chunks(per_segment)
            .map(|chunk| {
                assert!(chunk.iter().all(|v| v.depth_row == chunk[0].depth_row));
                chunk[0].depth_row
            })
            .collect();
        assert_eq!(rows, vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let depth = DepthToRow::new(&[0.0, 3000.0]).unwrap();
        let opts = MeshOptions::default();
        let a = WellModel::build(&samples(), &bounds(), &depth, &opts).unwrap();
        let b = WellModel::build(&samples(), &bounds(), &depth, &opts).unwrap();
        assert_eq!(a.pipe, b.pipe);
        assert_eq!(a.shoe_mesh, b.shoe_mesh);
    }

    #[test]
    fn shoe_rings_surround_the_boundary() {
        let depth = DepthToRow::new(&[0.0, 3000.0]).unwrap();
        let model = WellModel::build(&samples(), &bounds(), &depth, &MeshOptions::default()).unwrap();
        assert_eq!(model.shoes.len(), 2);

        let ring_len = model.shoe_mesh.vertices.len() / 2;
        let first = &model.shoe_mesh.vertices[..ring_len];
        let centre = model.shoes[0].position;
        for v in first {
            let d = (DVec3::from(v.position.map(f64::from)) - centre).length();
            assert!(d > model.shoes[0].inner_radius - 1e-3);
            assert!(d < model.shoes[0].outer_radius + 1e-3);
        }
    }

    #[test]
    fn rejects_unsorted_boundaries() {
        let depth = DepthToRow::new(&[0.0, 3000.0]).unwrap();
        let mut b = bounds();
        b.reverse();
        assert!(WellModel::build(&samples(), &b, &depth, &MeshOptions::default()).is_err());
    }
}
