//! Wellbore path resolution, pipe meshing and simulation textures.
//!
//! Pipeline, leaf first:
//!   survey   : raw stations → [`PathSample`]s (first station dropped)
//!   geometry : measured depth → pipe type and radius
//!   segments : half-vector fold → world-space [`PipeSegment`]s and shoes
//!   mesh     : merged cylinder mesh tagged with the depth row per vertex
//!   normalize: depth → texture row, time → texture column
//!   material : CPU model of the time/depth texture lookup
//!   timeline : wrapped playback clock
//!
//! Data files are read through [`dataset`]; simulation grids are coloured
//! in [`simulation`] with the ramps from [`colormap`].
//!
//! Nothing here touches the GPU; the viewer uploads the results.

pub mod colormap;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod material;
pub mod mesh;
pub mod normalize;
pub mod segments;
pub mod simulation;
pub mod survey;
pub mod texture;
pub mod timeline;

pub use colormap::Colormap;
pub use dataset::{load_geometry, load_image, Catalog, ConnectionDir, ImageRequest, LoadedGeometry};
pub use error::{Result, WellError};
pub use geometry::{classify, GeometryBoundary, PipeClass};
pub use material::{AnimatedMaterial, Technique, FALLBACK_COLOR};
pub use mesh::{MarkerVertex, MergedMesh, MeshOptions, PipeVertex, WellModel};
pub use normalize::{DepthToRow, LinearScale, TimeToColumn};
pub use segments::{PipeSegment, ShoeMarker};
pub use simulation::{SimulationGrid, SimulationKind, Thresholds};
pub use survey::{resolve_path, AngleUnit, PathSample, SurveyRecord};
pub use texture::{DataTexture, TextureSampler};
pub use timeline::{PlaybackState, TimeBounds, Timeline};
