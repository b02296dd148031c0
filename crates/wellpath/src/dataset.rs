//! On-disk simulation catalog.
//!
//! Layout: `<root>/<well>/<connection>/` holding `well_path.csv`,
//! `geometrydef.txt`, `fluiddef.txt` and one CSV per [`SimulationKind`].

use crate::colormap::Colormap;
use crate::error::{Result, WellError};
use crate::geometry::{boundaries_from_definition, read_numbered_values, GeometryBoundary};
use crate::mesh::{MeshOptions, WellModel};
use crate::normalize::TimeToColumn;
use crate::simulation::{read_mud_density, read_simulation, SimulationGrid, SimulationKind, Thresholds};
use crate::survey::{
    read_survey, resolve_path, vertical_depth_scale, AngleUnit, PathSample, SurveyRecord,
};
use crate::texture::DataTexture;
use crate::timeline::TimeBounds;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const WELL_PATH_FILE: &str = "well_path.csv";
pub const GEOMETRY_FILE: &str = "geometrydef.txt";
pub const FLUID_FILE: &str = "fluiddef.txt";

/// Wells and their connections, sorted by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    root: PathBuf,
    wells: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Lists every `<well>/<connection>` directory under `root`.
    pub fn scan(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut wells: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for entry in WalkDir::new(&root)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                    return Err(WellError::asset(path, io::Error::from(e)));
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            let (Some(well), Some(connection)) = (
                path.parent().and_then(Path::file_name),
                path.file_name(),
            ) else {
                continue;
            };
            wells
                .entry(well.to_string_lossy().into_owned())
                .or_default()
                .push(connection.to_string_lossy().into_owned());
        }

        log::info!("Found {} wells under {}", wells.len(), root.display());
        Ok(Self { root, wells })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn wells(&self) -> impl Iterator<Item = &str> {
        self.wells.keys().map(String::as_str)
    }

    pub fn connections(&self, well: &str) -> &[String] {
        self.wells.get(well).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Selecting a well picks its last connection.
    pub fn default_connection(&self, well: &str) -> Option<&str> {
        self.connections(well).last().map(String::as_str)
    }

    /// First well and its default connection.
    pub fn default_selection(&self) -> Option<(&str, &str)> {
        let well = self.wells().next()?;
        Some((well, self.default_connection(well)?))
    }

    pub fn connection(&self, well: &str, connection: &str) -> Result<ConnectionDir> {
        let path = self.root.join(well).join(connection);
        if !self.connections(well).iter().any(|c| c == connection) {
            return Err(WellError::asset(
                path,
                io::Error::new(io::ErrorKind::NotFound, "no such well/connection"),
            ));
        }
        Ok(ConnectionDir::new(path))
    }
}

/// One `<well>/<connection>` directory.
#[derive(Debug, Clone)]
pub struct ConnectionDir {
    path: PathBuf,
}

impl ConnectionDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self, name: &str) -> Result<BufReader<File>> {
        let path = self.path.join(name);
        File::open(&path)
            .map(BufReader::new)
            .map_err(|e| WellError::asset(path, e))
    }

    pub fn survey(&self) -> Result<Vec<SurveyRecord>> {
        read_survey(self.open(WELL_PATH_FILE)?)
    }

    pub fn path_samples(&self) -> Result<Vec<PathSample>> {
        resolve_path(&self.survey()?, AngleUnit::Degrees)
    }

    pub fn boundaries(&self) -> Result<Vec<GeometryBoundary>> {
        boundaries_from_definition(&read_numbered_values(self.open(GEOMETRY_FILE)?)?)
    }

    pub fn mud_density(&self) -> Result<f64> {
        read_mud_density(self.open(FLUID_FILE)?)
    }

    pub fn simulation(&self, kind: SimulationKind) -> Result<SimulationGrid> {
        read_simulation(self.open(&kind.file_name())?)
    }
}

/// Result of a geometry load: the mesh and the time axis it animates over.
#[derive(Debug, Clone)]
pub struct LoadedGeometry {
    pub model: WellModel,
    pub time_bounds: TimeBounds,
    pub time_to_column: TimeToColumn,
}

/// Builds the pipe model. Depth rows and the time axis come from the pipe
/// pressure series, which every connection carries.
pub fn load_geometry(dir: &ConnectionDir, options: &MeshOptions) -> Result<LoadedGeometry> {
    let samples = dir.path_samples()?;
    let boundaries = dir.boundaries()?;
    let grid = dir.simulation(SimulationKind::PipePressure)?;

    let model = WellModel::build(&samples, &boundaries, &grid.depth_to_row()?, options)?;
    let time_bounds = grid.time_bounds()?;
    let time_to_column = grid.time_to_column()?;

    log::info!(
        "Loaded geometry {}: {} segments, {} shoes, time {}..{} s",
        dir.path().display(),
        model.segments.len(),
        model.shoes.len(),
        time_bounds.min,
        time_bounds.max
    );
    Ok(LoadedGeometry {
        model,
        time_bounds,
        time_to_column,
    })
}

/// What to render into the data texture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImageRequest {
    pub simulation: SimulationKind,
    pub colormap: Colormap,
    pub thresholds: Thresholds,
}

/// Renders the selected simulation, hydrostatic part removed.
pub fn load_image(dir: &ConnectionDir, request: &ImageRequest) -> Result<DataTexture> {
    let kind = request.simulation;
    let vertical = vertical_depth_scale(&dir.survey()?, AngleUnit::Degrees)?;
    let density = if kind.is_pressure() {
        dir.mud_density()?
    } else {
        0.0
    };
    let grid = dir
        .simulation(kind)?
        .relative_to_hydrostatic(&vertical, kind.gradient_per_meter(density));
    let texture = grid.render(request.colormap, request.thresholds)?;

    log::info!(
        "Loaded {} image {}: {}x{} ({})",
        kind,
        dir.path().display(),
        texture.width(),
        texture.height(),
        request.colormap
    );
    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wellpath-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn scan_sorts_wells_and_defaults_to_last_connection() {
        let root = scratch("catalog");
        for p in ["B/c2", "B/c1", "A/only"] {
            fs::create_dir_all(root.join(p)).unwrap();
        }
        fs::write(root.join("A/readme.txt"), "not a connection").unwrap();

        let catalog = Catalog::scan(&root).unwrap();
        assert_eq!(catalog.wells().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(catalog.connections("B"), ["c1", "c2"]);
        assert_eq!(catalog.default_connection("B"), Some("c2"));
        assert_eq!(catalog.default_selection(), Some(("A", "only")));
        assert!(catalog.connection("B", "c3").is_err());
        assert!(catalog.connections("Z").is_empty());

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn two_station_survey_still_renders_an_image() {
        let root = scratch("two-stations");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join(WELL_PATH_FILE), "Md;Inc;Azi;Tvd\n0;0;0;0\n100;0;0;100\n").unwrap();
        fs::write(root.join(FLUID_FILE), "1000 # Mud density (kg/m3)\n").unwrap();
        fs::write(
            root.join(SimulationKind::PipePressure.file_name()),
            "time,0.0,100.0\n0.0,0.0,1.0\n1.0,2.0,3.0\n",
        )
        .unwrap();

        let dir = ConnectionDir::new(&root);
        let texture = load_image(&dir, &ImageRequest::default()).unwrap();
        assert_eq!((texture.width(), texture.height()), (2, 2));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn missing_files_are_asset_errors() {
        let dir = ConnectionDir::new(scratch("missing"));
        let err = dir.survey().unwrap_err();
        assert!(matches!(err, WellError::AssetLoad { .. }));
        assert!(!err.is_malformed_input());
    }
}
